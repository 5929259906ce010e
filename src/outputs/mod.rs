//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes one `SymbolReport` per symbol plus a run index
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-10-16/
//!     ├── AAPL.json
//!     ├── TSLA.json
//!     └── index.json
//! ```

pub mod json;
