//! Command-line interface definitions.
//!
//! Flags override the YAML configuration; most can also come from the
//! environment.

use clap::Parser;

/// Scrape Finviz quote pages and score the headline sentiment of each symbol.
///
/// # Examples
///
/// ```sh
/// # A few symbols
/// finviz_sentiment -j ./reports AAPL MSFT TSLA
///
/// # The popular list plus one sector, with a config file
/// finviz_sentiment -j ./reports --popular --sector Healthcare -c config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Ticker symbols to process
    pub symbols: Vec<String>,

    /// Also process the built-in list of popular symbols
    #[arg(long)]
    pub popular: bool,

    /// Also process every symbol of a sector (Technology, Healthcare, Financial, Consumer, Industrial)
    #[arg(long)]
    pub sector: Vec<String>,

    /// Output directory for the JSON reports
    #[arg(short, long, env = "FINVIZ_JSON_OUTPUT_DIR")]
    pub json_output_dir: String,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "FINVIZ_CONFIG")]
    pub config: Option<String>,

    /// Override the site origin (useful for mirrors and fixtures)
    #[arg(long, env = "FINVIZ_BASE_URL")]
    pub base_url: Option<String>,

    /// Days of news included in each summary
    #[arg(long)]
    pub window_days: Option<u32>,
}
