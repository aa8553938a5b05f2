//! Command-line interface definitions.

use clap::Parser;

/// Command-line arguments for the feed builder.
///
/// # Examples
///
/// ```sh
/// # Build feeds from the default feeds.yaml into ./site
/// topic_feeds -o ./site
///
/// # Use an alternate configuration file
/// topic_feeds -c staging.yaml -o ./out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the feeds configuration file
    #[arg(short, long, default_value = "feeds.yaml")]
    pub config: String,

    /// Output directory; feeds land in `<out-dir>/feeds`, the homepage at
    /// `<out-dir>/index.html`
    #[arg(short, long, default_value = ".")]
    pub out_dir: String,
}
