use std::{path::PathBuf, time::Duration};

use clap::Parser;

pub const DEFAULT_OUTPUT_PATH: &str = "volna_episodes.json";
pub const DEFAULT_EXTRAS_PATH: &str = "extras_map.json";

/// Regenerates the episode list of the "Volna s Vostoka" podcast from its
/// RSS feed.
#[derive(Debug, Clone, Parser)]
#[command(version)]
pub struct Config {
  /// Podcast feed URL
  #[arg(long = "rss", env = "RSS_URL")]
  pub feed_url: String,

  /// Where to write the episode list
  #[arg(long = "out", env = "OUTPUT_PATH", default_value = DEFAULT_OUTPUT_PATH)]
  pub output_path: PathBuf,

  /// JSON map of per-episode site fields, keyed by episode number
  #[arg(long = "extras", env = "EXTRAS_FILE", default_value = DEFAULT_EXTRAS_PATH)]
  pub extras_path: PathBuf,

  /// Give up on the feed request after this many seconds
  #[arg(long, env = "FEED_TIMEOUT_SECS", default_value_t = 30)]
  pub timeout_secs: u64,
}

impl Config {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}
