use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod extractor;
mod feed;
mod output;
mod podcast;
mod util;

pub use error::{Error, Result};
pub use util::W;

use crate::{
  config::Config,
  feed::{FeedSource, HttpFeed},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();

  let config = Config::parse();

  match run(&config).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{e}");
      ExitCode::FAILURE
    }
  }
}

async fn run(config: &Config) -> Result<()> {
  let source = HttpFeed::new(config.timeout())
    .map_err(|e| Error::feed_unavailable(&config.feed_url, e))?;

  run_with(&source, config).await
}

async fn run_with(source: &dyn FeedSource, config: &Config) -> Result<()> {
  let generated_at = Utc::now();
  let extras = output::load_extras(&config.extras_path);

  tracing::info!(url = %config.feed_url, "fetching feed");
  let collection = extractor::generate_episodes(
    source,
    &config.feed_url,
    &extras,
    generated_at,
  )
  .await?;

  if collection.episodes.is_empty() {
    return Err(Error::EmptyFeed(config.feed_url.clone()));
  }

  output::write_collection(&config.output_path, &collection)?;
  tracing::info!(
    count = collection.total_count,
    path = %config.output_path.display(),
    "episodes saved"
  );

  if let Some(latest) = collection.latest() {
    tracing::info!(
      title = %latest.title,
      published_at = ?latest.published_at,
      "latest episode"
    );
  }

  Ok(())
}

#[cfg(test)]
mod test {
  use std::{fs, path::Path, time::Duration};

  use async_trait::async_trait;
  use bytes::Bytes;

  use super::*;
  use crate::error::FeedError;

  struct StaticFeed(&'static str);

  #[async_trait]
  impl FeedSource for StaticFeed {
    async fn fetch(&self, _url: &str) -> Result<Bytes, FeedError> {
      Ok(Bytes::from_static(self.0.as_bytes()))
    }
  }

  fn config(feed_url: &str, dir: &Path) -> Config {
    Config {
      feed_url: feed_url.to_owned(),
      output_path: dir.join("volna_episodes.json"),
      extras_path: dir.join("extras_map.json"),
      timeout_secs: 2,
    }
  }

  const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Волна с Востока</title>
    <link>https://volna.example</link>
    <description>Подкаст</description>
    <item>
      <title>Выпуск 8</title>
      <guid>volna-8</guid>
      <pubDate>Wed, 03 Jan 2024 10:00:00 +0000</pubDate>
      <enclosure url="https://cdn.example/8.mp3" length="1" type="audio/mpeg"/>
      <itunes:episode>8</itunes:episode>
    </item>
  </channel>
</rss>"#;

  const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Волна с Востока</title>
    <link>https://volna.example</link>
    <description>Подкаст</description>
  </channel>
</rss>"#;

  #[tokio::test]
  async fn test_run_writes_episodes_with_extras() {
    let dir = tempfile::tempdir().unwrap();
    let config = config("https://volna.example/rss", dir.path());
    fs::write(&config.extras_path, r#"{"8": {"page": "/ep/8"}}"#).unwrap();

    run_with(&StaticFeed(FEED), &config).await.unwrap();

    let text = fs::read_to_string(&config.output_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["totalCount"], 1);
    assert_eq!(json["episodes"][0]["id"], "volna-8");
    assert_eq!(json["episodes"][0]["episodeNumber"], 8);
    assert_eq!(json["episodes"][0]["page"], "/ep/8");
    assert_eq!(json["episodes"][0]["publishedAt"], "2024-01-03T10:00:00Z");
  }

  #[tokio::test]
  async fn test_unreachable_feed_keeps_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config("http://127.0.0.1:1/rss.xml", dir.path());
    fs::write(&config.output_path, "previous run").unwrap();

    let source = HttpFeed::new(Duration::from_secs(2)).unwrap();
    let err = run_with(&source, &config).await.unwrap_err();

    assert!(matches!(err, Error::FeedUnavailable { .. }));
    let text = fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(text, "previous run");
  }

  #[tokio::test]
  async fn test_empty_feed_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = config("https://volna.example/rss", dir.path());

    let err = run_with(&StaticFeed(EMPTY_FEED), &config)
      .await
      .unwrap_err();

    assert!(matches!(err, Error::EmptyFeed(_)));
    assert!(!config.output_path.exists());
  }
}
