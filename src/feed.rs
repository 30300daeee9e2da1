use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{error::FeedError, Error, Result, W};

const USER_AGENT: &str =
  concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A feed reduced to the fields the extractor reads, independent of
/// whether it arrived as RSS or Atom. Values are trimmed and blank ones
/// are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeed {
  pub title: String,
  pub image: Option<String>,
  pub entries: Vec<RawEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
  pub guid: Option<String>,
  pub title: Option<String>,
  pub date: Option<String>,
  pub duration: Option<String>,
  pub episode: Option<String>,
  pub season: Option<String>,
  pub episode_type: Option<String>,
  pub explicit: Option<String>,
  pub image: Option<String>,
  pub audio: Option<String>,
  pub description: Option<String>,
  pub link: Option<String>,
}

#[async_trait]
pub trait FeedSource: Send + Sync {
  async fn fetch(&self, url: &str) -> Result<Bytes, FeedError>;
}

pub struct HttpFeed {
  client: reqwest::Client,
}

impl HttpFeed {
  pub fn new(timeout: Duration) -> Result<Self, FeedError> {
    let client = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(timeout)
      .build()?;

    Ok(Self { client })
  }
}

#[async_trait]
impl FeedSource for HttpFeed {
  async fn fetch(&self, url: &str) -> Result<Bytes, FeedError> {
    let resp = self.client.get(url).send().await?.error_for_status()?;
    Ok(resp.bytes().await?)
  }
}

pub fn parse_feed(body: &[u8]) -> Result<RawFeed, FeedError> {
  let rss = match rss::Channel::read_from(body) {
    Ok(channel) => return Ok(W(&channel).raw_feed()),
    Err(e) => e,
  };

  let atom = match atom_syndication::Feed::read_from(body) {
    Ok(feed) => return Ok(W(&feed).raw_feed()),
    Err(e) => e,
  };

  Err(FeedError::Unrecognized { rss, atom })
}

pub async fn get_feed(source: &dyn FeedSource, url: &str) -> Result<RawFeed> {
  let body = source
    .fetch(url)
    .await
    .map_err(|e| Error::feed_unavailable(url, e))?;
  tracing::debug!(url, bytes = body.len(), "feed downloaded");

  parse_feed(&body).map_err(|e| Error::feed_unavailable(url, e))
}
