use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("feed unavailable ({url}): {source}")]
  FeedUnavailable {
    url: String,
    #[source]
    source: FeedError,
  },
  #[error("feed {0} contains no episodes")]
  EmptyFeed(String),
  #[error("failed to serialize episodes: {0}")]
  Serialize(#[from] serde_json::Error),
  #[error("failed to write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("neither rss ({rss}) nor atom ({atom})")]
  Unrecognized {
    rss: rss::Error,
    atom: atom_syndication::Error,
  },
}

impl Error {
  pub fn feed_unavailable(url: &str, source: impl Into<FeedError>) -> Self {
    Error::FeedUnavailable {
      url: url.to_owned(),
      source: source.into(),
    }
  }
}
