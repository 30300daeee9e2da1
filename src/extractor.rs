use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::{
  feed::{get_feed, FeedSource, RawEntry, RawFeed},
  podcast::{Episode, EpisodeCollection, Extras},
  util::parse,
  Result,
};

/// A field of a single entry that could not be mapped. The entry is still
/// emitted with the field left null.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryWarning {
  #[error("no publication date")]
  MissingDate,
  #[error("unparseable publication date {0:?}")]
  InvalidDate(String),
  #[error("unparseable duration {0:?}")]
  InvalidDuration(String),
  #[error("unparseable episode number {0:?}")]
  InvalidEpisodeNumber(String),
  #[error("unparseable season {0:?}")]
  InvalidSeason(String),
  #[error("no audio enclosure")]
  MissingAudio,
}

pub async fn generate_episodes(
  source: &dyn FeedSource,
  feed_url: &str,
  extras: &Extras,
  generated_at: DateTime<Utc>,
) -> Result<EpisodeCollection> {
  let feed = get_feed(source, feed_url).await?;
  tracing::info!(
    url = feed_url,
    title = %feed.title,
    entries = feed.entries.len(),
    "feed parsed"
  );

  Ok(build_collection(feed, extras, generated_at))
}

pub fn build_collection(
  feed: RawFeed,
  extras: &Extras,
  generated_at: DateTime<Utc>,
) -> EpisodeCollection {
  let RawFeed { image, entries, .. } = feed;
  let total = entries.len();
  let mut warning_count = 0;

  let mapped: Vec<_> = entries
    .into_iter()
    .enumerate()
    .map(|(i, entry)| {
      let (episode, warnings) = map_entry(entry, image.as_deref(), extras);
      for warning in &warnings {
        tracing::warn!(entry = i + 1, id = %episode.id, "{warning}");
      }
      warning_count += warnings.len();
      episode
    })
    .collect();

  let mut episodes: Vec<_> =
    mapped.into_iter().unique_by(|ep| ep.id.clone()).collect();
  if episodes.len() < total {
    tracing::debug!(
      dropped = total - episodes.len(),
      "dropped entries with duplicate ids"
    );
  }

  // stable, so undated entries keep their feed order at the end
  episodes.sort_by_key(|ep| Reverse(ep.published_at));

  if warning_count > 0 {
    tracing::warn!(warnings = warning_count, "some entries were incomplete");
  }

  EpisodeCollection::new(generated_at, episodes)
}

pub fn map_entry(
  entry: RawEntry,
  feed_image: Option<&str>,
  extras: &Extras,
) -> (Episode, Vec<EntryWarning>) {
  let mut warnings = Vec::new();

  let title = entry.title.unwrap_or_default();
  let id = match entry.guid {
    Some(guid) => guid,
    None => parse::fallback_id(&title, entry.date.as_deref().unwrap_or("")),
  };

  let published_at = match entry.date {
    None => {
      warnings.push(EntryWarning::MissingDate);
      None
    }
    Some(raw) => parse::parse_date(&raw).or_else(|| {
      warnings.push(EntryWarning::InvalidDate(raw));
      None
    }),
  };

  let duration_seconds = entry.duration.and_then(|raw| {
    parse::parse_duration(&raw).or_else(|| {
      warnings.push(EntryWarning::InvalidDuration(raw));
      None
    })
  });

  let episode_number = entry.episode.and_then(|raw| {
    parse::parse_number(&raw).or_else(|| {
      warnings.push(EntryWarning::InvalidEpisodeNumber(raw));
      None
    })
  });

  let season = entry.season.and_then(|raw| {
    parse::parse_number(&raw).or_else(|| {
      warnings.push(EntryWarning::InvalidSeason(raw));
      None
    })
  });

  if entry.audio.is_none() {
    warnings.push(EntryWarning::MissingAudio);
  }

  let description = entry
    .description
    .map(|html| parse::html_to_text(&html))
    .filter(|text| !text.is_empty());

  let page = episode_number
    .and_then(|n| extras.get(n))
    .and_then(|extra| extra.page.clone());

  let episode = Episode {
    id,
    title,
    published_at,
    duration_seconds,
    episode_number,
    image_url: entry.image.or_else(|| feed_image.map(str::to_owned)),
    audio_url: entry.audio,
    description,
    link: entry.link,
    season,
    episode_type: entry.episode_type,
    explicit: entry.explicit.as_deref().is_some_and(parse::parse_flag),
    page,
  };

  (episode, warnings)
}
