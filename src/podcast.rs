use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
  pub id: String,
  pub title: String,
  pub published_at: Option<DateTime<Utc>>,
  pub duration_seconds: Option<u64>,
  pub episode_number: Option<u32>,
  pub image_url: Option<String>,
  pub audio_url: Option<String>,
  pub description: Option<String>,
  pub link: Option<String>,
  pub season: Option<u32>,
  pub episode_type: Option<String>,
  pub explicit: bool,
  pub page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeCollection {
  pub generated_at: DateTime<Utc>,
  pub total_count: usize,
  pub episodes: Vec<Episode>,
}

impl EpisodeCollection {
  pub fn new(generated_at: DateTime<Utc>, episodes: Vec<Episode>) -> Self {
    Self {
      generated_at,
      total_count: episodes.len(),
      episodes,
    }
  }

  pub fn latest(&self) -> Option<&Episode> {
    self.episodes.first()
  }
}

/// Site-maintained fields for a single episode, keyed by episode number in
/// the extras map file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EpisodeExtra {
  #[serde(default)]
  pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Extras(HashMap<String, EpisodeExtra>);

impl Extras {
  pub fn get(&self, episode_number: u32) -> Option<&EpisodeExtra> {
    self.0.get(&episode_number.to_string())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }
}

#[cfg(test)]
mod test {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn test_collection_serializes_envelope() {
    let generated_at = Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap();
    let episode = Episode {
      id: "ep-1".into(),
      title: "Первый выпуск".into(),
      published_at: Some(Utc.with_ymd_and_hms(2024, 1, 3, 9, 30, 0).unwrap()),
      duration_seconds: Some(3723),
      ..Default::default()
    };

    let collection = EpisodeCollection::new(generated_at, vec![episode]);
    let json = serde_json::to_value(&collection).unwrap();

    assert_eq!(json["generatedAt"], "2024-02-01T06:00:00Z");
    assert_eq!(json["totalCount"], 1);
    let ep = &json["episodes"][0];
    assert_eq!(ep["id"], "ep-1");
    assert_eq!(ep["publishedAt"], "2024-01-03T09:30:00Z");
    assert_eq!(ep["durationSeconds"], 3723);
    assert!(ep["episodeNumber"].is_null());
    assert!(ep["imageUrl"].is_null());
    assert!(ep["audioUrl"].is_null());
    assert!(ep["description"].is_null());
    assert_eq!(ep["explicit"], false);
  }

  #[test]
  fn test_extras_lookup_by_number() {
    let extras: Extras =
      serde_json::from_str(r#"{"8": {"page": "/episodes/8"}, "9": {}}"#)
        .unwrap();

    assert_eq!(extras.len(), 2);
    assert_eq!(extras.get(8).unwrap().page.as_deref(), Some("/episodes/8"));
    assert_eq!(extras.get(9).unwrap().page, None);
    assert!(extras.get(10).is_none());
  }
}
