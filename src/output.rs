use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
};

use crate::{
  podcast::{EpisodeCollection, Extras},
  Error, Result,
};

/// Loads the extras map. A missing file is normal; an unreadable one is
/// reported and ignored so the site still gets the feed data.
pub fn load_extras(path: &Path) -> Extras {
  let text = match fs::read_to_string(path) {
    Ok(text) => text,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      tracing::debug!(path = %path.display(), "no extras map");
      return Extras::default();
    }
    Err(e) => {
      tracing::warn!(path = %path.display(), "cannot read extras map: {e}");
      return Extras::default();
    }
  };

  match serde_json::from_str::<Extras>(&text) {
    Ok(extras) => {
      tracing::debug!(
        path = %path.display(),
        count = extras.len(),
        "extras loaded"
      );
      extras
    }
    Err(e) => {
      tracing::warn!(path = %path.display(), "invalid extras map: {e}");
      Extras::default()
    }
  }
}

/// Replaces `path` with the serialized collection. The JSON goes to a
/// sibling temp file first, so a failed run never leaves a truncated file
/// behind.
pub fn write_collection(
  path: &Path,
  collection: &EpisodeCollection,
) -> Result<()> {
  let mut json = serde_json::to_vec_pretty(collection)?;
  json.push(b'\n');

  let temp_path = temp_path(path);
  let write_err = |source| Error::Write {
    path: path.to_owned(),
    source,
  };

  if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
    fs::create_dir_all(dir).map_err(write_err)?;
  }

  let written = fs::File::create(&temp_path)
    .and_then(|mut file| file.write_all(&json).and_then(|_| file.sync_all()))
    .and_then(|_| fs::rename(&temp_path, path));

  if let Err(e) = written {
    fs::remove_file(&temp_path).ok();
    return Err(write_err(e));
  }

  Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().unwrap_or_default().to_os_string();
  name.push(".tmp");
  path.with_file_name(name)
}

#[cfg(test)]
mod test {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::podcast::Episode;

  fn collection() -> EpisodeCollection {
    EpisodeCollection::new(
      Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap(),
      vec![Episode {
        id: "volna-1".into(),
        title: "Первый".into(),
        ..Default::default()
      }],
    )
  }

  #[test]
  fn test_write_collection_replaces_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volna_episodes.json");
    fs::write(&path, "old content").unwrap();

    write_collection(&path, &collection()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["totalCount"], 1);
    assert_eq!(json["episodes"][0]["title"], "Первый");
    // utf-8 is written as is, not \u-escaped
    assert!(text.contains("Первый"));
    assert!(!temp_path(&path).exists());
  }

  #[test]
  fn test_write_collection_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("public").join("volna_episodes.json");

    write_collection(&path, &collection()).unwrap();

    assert!(path.exists());
  }

  #[test]
  fn test_load_extras() {
    let dir = tempfile::tempdir().unwrap();

    let missing = load_extras(&dir.path().join("nope.json"));
    assert_eq!(missing, Extras::default());

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "[1, 2, 3]").unwrap();
    assert_eq!(load_extras(&broken), Extras::default());

    let good = dir.path().join("extras_map.json");
    fs::write(&good, r#"{"12": {"page": "/episodes/12"}}"#).unwrap();
    let extras = load_extras(&good);
    assert_eq!(extras.get(12).unwrap().page.as_deref(), Some("/episodes/12"));
  }
}
