use std::collections::BTreeMap;

use atom_syndication::{Entry, Feed};
use rss::{extension::itunes::ITunesItemExtension, Channel, Item};

use crate::{
  feed::{RawEntry, RawFeed},
  W,
};

const ITUNES: &str = "itunes";
const MEDIA: &str = "media";
const PODCAST: &str = "podcast";

type ExtensionMap<E> = BTreeMap<String, BTreeMap<String, Vec<E>>>;

// rss and atom_syndication each ship their own (identical) extension type
trait ExtensionNode: Sized {
  fn text(&self) -> Option<&str>;
  fn attr(&self, name: &str) -> Option<&str>;
  fn child_nodes(&self) -> &BTreeMap<String, Vec<Self>>;
}

impl ExtensionNode for rss::extension::Extension {
  fn text(&self) -> Option<&str> {
    self.value()
  }

  fn attr(&self, name: &str) -> Option<&str> {
    self.attrs().get(name).map(String::as_str)
  }

  fn child_nodes(&self) -> &BTreeMap<String, Vec<Self>> {
    self.children()
  }
}

impl ExtensionNode for atom_syndication::extension::Extension {
  fn text(&self) -> Option<&str> {
    self.value()
  }

  fn attr(&self, name: &str) -> Option<&str> {
    self.attrs().get(name).map(String::as_str)
  }

  fn child_nodes(&self) -> &BTreeMap<String, Vec<Self>> {
    self.children()
  }
}

fn extensions<'a, E>(
  map: &'a ExtensionMap<E>,
  prefix: &str,
  name: &str,
) -> impl Iterator<Item = &'a E> {
  map
    .get(prefix)
    .and_then(|names| names.get(name))
    .into_iter()
    .flatten()
}

fn extension_text<E: ExtensionNode>(
  map: &ExtensionMap<E>,
  prefix: &str,
  name: &str,
) -> Option<String> {
  extensions(map, prefix, name)
    .find_map(|ext| ext.text())
    .and_then(non_blank)
}

// media:* elements, either directly on the entry or inside media:group
fn media_nodes<'a, E: ExtensionNode>(
  map: &'a ExtensionMap<E>,
  name: &str,
) -> Vec<&'a E> {
  let mut nodes: Vec<&E> = extensions(map, MEDIA, name).collect();
  let prefixed = format!("{MEDIA}:{name}");

  for group in extensions(map, MEDIA, "group") {
    let children = group.child_nodes();
    let found = children.get(name).or_else(|| children.get(&prefixed));
    nodes.extend(found.into_iter().flatten());
  }

  nodes
}

fn media_thumbnail<E: ExtensionNode>(
  map: &ExtensionMap<E>,
) -> Option<String> {
  media_nodes(map, "thumbnail")
    .into_iter()
    .find_map(|ext| ext.attr("url"))
    .and_then(non_blank)
}

fn media_content<E: ExtensionNode>(
  map: &ExtensionMap<E>,
  kind: &str,
) -> Option<String> {
  media_nodes(map, "content")
    .into_iter()
    .filter(|ext| {
      let mime_type = ext.attr("type").unwrap_or_default();
      let medium = ext.attr("medium").unwrap_or_default();
      mime_type.starts_with(kind)
        || medium == kind
        || (mime_type.is_empty() && medium.is_empty() && kind == "image")
    })
    .find_map(|ext| ext.attr("url"))
    .and_then(non_blank)
}

fn is_audio_type(mime_type: &str) -> bool {
  let mime_type = mime_type.trim().to_lowercase();
  mime_type.is_empty() || mime_type.contains("audio")
}

fn non_blank(s: &str) -> Option<String> {
  let s = s.trim();
  (!s.is_empty()).then(|| s.to_owned())
}

impl W<&Channel> {
  pub fn image(&self) -> Option<String> {
    self
      .0
      .itunes_ext()
      .and_then(|itunes| itunes.image())
      .and_then(non_blank)
      .or_else(|| self.0.image().and_then(|img| non_blank(img.url())))
  }

  pub fn raw_feed(&self) -> RawFeed {
    RawFeed {
      title: self.0.title().trim().to_owned(),
      image: self.image(),
      entries: self.0.items().iter().map(|x| W(x).raw_entry()).collect(),
    }
  }
}

impl W<&Item> {
  fn itunes<'a>(
    &'a self,
    f: impl FnOnce(&'a ITunesItemExtension) -> Option<&'a str>,
  ) -> Option<String> {
    self.0.itunes_ext().and_then(f).and_then(non_blank)
  }

  pub fn guid(&self) -> Option<String> {
    self.0.guid().and_then(|guid| non_blank(guid.value()))
  }

  pub fn date(&self) -> Option<String> {
    self.0.pub_date().and_then(non_blank).or_else(|| {
      self
        .0
        .dublin_core_ext()
        .and_then(|dc| dc.dates().iter().find_map(|d| non_blank(d)))
    })
  }

  pub fn episode(&self) -> Option<String> {
    self
      .itunes(|x| x.episode())
      .or_else(|| extension_text(self.0.extensions(), PODCAST, "episode"))
  }

  pub fn image(&self) -> Option<String> {
    let exts = self.0.extensions();
    self
      .itunes(|x| x.image())
      .or_else(|| media_thumbnail(exts))
      .or_else(|| media_content(exts, "image"))
  }

  pub fn audio(&self) -> Option<String> {
    self
      .0
      .enclosure()
      .filter(|enc| is_audio_type(enc.mime_type()))
      .and_then(|enc| non_blank(enc.url()))
      .or_else(|| media_content(self.0.extensions(), "audio"))
  }

  pub fn description(&self) -> Option<String> {
    self
      .0
      .content()
      .and_then(non_blank)
      .or_else(|| self.0.description().and_then(non_blank))
      .or_else(|| self.itunes(|x| x.summary()))
  }

  pub fn raw_entry(&self) -> RawEntry {
    RawEntry {
      guid: self.guid(),
      title: self.0.title().and_then(non_blank),
      date: self.date(),
      duration: self.itunes(|x| x.duration()),
      episode: self.episode(),
      season: self.itunes(|x| x.season()),
      episode_type: self.itunes(|x| x.episode_type()),
      explicit: self.itunes(|x| x.explicit()),
      image: self.image(),
      audio: self.audio(),
      description: self.description(),
      link: self.0.link().and_then(non_blank),
    }
  }
}

impl W<&Feed> {
  pub fn image(&self) -> Option<String> {
    extensions(self.0.extensions(), ITUNES, "image")
      .find_map(|ext| ext.attr("href"))
      .and_then(non_blank)
      .or_else(|| self.0.logo().and_then(non_blank))
      .or_else(|| self.0.icon().and_then(non_blank))
  }

  pub fn raw_feed(&self) -> RawFeed {
    RawFeed {
      title: self.0.title().as_str().trim().to_owned(),
      image: self.image(),
      entries: self.0.entries().iter().map(|x| W(x).raw_entry()).collect(),
    }
  }
}

impl W<&Entry> {
  fn itunes(&self, name: &str) -> Option<String> {
    extension_text(self.0.extensions(), ITUNES, name)
  }

  pub fn date(&self) -> Option<String> {
    let updated = self.0.updated();
    self
      .0
      .published()
      .or((updated.timestamp() != 0).then_some(updated))
      .map(|date| date.to_rfc3339())
  }

  pub fn episode(&self) -> Option<String> {
    self
      .itunes("episode")
      .or_else(|| extension_text(self.0.extensions(), PODCAST, "episode"))
  }

  pub fn image(&self) -> Option<String> {
    let exts = self.0.extensions();
    extensions(exts, ITUNES, "image")
      .find_map(|ext| ext.attr("href"))
      .and_then(non_blank)
      .or_else(|| media_thumbnail(exts))
      .or_else(|| media_content(exts, "image"))
  }

  pub fn audio(&self) -> Option<String> {
    self
      .0
      .links()
      .iter()
      .filter(|link| link.rel() == "enclosure")
      .find(|link| is_audio_type(link.mime_type().unwrap_or_default()))
      .and_then(|link| non_blank(link.href()))
      .or_else(|| media_content(self.0.extensions(), "audio"))
  }

  pub fn link(&self) -> Option<String> {
    let links = self.0.links();
    links
      .iter()
      .find(|link| link.rel() == "alternate")
      .or_else(|| links.iter().find(|link| link.rel() != "enclosure"))
      .and_then(|link| non_blank(link.href()))
  }

  pub fn description(&self) -> Option<String> {
    self
      .0
      .content()
      .and_then(|content| content.value())
      .and_then(non_blank)
      .or_else(|| self.0.summary().and_then(|text| non_blank(text.as_str())))
  }

  pub fn raw_entry(&self) -> RawEntry {
    RawEntry {
      guid: non_blank(self.0.id()),
      title: non_blank(self.0.title().as_str()),
      date: self.date(),
      duration: self.itunes("duration"),
      episode: self.episode(),
      season: self.itunes("season"),
      episode_type: self.itunes("episodeType"),
      explicit: self.itunes("explicit"),
      image: self.image(),
      audio: self.audio(),
      description: self.description(),
      link: self.link(),
    }
  }
}
