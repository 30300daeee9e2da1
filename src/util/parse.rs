use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

static CLOCK_DURATION_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(\d+):(\d{1,2})(?::(\d{1,2}))?$").unwrap());

static UNIT_DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^(?:(\d+)h)?\s*(?:(\d+)m)?\s*(?:(\d+)s)?$").unwrap()
});

static URL_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

static WHITESPACE_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Parses a feed date into UTC. Accepts RFC 2822 (`pubDate`), RFC 3339
/// (Atom, `dc:date`) and a couple of zone-less forms, which are taken as
/// UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
    return Some(date.with_timezone(&Utc));
  }

  if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
    return Some(date.with_timezone(&Utc));
  }

  for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(naive.and_utc());
    }
  }

  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

/// Parses `itunes:duration` into seconds. Understands `H:MM:SS`, `M:SS`,
/// plain seconds and unit forms such as `1h02m03s`.
pub fn parse_duration(raw: &str) -> Option<u64> {
  let raw = raw.trim().to_lowercase();
  if raw.is_empty() {
    return None;
  }

  if let Some(caps) = CLOCK_DURATION_REGEX.captures(&raw) {
    let parts = [group(&caps, 1), group(&caps, 2), group(&caps, 3)];
    return match parts {
      [Some(h), Some(m), Some(s)] => hms_to_secs(h, m, s),
      [Some(m), Some(s), None] => hms_to_secs(0, m, s),
      _ => None,
    };
  }

  if let Some(caps) = UNIT_DURATION_REGEX.captures(&raw) {
    let (h, m, s) = (group(&caps, 1), group(&caps, 2), group(&caps, 3));
    if h.is_some() || m.is_some() || s.is_some() {
      return hms_to_secs(h.unwrap_or(0), m.unwrap_or(0), s.unwrap_or(0));
    }
  }

  // some hosts emit fractional seconds
  raw
    .parse::<f64>()
    .ok()
    .filter(|secs| secs.is_finite() && *secs >= 0.0)
    .map(|secs| secs as u64)
}

// None when the total does not fit
fn hms_to_secs(h: u64, m: u64, s: u64) -> Option<u64> {
  h.checked_mul(3600)?
    .checked_add(m.checked_mul(60)?)?
    .checked_add(s)
}

fn group(caps: &Captures<'_>, i: usize) -> Option<u64> {
  caps.get(i).and_then(|m| m.as_str().parse().ok())
}

pub fn parse_number(raw: &str) -> Option<u32> {
  raw.trim().parse().ok()
}

pub fn parse_flag(raw: &str) -> bool {
  matches!(raw.trim().to_lowercase().as_str(), "yes" | "true" | "1")
}

/// Stable id for entries without a guid.
pub fn fallback_id(title: &str, raw_date: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(title.trim().as_bytes());
  hasher.update(b"|");
  hasher.update(raw_date.trim().as_bytes());
  hex::encode(hasher.finalize())
}

/// Reduces an HTML show-notes fragment to a single line of plain text.
/// Links are dropped since the site renders its own.
pub fn html_to_text(html: &str) -> String {
  // escaped markup only shows up as tags once decoded
  let text = strip_tags(html);
  let text = html_escape::decode_html_entities(&text);
  let text = strip_tags(&text);
  let text = URL_REGEX.replace_all(&text, "");
  WHITESPACE_REGEX.replace_all(&text, " ").trim().to_owned()
}

fn strip_tags(html: &str) -> String {
  match tl::parse(html, tl::ParserOptions::default()) {
    Ok(dom) => dom
      .nodes()
      .iter()
      .filter_map(|node| match node {
        tl::Node::Raw(bytes) => Some(bytes.as_utf8_str().into_owned()),
        _ => None,
      })
      .collect::<Vec<_>>()
      .join(" "),
    Err(_) => html.to_owned(),
  }
}
