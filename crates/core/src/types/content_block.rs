//! Structured blog content blocks.
//!
//! `blog_posts.detailed_content` is a JSON array of loosely-typed objects of
//! the form `{"type": "...", "content": ..., "level": n}`. Decoding maps each
//! object onto a closed set of variants; anything unrecognized is kept verbatim
//! in [`ContentBlock::Unsupported`] so a read/write cycle never drops data.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Heading level used when a heading block carries none.
pub const DEFAULT_HEADING_LEVEL: u8 = 2;

/// One block of a blog post's detailed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// A section heading, level 1..=6.
    Heading { level: u8, text: String },
    /// A paragraph of prose.
    Paragraph { text: String },
    /// A bulleted list of short points.
    KeyPoints { items: Vec<String> },
    /// A block with an unknown tag or a malformed shape, kept as-is.
    Unsupported { kind: String, raw: Value },
}

impl ContentBlock {
    /// Decode one stored block. Never fails: unknown shapes become
    /// [`ContentBlock::Unsupported`].
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Unsupported {
                kind: String::new(),
                raw: value,
            };
        };

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let decoded = match kind.as_str() {
            "heading" => text_content(object).map(|text| Self::Heading {
                level: heading_level(object),
                text,
            }),
            "paragraph" => text_content(object).map(|text| Self::Paragraph { text }),
            "key_points" => key_points(object).map(|items| Self::KeyPoints { items }),
            _ => None,
        };

        decoded.unwrap_or(Self::Unsupported { kind, raw: value })
    }

    /// Encode back into the stored JSON shape.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Heading { level, text } => {
                json!({ "type": "heading", "content": text, "level": level })
            }
            Self::Paragraph { text } => json!({ "type": "paragraph", "content": text }),
            Self::KeyPoints { items } => json!({ "type": "key_points", "content": items }),
            Self::Unsupported { raw, .. } => raw.clone(),
        }
    }

    /// Decode a whole `detailed_content` array. A non-array value (including
    /// `null`) yields an empty list.
    #[must_use]
    pub fn decode_all(value: Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// Encode a list of blocks as a `detailed_content` array.
    #[must_use]
    pub fn encode_all(blocks: &[Self]) -> Value {
        Value::Array(blocks.iter().map(Self::to_value).collect())
    }
}

fn text_content(object: &Map<String, Value>) -> Option<String> {
    object.get("content")?.as_str().map(str::to_owned)
}

fn heading_level(object: &Map<String, Value>) -> u8 {
    object
        .get("level")
        .and_then(Value::as_u64)
        .map_or(DEFAULT_HEADING_LEVEL, |level| {
            u8::try_from(level.clamp(1, 6)).unwrap_or(DEFAULT_HEADING_LEVEL)
        })
}

fn key_points(object: &Map<String, Value>) -> Option<Vec<String>> {
    match object.get("content")? {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect(),
        Value::String(text) => Some(
            text.lines()
                .map(|line| strip_bullet(line.trim()))
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        _ => None,
    }
}

/// Remove one leading bullet marker, only when whitespace follows it.
fn strip_bullet(line: &str) -> &str {
    ["-", "*", "•"]
        .iter()
        .find_map(|&marker| {
            line.strip_prefix(marker)
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .map_or(line, str::trim_start)
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
