//! Loader for iTunes-format plist XML library exports.
//!
//! The export is one big property list whose top-level dictionary has a
//! `Tracks` key mapping track ids to per-track dictionaries:
//!
//! ```text
//! <plist><dict>
//!   <key>Tracks</key>
//!   <dict>
//!     <key>1234</key>
//!     <dict><key>Track ID</key><integer>1234</integer><key>Name</key>...</dict>
//!   </dict>
//! </dict></plist>
//! ```

use crate::track::{Collection, Track};
use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// A parsed plist value.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Dict(Vec<(String, Value)>),
    Array(Vec<Value>),
    String(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Date(String),
    Data(String),
    /// A `<key>`; only meaningful directly inside a dict.
    Key(String),
}

impl Value {
    /// Scalar values rendered as text, for the track's extra fields.
    fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) | Self::Date(s) | Self::Data(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Real(x) => Some(x.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Dict(_) | Self::Array(_) | Self::Key(_) => None,
        }
    }
}

/// Load a plist file and return the tracks it contains.
///
/// # Errors
///
/// Fails if the file cannot be read, is not a well-formed plist, or has no
/// `Tracks` dictionary.
pub fn load_file(path: &Path) -> Result<Collection> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read iTunes library at {}", path.display()))?;
    parse_library(&xml).with_context(|| format!("Failed to parse iTunes library {}", path.display()))
}

/// Parse the text of a library export.
///
/// # Errors
///
/// See [`load_file`].
pub fn parse_library(xml: &str) -> Result<Collection> {
    let Value::Dict(entries) = parse_document(xml)? else {
        bail!("Library root is not a <dict>");
    };

    let tracks = entries
        .into_iter()
        .find_map(|(key, value)| (key == "Tracks").then_some(value))
        .ok_or_else(|| anyhow!("Could not find 'Tracks' dictionary"))?;
    let Value::Dict(tracks) = tracks else {
        bail!("'Tracks' is not a dictionary");
    };

    Ok(tracks
        .into_iter()
        .filter_map(|(_, value)| match value {
            Value::Dict(fields) => Some(track_from_fields(fields)),
            _ => None,
        })
        .collect())
}

/// `Track ID` -> `track_id`.
fn attribute_name(key: &str) -> String {
    key.to_lowercase().replace(' ', "_")
}

fn non_negative(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn track_from_fields(fields: Vec<(String, Value)>) -> Track {
    let mut track = Track::default();
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("Track ID", Value::Integer(n)) => track.id = non_negative(n),
            ("Size", Value::Integer(n)) => track.size = non_negative(n),
            ("Total Time", Value::Integer(n)) => track.duration_ms = non_negative(n),
            ("Name", Value::String(s)) => track.name = Some(s),
            ("Artist", Value::String(s)) => track.artist = Some(s),
            ("Album", Value::String(s)) => track.album = Some(s),
            ("Genre", Value::String(s)) => track.genre = Some(s),
            ("Location", Value::String(s)) => track.location = Some(s),
            (_, value) => {
                if let Some(text) = value.as_text() {
                    track.extra.insert(attribute_name(&key), text);
                }
            }
        }
    }
    track
}

fn parse_document(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"plist" => {
                return next_value(&mut reader)?.ok_or_else(|| anyhow!("Empty <plist> element"));
            }
            Event::Eof => bail!("No <plist> element found"),
            _ => {}
        }
    }
}

/// Next value element, or `None` once the enclosing element closes.
fn next_value(reader: &mut Reader<&[u8]>) -> Result<Option<Value>> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = e.name().as_ref().to_vec();
                return parse_element(reader, &tag).map(Some);
            }
            Event::Empty(e) => return empty_element(e.name().as_ref()).map(Some),
            Event::End(_) => return Ok(None),
            Event::Eof => bail!("Unexpected end of document"),
            _ => {}
        }
    }
}

fn parse_element(reader: &mut Reader<&[u8]>, tag: &[u8]) -> Result<Value> {
    let value = match tag {
        b"dict" => {
            let mut entries = Vec::new();
            while let Some(key) = next_value(reader)? {
                let Value::Key(key) = key else {
                    bail!("Expected <key> inside <dict>");
                };
                let value = next_value(reader)?.ok_or_else(|| anyhow!("Key '{key}' has no value"))?;
                entries.push((key, value));
            }
            Value::Dict(entries)
        }
        b"array" => {
            let mut items = Vec::new();
            while let Some(item) = next_value(reader)? {
                items.push(item);
            }
            Value::Array(items)
        }
        b"key" => Value::Key(read_text(reader)?),
        b"string" => Value::String(read_text(reader)?),
        b"date" => Value::Date(read_text(reader)?),
        b"data" => Value::Data(read_text(reader)?),
        b"integer" => {
            let text = read_text(reader)?;
            Value::Integer(
                text.trim()
                    .parse()
                    .with_context(|| format!("Invalid <integer> '{text}'"))?,
            )
        }
        b"real" => {
            let text = read_text(reader)?;
            Value::Real(
                text.trim()
                    .parse()
                    .with_context(|| format!("Invalid <real> '{text}'"))?,
            )
        }
        b"true" | b"false" => {
            read_text(reader)?;
            Value::Bool(tag == b"true")
        }
        other => bail!("Unexpected <{}> element", String::from_utf8_lossy(other)),
    };
    Ok(value)
}

fn empty_element(tag: &[u8]) -> Result<Value> {
    let value = match tag {
        b"true" => Value::Bool(true),
        b"false" => Value::Bool(false),
        b"dict" => Value::Dict(Vec::new()),
        b"array" => Value::Array(Vec::new()),
        b"key" => Value::Key(String::new()),
        b"string" => Value::String(String::new()),
        b"date" => Value::Date(String::new()),
        b"data" => Value::Data(String::new()),
        other => bail!("Unexpected empty <{}/> element", String::from_utf8_lossy(other)),
    };
    Ok(value)
}

/// Collect text up to the closing tag of the current element.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(_) => return Ok(text),
            Event::Eof => bail!("Unexpected end of document inside an element"),
            _ => {}
        }
    }
}
