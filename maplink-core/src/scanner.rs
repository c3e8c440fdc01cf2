use regex::{Captures, Regex};
use std::ops::Range;

use crate::{LinkError, Result};

/// Glyph the host puts in front of every map link's visible text.
pub const LINK_MARKER: char = '\u{E0BB}';

/// Instance glyphs, `\u{E0B1}` for instance 1 through `\u{E0B9}` for 9.
pub const FIRST_INSTANCE_GLYPH: char = '\u{E0B1}';
pub const LAST_INSTANCE_GLYPH: char = '\u{E0B9}';

// The two spaces before the comma are part of the host's own number
// formatting; learned display text and pasted text must key identically.
const LITERAL_LINK_PATTERN: &str = r"\x{E0BB}(?P<map>.+?)(?P<instance>[\x{E0B1}-\x{E0B9}])? \( (?P<x>[0-9]{1,2}\.[0-9])  , (?P<y>[0-9]{1,2}\.[0-9]) \)";

/// Instance number for an instance glyph.
pub fn instance_of(glyph: char) -> Option<u8> {
    if (FIRST_INSTANCE_GLYPH..=LAST_INSTANCE_GLYPH).contains(&glyph) {
        Some((glyph as u32 - FIRST_INSTANCE_GLYPH as u32 + 1) as u8)
    } else {
        None
    }
}

/// A literal map link found inside a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    /// Byte range of the whole match, marker included.
    pub span: Range<usize>,
    /// Place name exactly as it appeared, possibly masked.
    pub place_name: String,
    pub instance: Option<u8>,
    pub x_text: String,
    pub y_text: String,
    /// Everything the match covered after the place name.
    pub suffix: String,
}

impl ParsedLink {
    /// Cache key for this link once its place name has been unmasked.
    pub fn history_key(&self, unmasked_name: &str) -> String {
        let mut key = String::with_capacity(unmasked_name.len() + self.suffix.len());
        key.push_str(unmasked_name);
        key.push_str(&self.suffix);
        key
    }

    pub fn coordinates(&self) -> Result<(f32, f32)> {
        let parse = |text: &str| {
            text.parse::<f32>()
                .map_err(|_| LinkError::InvalidCoordinate(text.to_string()))
        };
        Ok((parse(&self.x_text)?, parse(&self.y_text)?))
    }
}

/// Finds literal map links in decoded message text.
#[derive(Debug, Clone)]
pub struct LiteralScanner {
    pattern: Regex,
}

impl LiteralScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(LITERAL_LINK_PATTERN).expect("literal link pattern is valid"),
        }
    }

    /// Leftmost literal link in `text`, if any.
    pub fn scan(&self, text: &str) -> Option<ParsedLink> {
        let caps = self.pattern.captures(text)?;
        Self::parsed_from(&caps)
    }

    fn parsed_from(caps: &Captures<'_>) -> Option<ParsedLink> {
        let whole = caps.get(0)?;
        let map = caps.name("map")?;
        let group_text = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

        Some(ParsedLink {
            span: whole.range(),
            place_name: map.as_str().to_string(),
            instance: caps
                .name("instance")
                .and_then(|m| m.as_str().chars().next())
                .and_then(instance_of),
            x_text: group_text("x").to_string(),
            y_text: group_text("y").to_string(),
            suffix: whole.as_str()[map.end() - whole.start()..].to_string(),
        })
    }
}

impl Default for LiteralScanner {
    fn default() -> Self {
        Self::new()
    }
}
