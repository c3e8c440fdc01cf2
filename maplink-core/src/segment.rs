use thiserror::Error;

use crate::integer::{decode_integer, encode_integer, MarkerPolicy};

pub const START_BYTE: u8 = 0x02;
pub const END_BYTE: u8 = 0x03;

/// Chunk kind of auto-translate entries, which also carry pre-built map links.
pub const AUTO_TRANSLATE_KEY: u8 = 0x2E;

/// First two body bytes of an auto-translate chunk that holds a map link.
pub const LINK_PAYLOAD_SIGNATURE: [u8; 2] = [0xC9, 0x04];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("message truncated at byte {offset}")]
    Truncated { offset: usize },

    #[error("unsupported integer marker {marker:#04X} at byte {offset}")]
    UnsupportedInteger { marker: u8, offset: usize },

    #[error("encoded chunk does not begin with a start marker")]
    MissingStartMarker,

    #[error("chunk starting at byte {offset} is not closed by an end marker")]
    MissingEndMarker { offset: usize },

    #[error("text run at byte {offset} is not valid UTF-8")]
    InvalidText { offset: usize },
}

/// One control chunk, kept byte-for-byte as it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    kind: u8,
    body_start: usize,
    bytes: Vec<u8>,
}

impl Chunk {
    /// Build a chunk around `body` with a generically encoded length.
    pub fn new(kind: u8, body: &[u8]) -> Self {
        let len = encode_integer(body.len() as u32, MarkerPolicy::Generic);
        let mut bytes = Vec::with_capacity(body.len() + len.len() + 3);
        bytes.push(START_BYTE);
        bytes.push(kind);
        bytes.extend_from_slice(&len);
        let body_start = bytes.len();
        bytes.extend_from_slice(body);
        bytes.push(END_BYTE);
        Self {
            kind,
            body_start,
            bytes,
        }
    }

    /// Wrap fully encoded chunk bytes, as produced by a payload encoder.
    pub fn from_encoded(bytes: Vec<u8>) -> Result<Self, SegmentError> {
        if bytes.first() != Some(&START_BYTE) {
            return Err(SegmentError::MissingStartMarker);
        }
        let (chunk, end) = Self::read(&bytes, 0)?;
        if end != bytes.len() {
            return Err(SegmentError::MissingEndMarker { offset: 0 });
        }
        Ok(chunk)
    }

    pub fn kind(&self) -> u8 {
        self.kind
    }

    pub fn body(&self) -> &[u8] {
        &self.bytes[self.body_start..self.bytes.len() - 1]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True for a chunk that already is a complete map link.
    pub fn is_link_payload(&self) -> bool {
        self.kind == AUTO_TRANSLATE_KEY
            && self.bytes.get(3..5) == Some(&LINK_PAYLOAD_SIGNATURE[..])
    }

    fn read(buf: &[u8], start: usize) -> Result<(Self, usize), SegmentError> {
        let kind = *buf
            .get(start + 1)
            .ok_or(SegmentError::Truncated { offset: start + 1 })?;
        let (len, body_pos) = decode_integer(buf, start + 2)?;
        let body_end = body_pos
            .checked_add(len as usize)
            .ok_or(SegmentError::Truncated { offset: body_pos })?;
        match buf.get(body_end) {
            Some(&END_BYTE) => {}
            Some(_) => return Err(SegmentError::MissingEndMarker { offset: start }),
            None => return Err(SegmentError::Truncated { offset: buf.len() }),
        }
        let chunk = Self {
            kind,
            body_start: body_pos - start,
            bytes: buf[start..=body_end].to_vec(),
        };
        Ok((chunk, body_end + 1))
    }
}

/// A message split into text runs and control chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Chunk(Chunk),
}

impl Segment {
    pub fn is_link_payload(&self) -> bool {
        matches!(self, Segment::Chunk(chunk) if chunk.is_link_payload())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text(text) => Some(text),
            Segment::Chunk(_) => None,
        }
    }
}

/// Split a message into segments. Chunks keep their exact bytes, so
/// `encode(&decode(m)?) == m` for every well-formed message.
pub fn decode(message: &[u8]) -> Result<Vec<Segment>, SegmentError> {
    let mut segments = Vec::new();
    let mut pos = 0usize;

    while pos < message.len() {
        if message[pos] == START_BYTE {
            let (chunk, next) = Chunk::read(message, pos)?;
            segments.push(Segment::Chunk(chunk));
            pos = next;
            continue;
        }

        let end = message[pos..]
            .iter()
            .position(|&b| b == START_BYTE)
            .map_or(message.len(), |rel| pos + rel);
        let text = std::str::from_utf8(&message[pos..end])
            .map_err(|_| SegmentError::InvalidText { offset: pos })?;
        segments.push(Segment::Text(text.to_string()));
        pos = end;
    }

    Ok(segments)
}

pub fn encode(segments: &[Segment]) -> Vec<u8> {
    let mut out = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.extend_from_slice(text.as_bytes()),
            Segment::Chunk(chunk) => out.extend_from_slice(chunk.as_bytes()),
        }
    }
    out
}

/// Dash-separated upper-case hex, e.g. `02-2E-14`.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push('-');
        }
        out.push_str(&format!("{:02X}", b));
    }
    out
}
