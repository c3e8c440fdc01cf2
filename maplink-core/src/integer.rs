use crate::segment::SegmentError;

/// Marker bytes the host uses in front of multi-byte integers.
///
/// For markers 0xF0..=0xFE other than `Int24`, `(marker + 1) & 0xF` is a
/// bitmask of which big-endian bytes (bit 3 = most significant) follow the
/// marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IntegerType {
    /// A zero tag in front of a single significant byte.
    None = 0x00,
    Byte = 0xF0,
    Int16 = 0xF2,
    /// Three contiguous low bytes. Map link payloads use this form.
    Int24Special = 0xF6,
    Int24 = 0xFA,
    Int32 = 0xFE,
}

/// How the marker for a multi-byte integer is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPolicy {
    Generic,
    LinkPayload,
}

impl MarkerPolicy {
    fn marker_for(self, significant_bytes: usize) -> IntegerType {
        match (self, significant_bytes) {
            (MarkerPolicy::LinkPayload, 1) => IntegerType::None,
            (MarkerPolicy::LinkPayload, 2) => IntegerType::Int16,
            (MarkerPolicy::LinkPayload, 3) => IntegerType::Int24Special,
            (_, 1) => IntegerType::Byte,
            (_, 2) => IntegerType::Int16,
            (_, 3) => IntegerType::Int24,
            _ => IntegerType::Int32,
        }
    }
}

/// Values below this are written as a single byte holding `value + 1`.
pub const SMALL_INTEGER_LIMIT: u32 = 0xCF;

/// Encode `value` with the host's variable-width integer rule.
pub fn encode_integer(value: u32, policy: MarkerPolicy) -> Vec<u8> {
    if value < SMALL_INTEGER_LIMIT {
        return vec![(value + 1) as u8];
    }

    let be = value.to_be_bytes();
    let first = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
    let significant = &be[first..];

    let mut out = Vec::with_capacity(significant.len() + 1);
    out.push(policy.marker_for(significant.len()) as u8);
    out.extend_from_slice(significant);
    out
}

/// Decode one integer starting at `pos`. Returns the value and the position
/// just past it.
pub fn decode_integer(buf: &[u8], pos: usize) -> Result<(u32, usize), SegmentError> {
    let marker = *buf.get(pos).ok_or(SegmentError::Truncated { offset: pos })?;
    if marker == 0 {
        return Err(SegmentError::UnsupportedInteger { marker, offset: pos });
    }
    if marker < 0xD0 {
        return Ok((u32::from(marker) - 1, pos + 1));
    }
    if marker < 0xF0 || marker == 0xFF {
        return Err(SegmentError::UnsupportedInteger { marker, offset: pos });
    }

    // Int24 breaks the bitmask rule: three contiguous low bytes follow it.
    let mask = if marker == IntegerType::Int24 as u8 {
        0x07
    } else {
        marker.wrapping_add(1) & 0x0F
    };
    let mut bytes = [0u8; 4];
    let mut i = pos + 1;
    for bit in (0..4).rev() {
        if mask & (1 << bit) != 0 {
            bytes[3 - bit] = *buf.get(i).ok_or(SegmentError::Truncated { offset: i })?;
            i += 1;
        }
    }
    Ok((u32::from_be_bytes(bytes), i))
}
