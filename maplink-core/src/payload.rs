use crate::integer::{encode_integer, MarkerPolicy};
use crate::segment::{
    Chunk, SegmentError, AUTO_TRANSLATE_KEY, END_BYTE, LINK_PAYLOAD_SIGNATURE, START_BYTE,
};

/// Height the host uses for links that carry no real height.
pub const RAW_Z_SENTINEL: i32 = -30_000;

/// A map link in the auto-translate form the host accepts from outgoing
/// messages, before it expands it into a full interactive link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreLinkPayload {
    pub zone_id: u32,
    pub map_id: u32,
    pub raw_x: i32,
    pub raw_y: i32,
    pub raw_z: i32,
}

impl PreLinkPayload {
    pub fn new(zone_id: u32, map_id: u32, raw_x: i32, raw_y: i32) -> Self {
        Self {
            zone_id,
            map_id,
            raw_x,
            raw_y,
            raw_z: RAW_Z_SENTINEL,
        }
    }

    /// Layout: `02 2E len C9 04 zone map x y z 03`, where `len` is three
    /// plus the encoded size of the five fields.
    ///
    /// When zone and map both take the tagged single-byte form `00 b`, the
    /// host expects both tags dropped.
    pub fn encode(&self) -> Vec<u8> {
        let mut zone = encode_integer(self.zone_id, MarkerPolicy::LinkPayload);
        let mut map = encode_integer(self.map_id, MarkerPolicy::LinkPayload);
        if zone.len() == 2 && map.len() == 2 {
            zone.remove(0);
            map.remove(0);
        }

        let fields = [
            zone,
            map,
            encode_integer(self.raw_x as u32, MarkerPolicy::LinkPayload),
            encode_integer(self.raw_y as u32, MarkerPolicy::LinkPayload),
            encode_integer(self.raw_z as u32, MarkerPolicy::LinkPayload),
        ];
        let fields_len: usize = fields.iter().map(Vec::len).sum();

        let mut bytes = Vec::with_capacity(fields_len + 6);
        bytes.push(START_BYTE);
        bytes.push(AUTO_TRANSLATE_KEY);
        bytes.push((3 + fields_len) as u8);
        bytes.extend_from_slice(&LINK_PAYLOAD_SIGNATURE);
        for field in &fields {
            bytes.extend_from_slice(field);
        }
        bytes.push(END_BYTE);
        bytes
    }

    pub fn to_chunk(&self) -> Result<Chunk, SegmentError> {
        Chunk::from_encoded(self.encode())
    }
}
