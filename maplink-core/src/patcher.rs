use rand::Rng;

use crate::buffer::{MessageBuffer, PendingWrite};
use crate::history::{pack_instance, HistoryEntry};
use crate::masked::unmask;
use crate::payload::PreLinkPayload;
use crate::scanner::{LiteralScanner, ParsedLink};
use crate::segment::{self, hex_dump, Segment};
use crate::transform::generate_raw_position;
use crate::zones::ZoneDirectory;
use crate::{LinkError, LinkState, Result};

/// What a patch attempt did to the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The message already carries a real map link.
    AlreadyLinked,
    /// No literal link text anywhere in the message.
    NoLiteralLink,
    /// Literal links were found but none of their place names resolved.
    Unresolved(Vec<String>),
    /// One literal link was rebuilt and the buffer rewritten.
    Patched {
        key: String,
        entry: HistoryEntry,
        /// Whether the coordinates came from history rather than a fresh draw.
        recalled: bool,
        len: usize,
    },
}

/// Rebuilds the first resolvable literal link of one message.
pub struct BufferPatcher<'a, Z: ?Sized, R: ?Sized> {
    state: &'a mut LinkState,
    zones: &'a Z,
    rng: &'a mut R,
    scanner: &'a LiteralScanner,
    debug: bool,
}

impl<'a, Z, R> BufferPatcher<'a, Z, R>
where
    Z: ZoneDirectory + ?Sized,
    R: Rng + ?Sized,
{
    pub fn new(
        state: &'a mut LinkState,
        zones: &'a Z,
        rng: &'a mut R,
        scanner: &'a LiteralScanner,
    ) -> Self {
        Self {
            state,
            zones,
            rng,
            scanner,
            debug: false,
        }
    }

    /// Log every inbound and outbound message as hex.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Resolve a scanned link to the entry its text is bound to, binding it
    /// first if this text has never been seen.
    fn resolve(&mut self, link: &ParsedLink) -> Result<(String, HistoryEntry, bool)> {
        let name = unmask(&link.place_name);
        let key = link.history_key(name);

        if let Some(entry) = self.state.history.get(&key) {
            log::info!("recall {} => {:?}", key, entry);
            return Ok((key, entry, true));
        }

        let (zone_id, map_id) =
            self.state
                .registry
                .lookup(name)
                .ok_or_else(|| LinkError::UnresolvedPlaceName {
                    name: name.to_string(),
                })?;
        let geometry = self
            .zones
            .map_geometry(map_id)
            .filter(|g| g.size_factor != 0)
            .ok_or(LinkError::MissingMapGeometry { map_id })?;

        let (x, y) = link.coordinates()?;
        let factor = geometry.size_factor;
        let entry = HistoryEntry {
            zone_id,
            map_id: pack_instance(map_id, link.instance),
            raw_x: generate_raw_position(&mut *self.rng, x, geometry.offset_x, factor),
            raw_y: generate_raw_position(&mut *self.rng, y, geometry.offset_y, factor),
        };
        self.state.history.put(key.clone(), entry);
        log::info!("generate {} => {:?}", key, entry);
        Ok((key, entry, false))
    }

    /// Patch `buffer` in place. The buffer is either rewritten completely or
    /// left exactly as it was.
    pub fn patch<B: MessageBuffer + ?Sized>(&mut self, buffer: &mut B) -> Result<PatchOutcome> {
        if self.debug {
            log::debug!("<- {}", hex_dump(buffer.message()));
        }

        let mut segments = segment::decode(buffer.message())?;
        if segments.iter().any(Segment::is_link_payload) {
            return Ok(PatchOutcome::AlreadyLinked);
        }

        let mut unresolved = Vec::new();
        for i in 0..segments.len() {
            let Some(text) = segments[i].as_text() else {
                continue;
            };
            let Some(link) = self.scanner.scan(text) else {
                continue;
            };
            let prefix = &text[..link.span.start];
            let suffix = &text[link.span.end..];

            let mut replacement = Vec::with_capacity(3);
            if !prefix.is_empty() {
                replacement.push(Segment::Text(prefix.to_string()));
            }
            let suffix = (!suffix.is_empty()).then(|| Segment::Text(suffix.to_string()));

            let (key, entry, recalled) = match self.resolve(&link) {
                Ok(resolved) => resolved,
                Err(LinkError::UnresolvedPlaceName { name }) => {
                    log::warn!("Can't find map {}", name);
                    unresolved.push(name);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let payload =
                PreLinkPayload::new(entry.zone_id, entry.map_id, entry.raw_x, entry.raw_y);
            replacement.push(Segment::Chunk(payload.to_chunk()?));
            replacement.extend(suffix);
            segments.splice(i..=i, replacement);

            let rebuilt = segment::encode(&segments);
            if self.debug {
                log::debug!("-> {}", hex_dump(&rebuilt));
            }
            let len = rebuilt.len();
            let write = PendingWrite::new(rebuilt).check_capacity(buffer.capacity())?;
            buffer.replace(write)?;

            return Ok(PatchOutcome::Patched {
                key,
                entry,
                recalled,
                len,
            });
        }

        if unresolved.is_empty() {
            Ok(PatchOutcome::NoLiteralLink)
        } else {
            Ok(PatchOutcome::Unresolved(unresolved))
        }
    }
}
