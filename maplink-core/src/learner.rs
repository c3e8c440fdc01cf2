use serde::{Deserialize, Serialize};

use crate::history::{pack_instance, HistoryEntry};
use crate::scanner::instance_of;
use crate::LinkState;

/// Position of a received link's display text, counted in payloads from the
/// link payload itself. The payloads in between style the link.
pub const DISPLAY_TEXT_OFFSET: usize = 6;

/// Read access to a map link the host generated itself.
pub trait GenuineLink {
    fn zone_id(&self) -> u32;
    fn map_id(&self) -> u32;
    fn raw_x(&self) -> i32;
    fn raw_y(&self) -> i32;
}

/// Plain data form of a genuine link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedLink {
    pub zone_id: u32,
    pub map_id: u32,
    pub raw_x: i32,
    pub raw_y: i32,
}

impl GenuineLink for ObservedLink {
    fn zone_id(&self) -> u32 {
        self.zone_id
    }

    fn map_id(&self) -> u32 {
        self.map_id
    }

    fn raw_x(&self) -> i32 {
        self.raw_x
    }

    fn raw_y(&self) -> i32 {
        self.raw_y
    }
}

/// One payload of a message the host has received.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceivedPayload<L> {
    MapLink(L),
    Text(String),
    Other,
}

/// Split display text into `(history key, place name)`.
///
/// The key runs through the last `)`; the place name is everything before
/// the last `(` minus the single space that precedes it.
fn split_display_text(text: &str) -> Option<(&str, &str)> {
    let key = &text[..text.rfind(')')? + 1];
    let open = key.rfind('(')?;
    let name = key[..open].strip_suffix(' ')?;
    if name.is_empty() {
        return None;
    }
    Some((key, name))
}

/// Feeds ground truth from genuine links into the shared state.
pub struct LinkLearner<'a> {
    state: &'a mut LinkState,
}

impl<'a> LinkLearner<'a> {
    pub fn new(state: &'a mut LinkState) -> Self {
        Self { state }
    }

    /// Record one genuine link shown as `display_text`. Returns the history
    /// key and entry stored, or `None` if the text has no link shape.
    pub fn observe<L: GenuineLink + ?Sized>(
        &mut self,
        display_text: &str,
        link: &L,
    ) -> Option<(String, HistoryEntry)> {
        let (key, name) = split_display_text(display_text)?;
        let zone_id = link.zone_id();
        let mut map_id = link.map_id();

        let instance = name.chars().last().and_then(instance_of);
        match instance {
            Some(_) => {
                let glyph_len = name.chars().last().map_or(0, char::len_utf8);
                let stripped = &name[..name.len() - glyph_len];
                self.state.registry.upsert(stripped, zone_id, map_id & 0xFFFF);
                map_id = pack_instance(map_id & 0xFFFF, instance);
            }
            None => self.state.registry.upsert(name, zone_id, map_id),
        }

        let entry = HistoryEntry {
            zone_id,
            map_id,
            raw_x: link.raw_x(),
            raw_y: link.raw_y(),
        };
        self.state.history.put(key.to_string(), entry);
        log::info!("memorize {} => {:?}", key, entry);
        Some((key.to_string(), entry))
    }

    /// Walk a received message and learn from every map link whose display
    /// text sits where the host puts it. Returns how many links were learned.
    pub fn observe_message<L: GenuineLink>(&mut self, payloads: &[ReceivedPayload<L>]) -> usize {
        let mut learned = 0usize;
        for (i, payload) in payloads.iter().enumerate() {
            let ReceivedPayload::MapLink(link) = payload else {
                continue;
            };
            let Some(ReceivedPayload::Text(text)) = payloads.get(i + DISPLAY_TEXT_OFFSET) else {
                log::debug!("map link at payload {} has no display text", i);
                continue;
            };
            match self.observe(text, link) {
                Some(_) => learned += 1,
                None => log::debug!("display text {:?} is not a map link", text),
            }
        }
        learned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(zone_id: u32, map_id: u32, raw_x: i32, raw_y: i32) -> ObservedLink {
        ObservedLink {
            zone_id,
            map_id,
            raw_x,
            raw_y,
        }
    }

    #[test]
    fn learns_plain_link() {
        let mut state = LinkState::new();
        let (key, entry) = LinkLearner::new(&mut state)
            .observe("Eastern Fields ( 10.0  , 10.0 )", &link(7, 3, 100, 200))
            .unwrap();

        assert_eq!(key, "Eastern Fields ( 10.0  , 10.0 )");
        assert_eq!(
            entry,
            HistoryEntry {
                zone_id: 7,
                map_id: 3,
                raw_x: 100,
                raw_y: 200
            }
        );
        assert_eq!(state.registry.lookup("Eastern Fields"), Some((7, 3)));
        assert_eq!(state.history.get(&key), Some(entry));
    }

    #[test]
    fn strips_instance_glyph_and_packs_instance() {
        let mut state = LinkState::new();
        let (key, entry) = LinkLearner::new(&mut state)
            .observe("Eastern Fields\u{E0B2} ( 1.5  , 2.5 )", &link(7, 3, 1, 2))
            .unwrap();

        assert_eq!(key, "Eastern Fields\u{E0B2} ( 1.5  , 2.5 )");
        assert_eq!(entry.map_id, 0x0002_0003);
        assert_eq!(state.registry.lookup("Eastern Fields"), Some((7, 3)));
        assert_eq!(state.registry.lookup("Eastern Fields\u{E0B2}"), None);
    }

    #[test]
    fn key_stops_at_last_closing_paren() {
        let mut state = LinkState::new();
        let (key, _) = LinkLearner::new(&mut state)
            .observe("Eastern Fields ( 10.0  , 10.0 ) trailing", &link(1, 1, 0, 0))
            .unwrap();
        assert_eq!(key, "Eastern Fields ( 10.0  , 10.0 )");
    }

    #[test]
    fn overwrites_previous_guess() {
        let mut state = LinkState::new();
        state.history.put(
            "A ( 1.0  , 1.0 )".into(),
            HistoryEntry {
                zone_id: 1,
                map_id: 1,
                raw_x: -1,
                raw_y: -1,
            },
        );
        state.registry.upsert("A", 1, 1);

        LinkLearner::new(&mut state).observe("A ( 1.0  , 1.0 )", &link(9, 4, 5, 6));
        assert_eq!(state.history.get("A ( 1.0  , 1.0 )").unwrap().raw_x, 5);
        assert_eq!(state.registry.lookup("A"), Some((9, 4)));
    }

    #[test]
    fn ignores_text_without_link_shape() {
        let mut state = LinkState::new();
        let mut learner = LinkLearner::new(&mut state);
        assert!(learner.observe("no coordinates here", &link(1, 1, 0, 0)).is_none());
        assert!(learner.observe("( 1.0  , 1.0 )", &link(1, 1, 0, 0)).is_none());
        assert!(learner.observe("A( 1.0  , 1.0 )", &link(1, 1, 0, 0)).is_none());
        assert!(state.history.is_empty());
    }

    #[test]
    fn walks_received_message_layout() {
        let mut payloads: Vec<ReceivedPayload<ObservedLink>> = vec![
            ReceivedPayload::Text("look: ".into()),
            ReceivedPayload::MapLink(link(7, 3, 100, 200)),
        ];
        payloads.extend(std::iter::repeat(ReceivedPayload::Other).take(4));
        payloads.push(ReceivedPayload::Text("\u{E0BB}".into()));
        payloads.push(ReceivedPayload::Text("Eastern Fields ( 10.0  , 10.0 )".into()));
        payloads.push(ReceivedPayload::Other);
        // A link whose display text is missing.
        payloads.push(ReceivedPayload::MapLink(link(8, 8, 0, 0)));

        let mut state = LinkState::new();
        let learned = LinkLearner::new(&mut state).observe_message(&payloads);
        assert_eq!(learned, 1);
        assert_eq!(
            state.history.get("Eastern Fields ( 10.0  , 10.0 )").map(|e| e.zone_id),
            Some(7)
        );
    }
}
