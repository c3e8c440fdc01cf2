use std::collections::HashMap;

/// Resolved link data remembered for one canonical link text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub zone_id: u32,
    /// Bare map id in the low 16 bits, instance number (if any) above.
    pub map_id: u32,
    pub raw_x: i32,
    pub raw_y: i32,
}

impl HistoryEntry {
    pub fn bare_map_id(&self) -> u32 {
        self.map_id & 0xFFFF
    }

    pub fn instance(&self) -> Option<u8> {
        match self.map_id >> 16 {
            0 => None,
            n => Some(n as u8),
        }
    }
}

/// Pack an instance number (1..=9) into the high bits of a map id.
pub fn pack_instance(map_id: u32, instance: Option<u8>) -> u32 {
    match instance {
        Some(n) => map_id | (u32::from(n) << 16),
        None => map_id,
    }
}

/// Canonical link text → the coordinates chosen (or learned) for it.
///
/// Entries are never evicted: once a text has been bound to raw coordinates
/// every later paste of the same text must rebuild the same link.
#[derive(Debug, Default, Clone)]
pub struct HistoryCache {
    entries: HashMap<String, HistoryEntry>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<HistoryEntry> {
        self.entries.get(key).copied()
    }

    /// Bind `key`, replacing any previous entry. Returns the replaced entry.
    pub fn put(&mut self, key: String, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.insert(key, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
