use std::collections::HashMap;

use crate::zones::ZoneDirectory;

/// Display name → (zone id, map id).
#[derive(Debug, Default, Clone)]
pub struct MapRegistry {
    maps: HashMap<String, (u32, u32)>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load every named zone from the directory. The first zone seen
    /// for a name wins, so later duplicates do not clobber it.
    pub fn seed<Z: ZoneDirectory + ?Sized>(&mut self, directory: &Z) -> usize {
        let mut added = 0usize;
        for zone in directory.zones() {
            if zone.place_name.is_empty() || self.maps.contains_key(&zone.place_name) {
                continue;
            }
            self.maps.insert(zone.place_name, (zone.zone_id, zone.map_id));
            added += 1;
        }
        added
    }

    pub fn upsert(&mut self, name: &str, zone_id: u32, map_id: u32) {
        self.maps.insert(name.to_string(), (zone_id, map_id));
    }

    pub fn lookup(&self, name: &str) -> Option<(u32, u32)> {
        self.maps.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::StaticZoneDirectory;

    #[test]
    fn seeding_skips_unnamed_zones_and_keeps_first_duplicate() {
        let dir = StaticZoneDirectory::new()
            .with_zone(1, "Eastern Fields", 1)
            .with_zone(2, "", 2)
            .with_zone(3, "Eastern Fields", 9);

        let mut registry = MapRegistry::new();
        assert_eq!(registry.seed(&dir), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("Eastern Fields"), Some((1, 1)));
        assert_eq!(registry.lookup(""), None);
    }

    #[test]
    fn upsert_replaces_seeded_entry() {
        let dir = StaticZoneDirectory::new().with_zone(1, "Eastern Fields", 1);
        let mut registry = MapRegistry::new();
        registry.seed(&dir);

        registry.upsert("Eastern Fields", 7, 3);
        assert_eq!(registry.lookup("Eastern Fields"), Some((7, 3)));

        registry.upsert("Eastern Fields", 7, 3);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reseeding_does_not_override_learned_entries() {
        let dir = StaticZoneDirectory::new().with_zone(1, "Eastern Fields", 1);
        let mut registry = MapRegistry::new();
        registry.upsert("Eastern Fields", 7, 3);
        assert_eq!(registry.seed(&dir), 0);
        assert_eq!(registry.lookup("Eastern Fields"), Some((7, 3)));
    }
}
