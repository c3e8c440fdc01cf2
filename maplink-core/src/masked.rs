// Place names the host renders with `*` in place of filtered characters,
// paired with the real name the zone directory knows them by.
pub(crate) const MASKED_PLACE_NAMES: &[(&str, &str)] = &[
    ("狼狱演*场", "狼狱演习场"),
    ("魔**阿济兹拉", "魔大陆阿济兹拉"),
    ("玛托雅的洞*", "玛托雅的洞穴"),
    ("魔**中枢", "魔大陆中枢"),
    ("双蛇*军营", "双蛇党军营"),
    ("地衣宫演*场", "地衣宫演习场"),
    ("水晶塔演*场", "水晶塔演习场"),
    ("*泉神社", "醴泉神社"),
    ("*泉神社神道", "醴泉神社神道"),
    ("格**火山", "格鲁格火山"),
    ("**亚马乌罗提", "末日亚马乌罗提"),
    ("游末邦**", "游末邦监狱"),
];

/// Map a masked place name back to its canonical spelling. Names that are
/// not in the table are returned unchanged.
pub fn unmask(name: &str) -> &str {
    MASKED_PLACE_NAMES
        .iter()
        .find(|(masked, _)| *masked == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_masked_name_resolves_to_its_canonical_form() {
        for (masked, canonical) in MASKED_PLACE_NAMES {
            assert_eq!(unmask(masked), *canonical);
        }
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(unmask("Eastern Fields"), "Eastern Fields");
        assert_eq!(unmask("醴泉神社"), "醴泉神社");
        assert_eq!(unmask(""), "");
    }

    #[test]
    fn masked_names_are_unique() {
        for (i, (a, _)) in MASKED_PLACE_NAMES.iter().enumerate() {
            for (b, _) in &MASKED_PLACE_NAMES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
