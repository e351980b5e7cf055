use crate::models::place::CanonicalPlace;

/// Normalizes free-text event locations into canonical places. Rules are
/// case-insensitive substring matches applied in a fixed priority order, so a
/// place name embedded in a longer address still resolves. No fuzzy matching.
const RESOLUTION_RULES: &[(&str, CanonicalPlace)] = &[
    ("kfar saba", CanonicalPlace::KfarSaba),
    ("hod hasharon", CanonicalPlace::HodHasharon),
    ("beit dagan", CanonicalPlace::BeitDagan),
    ("rishon", CanonicalPlace::RishonLezion),
    ("nir tzvi", CanonicalPlace::NirTzvi),
    ("tennis", CanonicalPlace::NirTzvi),
    ("tel aviv", CanonicalPlace::TelAviv),
];

pub fn resolve(text: &str) -> CanonicalPlace {
    let lowered = text.to_lowercase();
    for (keyword, place) in RESOLUTION_RULES {
        if lowered.contains(keyword) {
            return *place;
        }
    }
    CanonicalPlace::Unresolved
}

pub fn resolve_optional(text: Option<&str>) -> CanonicalPlace {
    match text {
        Some(value) => resolve(value),
        None => CanonicalPlace::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive() {
        assert_eq!(resolve("KFAR SABA"), CanonicalPlace::KfarSaba);
        assert_eq!(resolve("beit dagan"), CanonicalPlace::BeitDagan);
    }

    #[test]
    fn place_embedded_in_an_address_still_resolves() {
        assert_eq!(
            resolve("Weizmann St 12, Kfar Saba, Israel"),
            CanonicalPlace::KfarSaba
        );
        assert_eq!(
            resolve("Office park, Rishon Lezion west"),
            CanonicalPlace::RishonLezion
        );
    }

    #[test]
    fn tennis_aliases_to_nir_tzvi() {
        assert_eq!(resolve("tennis club"), CanonicalPlace::NirTzvi);
        assert_eq!(resolve("Nir Tzvi courts"), CanonicalPlace::NirTzvi);
    }

    #[test]
    fn first_rule_wins_when_several_match() {
        // "kfar saba" outranks "tel aviv" in the rule order.
        assert_eq!(
            resolve("Tel Aviv road towards Kfar Saba"),
            CanonicalPlace::KfarSaba
        );
    }

    #[test]
    fn unknown_text_stays_unresolved() {
        assert_eq!(resolve("Haifa port"), CanonicalPlace::Unresolved);
        assert_eq!(resolve(""), CanonicalPlace::Unresolved);
        assert_eq!(resolve_optional(None), CanonicalPlace::Unresolved);
    }
}
