use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of places the planner knows travel data for. Free-text event
/// locations are normalized into one of these by the location resolver;
/// anything that matches no rule stays `Unresolved` and is skipped by the
/// travel computations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalPlace {
    KfarSaba,
    BeitDagan,
    RishonLezion,
    NirTzvi,
    HodHasharon,
    TelAviv,
    Unresolved,
}

impl CanonicalPlace {
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalPlace::KfarSaba => "Kfar Saba",
            CanonicalPlace::BeitDagan => "Beit Dagan",
            CanonicalPlace::RishonLezion => "Rishon Lezion",
            CanonicalPlace::NirTzvi => "Nir Tzvi",
            CanonicalPlace::HodHasharon => "Hod Hasharon",
            CanonicalPlace::TelAviv => "Tel Aviv",
            CanonicalPlace::Unresolved => "unresolved",
        }
    }

    /// Home base on the Beit Dagan side.
    pub fn own_home() -> Self {
        CanonicalPlace::BeitDagan
    }

    /// Home base on the partner's side.
    pub fn partner_home() -> Self {
        CanonicalPlace::KfarSaba
    }

    /// Places within a short hop of the own home base. A first commitment here
    /// tomorrow means sleeping at home wins outright.
    pub fn is_near_home(self) -> bool {
        matches!(
            self,
            CanonicalPlace::BeitDagan | CanonicalPlace::RishonLezion | CanonicalPlace::NirTzvi
        )
    }

    pub fn is_partner_area(self) -> bool {
        matches!(self, CanonicalPlace::KfarSaba)
    }

    pub fn is_resolved(self) -> bool {
        !matches!(self, CanonicalPlace::Unresolved)
    }
}

impl fmt::Display for CanonicalPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
