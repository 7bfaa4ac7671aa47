use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ParseEnumError;

/// Generates the text forms shared by every closed vocabulary type:
/// a stable `slug` used for storage and serde, and a display `label`.
/// Parsing accepts either form, case-insensitively.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => ($slug:literal, $label:literal)),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn slug(&self) -> &'static str {
                match self {
                    $($name::$variant => $slug),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.slug().to_lowercase() == needle || v.label().to_lowercase() == needle)
                    .ok_or_else(|| ParseEnumError::new(stringify!($name), s))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.slug().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CourtKind {
    Half,
    Full,
}

text_enum!(CourtKind {
    Half => ("half", "Demi"),
    Full => ("full", "Complet"),
});

/// Which court kinds a game kind may be played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CourtRequirement {
    Any,
    HalfOnly,
    FullOnly,
}

text_enum!(CourtRequirement {
    Any => ("any", "Demi ou Complet"),
    HalfOnly => ("halfOnly", "Demi seulement"),
    FullOnly => ("fullOnly", "Complet obligatoire"),
});

impl CourtRequirement {
    pub fn accepts(&self, court_kind: CourtKind) -> bool {
        match self {
            CourtRequirement::Any => true,
            CourtRequirement::HalfOnly => court_kind == CourtKind::Half,
            CourtRequirement::FullOnly => court_kind == CourtKind::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GameKind {
    OneVOne,
    TwoVTwo,
    ThreeVThree,
    FourVFour,
    FiveVFive,
}

text_enum!(GameKind {
    OneVOne => ("1v1", "1v1"),
    TwoVTwo => ("2v2", "2v2"),
    ThreeVThree => ("3v3", "3v3"),
    FourVFour => ("4v4", "4v4"),
    FiveVFive => ("5v5", "5v5"),
});

impl GameKind {
    /// Number of players needed to fill a game of this kind.
    pub fn capacity(&self) -> usize {
        match self {
            GameKind::OneVOne => 2,
            GameKind::TwoVTwo => 4,
            GameKind::ThreeVThree => 6,
            GameKind::FourVFour => 8,
            GameKind::FiveVFive => 10,
        }
    }

    pub fn required_court(&self) -> CourtRequirement {
        match self {
            GameKind::OneVOne | GameKind::TwoVTwo => CourtRequirement::HalfOnly,
            GameKind::ThreeVThree => CourtRequirement::Any,
            GameKind::FourVFour | GameKind::FiveVFive => CourtRequirement::FullOnly,
        }
    }
}

/// `InProgress` and `Finished` are never produced by any transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GameStatus {
    Open,
    Full,
    InProgress,
    Finished,
}

text_enum!(GameStatus {
    Open => ("open", "Ouvert"),
    Full => ("full", "Complet"),
    InProgress => ("inProgress", "En cours"),
    Finished => ("finished", "Terminé"),
});

/// The 24 Tunisian governorates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Governorate {
    Ariana,
    Beja,
    BenArous,
    Bizerte,
    Gabes,
    Gafsa,
    Jendouba,
    Kairouan,
    Kasserine,
    Kebili,
    Kef,
    Mahdia,
    Manouba,
    Medenine,
    Monastir,
    Nabeul,
    Sfax,
    SidiBouzid,
    Siliana,
    Sousse,
    Tataouine,
    Tozeur,
    Tunis,
    Zaghouan,
}

text_enum!(Governorate {
    Ariana => ("ariana", "Ariana"),
    Beja => ("beja", "Béja"),
    BenArous => ("ben-arous", "Ben Arous"),
    Bizerte => ("bizerte", "Bizerte"),
    Gabes => ("gabes", "Gabès"),
    Gafsa => ("gafsa", "Gafsa"),
    Jendouba => ("jendouba", "Jendouba"),
    Kairouan => ("kairouan", "Kairouan"),
    Kasserine => ("kasserine", "Kasserine"),
    Kebili => ("kebili", "Kebili"),
    Kef => ("kef", "Le Kef"),
    Mahdia => ("mahdia", "Mahdia"),
    Manouba => ("manouba", "La Manouba"),
    Medenine => ("medenine", "Médenine"),
    Monastir => ("monastir", "Monastir"),
    Nabeul => ("nabeul", "Nabeul"),
    Sfax => ("sfax", "Sfax"),
    SidiBouzid => ("sidi-bouzid", "Sidi Bouzid"),
    Siliana => ("siliana", "Siliana"),
    Sousse => ("sousse", "Sousse"),
    Tataouine => ("tataouine", "Tataouine"),
    Tozeur => ("tozeur", "Tozeur"),
    Tunis => ("tunis", "Tunis"),
    Zaghouan => ("zaghouan", "Zaghouan"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SurfaceType {
    #[default]
    Asphalt,
    Concrete,
    Other,
}

text_enum!(SurfaceType {
    Asphalt => ("asphalt", "Asphalte"),
    Concrete => ("concrete", "Béton"),
    Other => ("other", "Autre"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GroundCondition {
    #[default]
    Good,
    Medium,
    Bad,
}

text_enum!(GroundCondition {
    Good => ("good", "Bon"),
    Medium => ("medium", "Moyen"),
    Bad => ("bad", "Mauvais"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PlayerPosition {
    PointGuard,
    Forward,
    Center,
}

text_enum!(PlayerPosition {
    PointGuard => ("PG", "PG"),
    Forward => ("forward", "Forward"),
    Center => ("center", "Center"),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_table() {
        let capacities: Vec<usize> = GameKind::ALL.iter().map(|k| k.capacity()).collect();
        assert_eq!(capacities, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_required_court_table() {
        assert_eq!(GameKind::OneVOne.required_court(), CourtRequirement::HalfOnly);
        assert_eq!(GameKind::TwoVTwo.required_court(), CourtRequirement::HalfOnly);
        assert_eq!(GameKind::ThreeVThree.required_court(), CourtRequirement::Any);
        assert_eq!(GameKind::FourVFour.required_court(), CourtRequirement::FullOnly);
        assert_eq!(GameKind::FiveVFive.required_court(), CourtRequirement::FullOnly);
    }

    #[test]
    fn test_requirement_accepts() {
        assert!(CourtRequirement::Any.accepts(CourtKind::Half));
        assert!(CourtRequirement::Any.accepts(CourtKind::Full));
        assert!(CourtRequirement::HalfOnly.accepts(CourtKind::Half));
        assert!(!CourtRequirement::HalfOnly.accepts(CourtKind::Full));
        assert!(CourtRequirement::FullOnly.accepts(CourtKind::Full));
        assert!(!CourtRequirement::FullOnly.accepts(CourtKind::Half));
    }

    #[test]
    fn test_there_are_24_governorates() {
        assert_eq!(Governorate::ALL.len(), 24);
    }

    #[test]
    fn test_parse_accepts_slug_and_label() {
        assert_eq!("ben-arous".parse::<Governorate>().unwrap(), Governorate::BenArous);
        assert_eq!("Le Kef".parse::<Governorate>().unwrap(), Governorate::Kef);
        assert_eq!("BÉJA".parse::<Governorate>().unwrap(), Governorate::Beja);
        assert_eq!("Complet".parse::<CourtKind>().unwrap(), CourtKind::Full);
        assert_eq!(" 3v3 ".parse::<GameKind>().unwrap(), GameKind::ThreeVThree);
        assert!("6v6".parse::<GameKind>().is_err());
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&GameStatus::InProgress).unwrap();
        assert_eq!(json, "\"inProgress\"");

        let kind: GameKind = serde_json::from_str("\"5v5\"").unwrap();
        assert_eq!(kind, GameKind::FiveVFive);
    }
}
