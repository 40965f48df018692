use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(MoveKind {
    Checker => "checker",
    Cube => "cube",
});

str_enum!(DecisionKind {
    CheckerPlay => "checker_play",
    CubeAction => "cube_action",
});

str_enum!(CubeAction {
    NoDouble => "no_double",
    Take => "take",
    Pass => "pass",
    Unknown => "unknown",
});

str_enum!(MatchFormat {
    Xg => "xg",
    GnubgSgf => "gnubg_sgf",
    GnubgMat => "gnubg_mat",
    GnubgText => "gnubg_text",
    Bgf => "bgf",
});

impl CubeAction {
    /// Human-readable label stored with played cube actions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoDouble => "No Double",
            Self::Take => "Double/Take",
            Self::Pass => "Double/Pass",
            Self::Unknown => "Double",
        }
    }

    /// Label of the responder's half of the decision, if resolved.
    pub fn response_label(&self) -> Option<&'static str> {
        match self {
            Self::Take => Some("Take"),
            Self::Pass => Some("Pass"),
            Self::NoDouble | Self::Unknown => None,
        }
    }
}

impl MatchFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xg => "xg",
            Self::GnubgSgf => "sgf",
            Self::GnubgMat => "mat",
            Self::GnubgText => "txt",
            Self::Bgf => "bgf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xg" => Some(Self::Xg),
            "sgf" => Some(Self::GnubgSgf),
            "mat" => Some(Self::GnubgMat),
            "txt" => Some(Self::GnubgText),
            "bgf" => Some(Self::Bgf),
            _ => None,
        }
    }
}
