use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::Choice;

/// Society role carried by flat assignments and notification authors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Resident,
    Admin,
    President,
    Watchman,
}

impl Role {
    pub const LABELS: &'static [&'static str] = &["resident", "admin", "president", "watchman"];

    pub const fn ordered() -> [Self; 4] {
        [Self::Resident, Self::Admin, Self::President, Self::Watchman]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::Admin => "admin",
            Self::President => "president",
            Self::Watchman => "watchman",
        }
    }
}

impl Choice for Role {
    const LABELS: &'static [&'static str] = Role::LABELS;

    fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|role| role.label() == label)
    }

    fn label(self) -> &'static str {
        Role::label(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        <Self as Choice>::from_label(value)
            .ok_or_else(|| format!("unknown role '{value}', expected one of {:?}", Self::LABELS))
    }
}
