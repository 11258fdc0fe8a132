use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CardKind {
    Miss = 0,
    Hit = 1,
    Crit = 2,
    /// Crit that grants an extra draw; never counts toward the target.
    Bonus = 3,
}

impl CardKind {
    /// Canonical enumeration order. Float accumulation depends on it.
    pub const ALL: [CardKind; 4] = [
        CardKind::Miss,
        CardKind::Hit,
        CardKind::Crit,
        CardKind::Bonus,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_bonus(self) -> bool {
        matches!(self, CardKind::Bonus)
    }

    pub const fn is_miss(self) -> bool {
        matches!(self, CardKind::Miss)
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CardKind::Miss => "0",
            CardKind::Hit => "1",
            CardKind::Crit => "2",
            CardKind::Bonus => "2*",
        };
        f.write_str(symbol)
    }
}
