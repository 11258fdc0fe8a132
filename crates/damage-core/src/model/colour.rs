use core::fmt;

use serde::{Deserialize, Serialize};

use crate::model::kind::CardKind;

/// Damage table printed on a deck. Every colour shares the white deck's
/// composition and draw rules; only the face values change.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Colour {
    #[default]
    White,
    Yellow,
    Red,
    Black,
}

impl Colour {
    pub const ALL: [Colour; 4] = [Colour::White, Colour::Yellow, Colour::Red, Colour::Black];

    /// Face value of a plain hit. Crits are worth one more.
    pub const fn low(self) -> u32 {
        match self {
            Colour::White => 1,
            Colour::Yellow => 2,
            Colour::Red => 3,
            Colour::Black => 4,
        }
    }

    pub const fn damage(self, kind: CardKind) -> u32 {
        match kind {
            CardKind::Miss => 0,
            CardKind::Hit => self.low(),
            CardKind::Crit | CardKind::Bonus => self.low() + 1,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colour::White => "white",
            Colour::Yellow => "yellow",
            Colour::Red => "red",
            Colour::Black => "black",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::Colour;
    use crate::model::kind::CardKind;

    #[test]
    fn darker_decks_hit_harder() {
        let tables: Vec<[u32; 4]> = Colour::ALL
            .iter()
            .map(|colour| CardKind::ALL.map(|kind| colour.damage(kind)))
            .collect();
        assert_eq!(
            tables,
            vec![[0, 1, 2, 2], [0, 2, 3, 3], [0, 3, 4, 4], [0, 4, 5, 5]]
        );
    }

    #[test]
    fn parses_lowercase_names() {
        let colour: Colour = serde_json::from_str("\"red\"").expect("known colour");
        assert_eq!(colour, Colour::Red);
        assert_eq!(colour.to_string(), "red");
        assert!(serde_json::from_str::<Colour>("\"green\"").is_err());
    }
}
