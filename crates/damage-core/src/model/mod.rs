pub mod colour;
pub mod deck;
pub mod hand;
pub mod kind;

pub use colour::Colour;
pub use deck::Deck;
pub use hand::Hand;
pub use kind::CardKind;
