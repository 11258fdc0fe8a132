#![deny(warnings)]
pub mod engine;
pub mod model;
pub mod sample;
pub mod value;

pub use engine::{
    Evaluation, WalkStats, evaluate, evaluate_colour, expected_colour_damage, expected_damage,
    expected_damage_approx, expected_damage_exact, terminal_mass,
};
pub use model::{CardKind, Colour, Deck, Hand};
pub use value::{Exact, Weight};
