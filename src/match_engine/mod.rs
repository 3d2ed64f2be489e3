//! Core match engine: card resolution, control, scoring and the match loop.
//!
//! ## Module overview
//!
//! | Module       | Purpose |
//! |--------------|---------|
//! | `models`     | All shared types: grades, skills, wrestlers, cards, reports |
//! | `error`      | `MatchError` and the crate `Result` alias |
//! | `dice`       | `Dice` trait over any `rand::Rng`, plus scripted `LoadedDice` for tests |
//! | `board`      | Track layout: square/circle spaces, pin zone, kickout and grade tables |
//! | `deck`       | FAC deck with Fisher-Yates shuffle and discard reshuffle |
//! | `resolver`   | Who may use a card, and the trailing/underdog tiebreak |
//! | `control`    | In-control state machine and the two-step free shot |
//! | `scoring`    | Points, token movement and arming of pin/finisher attempts |
//! | `themed`     | Submission holds and the Test of Strength |
//! | `finish`     | Pin counts and finisher rolls |
//! | `controller` | `MatchController`, the command surface driving one match |
//! | `loader`     | Wrestler/deck JSON records and the `Roster` |

pub mod board;
pub mod control;
pub mod controller;
pub mod deck;
pub mod dice;
pub mod error;
pub mod finish;
pub mod loader;
pub mod models;
pub mod resolver;
pub mod scoring;
pub mod themed;

// Re-export the public API surface so callers can use
// `match_engine::MatchController` without reaching into sub-modules.
pub use controller::{MatchConfig, MatchController};
pub use deck::FacDeck;
pub use dice::{Dice, LoadedDice};
pub use error::{MatchError, Result};
pub use loader::{load_cards, load_deck, load_wrestlers, GradeUpdate, Roster};
pub use models::{
    ArmedAttempt, AttemptReport, CardReport, ControlState, Fac, FacKind, MatchResult,
    MatchSnapshot, MatchSummary, Outcome, PointSpec, Role, Skill, SkillSheet, SkillSymbol,
    TieReason, TvGrade, Wrestler,
};
pub use resolver::{resolve, ResolveContext};
