//! # mat_engine
//!
//! The match resolution engine of a Fast Action Card (FAC) pro-wrestling game.
//!
//! Two wrestlers, one Favored and one Underdog, race along a 16-space track.
//! Each FAC drawn names a skill, grade or theme; the engine decides who can
//! use it, moves that wrestler forward, tracks who is "in control", and runs
//! the pin and finisher attempts that end the match.
//!
//! ## How it works
//!
//! 1. Load wrestlers and a deck with [`load_wrestlers`] / [`load_deck`], or
//!    build them in code.
//! 2. Create a [`MatchController`] from the deck and a [`MatchConfig`], then
//!    call [`MatchController::start_match`].
//! 3. Call [`MatchController::draw_and_resolve`] once per card cycle. Each call
//!    returns a [`CardReport`] describing every card drawn, the points scored
//!    (die rolls included), control changes and any pin or finisher attempt.
//! 4. Stop when [`CardReport::result`] is over, then hand the records back
//!    with [`MatchController::end_match`].
//!
//! ## Key features
//!
//! - **Deterministic**: set `rng_seed` to replay the exact same match. Tests
//!   can script individual rolls with [`LoadedDice`].
//! - **Bounded**: a card nobody can use triggers a fixed number of redraws,
//!   and a long scoreless run surfaces [`MatchError::ExhaustedDeck`] instead
//!   of spinning.
//! - **Data out**: reports are plain serde types; [`board_view`] turns them
//!   into board JSON and log lines for a presentation layer.
//!
//! ## Quick start
//!
//! ```rust
//! use mat_engine::{
//!     FacDeck, Fac, FacKind, MatchConfig, MatchController, PointSpec, Skill, SkillSheet,
//!     SkillSymbol, TvGrade, Wrestler,
//! };
//!
//! let deck = FacDeck::new(vec![
//!     Fac::new(1, FacKind::Skill(Skill::Strong), PointSpec::Flat(3)),
//!     Fac::new(2, FacKind::Skill(Skill::Agile), PointSpec::DieRoll { sides: 6 }).control(),
//!     Fac::new(3, FacKind::Trailing, PointSpec::Flat(2)),
//! ]);
//! let favored = Wrestler::new("Iron Duke", TvGrade::Aa, 3)
//!     .with_skills(SkillSheet::new().with(Skill::Strong, SkillSymbol::Star))
//!     .with_finisher("Iron Clutch", (11, 36));
//! let underdog = Wrestler::new("Kid Comet", TvGrade::C, 1)
//!     .with_skills(SkillSheet::new().with(Skill::Agile, SkillSymbol::Circle));
//!
//! let mut ctl = MatchController::new(deck, MatchConfig::default().with_seed(42));
//! ctl.start_match(favored, underdog)?;
//! for _ in 0..200 {
//!     let report = ctl.draw_and_resolve()?;
//!     if report.result.is_over() {
//!         println!("winner: {:?}", report.result.winner());
//!         break;
//!     }
//! }
//! let summary = ctl.end_match()?;
//! println!("{} finished on {}", summary.favored.name, summary.favored.position());
//! # Ok::<(), mat_engine::MatchError>(())
//! ```

pub mod board_view;
pub mod match_engine;

// Convenience re-exports so callers can use `mat_engine::MatchController`
// directly without reaching into `match_engine::`.
pub use match_engine::{
    load_cards, load_deck, load_wrestlers, ArmedAttempt, AttemptReport, CardReport,
    ControlState, Dice, Fac, FacDeck, FacKind, GradeUpdate, LoadedDice, MatchConfig,
    MatchController, MatchError, MatchResult, MatchSnapshot, MatchSummary, Outcome, PointSpec,
    resolve, ResolveContext, Result, Role, Roster, Skill, SkillSheet, SkillSymbol, TieReason,
    TvGrade, Wrestler,
};
