//! Control Tracker.
//!
//! Two states, `NoControl` and `ControlledBy(role)`. Scoring moves control to
//! the scorer; anything else leaves it alone except the free-shot protocol,
//! which can reset it.
//!
//! A control-flagged card drawn while someone is in control runs as a fixed
//! two-step machine:
//!
//! ```text
//! ControlledBy(A) + control card ─┬─ A eligible ─────────────► Scored(A)
//!                                 └─ A not eligible ─► PassTo(B)
//!                                        follow-up card ─┬─ B eligible ─► Scored(B)
//!                                                        └─ otherwise ──► Reset
//! ```
//!
//! Only single-wrestler eligibility is consulted. There is no third step.

use tracing::info;

use crate::match_engine::models::{ControlChange, ControlState, Fac, Role};
use crate::match_engine::resolver::{eligible_alone, ResolveContext};

/// One step of the free-shot protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeShot {
    Scored(Role),
    /// The holder missed; draw one follow-up card for this wrestler.
    PassTo(Role),
    /// Both missed. Control goes back to `NoControl`.
    Reset,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlTracker {
    state: ControlState,
}

impl ControlTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn holder(&self) -> Option<Role> {
        self.state.holder()
    }

    fn transition(&mut self, after: ControlState) -> ControlChange {
        let change = ControlChange { before: self.state, after };
        if change.changed() {
            info!(before = ?change.before, after = ?change.after, "control changed");
        }
        self.state = after;
        change
    }

    /// Feed the result of a resolved card. `None` means nobody scored.
    pub fn on_outcome(&mut self, scorer: Option<Role>) -> ControlChange {
        match scorer {
            Some(role) => self.transition(ControlState::ControlledBy(role)),
            None       => self.transition(self.state),
        }
    }

    pub fn set_manual(&mut self, holder: Option<Role>) -> ControlChange {
        self.transition(holder.map_or(ControlState::NoControl, ControlState::ControlledBy))
    }

    pub fn reset(&mut self) -> ControlChange {
        self.transition(ControlState::NoControl)
    }

    /// First step of the protocol. `None` when the card is not
    /// control-flagged or nobody is in control, in which case the card is
    /// resolved the ordinary way.
    pub fn free_shot(&self, card: &Fac, ctx: &ResolveContext<'_>) -> Option<FreeShot> {
        if !card.control {
            return None;
        }
        let holder = self.holder()?;
        Some(if eligible_alone(card, holder, ctx) {
            FreeShot::Scored(holder)
        } else {
            FreeShot::PassTo(holder.other())
        })
    }

    /// Second and last step: the other wrestler's shot on the follow-up card.
    pub fn follow_up(&self, shooter: Role, card: &Fac, ctx: &ResolveContext<'_>) -> FreeShot {
        if eligible_alone(card, shooter, ctx) {
            FreeShot::Scored(shooter)
        } else {
            FreeShot::Reset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_engine::models::{FacKind, PointSpec, Skill, SkillSheet, SkillSymbol, TvGrade, Wrestler};

    fn with_skill(name: &str, skill: Skill) -> Wrestler {
        Wrestler::new(name, TvGrade::B, 1)
            .with_skills(SkillSheet::new().with(skill, SkillSymbol::Star))
    }

    fn card(skill: Skill) -> Fac {
        Fac::new(7, FacKind::Skill(skill), PointSpec::Flat(2)).control()
    }

    #[test]
    fn scoring_takes_control_and_misses_keep_it() {
        let mut tracker = ControlTracker::new();
        assert_eq!(tracker.state(), ControlState::NoControl);

        let change = tracker.on_outcome(Some(Role::Underdog));
        assert!(change.changed());
        assert_eq!(tracker.holder(), Some(Role::Underdog));

        let change = tracker.on_outcome(None);
        assert!(!change.changed());
        assert_eq!(tracker.holder(), Some(Role::Underdog));
    }

    #[test]
    fn no_free_shot_without_control_or_flag() {
        let fav = with_skill("Fav", Skill::Agile);
        let dog = with_skill("Dog", Skill::Mean);
        let ctx = ResolveContext::new(&fav, &dog);
        let mut tracker = ControlTracker::new();
        assert_eq!(tracker.free_shot(&card(Skill::Agile), &ctx), None);

        tracker.set_manual(Some(Role::Favored));
        let plain = Fac::new(8, FacKind::Skill(Skill::Agile), PointSpec::Flat(2));
        assert_eq!(tracker.free_shot(&plain, &ctx), None);
    }

    #[test]
    fn holder_scores_even_when_trailing_opponent_is_eligible() {
        let mut fav = with_skill("Fav", Skill::Agile);
        fav.set_position(10);
        let dog = with_skill("Dog", Skill::Agile);
        let ctx = ResolveContext::new(&fav, &dog);
        let mut tracker = ControlTracker::new();
        tracker.set_manual(Some(Role::Favored));
        assert_eq!(tracker.free_shot(&card(Skill::Agile), &ctx), Some(FreeShot::Scored(Role::Favored)));
    }

    #[test]
    fn missed_shot_passes_then_resets() {
        let fav = with_skill("Fav", Skill::Agile);
        let dog = with_skill("Dog", Skill::Mean);
        let ctx = ResolveContext::new(&fav, &dog);
        let mut tracker = ControlTracker::new();
        tracker.set_manual(Some(Role::Favored));

        let first = tracker.free_shot(&card(Skill::Mean), &ctx);
        assert_eq!(first, Some(FreeShot::PassTo(Role::Underdog)));

        let follow = Fac::new(9, FacKind::Skill(Skill::Mean), PointSpec::Flat(1));
        assert_eq!(tracker.follow_up(Role::Underdog, &follow, &ctx), FreeShot::Scored(Role::Underdog));

        let dud = Fac::new(10, FacKind::Skill(Skill::Heavy), PointSpec::Flat(1));
        assert_eq!(tracker.follow_up(Role::Underdog, &dud, &ctx), FreeShot::Reset);
        tracker.reset();
        assert_eq!(tracker.state(), ControlState::NoControl);
    }
}
