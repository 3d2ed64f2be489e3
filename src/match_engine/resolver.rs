//! Skill Resolver: who may act on a card, and who wins when both may.
//!
//! Everything here is a pure function of the card and the wrestlers passed
//! in. The control free-shot protocol reuses [`eligible_alone`] and never
//! reaches the tiebreak.

use std::cmp::Ordering;

use crate::match_engine::board::symbol_usable;
use crate::match_engine::models::{Fac, FacKind, Outcome, Role, Skill, TieReason, Wrestler};

/// Skills that qualify a wrestler for a Test of Strength.
pub const STRENGTH_SKILLS: [Skill; 2] = [Skill::Strong, Skill::Powerful];

/// The state a resolution reads.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub favored: &'a Wrestler,
    pub underdog: &'a Wrestler,
    pub in_control: Option<Role>,
    pub last_scorer: Option<Role>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(favored: &'a Wrestler, underdog: &'a Wrestler) -> Self {
        Self { favored, underdog, in_control: None, last_scorer: None }
    }

    pub fn wrestler(&self, role: Role) -> &'a Wrestler {
        match role {
            Role::Favored  => self.favored,
            Role::Underdog => self.underdog,
        }
    }
}

pub fn can_use_skill(wrestler: &Wrestler, skill: Skill) -> bool {
    wrestler
        .skills
        .symbol(skill)
        .is_some_and(|symbol| symbol_usable(symbol, wrestler.position()))
}

pub fn qualifies_for_test_of_strength(wrestler: &Wrestler) -> bool {
    wrestler.has_any(&STRENGTH_SKILLS)
}

fn signature_ready(role: Role, ctx: &ResolveContext<'_>) -> bool {
    ctx.in_control == Some(role) && ctx.last_scorer == Some(role)
}

/// Single-wrestler eligibility, ignoring the opponent entirely.
pub fn eligible_alone(card: &Fac, role: Role, ctx: &ResolveContext<'_>) -> bool {
    let wrestler = ctx.wrestler(role);
    match card.kind {
        FacKind::Skill(skill) | FacKind::Submission(skill) => can_use_skill(wrestler, skill),
        FacKind::TvMove | FacKind::Grudge | FacKind::Trailing => true,
        FacKind::Specialty      => wrestler.specialty.is_some(),
        FacKind::Signature      => signature_ready(role, ctx),
        FacKind::TestOfStrength => qualifies_for_test_of_strength(wrestler),
        FacKind::Helped
        | FacKind::WildCard
        | FacKind::HighlightReel
        | FacKind::RefBump
        | FacKind::TitleHolder => false,
    }
}

/// `(favored, underdog)` eligibility for the ordinary dual check.
fn eligibility(card: &Fac, ctx: &ResolveContext<'_>) -> (bool, bool) {
    let (fav, dog) = (ctx.favored, ctx.underdog);
    match card.kind {
        FacKind::TvMove => match fav.tv_grade.cmp(&dog.tv_grade) {
            Ordering::Less    => (true, false),
            Ordering::Greater => (false, true),
            Ordering::Equal   => (true, true),
        },
        FacKind::Grudge => {
            match fav.grudge_grade.unsigned_abs().cmp(&dog.grudge_grade.unsigned_abs()) {
                Ordering::Greater => (true, false),
                Ordering::Less    => (false, true),
                Ordering::Equal   => (true, true),
            }
        }
        FacKind::TestOfStrength => {
            let both = qualifies_for_test_of_strength(fav) && qualifies_for_test_of_strength(dog);
            (both, both)
        }
        _ => (
            eligible_alone(card, Role::Favored, ctx),
            eligible_alone(card, Role::Underdog, ctx),
        ),
    }
}

/// Tiebreak between two eligible wrestlers: the trailing wrestler wins;
/// level wrestlers hand the card to the Underdog.
pub fn tiebreak(card: &Fac, ctx: &ResolveContext<'_>) -> (Role, TieReason) {
    match ctx.favored.position().cmp(&ctx.underdog.position()) {
        Ordering::Less    => (Role::Favored, TieReason::Trailing),
        Ordering::Greater => (Role::Underdog, TieReason::Trailing),
        Ordering::Equal if card.is_trailing() => (Role::Underdog, TieReason::TrailingCard),
        Ordering::Equal   => (Role::Underdog, TieReason::EqualUnderdog),
    }
}

/// Ordinary resolution of a card.
///
/// A Test of Strength where both qualify comes back as a tie here; the
/// controller runs the contest instead of honoring the tiebreak.
pub fn resolve(card: &Fac, ctx: &ResolveContext<'_>) -> Outcome {
    match eligibility(card, ctx) {
        (false, false) => Outcome::NoOneEligible,
        (true, false)  => Outcome::SingleWinner(Role::Favored),
        (false, true)  => Outcome::SingleWinner(Role::Underdog),
        (true, true)   => {
            let (winner, reason) = tiebreak(card, ctx);
            Outcome::TieResolved(winner, reason)
        }
    }
}
