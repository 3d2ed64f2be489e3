//! Scoring & Track Engine.
//!
//! Turns a won card into points, moves the scorer's token and works out
//! which match-ending attempt, if any, the new position arms.

use tracing::debug;

use crate::match_engine::board::{grudge_points, tv_move_points, zone, Zone, FAILED_FINISHER_SPACE};
use crate::match_engine::dice::Dice;
use crate::match_engine::models::{
    ArmedAttempt, Fac, FacKind, GradeTableKind, HoldReport, PointSpec, Role, ScoreReport, Wrestler,
};
use crate::match_engine::themed::submission_hold;

/// Base points of `card` for `scorer`, plus the die value when one was rolled.
pub fn card_points<D: Dice + ?Sized>(card: &Fac, scorer: &Wrestler, dice: &mut D) -> (u8, Option<u8>) {
    if card.kind == FacKind::Specialty {
        if let Some(specialty) = &scorer.specialty {
            return (specialty.points, None);
        }
    }
    match card.points {
        PointSpec::Flat(points) => (points, None),
        PointSpec::DieRoll { sides } => {
            let roll = dice.roll(sides);
            (roll, Some(roll))
        }
        PointSpec::GradeTable(GradeTableKind::Tv)     => (tv_move_points(scorer.tv_grade), None),
        PointSpec::GradeTable(GradeTableKind::Grudge) => (grudge_points(scorer), None),
    }
}

/// The attempt a wrestler standing on their current space is entitled to.
/// Space 15 without a finisher falls back to a pin.
pub fn armed_attempt(role: Role, wrestler: &Wrestler) -> Option<ArmedAttempt> {
    match zone(wrestler.position()) {
        Zone::Open => None,
        Zone::Pin  => Some(ArmedAttempt::Pin { attacker: role }),
        Zone::Finisher if wrestler.finisher.is_some() => Some(ArmedAttempt::Finisher { attacker: role }),
        Zone::Finisher => Some(ArmedAttempt::Pin { attacker: role }),
    }
}

/// Move the scorer by already-computed points. Zero points move nothing
/// and arm nothing.
pub fn award(
    role: Role,
    card_id: u32,
    scorer: &mut Wrestler,
    base_points: u8,
    die_roll: Option<u8>,
    hold: Option<HoldReport>,
) -> ScoreReport {
    let extra = hold.as_ref().map_or(0, |h| h.extra_points);
    let points = base_points.saturating_add(extra);
    let (from, to) = scorer.advance(points);
    let armed = if points > 0 { armed_attempt(role, scorer) } else { None };
    debug!(card_id, %role, points, from, to, ?armed, "points applied");

    ScoreReport { scorer: role, card_id, base_points, die_roll, hold, points, from, to, armed }
}

/// Score `card` for `scorer`. Submission cards run the hold against
/// `defender` once the opening points land.
pub fn apply<D: Dice + ?Sized>(
    role: Role,
    card: &Fac,
    scorer: &mut Wrestler,
    defender: &Wrestler,
    max_hold_rounds: u8,
    dice: &mut D,
) -> ScoreReport {
    let (base, die_roll) = card_points(card, scorer, dice);
    let hold = match card.kind {
        FacKind::Submission(_) if base > 0 => Some(submission_hold(defender, max_hold_rounds, dice)),
        _ => None,
    };
    award(role, card.id, scorer, base, die_roll, hold)
}

/// Failed finisher penalty. Returns `(from, to)`.
pub fn move_back_to_nine(wrestler: &mut Wrestler) -> (u8, u8) {
    let from = wrestler.position();
    wrestler.set_position(FAILED_FINISHER_SPACE as i32);
    (from, wrestler.position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_engine::dice::LoadedDice;
    use crate::match_engine::models::{Skill, TvGrade};

    fn grade(tv: TvGrade, grudge: i32) -> Wrestler {
        Wrestler::new("W", tv, grudge)
    }

    #[test]
    fn die_roll_is_surfaced() {
        let mut w = grade(TvGrade::C, 0);
        let card = Fac::new(12, FacKind::Signature, PointSpec::DieRoll { sides: 6 });
        let report = apply(Role::Favored, &card, &mut w, &grade(TvGrade::C, 0), 6, &mut LoadedDice::new([4]));
        assert_eq!(report.die_roll, Some(4));
        assert_eq!(report.points, 4);
        assert_eq!(w.position(), 4);
    }

    #[test]
    fn grade_tables_use_the_scorer() {
        let mut dice = LoadedDice::default();
        let tv = Fac::new(1, FacKind::TvMove, PointSpec::GradeTable(GradeTableKind::Tv));
        let grudge = Fac::new(2, FacKind::Grudge, PointSpec::GradeTable(GradeTableKind::Grudge));
        assert_eq!(card_points(&tv, &grade(TvGrade::Aaa, 0), &mut dice), (5, None));
        assert_eq!(card_points(&tv, &grade(TvGrade::E, 0), &mut dice), (0, None));
        assert_eq!(card_points(&grudge, &grade(TvGrade::E, -3), &mut dice), (2, None));
    }

    #[test]
    fn specialty_card_pays_the_specialty() {
        let w = grade(TvGrade::B, 0).with_specialty("Moonsault", 4);
        let card = Fac::new(3, FacKind::Specialty, PointSpec::Flat(1));
        assert_eq!(card_points(&card, &w, &mut LoadedDice::default()), (4, None));
    }

    #[test]
    fn movement_clamps_and_arms() {
        let mut w = grade(TvGrade::B, 0);
        w.set_position(11);
        let card = Fac::new(4, FacKind::Skill(Skill::Mean), PointSpec::Flat(2));
        let report = apply(Role::Underdog, &card, &mut w, &grade(TvGrade::B, 0), 6, &mut LoadedDice::default());
        assert_eq!(report.to, 13);
        assert_eq!(report.armed, Some(ArmedAttempt::Pin { attacker: Role::Underdog }));

        let report = apply(Role::Underdog, &card.clone(), &mut w, &grade(TvGrade::B, 0), 6, &mut LoadedDice::default());
        assert_eq!(report.to, 15);
        // No finisher on this sheet, so space 15 falls back to a pin.
        assert_eq!(report.armed, Some(ArmedAttempt::Pin { attacker: Role::Underdog }));

        let mut finisher = w.clone().with_finisher("Piledriver", (11, 36));
        finisher.set_position(14);
        assert_eq!(award(Role::Favored, 5, &mut finisher, 9, None, None).to, 15);
        assert_eq!(armed_attempt(Role::Favored, &finisher), Some(ArmedAttempt::Finisher { attacker: Role::Favored }));
    }

    #[test]
    fn zero_points_arm_nothing() {
        let mut w = grade(TvGrade::F, 0);
        w.set_position(13);
        let report = award(Role::Favored, 1, &mut w, 0, None, None);
        assert_eq!(report.to, 13);
        assert_eq!(report.armed, None);
    }

    #[test]
    fn submission_adds_hold_points() {
        let mut w = grade(TvGrade::B, 0);
        let card = Fac::new(40, FacKind::Submission(Skill::Smart), PointSpec::Flat(2));
        // Defender stays in for two rounds then breaks on 1.
        let report = apply(Role::Favored, &card, &mut w, &grade(TvGrade::B, 0), 6, &mut LoadedDice::new([6, 5, 1]));
        assert_eq!(report.base_points, 2);
        assert_eq!(report.hold.as_ref().map(|h| h.extra_points), Some(2));
        assert_eq!(report.points, 4);
    }

    #[test]
    fn failed_finisher_always_lands_on_nine() {
        let mut w = grade(TvGrade::A, 0);
        w.set_position(15);
        assert_eq!(move_back_to_nine(&mut w), (15, 9));
        w.set_position(3);
        assert_eq!(move_back_to_nine(&mut w), (3, 9));
    }
}
