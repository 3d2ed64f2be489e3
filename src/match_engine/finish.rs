//! Pin and finisher attempts, the two ways a match ends.

use tracing::{debug, info};

use crate::match_engine::board::{kickout_range, FINISHER_SPACE};
use crate::match_engine::dice::Dice;
use crate::match_engine::error::{MatchError, Result};
use crate::match_engine::models::{FinisherReport, PinReport, Role, Wrestler};
use crate::match_engine::scoring::move_back_to_nine;

/// Referee's count. Three misses and the defender is pinned.
pub const PIN_COUNT: u8 = 3;

/// The defender rolls d66 up to three times, kicking out on any roll inside
/// the range for their TV grade.
pub fn attempt_pin<D: Dice + ?Sized>(attacker: Role, defender: &Wrestler, dice: &mut D) -> PinReport {
    let (lo, hi) = kickout_range(defender.tv_grade);
    let mut report = PinReport {
        attacker,
        defender: attacker.other(),
        kickout_range: (lo, hi),
        rolls: Vec::with_capacity(PIN_COUNT as usize),
        kicked_out_at: None,
        pinned: false,
    };

    for count in 1..=PIN_COUNT {
        let roll = dice.d66();
        report.rolls.push(roll);
        debug!(count, roll, lo, hi, defender = %defender.name, "pin count");
        if (lo..=hi).contains(&roll) {
            report.kicked_out_at = Some(count);
            info!(count, defender = %defender.name, "kick out");
            return report;
        }
    }

    report.pinned = true;
    info!(%attacker, "pinfall");
    report
}

/// One d66 roll against the attacker's own finisher range. A miss sends the
/// attacker back to space 9.
///
/// Fails with `IllegalTransition`, leaving the wrestler untouched, when the
/// attacker is short of space 15 or has no finisher.
pub fn attempt_finisher<D: Dice + ?Sized>(
    role: Role,
    attacker: &mut Wrestler,
    dice: &mut D,
) -> Result<FinisherReport> {
    if attacker.position() < FINISHER_SPACE {
        return Err(MatchError::IllegalTransition(format!(
            "{} is on space {}, finisher needs space {FINISHER_SPACE}",
            attacker.name,
            attacker.position()
        )));
    }
    let finisher = attacker.finisher.clone().ok_or_else(|| {
        MatchError::IllegalTransition(format!("{} has no finisher", attacker.name))
    })?;

    let roll = dice.d66();
    let success = finisher.hits(roll);
    let from = attacker.position();
    let to = if success { from } else { move_back_to_nine(attacker).1 };
    info!(%role, finisher = %finisher.name, roll, success, "finisher attempt");

    Ok(FinisherReport {
        attacker: role,
        finisher: finisher.name,
        range: finisher.range,
        roll,
        success,
        from,
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_engine::dice::LoadedDice;
    use crate::match_engine::models::TvGrade;

    #[test]
    fn grade_f_only_kicks_out_on_eleven() {
        let defender = Wrestler::new("Jobber", TvGrade::F, 0);

        let report = attempt_pin(Role::Favored, &defender, &mut LoadedDice::d66s(&[12, 21, 11]));
        assert_eq!(report.kicked_out_at, Some(3));
        assert!(!report.pinned);

        let report = attempt_pin(Role::Favored, &defender, &mut LoadedDice::d66s(&[12, 13, 16]));
        assert!(report.pinned);
        assert_eq!(report.rolls, vec![12, 13, 16]);
    }

    #[test]
    fn grade_aaa_kicks_out_across_its_range() {
        let defender = Wrestler::new("Champ", TvGrade::Aaa, 0);
        for roll in [11, 26, 43] {
            let report = attempt_pin(Role::Underdog, &defender, &mut LoadedDice::d66s(&[roll]));
            assert_eq!(report.kicked_out_at, Some(1), "roll {roll}");
        }
        let report = attempt_pin(Role::Underdog, &defender, &mut LoadedDice::d66s(&[44, 51, 66]));
        assert!(report.pinned);
        assert_eq!(report.defender, Role::Favored);
    }

    #[test]
    fn finisher_hit_ends_where_it_started() {
        let mut w = Wrestler::new("Ace", TvGrade::A, 0).with_finisher("Lariat", (11, 33));
        w.set_position(15);
        let report = attempt_finisher(Role::Favored, &mut w, &mut LoadedDice::d66s(&[24])).unwrap();
        assert!(report.success);
        assert_eq!(w.position(), 15);
    }

    #[test]
    fn finisher_miss_returns_to_nine() {
        let mut w = Wrestler::new("Ace", TvGrade::A, 0).with_finisher("Lariat", (11, 33));
        w.set_position(15);
        let report = attempt_finisher(Role::Favored, &mut w, &mut LoadedDice::d66s(&[55])).unwrap();
        assert!(!report.success);
        assert_eq!((report.from, report.to), (15, 9));
        assert_eq!(w.position(), 9);
    }

    #[test]
    fn finisher_preconditions_leave_state_alone() {
        let mut short = Wrestler::new("Ace", TvGrade::A, 0).with_finisher("Lariat", (11, 33));
        short.set_position(14);
        let err = attempt_finisher(Role::Favored, &mut short, &mut LoadedDice::default()).unwrap_err();
        assert!(matches!(err, MatchError::IllegalTransition(_)));
        assert_eq!(short.position(), 14);

        let mut bare = Wrestler::new("Rookie", TvGrade::D, 0);
        bare.set_position(15);
        let err = attempt_finisher(Role::Favored, &mut bare, &mut LoadedDice::default()).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(bare.position(), 15);
    }
}
