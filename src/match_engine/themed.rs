//! Themed sub-games: the submission hold and the Test of Strength.
//!
//! Both are short dice procedures that report every roll they made.

use tracing::debug;

use crate::match_engine::dice::Dice;
use crate::match_engine::models::{Alignment, ContestReport, HoldReport, Role, Wrestler};
use crate::match_engine::resolver::{qualifies_for_test_of_strength, STRENGTH_SKILLS};

/// Most exchanges a Test of Strength can run before the referee steps in.
pub const MAX_EXCHANGES: u8 = 3;

/// Highest d6 on which a defender escapes a hold. Strong defenders escape
/// more easily.
pub fn break_threshold(defender: &Wrestler) -> u8 {
    if defender.has_any(&STRENGTH_SKILLS) { 4 } else { 3 }
}

/// Run the hold after the initial submission points are scored. Each round
/// the defender rolls; a roll at or under the threshold breaks the hold,
/// anything higher gives the attacker one more point.
pub fn submission_hold<D: Dice + ?Sized>(defender: &Wrestler, max_rounds: u8, dice: &mut D) -> HoldReport {
    let threshold = break_threshold(defender);
    let mut report = HoldReport {
        break_on_or_below: threshold,
        rolls: Vec::new(),
        extra_points: 0,
        capped: false,
    };

    for _ in 0..max_rounds {
        let roll = dice.d6();
        report.rolls.push(roll);
        if roll <= threshold {
            debug!(roll, threshold, defender = %defender.name, "hold broken");
            return report;
        }
        report.extra_points += 1;
        debug!(roll, threshold, extra = report.extra_points, "hold maintained");
    }

    report.capped = true;
    report
}

/// Which role plays the Face in a contest. Alignment comes from the skill
/// sheets; when both share one, the Favored wrestler is the Face.
pub fn face_role(favored: &Wrestler, underdog: &Wrestler) -> Role {
    match (favored.alignment(), underdog.alignment()) {
        (Alignment::Heel, Alignment::Face) => Role::Underdog,
        _ => Role::Favored,
    }
}

/// Result of a Test of Strength: the log, and who came out ahead by how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    pub report: ContestReport,
    pub winner: Option<(Role, u8)>,
}

/// Run a Test of Strength. Returns `None` unless both wrestlers are Strong
/// or Powerful.
///
/// Exchange die: 1-2 the Face wins it, 3-4 the referee breaks it up, 5-6
/// the Heel wins it. After each won exchange the referee rolls a d6 and
/// breaks it up on 1-4. The side that won more exchanges scores the margin.
pub fn test_of_strength<D: Dice + ?Sized>(
    favored: &Wrestler,
    underdog: &Wrestler,
    dice: &mut D,
) -> Option<Contest> {
    if !(qualifies_for_test_of_strength(favored) && qualifies_for_test_of_strength(underdog)) {
        return None;
    }

    let face = face_role(favored, underdog);
    let mut report = ContestReport {
        face,
        rolls: Vec::new(),
        break_rolls: Vec::new(),
        face_exchanges: 0,
        heel_exchanges: 0,
    };

    for exchange in 1..=MAX_EXCHANGES {
        let roll = dice.d6();
        report.rolls.push(roll);
        match roll {
            1..=2 => report.face_exchanges += 1,
            3..=4 => break,
            _     => report.heel_exchanges += 1,
        }
        if exchange == MAX_EXCHANGES {
            break;
        }
        let ref_roll = dice.d6();
        report.break_rolls.push(ref_roll);
        if ref_roll <= 4 {
            break;
        }
    }

    let winner = match report.face_exchanges.cmp(&report.heel_exchanges) {
        std::cmp::Ordering::Greater => Some((face, report.face_exchanges - report.heel_exchanges)),
        std::cmp::Ordering::Less    => Some((face.other(), report.heel_exchanges - report.face_exchanges)),
        std::cmp::Ordering::Equal   => None,
    };
    debug!(face_role = ?face, face = report.face_exchanges, heel = report.heel_exchanges, "test of strength over");

    Some(Contest { report, winner })
}
