use serde_json::{json, Value};

use crate::match_engine::board::{space_kind, zone, Zone, TRACK_END};
use crate::match_engine::models::{
    ArmedAttempt, AttemptReport, CardReport, ControlState, MatchResult, MatchSnapshot, Outcome,
    ResolutionPath, Role, TieReason, Wrestler,
};

fn role_key(role: Role) -> &'static str {
    match role {
        Role::Favored  => "favored",
        Role::Underdog => "underdog",
    }
}

fn zone_str(z: Zone) -> &'static str {
    match z {
        Zone::Open     => "open",
        Zone::Pin      => "pin",
        Zone::Finisher => "finisher",
    }
}

/// One track space with whoever stands on it.
fn space(pos: u8, snapshot: &MatchSnapshot) -> Value {
    let occupants: Vec<&str> = [Role::Favored, Role::Underdog]
        .into_iter()
        .filter(|r| snapshot.wrestler(*r).position() == pos)
        .map(role_key)
        .collect();
    json!({
        "index": pos,
        "kind": space_kind(pos).to_string(),
        "zone": zone_str(zone(pos)),
        "occupants": occupants
    })
}

fn corner(w: &Wrestler, in_control: bool) -> Value {
    json!({
        "name": w.name,
        "tv_grade": w.tv_grade.letters(),
        "grudge_grade": w.grudge_grade,
        "alignment": format!("{:?}", w.alignment()),
        "position": w.position(),
        "zone": zone_str(zone(w.position())),
        "in_control": in_control,
        "specialty": w.specialty.as_ref().map(|s| s.name.clone()),
        "finisher": w.finisher.as_ref().map(|f| json!({ "name": f.name, "range": [f.range.0, f.range.1] }))
    })
}

fn result_value(result: MatchResult) -> Value {
    match result {
        MatchResult::Ongoing             => json!({ "state": "ongoing" }),
        MatchResult::Pin { winner }      => json!({ "state": "pin", "winner": role_key(winner) }),
        MatchResult::Finisher { winner } => json!({ "state": "finisher", "winner": role_key(winner) }),
    }
}

/// Map a [`MatchSnapshot`] to the board JSON a renderer draws from:
/// all 16 spaces, both corners, control, the current card and the result.
pub fn to_board_view(snapshot: &MatchSnapshot) -> Value {
    let holder = snapshot.control.holder();
    let spaces: Vec<Value> = (0..=TRACK_END).map(|pos| space(pos, snapshot)).collect();

    let pending = snapshot.pending.map(|armed| match armed {
        ArmedAttempt::Pin { attacker }      => json!({ "attempt": "pin", "attacker": role_key(attacker) }),
        ArmedAttempt::Finisher { attacker } => json!({ "attempt": "finisher", "attacker": role_key(attacker) }),
    });

    json!({
        "track": spaces,
        "favored": corner(&snapshot.favored, holder == Some(Role::Favored)),
        "underdog": corner(&snapshot.underdog, holder == Some(Role::Underdog)),
        "control": holder.map(role_key),
        "last_scorer": snapshot.last_scorer.map(role_key),
        "current_card": snapshot.current_card.as_ref().map(|c| json!({
            "id": c.id,
            "kind": c.kind.to_string(),
            "control": c.control,
            "text": c.text
        })),
        "scoreless_cards": snapshot.scoreless_cards,
        "pending": pending,
        "result": result_value(snapshot.result)
    })
}

fn outcome_line(outcome: Outcome, name: impl Fn(Role) -> String) -> String {
    match outcome {
        Outcome::NoOneEligible => "no one can use it".to_string(),
        Outcome::SingleWinner(r) => format!("{} can use it", name(r)),
        Outcome::TieResolved(r, TieReason::Trailing) => format!("both can use it, {} is trailing", name(r)),
        Outcome::TieResolved(r, TieReason::EqualUnderdog) => format!("both can use it, level so {} as underdog", name(r)),
        Outcome::TieResolved(r, TieReason::TrailingCard) => format!("trailing card with both level, {} takes it", name(r)),
    }
}

/// Render a [`CardReport`] as log lines. `snapshot` supplies the names.
pub fn describe(report: &CardReport, snapshot: &MatchSnapshot) -> Vec<String> {
    let name = |r: Role| snapshot.wrestler(r).name.clone();
    let mut lines = Vec::new();

    for card in &report.cards {
        let prefix = match card.path {
            ResolutionPath::Ordinary          => String::new(),
            ResolutionPath::Redraw            => "Redraw: ".to_string(),
            ResolutionPath::FreeShot(r)       => format!("Free shot for {}: ", name(r)),
            ResolutionPath::FollowUpShot(r)   => format!("Follow-up shot for {}: ", name(r)),
        };
        let flag = if card.control { "Control" } else { "No Control" };
        lines.push(format!("{prefix}Card {} {} ({flag}), {}", card.card_id, card.kind, outcome_line(card.outcome, name)));
        if let Some(text) = &card.text {
            lines.push(format!("  \"{text}\""));
        }
        if let Some(contest) = &card.contest {
            lines.push(format!(
                "  Test of Strength rolls {:?}: {} (Face) {} - {} {}",
                contest.rolls,
                name(contest.face),
                contest.face_exchanges,
                contest.heel_exchanges,
                name(contest.face.other()),
            ));
        }
    }

    if let Some(score) = &report.score {
        let mut line = format!("{} scores {}", name(score.scorer), score.points);
        if let Some(roll) = score.die_roll {
            line.push_str(&format!(" (rolled {roll})"));
        }
        if let Some(hold) = &score.hold {
            line.push_str(&format!(
                " with {} from the hold (escape on {} or less, rolls {:?})",
                hold.extra_points, hold.break_on_or_below, hold.rolls
            ));
        }
        line.push_str(&format!(", {} -> {}", score.from, score.to));
        lines.push(line);
    }

    if report.control.changed() {
        lines.push(match report.control.after {
            ControlState::ControlledBy(r) => format!("{} is in control", name(r)),
            ControlState::NoControl       => "No one is in control".to_string(),
        });
    }

    match &report.attempt {
        Some(AttemptReport::Pin(pin)) => {
            let verdict = match pin.kicked_out_at {
                Some(count) => format!("kick out at {count}"),
                None        => "1, 2, 3!".to_string(),
            };
            lines.push(format!(
                "{} goes for the pin, {} needs {}-{}: rolls {:?}, {verdict}",
                name(pin.attacker), name(pin.defender), pin.kickout_range.0, pin.kickout_range.1, pin.rolls
            ));
        }
        Some(AttemptReport::Finisher(fin)) => {
            let verdict = if fin.success { "it connects".to_string() } else { format!("missed, back to {}", fin.to) };
            lines.push(format!(
                "{} hits the {} ({}-{}): rolled {}, {verdict}",
                name(fin.attacker), fin.finisher, fin.range.0, fin.range.1, fin.roll
            ));
        }
        None => {}
    }

    if let Some(armed) = report.pending {
        lines.push(format!("{} may attempt a {}", name(armed.attacker()), match armed {
            ArmedAttempt::Pin { .. }      => "pin",
            ArmedAttempt::Finisher { .. } => "finisher",
        }));
    }
    if report.boo {
        lines.push(format!("The crowd boos after {} scoreless cards", report.scoreless_cards));
    }
    if let Some(winner) = report.result.winner() {
        lines.push(format!("{} wins the match!", name(winner)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_engine::models::{
        CardResolution, ControlChange, FacKind, ScoreReport, Skill, TrackSnapshot, TvGrade,
    };

    fn snapshot() -> MatchSnapshot {
        let mut fav = Wrestler::new("Iron Duke", TvGrade::Aa, 3).with_finisher("Iron Clutch", (11, 36));
        fav.set_position(12);
        MatchSnapshot {
            favored: fav,
            underdog: Wrestler::new("Kid Comet", TvGrade::C, 1),
            control: ControlState::ControlledBy(Role::Favored),
            last_scorer: Some(Role::Favored),
            current_card: None,
            scoreless_cards: 0,
            pending: Some(ArmedAttempt::Pin { attacker: Role::Favored }),
            result: MatchResult::Ongoing,
        }
    }

    #[test]
    fn board_has_every_space_and_occupants() {
        let view = to_board_view(&snapshot());
        let track = view["track"].as_array().unwrap();
        assert_eq!(track.len(), 16);
        assert_eq!(track[0]["occupants"], json!(["underdog"]));
        assert_eq!(track[12]["occupants"], json!(["favored"]));
        assert_eq!(track[12]["zone"], "pin");
        assert_eq!(track[15]["kind"], "finisher");
        assert_eq!(view["control"], "favored");
        assert_eq!(view["favored"]["in_control"], true);
        assert_eq!(view["pending"]["attempt"], "pin");
        assert_eq!(view["result"]["state"], "ongoing");
    }

    #[test]
    fn describe_shows_die_roll_and_control() {
        let report = CardReport {
            cards: vec![CardResolution {
                card_id: 14,
                kind: FacKind::Skill(Skill::Strong),
                control: false,
                text: None,
                path: ResolutionPath::Ordinary,
                outcome: Outcome::TieResolved(Role::Favored, TieReason::Trailing),
                contest: None,
            }],
            score: Some(ScoreReport {
                scorer: Role::Favored,
                card_id: 14,
                base_points: 4,
                die_roll: Some(4),
                hold: None,
                points: 4,
                from: 8,
                to: 12,
                armed: Some(ArmedAttempt::Pin { attacker: Role::Favored }),
            }),
            control: ControlChange { before: ControlState::NoControl, after: ControlState::ControlledBy(Role::Favored) },
            attempt: None,
            pending: Some(ArmedAttempt::Pin { attacker: Role::Favored }),
            positions: TrackSnapshot { favored: 12, underdog: 10 },
            result: MatchResult::Ongoing,
            scoreless_cards: 0,
            boo: false,
        };
        let lines = describe(&report, &snapshot());
        assert!(lines[0].contains("Iron Duke is trailing"), "{lines:?}");
        assert!(lines.iter().any(|l| l.contains("rolled 4") && l.contains("8 -> 12")), "{lines:?}");
        assert!(lines.iter().any(|l| l == "Iron Duke is in control"), "{lines:?}");
        assert!(lines.iter().any(|l| l.contains("may attempt a pin")), "{lines:?}");
    }
}
