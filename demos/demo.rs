//! One seeded match from roster JSON to the final bell.
//!
//! Run with: `cargo run --example demo`
//!
//! Set `RUST_LOG=mat_engine=debug` to see every draw and resolution step
//! alongside the printed play-by-play.
//!
//! ## Key concepts demonstrated
//!
//! - `Roster::from_json` and `load_deck` normalise loose JSON records.
//! - `MatchConfig::with_seed` makes the whole match reproducible.
//! - `board_view::describe` turns each `CardReport` into play-by-play lines.
//! - `board_view::to_board_view` is the JSON a board renderer would draw.
//! - `Roster::record` writes the final positions back after `end_match`.

use mat_engine::board_view::{describe, to_board_view};
use mat_engine::{load_deck, MatchConfig, MatchController, MatchError, Roster};
use tracing_subscriber::EnvFilter;

const ROSTER: &str = r#"{
    "wrestlers": [
        {
            "name": "Iron Duke", "tv_grade": "AA", "grudge_grade": -4,
            "skills": {"Strong": "star", "Mean": "square", "Smart": "circle", "Cheat": "star"},
            "specialty": {"name": "Duke Drop", "points": 3},
            "finisher": {"name": "Iron Clutch", "range": [11, 36]}
        },
        {
            "name": "Kid Comet", "tv_grade": "C", "grudge_grade": 2,
            "skills": {"Agile": "star", "Quick": "circle", "Powerful": "square", "Favorite": "star"},
            "finisher": {"name": "Comet Crash", "range": "11-23"}
        }
    ]
}"#;

const DECK: &str = r#"{
    "cards": [
        {"id": 1,  "control": false, "type": "strong",  "points": 3},
        {"id": 2,  "control": true, "type": "agile",   "points": 2},
        {"id": 3,  "control": false, "type": "mean",    "points": 2},
        {"id": 4,  "control": false, "type": "quick",   "points": "d6"},
        {"id": 5,  "control": true, "type": "smart",   "points": 2},
        {"id": 6,  "control": false, "type": "powerful","points": 3},
        {"id": 7,  "control": false, "type": "cheat",   "points": 2, "text": "Thumb to the eye!"},
        {"id": 8,  "control": false, "type": "strong",  "points": 2, "text": "Submission! Cobra clutch"},
        {"id": 9,  "control": false, "type": "tv",      "points": "tv"},
        {"id": 10, "control": true, "type": "grudge",  "points": "grudge"},
        {"id": 11, "control": false, "type": "specialty", "points": 0},
        {"id": 12, "control": false, "type": "signature"},
        {"id": 13, "control": false, "type": "trailing", "points": 2},
        {"id": 14, "control": true, "type": "trailing", "points": 3},
        {"id": 15, "control": false, "type": "test of strength"},
        {"id": 16, "control": false, "type": "helped", "text": "A second comes off the apron"},
        {"id": 17, "control": false, "type": "heavy",   "points": 4},
        {"id": 18, "control": false, "type": "agile",   "points": 1}
    ]
}"#;

fn banner(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  {title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

fn main() -> Result<(), MatchError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut roster = Roster::from_json(ROSTER)?;
    let deck = load_deck(DECK)?;
    let favored = roster
        .get("Iron Duke")
        .cloned()
        .ok_or_else(|| MatchError::DataIntegrity("Iron Duke missing from roster".into()))?;
    let underdog = roster
        .get("Kid Comet")
        .cloned()
        .ok_or_else(|| MatchError::DataIntegrity("Kid Comet missing from roster".into()))?;

    let mut ctl = MatchController::new(deck, MatchConfig::default().with_seed(2024));

    banner(&format!("{} ({}) vs {} ({})", favored.name, favored.tv_grade, underdog.name, underdog.tv_grade));
    let pre = ctl.pre_match_roll();
    println!("  Pre-match roll: d6 {} d66 {}, Highlight Reel {}", pre.d6, pre.d66, pre.highlight_reel);
    ctl.start_match(favored, underdog)?;

    for cycle in 1..=400 {
        let report = match ctl.draw_and_resolve() {
            Ok(report) => report,
            Err(err) if err.is_recoverable() => {
                println!("  [{cycle:>3}] {err}, reshuffling");
                ctl.reshuffle();
                continue;
            }
            Err(err) => return Err(err),
        };
        let snapshot = ctl.snapshot()?;
        for line in describe(&report, &snapshot) {
            println!("  [{cycle:>3}] {line}");
        }
        if report.result.is_over() {
            break;
        }
    }

    banner("Final board");
    let snapshot = ctl.snapshot()?;
    let view = to_board_view(&snapshot);
    println!("{}", serde_json::to_string_pretty(&view["favored"])?);
    println!("{}", serde_json::to_string_pretty(&view["underdog"])?);

    if snapshot.result.is_over() {
        let post = ctl.post_match_roll()?;
        println!("  Post-match roll: d6 {} d66 {}, Highlight Reel {}", post.d6, post.d66, post.highlight_reel);
    }

    let summary = ctl.end_match()?;
    roster.record(&summary)?;
    banner("Roster after the match");
    println!("{}", roster.to_json()?);
    Ok(())
}
