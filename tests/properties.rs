//! Property tests for the resolution laws that must hold for any roster,
//! card and roll.

use proptest::prelude::*;

use mat_engine::match_engine::{board, finish, resolver::eligible_alone};
use mat_engine::{
    resolve, Fac, FacDeck, FacKind, LoadedDice, MatchConfig, MatchController, Outcome, PointSpec,
    ResolveContext, Role, Skill, SkillSheet, SkillSymbol, TieReason, TvGrade, Wrestler,
};

// ── strategies ───────────────────────────────────────────────────────────────

fn grade() -> impl Strategy<Value = TvGrade> {
    prop::sample::select(TvGrade::ALL.to_vec())
}

fn symbol() -> impl Strategy<Value = SkillSymbol> {
    prop::sample::select(vec![SkillSymbol::Star, SkillSymbol::Square, SkillSymbol::Circle])
}

fn wrestler(name: &'static str) -> impl Strategy<Value = Wrestler> {
    (
        grade(),
        -6i32..=6,
        prop::collection::vec((prop::sample::select(Skill::ALL.to_vec()), symbol()), 0..6),
        0i32..=15,
        any::<bool>(),
    )
        .prop_map(move |(tv, grudge, skills, position, specialty)| {
            let mut w = Wrestler::new(name, tv, grudge)
                .with_skills(skills.into_iter().collect::<SkillSheet>())
                .with_finisher("Finisher", (11, 33));
            if specialty {
                w = w.with_specialty("Special", 3);
            }
            w.set_position(position);
            w
        })
}

fn card() -> impl Strategy<Value = Fac> {
    let kind = prop_oneof![
        prop::sample::select(Skill::ALL.to_vec()).prop_map(FacKind::Skill),
        prop::sample::select(Skill::ALL.to_vec()).prop_map(FacKind::Submission),
        Just(FacKind::TvMove),
        Just(FacKind::Grudge),
        Just(FacKind::Specialty),
        Just(FacKind::Signature),
        Just(FacKind::Trailing),
        Just(FacKind::TestOfStrength),
        Just(FacKind::Helped),
        Just(FacKind::WildCard),
        Just(FacKind::HighlightReel),
        Just(FacKind::RefBump),
        Just(FacKind::TitleHolder),
    ];
    (1u32..500, kind, 0u8..=6, any::<bool>(), any::<bool>()).prop_map(|(id, kind, points, control, trailing)| {
        let mut card = Fac::new(id, kind, PointSpec::Flat(points));
        if control {
            card = card.control();
        }
        if trailing {
            card = card.tagged_trailing();
        }
        card
    })
}

fn role() -> impl Strategy<Value = Option<Role>> {
    prop_oneof![Just(None), Just(Some(Role::Favored)), Just(Some(Role::Underdog))]
}

fn d66() -> impl Strategy<Value = u8> {
    (1u8..=6, 1u8..=6).prop_map(|(tens, units)| tens * 10 + units)
}

// ── resolution ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn outcome_agrees_with_eligibility_and_tiebreak(
        favored in wrestler("Fav"),
        underdog in wrestler("Dog"),
        card in card(),
        in_control in role(),
        last_scorer in role(),
    ) {
        let ctx = ResolveContext { favored: &favored, underdog: &underdog, in_control, last_scorer };
        let outcome = resolve(&card, &ctx);

        if card.kind.is_narrative() {
            prop_assert_eq!(outcome, Outcome::NoOneEligible);
        }
        match outcome {
            Outcome::NoOneEligible => {}
            Outcome::SingleWinner(r) => {
                prop_assert!(eligible_alone(&card, r, &ctx), "{r:?} won {card} without being eligible");
            }
            Outcome::TieResolved(r, TieReason::Trailing) => {
                prop_assert!(ctx.wrestler(r).position() < ctx.wrestler(r.other()).position());
            }
            Outcome::TieResolved(r, reason) => {
                prop_assert_eq!(r, Role::Underdog);
                prop_assert_eq!(favored.position(), underdog.position());
                prop_assert_eq!(reason == TieReason::TrailingCard, card.is_trailing());
            }
        }
    }

    #[test]
    fn positions_stay_on_the_track(start in any::<i32>(), points in any::<u8>()) {
        let mut w = Wrestler::new("W", TvGrade::B, 0);
        w.set_position(start);
        prop_assert!(w.position() <= board::TRACK_END);
        let (from, to) = w.advance(points);
        prop_assert!(to >= from && to <= board::TRACK_END);
    }

    // ── finish ───────────────────────────────────────────────────────────────

    #[test]
    fn missed_finisher_always_lands_on_nine(lo in d66(), span in 0u8..20, roll in d66()) {
        let hi = lo.saturating_add(span).min(66);
        let mut attacker = Wrestler::new("A", TvGrade::B, 0).with_finisher("Drop", (lo, hi));
        attacker.set_position(15);

        let report = finish::attempt_finisher(Role::Favored, &mut attacker, &mut LoadedDice::d66s(&[roll])).unwrap();
        prop_assert_eq!(report.roll, roll);
        prop_assert_eq!(report.success, (lo..=hi).contains(&roll));
        if !report.success {
            prop_assert_eq!(attacker.position(), 9);
        }
    }

    #[test]
    fn grade_f_only_kicks_out_on_eleven(roll in d66()) {
        prop_assert_eq!(board::kicks_out(TvGrade::F, roll), roll == 11);
    }

    #[test]
    fn better_grades_kick_out_on_more_rolls(roll in d66()) {
        // A roll that saves a grade saves every better grade too.
        for pair in TvGrade::ALL.windows(2) {
            if board::kicks_out(pair[1], roll) {
                prop_assert!(board::kicks_out(pair[0], roll), "{} saved on {roll} but {} did not", pair[1], pair[0]);
            }
        }
    }

    // ── controller ───────────────────────────────────────────────────────────

    #[test]
    fn every_cycle_scores_at_most_once(
        seed in any::<u64>(),
        favored in wrestler("Fav"),
        underdog in wrestler("Dog"),
        cards in prop::collection::vec(card(), 1..30),
    ) {
        let mut ctl = MatchController::new(FacDeck::new(cards), MatchConfig::default().with_seed(seed));
        ctl.start_match(favored, underdog).unwrap();
        for _ in 0..40 {
            let Ok(report) = ctl.draw_and_resolve() else { break };
            prop_assert!(report.cards.len() <= 2);
            let winners = report.cards.iter().filter(|c| c.outcome.winner().is_some()).count();
            prop_assert!(winners <= 1, "{winners} cards won in one cycle");
            prop_assert!(report.positions.favored <= 15 && report.positions.underdog <= 15);
            if report.result.is_over() {
                break;
            }
        }
    }

    // ── records ──────────────────────────────────────────────────────────────

    #[test]
    fn wrestler_survives_json(w in wrestler("Round Trip")) {
        let json = serde_json::to_string(&w).unwrap();
        let back: Wrestler = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, w);
    }
}
