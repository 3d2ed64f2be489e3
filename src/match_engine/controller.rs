use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::match_engine::{
    board::{zone, Zone},
    control::{ControlTracker, FreeShot},
    deck::FacDeck,
    dice::Dice,
    error::{MatchError, Result},
    finish,
    models::{
        Alignment, ArmedAttempt, AttemptReport, CardReport, CardResolution, ContestReport,
        ControlChange, Fac, FacKind, MatchResult, MatchSnapshot, MatchSummary, Outcome,
        ResolutionPath, Role, ScoreReport, StoryRoll, TrackSnapshot, Wrestler,
    },
    resolver::{resolve, ResolveContext},
    scoring, themed,
};

/// Match tuning. Every field has a default, so a partial JSON object works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    /// Extra cards drawn in one cycle after a card nobody could use.
    pub max_redraws_per_cycle: u8,
    /// Draws in a row without a score before the match reports a stall.
    pub stall_limit: u32,
    /// Run armed pin and finisher attempts as part of the card cycle.
    pub auto_attempts: bool,
    pub max_hold_rounds: u8,
    /// Scoreless cycles in a row before the crowd starts booing.
    pub boo_threshold: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            max_redraws_per_cycle: 1,
            stall_limit: 60,
            auto_attempts: true,
            max_hold_rounds: 6,
            boo_threshold: 3,
        }
    }
}

impl MatchConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_max_redraws(mut self, redraws: u8) -> Self {
        self.max_redraws_per_cycle = redraws;
        self
    }

    pub fn with_stall_limit(mut self, draws: u32) -> Self {
        self.stall_limit = draws;
        self
    }

    pub fn with_auto_attempts(mut self, auto: bool) -> Self {
        self.auto_attempts = auto;
        self
    }

    pub fn with_max_hold_rounds(mut self, rounds: u8) -> Self {
        self.max_hold_rounds = rounds;
        self
    }

    pub fn with_boo_threshold(mut self, cards: u32) -> Self {
        self.boo_threshold = cards;
        self
    }

    /// Most cards one cycle can draw: the first card plus either the
    /// follow-up shot or the redraws, whichever allows more.
    pub fn max_draws_per_cycle(&self) -> u32 {
        1 + u32::from(self.max_redraws_per_cycle.max(1))
    }
}

/// Everything that changes while a match runs.
#[derive(Debug, Clone)]
struct MatchState {
    favored: Wrestler,
    underdog: Wrestler,
    current_card: Option<Fac>,
    control: ControlTracker,
    last_scorer: Option<Role>,
    scoreless_cards: u32,
    draws_without_score: u32,
    pending: Option<ArmedAttempt>,
    result: MatchResult,
}

impl MatchState {
    fn new(mut favored: Wrestler, mut underdog: Wrestler) -> Self {
        favored.set_position(0);
        underdog.set_position(0);
        Self {
            favored,
            underdog,
            current_card: None,
            control: ControlTracker::new(),
            last_scorer: None,
            scoreless_cards: 0,
            draws_without_score: 0,
            pending: None,
            result: MatchResult::Ongoing,
        }
    }

    fn wrestler(&self, role: Role) -> &Wrestler {
        match role {
            Role::Favored  => &self.favored,
            Role::Underdog => &self.underdog,
        }
    }

    fn wrestler_mut(&mut self, role: Role) -> &mut Wrestler {
        match role {
            Role::Favored  => &mut self.favored,
            Role::Underdog => &mut self.underdog,
        }
    }

    /// The scorer mutably and the opponent for reading.
    fn corners(&mut self, role: Role) -> (&mut Wrestler, &Wrestler) {
        match role {
            Role::Favored  => (&mut self.favored, &self.underdog),
            Role::Underdog => (&mut self.underdog, &self.favored),
        }
    }

    fn context(&self) -> ResolveContext<'_> {
        ResolveContext {
            favored: &self.favored,
            underdog: &self.underdog,
            in_control: self.control.holder(),
            last_scorer: self.last_scorer,
        }
    }

    fn positions(&self) -> TrackSnapshot {
        TrackSnapshot { favored: self.favored.position(), underdog: self.underdog.position() }
    }

    fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            favored: self.favored.clone(),
            underdog: self.underdog.clone(),
            control: self.control.state(),
            last_scorer: self.last_scorer,
            current_card: self.current_card.clone(),
            scoreless_cards: self.scoreless_cards,
            pending: self.pending,
            result: self.result,
        }
    }
}

/// A card that someone gets to score with, and how the points are sourced.
struct Award {
    role: Role,
    card: Fac,
    /// Set when a Test of Strength already decided the margin.
    contest_points: Option<u8>,
}

fn resolution(card: &Fac, path: ResolutionPath, outcome: Outcome, contest: Option<ContestReport>) -> CardResolution {
    debug!(card_id = card.id, ?path, ?outcome, "card resolved");
    CardResolution {
        card_id: card.id,
        kind: card.kind,
        control: card.control,
        text: card.text.clone(),
        path,
        outcome,
        contest,
    }
}

/// Draw one card and count it toward the stall ceiling.
fn draw_card<D: Dice + ?Sized>(deck: &mut FacDeck, dice: &mut D, draws_without_score: &mut u32) -> Result<Fac> {
    let card = deck.draw(dice)?;
    *draws_without_score += 1;
    Ok(card)
}

fn run_attempt<D: Dice + ?Sized>(state: &mut MatchState, armed: ArmedAttempt, dice: &mut D) -> Result<AttemptReport> {
    match armed {
        ArmedAttempt::Pin { attacker } => {
            let report = finish::attempt_pin(attacker, state.wrestler(attacker.other()), dice);
            if report.pinned {
                state.result = MatchResult::Pin { winner: attacker };
            }
            Ok(AttemptReport::Pin(report))
        }
        ArmedAttempt::Finisher { attacker } => {
            let report = finish::attempt_finisher(attacker, state.wrestler_mut(attacker), dice)?;
            if report.success {
                state.result = MatchResult::Finisher { winner: attacker };
            }
            Ok(AttemptReport::Finisher(report))
        }
    }
}

/// Drives one match, one card cycle per call.
///
/// ```text
/// start_match ─► draw_and_resolve ─► (attempt_pin | attempt_finisher) ─► ... ─► end_match
/// ```
///
/// Randomness comes from `D`. The default `StdRng` is seeded from
/// [`MatchConfig::rng_seed`] when one is given.
pub struct MatchController<D: Dice = StdRng> {
    deck: FacDeck,
    config: MatchConfig,
    dice: D,
    state: Option<MatchState>,
}

impl MatchController<StdRng> {
    pub fn new(deck: FacDeck, config: MatchConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        Self::with_dice(deck, config, rng)
    }
}

impl<D: Dice> MatchController<D> {
    pub fn with_dice(deck: FacDeck, config: MatchConfig, dice: D) -> Self {
        Self { deck, config, dice, state: None }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn deck(&self) -> &FacDeck {
        &self.deck
    }

    pub fn is_running(&self) -> bool {
        self.state.as_ref().is_some_and(|s| !s.result.is_over())
    }

    fn set_up(&self) -> Result<&MatchState> {
        self.state
            .as_ref()
            .ok_or_else(|| MatchError::InvalidState("no match set up, call start_match first".into()))
    }

    fn live(state: &mut Option<MatchState>) -> Result<&mut MatchState> {
        let state = state
            .as_mut()
            .ok_or_else(|| MatchError::InvalidState("no match set up, call start_match first".into()))?;
        if state.result.is_over() {
            return Err(MatchError::InvalidState(format!("match is already over: {:?}", state.result)));
        }
        Ok(state)
    }

    /// Put both wrestlers on space 0, shuffle the whole deck and clear control.
    ///
    /// Fails without touching anything when the deck is empty or
    /// `stall_limit` cannot fit a single card cycle.
    pub fn start_match(&mut self, favored: Wrestler, underdog: Wrestler) -> Result<MatchSnapshot> {
        if self.deck.is_empty() {
            return Err(MatchError::ExhaustedDeck { draws: 0, empty: true });
        }
        if self.config.stall_limit < self.config.max_draws_per_cycle() {
            return Err(MatchError::InvalidState(format!(
                "stall_limit {} is below the {} draws one cycle may need",
                self.config.stall_limit,
                self.config.max_draws_per_cycle()
            )));
        }
        self.deck.reset(&mut self.dice);
        let state = MatchState::new(favored, underdog);
        info!(favored = %state.favored.name, underdog = %state.underdog.name, cards = self.deck.len(), "match started");
        let snapshot = state.snapshot();
        self.state = Some(state);
        Ok(snapshot)
    }

    /// One resolution cycle.
    ///
    /// Draws one card, plus at most one follow-up for a missed free shot or
    /// up to `max_redraws_per_cycle` replacements for cards nobody can use.
    /// At most one wrestler scores. An armed attempt either runs here or is
    /// left pending, depending on [`MatchConfig::auto_attempts`]. A pending
    /// attempt not taken before the next draw is forfeited.
    ///
    /// Control and the last scorer only change when the card is worth more
    /// than 0 points. An eligible wrestler whose card scores nothing, such as
    /// a follow-up TV move at grade D, leaves control where it was.
    ///
    /// When the cycle could run past `stall_limit`, nothing is drawn and
    /// `ExhaustedDeck` comes back with the match untouched.
    pub fn draw_and_resolve(&mut self) -> Result<CardReport> {
        let Self { deck, config, dice, state } = self;
        let state = Self::live(state)?;
        let draws = state.draws_without_score;
        if draws.saturating_add(config.max_draws_per_cycle()) > config.stall_limit {
            warn!(draws, stall_limit = config.stall_limit, "stall ceiling reached");
            return Err(MatchError::ExhaustedDeck { draws, empty: false });
        }

        let before = state.control.state();
        let mut cards = Vec::new();
        let mut award: Option<Award> = None;
        let mut reset_control = false;

        let first = draw_card(deck, dice, &mut state.draws_without_score)?;
        state.pending = None;

        let holder = state.control.holder();
        let shot = state.control.free_shot(&first, &state.context());
        match (shot, holder) {
            (Some(FreeShot::Scored(role)), _) => {
                cards.push(resolution(&first, ResolutionPath::FreeShot(role), Outcome::SingleWinner(role), None));
                award = Some(Award { role, card: first, contest_points: None });
            }
            (Some(FreeShot::PassTo(shooter)), Some(holder)) => {
                cards.push(resolution(&first, ResolutionPath::FreeShot(holder), Outcome::NoOneEligible, None));
                state.current_card = Some(first);
                let follow = draw_card(deck, dice, &mut state.draws_without_score)?;
                let follow_shot = state.control.follow_up(shooter, &follow, &state.context());
                match follow_shot {
                    FreeShot::Scored(role) => {
                        let path = ResolutionPath::FollowUpShot(shooter);
                        cards.push(resolution(&follow, path, Outcome::SingleWinner(role), None));
                        award = Some(Award { role, card: follow, contest_points: None });
                    }
                    _ => {
                        let path = ResolutionPath::FollowUpShot(shooter);
                        cards.push(resolution(&follow, path, Outcome::NoOneEligible, None));
                        state.current_card = Some(follow);
                        reset_control = true;
                    }
                }
            }
            _ => {
                let mut card = first;
                let mut path = ResolutionPath::Ordinary;
                let mut redraws = 0;
                loop {
                    let mut outcome = resolve(&card, &state.context());
                    let mut contest = None;
                    let mut contest_points = None;
                    if card.kind == FacKind::TestOfStrength && outcome != Outcome::NoOneEligible {
                        if let Some(result) = themed::test_of_strength(&state.favored, &state.underdog, dice) {
                            outcome = result.winner.map_or(Outcome::NoOneEligible, |(role, _)| Outcome::SingleWinner(role));
                            contest_points = result.winner.map(|(_, margin)| margin);
                            contest = Some(result.report);
                        }
                    }
                    cards.push(resolution(&card, path, outcome, contest));

                    if let Some(role) = outcome.winner() {
                        award = Some(Award { role, card, contest_points });
                        break;
                    }
                    if redraws >= config.max_redraws_per_cycle {
                        warn!(card_id = card.id, redraws, "no eligible card this cycle");
                        state.current_card = Some(card);
                        break;
                    }
                    redraws += 1;
                    state.current_card = Some(card);
                    card = draw_card(deck, dice, &mut state.draws_without_score)?;
                    path = ResolutionPath::Redraw;
                }
            }
        }

        let mut score: Option<ScoreReport> = None;
        if let Some(Award { role, card, contest_points }) = award {
            let (scorer, defender) = state.corners(role);
            let report = match contest_points {
                Some(points) => scoring::award(role, card.id, scorer, points, None, None),
                None => scoring::apply(role, &card, scorer, defender, config.max_hold_rounds, dice),
            };
            state.current_card = Some(card);
            score = Some(report);
        }

        let scorer = score.as_ref().filter(|s| s.points > 0).map(|s| s.scorer);
        if reset_control {
            state.control.reset();
        } else {
            state.control.on_outcome(scorer);
        }
        state.last_scorer = scorer;
        match scorer {
            Some(_) => {
                state.scoreless_cards = 0;
                state.draws_without_score = 0;
            }
            None => state.scoreless_cards += 1,
        }

        let mut attempt = None;
        if let Some(armed) = score.as_ref().and_then(|s| s.armed) {
            if config.auto_attempts {
                attempt = Some(run_attempt(state, armed, dice)?);
            } else {
                debug!(?armed, "attempt pending");
                state.pending = Some(armed);
            }
        }

        let boo = config.boo_threshold > 0 && state.scoreless_cards >= config.boo_threshold;
        if let Some(winner) = state.result.winner() {
            info!(%winner, result = ?state.result, "match over");
        }

        Ok(CardReport {
            cards,
            score,
            control: ControlChange { before, after: state.control.state() },
            attempt,
            pending: state.pending,
            positions: state.positions(),
            result: state.result,
            scoreless_cards: state.scoreless_cards,
            boo,
        })
    }

    /// Override control by hand. `None` clears it.
    pub fn set_in_control_manually(&mut self, holder: Option<Role>) -> Result<ControlChange> {
        let state = Self::live(&mut self.state)?;
        state.draws_without_score = 0;
        Ok(state.control.set_manual(holder))
    }

    /// Place a token by hand, clamped to the track.
    pub fn set_position(&mut self, role: Role, position: i32) -> Result<TrackSnapshot> {
        let state = Self::live(&mut self.state)?;
        state.wrestler_mut(role).set_position(position);
        state.pending = None;
        state.draws_without_score = 0;
        info!(%role, position = state.wrestler(role).position(), "position set manually");
        Ok(state.positions())
    }

    /// Pin attempt by the wrestler with a pending pin, or else the wrestler
    /// in control if they stand in the pin zone.
    pub fn attempt_pin(&mut self) -> Result<AttemptReport> {
        let Self { dice, state, .. } = self;
        let state = Self::live(state)?;
        let attacker = match state.pending {
            Some(ArmedAttempt::Pin { attacker }) => attacker,
            _ => {
                let holder = state.control.holder().ok_or_else(|| {
                    MatchError::IllegalTransition("no pin armed and no one in control".into())
                })?;
                let armed = scoring::armed_attempt(holder, state.wrestler(holder));
                if !matches!(armed, Some(ArmedAttempt::Pin { .. })) {
                    return Err(MatchError::IllegalTransition(format!(
                        "{} is on space {}, not in the pin zone",
                        state.wrestler(holder).name,
                        state.wrestler(holder).position()
                    )));
                }
                holder
            }
        };
        let report = run_attempt(state, ArmedAttempt::Pin { attacker }, dice)?;
        state.pending = None;
        Ok(report)
    }

    /// Finisher attempt by the wrestler with a pending finisher, or else the
    /// wrestler in control.
    pub fn attempt_finisher(&mut self) -> Result<AttemptReport> {
        let Self { dice, state, .. } = self;
        let state = Self::live(state)?;
        let attacker = match state.pending {
            Some(ArmedAttempt::Finisher { attacker }) => attacker,
            _ => state.control.holder().ok_or_else(|| {
                MatchError::IllegalTransition("no finisher armed and no one in control".into())
            })?,
        };
        let report = run_attempt(state, ArmedAttempt::Finisher { attacker }, dice)?;
        state.pending = None;
        Ok(report)
    }

    /// Gather every card back and reshuffle. Also clears a stall.
    pub fn reshuffle(&mut self) {
        self.deck.reset(&mut self.dice);
        if let Some(state) = self.state.as_mut() {
            state.draws_without_score = 0;
        }
    }

    pub fn snapshot(&self) -> Result<MatchSnapshot> {
        Ok(self.set_up()?.snapshot())
    }

    /// Close the match and hand the wrestler records back for write-back.
    /// Works on a match still in progress, which is then abandoned.
    pub fn end_match(&mut self) -> Result<MatchSummary> {
        let state = self
            .state
            .take()
            .ok_or_else(|| MatchError::InvalidState("no match to end".into()))?;
        info!(result = ?state.result, "match closed");
        Ok(MatchSummary { favored: state.favored, underdog: state.underdog, result: state.result })
    }

    /// Pre-match storyline roll: Highlight Reel O on a d6 of 1-4, R otherwise.
    pub fn pre_match_roll(&mut self) -> StoryRoll {
        let d6 = self.dice.d6();
        let d66 = self.dice.d66();
        StoryRoll { d6, d66, highlight_reel: if d6 <= 4 { 'O' } else { 'R' } }
    }

    /// Post-match storyline roll: Highlight Reel X on a d6 of 1-4, otherwise
    /// T for a Face winner and U for a Heel winner.
    pub fn post_match_roll(&mut self) -> Result<StoryRoll> {
        let state = self.set_up()?;
        let winner = state
            .result
            .winner()
            .ok_or_else(|| MatchError::InvalidState("match has no winner yet".into()))?;
        let alignment = state.wrestler(winner).alignment();

        let d6 = self.dice.d6();
        let d66 = self.dice.d66();
        let highlight_reel = match (d6, alignment) {
            (1..=4, _)            => 'X',
            (_, Alignment::Face)  => 'T',
            (_, Alignment::Heel)  => 'U',
        };
        Ok(StoryRoll { d6, d66, highlight_reel })
    }

    /// Which zone the wrestler in control currently stands in, if anyone is.
    pub fn control_zone(&self) -> Option<(Role, Zone)> {
        let state = self.state.as_ref()?;
        let holder = state.control.holder()?;
        Some((holder, zone(state.wrestler(holder).position())))
    }
}
