use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::match_engine::board::TRACK_END;

// ---------------------------------------------------------------------------
// Grades
// ---------------------------------------------------------------------------

/// TV Grade, best first. `Ord` follows declaration order, so a *smaller*
/// grade is a *better* grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TvGrade {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl TvGrade {
    pub const ALL: [TvGrade; 8] = [
        TvGrade::Aaa, TvGrade::Aa, TvGrade::A, TvGrade::B,
        TvGrade::C, TvGrade::D, TvGrade::E, TvGrade::F,
    ];

    pub fn letters(self) -> &'static str {
        match self {
            TvGrade::Aaa => "AAA",
            TvGrade::Aa  => "AA",
            TvGrade::A   => "A",
            TvGrade::B   => "B",
            TvGrade::C   => "C",
            TvGrade::D   => "D",
            TvGrade::E   => "E",
            TvGrade::F   => "F",
        }
    }

    pub fn is_better_than(self, other: TvGrade) -> bool {
        self < other
    }
}

impl fmt::Display for TvGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters())
    }
}

impl FromStr for TvGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        TvGrade::ALL
            .into_iter()
            .find(|g| g.letters() == wanted)
            .ok_or_else(|| format!("unknown TV grade '{s}'"))
    }
}

/// Grudge tier derived from the magnitude of a Grudge Grade.
/// Negative grades count the same as positive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrudgeTier {
    Gold,
    Silver,
    Bronze,
}

impl GrudgeTier {
    pub fn from_grade(grudge_grade: i32) -> Option<GrudgeTier> {
        match grudge_grade.unsigned_abs() {
            0      => None,
            1..=2  => Some(GrudgeTier::Bronze),
            3..=4  => Some(GrudgeTier::Silver),
            _      => Some(GrudgeTier::Gold),
        }
    }

    pub fn points(self) -> u8 {
        match self {
            GrudgeTier::Gold   => 3,
            GrudgeTier::Silver => 2,
            GrudgeTier::Bronze => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Agile,
    Cheat,
    Favorite,
    Heavy,
    Helped,
    Mean,
    Object,
    Powerful,
    Quick,
    Smart,
    Specialty,
    Strong,
}

impl Skill {
    pub const ALL: [Skill; 12] = [
        Skill::Agile, Skill::Cheat, Skill::Favorite, Skill::Heavy,
        Skill::Helped, Skill::Mean, Skill::Object, Skill::Powerful,
        Skill::Quick, Skill::Smart, Skill::Specialty, Skill::Strong,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Skill::Agile     => "agile",
            Skill::Cheat     => "cheat",
            Skill::Favorite  => "favorite",
            Skill::Heavy     => "heavy",
            Skill::Helped    => "helped",
            Skill::Mean      => "mean",
            Skill::Object    => "object",
            Skill::Powerful  => "powerful",
            Skill::Quick     => "quick",
            Skill::Smart     => "smart",
            Skill::Specialty => "specialty",
            Skill::Strong    => "strong",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Skill::ALL
            .into_iter()
            .find(|skill| skill.name() == wanted)
            .ok_or_else(|| format!("unknown skill '{s}'"))
    }
}

/// Where on the track a skill may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillSymbol {
    /// Usable on any space.
    Star,
    /// Usable on square spaces only.
    Square,
    /// Usable on circle spaces only.
    Circle,
}

impl FromStr for SkillSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "star"   => Ok(SkillSymbol::Star),
            "square" => Ok(SkillSymbol::Square),
            "circle" => Ok(SkillSymbol::Circle),
            other    => Err(format!("unknown skill symbol '{other}'")),
        }
    }
}

/// A wrestler's skill-to-symbol mapping. A skill missing from the sheet has
/// the "none" symbol and can never be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSheet(BTreeMap<Skill, SkillSymbol>);

impl SkillSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, skill: Skill, symbol: SkillSymbol) -> Self {
        self.0.insert(skill, symbol);
        self
    }

    pub fn symbol(&self, skill: Skill) -> Option<SkillSymbol> {
        self.0.get(&skill).copied()
    }

    pub fn has(&self, skill: Skill) -> bool {
        self.0.contains_key(&skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, SkillSymbol)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(Skill, SkillSymbol)> for SkillSheet {
    fn from_iter<I: IntoIterator<Item = (Skill, SkillSymbol)>>(iter: I) -> Self {
        SkillSheet(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Wrestlers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub name: String,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finisher {
    pub name: String,
    /// Inclusive d66 success range.
    pub range: (u8, u8),
}

impl Finisher {
    pub fn hits(&self, roll: u8) -> bool {
        (self.range.0..=self.range.1).contains(&roll)
    }
}

/// In-fiction alignment, derived from the skill sheet rather than assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Face,
    Heel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wrestler {
    pub name: String,
    pub tv_grade: TvGrade,
    pub grudge_grade: i32,
    #[serde(default)]
    pub skills: SkillSheet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finisher: Option<Finisher>,
    #[serde(default, deserialize_with = "clamped_position")]
    position: u8,
}

fn clamped_position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, TRACK_END as i64) as u8)
}

impl Wrestler {
    pub fn new(name: impl Into<String>, tv_grade: TvGrade, grudge_grade: i32) -> Self {
        Self {
            name: name.into(),
            tv_grade,
            grudge_grade,
            skills: SkillSheet::new(),
            specialty: None,
            finisher: None,
            position: 0,
        }
    }

    pub fn with_skills(mut self, skills: SkillSheet) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_specialty(mut self, name: impl Into<String>, points: u8) -> Self {
        self.specialty = Some(Specialty { name: name.into(), points });
        self
    }

    pub fn with_finisher(mut self, name: impl Into<String>, range: (u8, u8)) -> Self {
        self.finisher = Some(Finisher { name: name.into(), range });
        self
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    /// Place the token, clamping into the track.
    pub fn set_position(&mut self, position: i32) {
        self.position = position.clamp(0, TRACK_END as i32) as u8;
    }

    /// Move forward by `points`, stopping at the finisher space.
    /// Returns the `(from, to)` pair.
    pub fn advance(&mut self, points: u8) -> (u8, u8) {
        let from = self.position;
        self.position = from.saturating_add(points).min(TRACK_END);
        (from, self.position)
    }

    pub fn has_any(&self, skills: &[Skill]) -> bool {
        skills.iter().any(|s| self.skills.has(*s))
    }

    pub fn alignment(&self) -> Alignment {
        if self.skills.has(Skill::Cheat) && !self.skills.has(Skill::Favorite) {
            Alignment::Heel
        } else {
            Alignment::Face
        }
    }
}

/// Fixed match role, independent of alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Favored,
    Underdog,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Favored  => Role::Underdog,
            Role::Underdog => Role::Favored,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Favored  => write!(f, "Favored"),
            Role::Underdog => write!(f, "Underdog"),
        }
    }
}

// ---------------------------------------------------------------------------
// Fast Action Cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacKind {
    Skill(Skill),
    Submission(Skill),
    TvMove,
    Grudge,
    Specialty,
    Signature,
    Trailing,
    TestOfStrength,
    Helped,
    WildCard,
    HighlightReel,
    /// The referee is knocked down. Loaded for its text; no referee rules run.
    RefBump,
    TitleHolder,
}

impl FacKind {
    /// Cards that carry narrative only and never award points.
    pub fn is_narrative(self) -> bool {
        matches!(
            self,
            FacKind::Helped | FacKind::WildCard | FacKind::HighlightReel | FacKind::RefBump | FacKind::TitleHolder
        )
    }
}

impl fmt::Display for FacKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacKind::Skill(s)       => write!(f, "{s}"),
            FacKind::Submission(s)  => write!(f, "{s} submission"),
            FacKind::TvMove         => write!(f, "TV move"),
            FacKind::Grudge         => write!(f, "grudge"),
            FacKind::Specialty      => write!(f, "specialty"),
            FacKind::Signature      => write!(f, "signature"),
            FacKind::Trailing       => write!(f, "trailing"),
            FacKind::TestOfStrength => write!(f, "test of strength"),
            FacKind::Helped         => write!(f, "helped"),
            FacKind::WildCard       => write!(f, "wild card"),
            FacKind::HighlightReel  => write!(f, "highlight reel"),
            FacKind::RefBump        => write!(f, "ref bump"),
            FacKind::TitleHolder    => write!(f, "title holder"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeTableKind {
    Tv,
    Grudge,
}

/// How a card's point value is obtained at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSpec {
    Flat(u8),
    DieRoll { sides: u8 },
    GradeTable(GradeTableKind),
}

/// A Fast Action Card. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fac {
    pub id: u32,
    pub kind: FacKind,
    #[serde(default)]
    pub control: bool,
    pub points: PointSpec,
    #[serde(default)]
    pub trailing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Fac {
    pub fn new(id: u32, kind: FacKind, points: PointSpec) -> Self {
        Self { id, kind, control: false, points, trailing: false, text: None }
    }

    pub fn control(mut self) -> Self {
        self.control = true;
        self
    }

    pub fn tagged_trailing(mut self) -> Self {
        self.trailing = true;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is_trailing(&self) -> bool {
        self.trailing || self.kind == FacKind::Trailing
    }
}

impl fmt::Display for Fac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Card {}: {} ({})",
            self.id,
            self.kind,
            if self.control { "Control" } else { "No Control" }
        )
    }
}

// ---------------------------------------------------------------------------
// Resolution results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieReason {
    /// Positions differed; the wrestler further back took the card.
    Trailing,
    /// Level on the track; the Underdog takes ties.
    EqualUnderdog,
    /// Level on the track and the card is a Trailing card.
    TrailingCard,
}

/// Result of asking who may act on a card. Exactly one variant per card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    NoOneEligible,
    SingleWinner(Role),
    TieResolved(Role, TieReason),
}

impl Outcome {
    pub fn winner(self) -> Option<Role> {
        match self {
            Outcome::NoOneEligible         => None,
            Outcome::SingleWinner(r)       => Some(r),
            Outcome::TieResolved(r, _)     => Some(r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlState {
    #[default]
    NoControl,
    ControlledBy(Role),
}

impl ControlState {
    pub fn holder(self) -> Option<Role> {
        match self {
            ControlState::NoControl       => None,
            ControlState::ControlledBy(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionPath {
    /// First card of the cycle, normal dual-eligibility check.
    Ordinary,
    /// Replacement card after a NoOneEligible result.
    Redraw,
    /// Control-flagged card checked for the wrestler in control only.
    FreeShot(Role),
    /// Follow-up card checked for the other wrestler after a missed free shot.
    FollowUpShot(Role),
}

/// Test of Strength exchange log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestReport {
    pub face: Role,
    pub rolls: Vec<u8>,
    pub break_rolls: Vec<u8>,
    pub face_exchanges: u8,
    pub heel_exchanges: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResolution {
    pub card_id: u32,
    pub kind: FacKind,
    pub control: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub path: ResolutionPath,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest: Option<ContestReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmedAttempt {
    Pin { attacker: Role },
    Finisher { attacker: Role },
}

impl ArmedAttempt {
    pub fn attacker(self) -> Role {
        match self {
            ArmedAttempt::Pin { attacker } | ArmedAttempt::Finisher { attacker } => attacker,
        }
    }
}

/// Submission hold rounds after the initial points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldReport {
    pub break_on_or_below: u8,
    pub rolls: Vec<u8>,
    pub extra_points: u8,
    /// The hold was stopped by the round ceiling rather than a break.
    pub capped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scorer: Role,
    pub card_id: u32,
    pub base_points: u8,
    /// Set when the card's points came from a die roll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub die_roll: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<HoldReport>,
    pub points: u8,
    pub from: u8,
    pub to: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armed: Option<ArmedAttempt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinReport {
    pub attacker: Role,
    pub defender: Role,
    pub kickout_range: (u8, u8),
    pub rolls: Vec<u8>,
    /// Count (1..=3) at which the defender kicked out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kicked_out_at: Option<u8>,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinisherReport {
    pub attacker: Role,
    pub finisher: String,
    pub range: (u8, u8),
    pub roll: u8,
    pub success: bool,
    pub from: u8,
    pub to: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptReport {
    Pin(PinReport),
    Finisher(FinisherReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Ongoing,
    Pin { winner: Role },
    Finisher { winner: Role },
}

impl MatchResult {
    pub fn is_over(self) -> bool {
        !matches!(self, MatchResult::Ongoing)
    }

    pub fn winner(self) -> Option<Role> {
        match self {
            MatchResult::Ongoing                 => None,
            MatchResult::Pin { winner }
            | MatchResult::Finisher { winner }   => Some(winner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlChange {
    pub before: ControlState,
    pub after: ControlState,
}

impl ControlChange {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub favored: u8,
    pub underdog: u8,
}

/// Everything that happened during one `draw_and_resolve` cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardReport {
    pub cards: Vec<CardResolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreReport>,
    pub control: ControlChange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<AttemptReport>,
    /// An attempt armed by this card and left for the caller to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<ArmedAttempt>,
    pub positions: TrackSnapshot,
    pub result: MatchResult,
    pub scoreless_cards: u32,
    /// The Boo Rule threshold of consecutive scoreless cards was reached.
    pub boo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub favored: Wrestler,
    pub underdog: Wrestler,
    pub control: ControlState,
    pub last_scorer: Option<Role>,
    pub current_card: Option<Fac>,
    pub scoreless_cards: u32,
    pub pending: Option<ArmedAttempt>,
    pub result: MatchResult,
}

impl MatchSnapshot {
    pub fn wrestler(&self, role: Role) -> &Wrestler {
        match role {
            Role::Favored  => &self.favored,
            Role::Underdog => &self.underdog,
        }
    }
}

/// Records handed back to the wrestler data collaborator after a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub favored: Wrestler,
    pub underdog: Wrestler,
    pub result: MatchResult,
}

/// Pre- or post-match storyline roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRoll {
    pub d6: u8,
    pub d66: u8,
    pub highlight_reel: char,
}
