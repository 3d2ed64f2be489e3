//! Wrestler and deck records.
//!
//! Files are read into loose `Raw*` records first so a missing or malformed
//! field becomes a [`MatchError::DataIntegrity`] naming the record, rather
//! than a bare serde error or a silent default. Unknown extra fields (bio,
//! image, allies) are ignored.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::match_engine::board::tv_move_points;
use crate::match_engine::deck::FacDeck;
use crate::match_engine::error::{MatchError, Result};
use crate::match_engine::models::{
    Fac, FacKind, Finisher, GradeTableKind, MatchSummary, PointSpec, Skill, SkillSheet, SkillSymbol,
    Specialty, TvGrade, Wrestler,
};

/// Marker in card text that turns a skill card into a submission.
pub const SUBMISSION_MARKER: &str = "Submission!";

fn integrity(msg: impl Into<String>) -> MatchError {
    MatchError::DataIntegrity(msg.into())
}

// ── raw records ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawWrestlerFile {
    wrestlers: Option<Vec<RawWrestler>>,
}

#[derive(Debug, Deserialize)]
struct RawWrestler {
    name: Option<String>,
    tv_grade: Option<String>,
    grudge_grade: Option<Value>,
    skills: Option<BTreeMap<String, String>>,
    specialty: Option<RawSpecialty>,
    finisher: Option<RawFinisher>,
    position: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawSpecialty {
    name: Option<String>,
    points: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFinisher {
    name: Option<String>,
    range: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawDeckFile {
    cards: Option<Vec<RawCard>>,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    id: Option<u32>,
    control: Option<bool>,
    #[serde(rename = "type")]
    kind: Option<String>,
    points: Option<Value>,
    text: Option<String>,
    trailing: Option<bool>,
}

// ── field parsers ────────────────────────────────────────────────────────

/// Integer field that may arrive as a JSON number or a numeric string.
fn int_field(value: &Value, what: &str) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| integrity(format!("{what}: {n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| integrity(format!("{what}: '{s}' is not an integer"))),
        other => Err(integrity(format!("{what}: expected an integer, got {other}"))),
    }
}

fn d66_value(value: i64, what: &str) -> Result<u8> {
    let (tens, units) = (value / 10, value % 10);
    if (1..=6).contains(&tens) && (1..=6).contains(&units) {
        Ok(value as u8)
    } else {
        Err(integrity(format!("{what}: {value} is not a d66 result")))
    }
}

/// `[lo, hi]` or `"lo-hi"`, both d66 values with `lo <= hi`.
fn finisher_range(value: &Value, who: &str) -> Result<(u8, u8)> {
    let what = format!("{who} finisher range");
    let (lo, hi) = match value {
        Value::Array(items) if items.len() == 2 => (int_field(&items[0], &what)?, int_field(&items[1], &what)?),
        Value::String(s) => {
            let (lo, hi) = s
                .split_once('-')
                .ok_or_else(|| integrity(format!("{what}: '{s}' is not 'lo-hi'")))?;
            (
                int_field(&Value::String(lo.into()), &what)?,
                int_field(&Value::String(hi.into()), &what)?,
            )
        }
        other => return Err(integrity(format!("{what}: expected [lo, hi], got {other}"))),
    };
    let (lo, hi) = (d66_value(lo, &what)?, d66_value(hi, &what)?);
    if lo > hi {
        return Err(integrity(format!("{what}: {lo} is above {hi}")));
    }
    Ok((lo, hi))
}

/// Skill sheet. A `"none"` symbol leaves the skill off the sheet; anything
/// else unrecognised is rejected.
fn skill_sheet(raw: &BTreeMap<String, String>, who: &str) -> Result<SkillSheet> {
    let mut sheet = SkillSheet::new();
    for (name, symbol) in raw {
        let skill: Skill = name.parse().map_err(|e| integrity(format!("{who}: {e}")))?;
        if symbol.trim().eq_ignore_ascii_case("none") {
            continue;
        }
        let symbol: SkillSymbol = symbol.parse().map_err(|e| integrity(format!("{who} {skill}: {e}")))?;
        sheet = sheet.with(skill, symbol);
    }
    Ok(sheet)
}

fn card_kind(raw: &str, text: Option<&str>) -> std::result::Result<FacKind, String> {
    let kind = match raw.trim().to_ascii_lowercase().as_str() {
        "tv" | "tv move"     => FacKind::TvMove,
        "grudge"             => FacKind::Grudge,
        "specialty"          => FacKind::Specialty,
        "signature"          => FacKind::Signature,
        "trailing"           => FacKind::Trailing,
        "test of strength"   => FacKind::TestOfStrength,
        "helped"             => FacKind::Helped,
        "wild card"          => FacKind::WildCard,
        "highlight reel"     => FacKind::HighlightReel,
        "ref bump"           => FacKind::RefBump,
        "title holder"       => FacKind::TitleHolder,
        other => {
            let skill: Skill = other.parse().map_err(|_| format!("unknown card type '{raw}'"))?;
            if text.is_some_and(|t| t.contains(SUBMISSION_MARKER)) {
                FacKind::Submission(skill)
            } else {
                FacKind::Skill(skill)
            }
        }
    };
    Ok(kind)
}

/// Point spec: an integer, `"dN"`, `"tv"`, `"grudge"`, or a grade-keyed
/// object, which reads as the TV table and must agree with it.
pub fn parse_point_spec(value: &Value) -> Result<PointSpec> {
    point_spec(value).map_err(MatchError::DataIntegrity)
}

fn point_spec(value: &Value) -> std::result::Result<PointSpec, String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|points| u8::try_from(points).ok())
            .map(PointSpec::Flat)
            .ok_or_else(|| format!("points {n} out of range")),
        Value::String(s) => {
            let spec = s.trim().to_ascii_lowercase();
            match spec.as_str() {
                "tv"     => Ok(PointSpec::GradeTable(GradeTableKind::Tv)),
                "grudge" => Ok(PointSpec::GradeTable(GradeTableKind::Grudge)),
                _ => match spec.strip_prefix('d').map(str::parse::<u8>) {
                    Some(Ok(sides)) if sides > 0 => Ok(PointSpec::DieRoll { sides }),
                    _ => Err(format!("unrecognised point spec '{s}'")),
                },
            }
        }
        Value::Object(table) => {
            for (key, points) in table {
                let grade: TvGrade = key.parse().map_err(|e| format!("points table: {e}"))?;
                let expected = tv_move_points(grade);
                if points.as_u64() != Some(u64::from(expected)) {
                    return Err(format!("points table: {grade} is worth {expected} on the TV table, got {points}"));
                }
            }
            Ok(PointSpec::GradeTable(GradeTableKind::Tv))
        }
        other => Err(format!("unrecognised point spec {other}")),
    }
}

// ── records -> models ────────────────────────────────────────────────────

fn wrestler_from_raw(raw: RawWrestler, index: usize) -> Result<Wrestler> {
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| integrity(format!("wrestler #{index}: missing name")))?;
    let tv_grade: TvGrade = raw
        .tv_grade
        .ok_or_else(|| integrity(format!("{name}: missing tv_grade")))?
        .parse()
        .map_err(|e| integrity(format!("{name}: {e}")))?;
    let grudge = raw
        .grudge_grade
        .ok_or_else(|| integrity(format!("{name}: missing grudge_grade")))?;
    let grudge_grade = i32::try_from(int_field(&grudge, &format!("{name} grudge_grade"))?)
        .map_err(|_| integrity(format!("{name}: grudge_grade out of range")))?;
    let skills = raw
        .skills
        .ok_or_else(|| integrity(format!("{name}: missing skills")))
        .and_then(|s| skill_sheet(&s, &name))?;

    let mut wrestler = Wrestler::new(name, tv_grade, grudge_grade).with_skills(skills);

    wrestler.specialty = match raw.specialty {
        None | Some(RawSpecialty { name: None, points: None }) => None,
        Some(RawSpecialty { name: Some(spec_name), points: Some(points) }) => {
            let points = int_field(&points, &format!("{} specialty points", wrestler.name))?;
            let points = u8::try_from(points)
                .map_err(|_| integrity(format!("{}: specialty points {points} out of range", wrestler.name)))?;
            Some(Specialty { name: spec_name, points })
        }
        Some(_) => return Err(integrity(format!("{}: specialty needs both name and points", wrestler.name))),
    };

    wrestler.finisher = match raw.finisher {
        None | Some(RawFinisher { name: None, range: None }) => None,
        Some(RawFinisher { name: Some(fin_name), range: Some(range) }) => {
            let range = finisher_range(&range, &wrestler.name)?;
            Some(Finisher { name: fin_name, range })
        }
        Some(_) => return Err(integrity(format!("{}: finisher needs both name and range", wrestler.name))),
    };

    if let Some(position) = raw.position {
        wrestler.set_position(position.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
    }
    Ok(wrestler)
}

fn card_from_raw(raw: RawCard, index: usize) -> Result<Fac> {
    let id = raw.id.ok_or_else(|| integrity(format!("card #{index}: missing id")))?;
    let control = raw.control.ok_or_else(|| integrity(format!("card {id}: missing control")))?;
    let type_name = raw.kind.ok_or_else(|| integrity(format!("card {id}: missing type")))?;
    let kind = card_kind(&type_name, raw.text.as_deref()).map_err(|e| integrity(format!("card {id}: {e}")))?;

    let points = match (raw.points, kind) {
        (Some(Value::Null) | None, kind) if kind.is_narrative() => PointSpec::Flat(0),
        (Some(Value::Null) | None, FacKind::Signature)          => PointSpec::DieRoll { sides: 6 },
        (Some(Value::Null) | None, FacKind::TestOfStrength)     => PointSpec::Flat(1),
        (Some(Value::Null) | None, _) => return Err(integrity(format!("card {id}: missing points"))),
        (Some(value), _) => point_spec(&value).map_err(|e| integrity(format!("card {id}: {e}")))?,
    };

    Ok(Fac {
        id,
        kind,
        control,
        points,
        trailing: raw.trailing.unwrap_or(false),
        text: raw.text,
    })
}

/// Parse `{"wrestlers": [...]}`.
pub fn load_wrestlers(json: &str) -> Result<Vec<Wrestler>> {
    let file: RawWrestlerFile = serde_json::from_str(json)?;
    let raws = file.wrestlers.ok_or_else(|| integrity("missing 'wrestlers' list"))?;

    let mut seen = HashSet::new();
    let mut wrestlers = Vec::with_capacity(raws.len());
    for (index, raw) in raws.into_iter().enumerate() {
        let wrestler = wrestler_from_raw(raw, index)?;
        if !seen.insert(wrestler.name.clone()) {
            return Err(integrity(format!("duplicate wrestler '{}'", wrestler.name)));
        }
        wrestlers.push(wrestler);
    }
    info!(count = wrestlers.len(), "wrestlers loaded");
    Ok(wrestlers)
}

/// Parse `{"cards": [...]}`.
pub fn load_cards(json: &str) -> Result<Vec<Fac>> {
    let file: RawDeckFile = serde_json::from_str(json)?;
    let raws = file.cards.ok_or_else(|| integrity("missing 'cards' list"))?;

    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(raws.len());
    for (index, raw) in raws.into_iter().enumerate() {
        let card = card_from_raw(raw, index)?;
        if !seen.insert(card.id) {
            return Err(integrity(format!("duplicate card id {}", card.id)));
        }
        cards.push(card);
    }
    if cards.is_empty() {
        warn!("deck file holds no cards");
    }
    info!(count = cards.len(), "cards loaded");
    Ok(cards)
}

/// Parse a deck file straight into an unshuffled [`FacDeck`].
pub fn load_deck(json: &str) -> Result<FacDeck> {
    load_cards(json).map(FacDeck::new)
}

// ── roster ───────────────────────────────────────────────────────────────

/// A grade change requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeUpdate {
    Tv(TvGrade),
    Grudge(i32),
}

impl GradeUpdate {
    /// `kind` is `"tv"` or `"grudge"`, case-insensitive.
    pub fn parse(kind: &str, value: &str) -> Result<GradeUpdate> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "tv" => value
                .parse()
                .map(GradeUpdate::Tv)
                .map_err(MatchError::InvalidState),
            "grudge" => value
                .trim()
                .parse()
                .map(GradeUpdate::Grudge)
                .map_err(|_| MatchError::InvalidState(format!("grudge grade must be an integer, got '{value}'"))),
            other => Err(MatchError::InvalidState(format!("grade type must be TV or GRUDGE, got '{other}'"))),
        }
    }
}

/// The wrestler collection a match reads from and writes back to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    wrestlers: Vec<Wrestler>,
}

impl Roster {
    pub fn new(wrestlers: Vec<Wrestler>) -> Self {
        Self { wrestlers }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        load_wrestlers(json).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.wrestlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrestlers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wrestler> + '_ {
        self.wrestlers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Wrestler> {
        self.wrestlers.iter().find(|w| w.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Wrestler> {
        self.wrestlers
            .iter_mut()
            .find(|w| w.name == name)
            .ok_or_else(|| MatchError::InvalidState(format!("no wrestler named '{name}'")))
    }

    pub fn by_tv_grade(&self, grade: TvGrade) -> impl Iterator<Item = &Wrestler> + '_ {
        self.wrestlers.iter().filter(move |w| w.tv_grade == grade)
    }

    /// Wrestlers within one TV grade of `name`.
    pub fn opponents_for(&self, name: &str) -> Vec<&Wrestler> {
        let Some(me) = self.get(name) else {
            return Vec::new();
        };
        let mine = me.tv_grade as i32;
        self.wrestlers
            .iter()
            .filter(|w| w.name != name && (w.tv_grade as i32 - mine).abs() <= 1)
            .collect()
    }

    /// The `count` biggest grudges by magnitude, skipping `excluded` names.
    pub fn top_grudge(&self, count: usize, excluded: &[&str]) -> Vec<&Wrestler> {
        let mut pool: Vec<&Wrestler> = self
            .wrestlers
            .iter()
            .filter(|w| !excluded.contains(&w.name.as_str()))
            .collect();
        pool.sort_by_key(|w| std::cmp::Reverse(w.grudge_grade.unsigned_abs()));
        pool.truncate(count);
        pool
    }

    /// Apply a grade change, returning the wrestler as it now stands.
    pub fn update_grade(&mut self, name: &str, update: GradeUpdate) -> Result<&Wrestler> {
        let wrestler = self.get_mut(name)?;
        match update {
            GradeUpdate::Tv(grade) => {
                info!(wrestler = name, from = %wrestler.tv_grade, to = %grade, "TV grade updated");
                wrestler.tv_grade = grade;
            }
            GradeUpdate::Grudge(grade) => {
                info!(wrestler = name, from = wrestler.grudge_grade, to = grade, "grudge grade updated");
                wrestler.grudge_grade = grade;
            }
        }
        Ok(wrestler)
    }

    /// Write both wrestlers of a finished match back into the roster.
    pub fn record(&mut self, summary: &MatchSummary) -> Result<()> {
        for updated in [&summary.favored, &summary.underdog] {
            *self.get_mut(&updated.name)? = updated.clone();
        }
        Ok(())
    }

    /// `{"wrestlers": [...]}`, readable by [`Roster::from_json`].
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&serde_json::json!({ "wrestlers": self.wrestlers }))?)
    }
}
