use crate::match_engine::models::{GrudgeTier, SkillSymbol, TvGrade, Wrestler};

/// Last space on the track; reaching it arms a finisher attempt.
pub const TRACK_END: u8 = 15;
pub const FINISHER_SPACE: u8 = TRACK_END;
/// Where a wrestler lands after a failed finisher.
pub const FAILED_FINISHER_SPACE: u8 = 9;

pub const SQUARE_SPACES: [u8; 7] = [5, 7, 9, 11, 12, 13, 14];
pub const CIRCLE_SPACES: [u8; 8] = [0, 1, 2, 3, 4, 6, 8, 10];
pub const PIN_SPACES: [u8; 3] = [12, 13, 14];

/// Square/circle classification of a track space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    Circle,
    Square,
    /// Space 15 is neither.
    Finisher,
}

impl std::fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpaceKind::Circle   => write!(f, "circle"),
            SpaceKind::Square   => write!(f, "square"),
            SpaceKind::Finisher => write!(f, "finisher"),
        }
    }
}

/// Which match-ending sub-game, if any, a space arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Open,
    Pin,
    Finisher,
}

pub fn space_kind(position: u8) -> SpaceKind {
    if SQUARE_SPACES.contains(&position) {
        SpaceKind::Square
    } else if CIRCLE_SPACES.contains(&position) {
        SpaceKind::Circle
    } else {
        SpaceKind::Finisher
    }
}

pub fn zone(position: u8) -> Zone {
    if position >= FINISHER_SPACE {
        Zone::Finisher
    } else if PIN_SPACES.contains(&position) {
        Zone::Pin
    } else {
        Zone::Open
    }
}

/// True if a skill with `symbol` may be used by a wrestler standing on
/// `position`. Any listed skill works on the finisher space.
pub fn symbol_usable(symbol: SkillSymbol, position: u8) -> bool {
    match (symbol, space_kind(position)) {
        (_, SpaceKind::Finisher)                => true,
        (SkillSymbol::Star, _)                  => true,
        (SkillSymbol::Square, SpaceKind::Square) => true,
        (SkillSymbol::Circle, SpaceKind::Circle) => true,
        _                                       => false,
    }
}

/// Inclusive d66 kickout range for a pinned wrestler of this TV grade.
pub fn kickout_range(grade: TvGrade) -> (u8, u8) {
    let top = match grade {
        TvGrade::Aaa => 43,
        TvGrade::Aa  => 36,
        TvGrade::A   => 33,
        TvGrade::B   => 26,
        TvGrade::C   => 23,
        TvGrade::D   => 16,
        TvGrade::E   => 13,
        TvGrade::F   => 11,
    };
    (11, top)
}

pub fn kicks_out(grade: TvGrade, roll: u8) -> bool {
    let (lo, hi) = kickout_range(grade);
    (lo..=hi).contains(&roll)
}

/// Points a TV Move card is worth to a wrestler of this grade.
pub fn tv_move_points(grade: TvGrade) -> u8 {
    match grade {
        TvGrade::Aaa => 5,
        TvGrade::Aa  => 4,
        TvGrade::A   => 3,
        TvGrade::B   => 2,
        TvGrade::C   => 1,
        TvGrade::D | TvGrade::E | TvGrade::F => 0,
    }
}

pub fn grudge_points(wrestler: &Wrestler) -> u8 {
    GrudgeTier::from_grade(wrestler.grudge_grade).map_or(0, GrudgeTier::points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_space_below_the_finisher_is_square_or_circle() {
        for pos in 0..FINISHER_SPACE {
            assert_ne!(space_kind(pos), SpaceKind::Finisher, "space {pos}");
        }
        assert_eq!(space_kind(15), SpaceKind::Finisher);
    }

    #[test]
    fn zones_match_track_layout() {
        assert_eq!(zone(11), Zone::Open);
        for pos in 12..=14 {
            assert_eq!(zone(pos), Zone::Pin);
        }
        assert_eq!(zone(15), Zone::Finisher);
    }

    #[test]
    fn square_symbol_only_on_square_spaces() {
        assert!(symbol_usable(SkillSymbol::Square, 5));
        assert!(!symbol_usable(SkillSymbol::Square, 6));
        assert!(symbol_usable(SkillSymbol::Circle, 6));
        assert!(!symbol_usable(SkillSymbol::Circle, 13));
        assert!(symbol_usable(SkillSymbol::Star, 13));
        assert!(symbol_usable(SkillSymbol::Circle, 15));
    }

    #[test]
    fn kickout_ranges_by_grade() {
        assert_eq!(kickout_range(TvGrade::Aaa), (11, 43));
        assert_eq!(kickout_range(TvGrade::C), (11, 23));
        assert_eq!(kickout_range(TvGrade::F), (11, 11));
        assert!(kicks_out(TvGrade::F, 11));
        assert!(!kicks_out(TvGrade::F, 12));
        assert!(kicks_out(TvGrade::Aaa, 43));
        assert!(!kicks_out(TvGrade::Aaa, 44));
    }

    #[test]
    fn grudge_tiers_ignore_sign() {
        let bronze = Wrestler::new("B", TvGrade::C, -2);
        let silver = Wrestler::new("S", TvGrade::C, 4);
        let gold = Wrestler::new("G", TvGrade::C, -7);
        let none = Wrestler::new("N", TvGrade::C, 0);
        assert_eq!(grudge_points(&bronze), 1);
        assert_eq!(grudge_points(&silver), 2);
        assert_eq!(grudge_points(&gold), 3);
        assert_eq!(grudge_points(&none), 0);
    }
}
