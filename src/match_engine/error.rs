use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// `empty` is set when the deck holds no cards at all; otherwise the
    /// stall ceiling was reached after `draws` draws without a score.
    #[error("Deck exhausted after {draws} draws without a score (empty deck: {empty})")]
    ExhaustedDeck { draws: u32, empty: bool },

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MatchError {
    /// Whether the caller can retry after fixing the request. Match state is
    /// left untouched for every recoverable error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MatchError::InvalidState(_)          => true,
            MatchError::IllegalTransition(_)     => true,
            MatchError::ExhaustedDeck { empty, .. } => !*empty,
            MatchError::DataIntegrity(_)         => false,
            MatchError::Json(_)                  => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_deck_is_fatal_but_stall_is_not() {
        assert!(!MatchError::ExhaustedDeck { draws: 0, empty: true }.is_recoverable());
        assert!(MatchError::ExhaustedDeck { draws: 12, empty: false }.is_recoverable());
        // A stall is recoverable whatever the count.
        assert!(MatchError::ExhaustedDeck { draws: 0, empty: false }.is_recoverable());
    }

    #[test]
    fn integrity_errors_are_fatal() {
        assert!(!MatchError::DataIntegrity("missing tv_grade".into()).is_recoverable());
        assert!(MatchError::IllegalTransition("no finisher".into()).is_recoverable());
    }
}
