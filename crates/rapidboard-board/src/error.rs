//! Error types for the board layer.

use rapidboard_session::SessionError;

/// Errors from board pipelines.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The display window's three columns have different lengths. A setup
    /// mistake: detected before any remote call is made.
    #[error(
        "display window columns differ in length (ranks {ranks}, names {names}, scores {scores})"
    )]
    Misconfigured {
        ranks: usize,
        names: usize,
        scores: usize,
    },

    /// A leaderboard call failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl BoardError {
    /// The raw failure text, as shown in the board's failure template.
    pub fn message(&self) -> String {
        match self {
            Self::Misconfigured { .. } => self.to_string(),
            Self::Session(e) => e.message(),
        }
    }
}
