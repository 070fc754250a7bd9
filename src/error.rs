use thiserror::Error;

use crate::data::ArtistSize;

/// Everything that can go wrong while building a festival schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid festival configuration: {0}")]
    InvalidConfig(String),

    #[error("the catalog has no {0} artists")]
    EmptyCatalogBucket(ArtistSize),

    #[error("no acceptable {size} artist found after {attempts} sampling attempts")]
    CatalogExhausted { size: ArtistSize, attempts: usize },

    #[error("schedule does not match the festival layout: {0}")]
    InvalidShape(String),

    #[error("conflict repair did not converge after {attempts} attempts")]
    NonConvergence { attempts: usize },

    #[error("gave up after {restarts} restarts without a conflict-free schedule")]
    RestartsExhausted { restarts: u32 },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScheduleError {
    /// Failures that only concern one random run; a fresh run may succeed.
    pub fn is_restartable(&self) -> bool {
        matches!(
            self,
            ScheduleError::NonConvergence { .. } | ScheduleError::CatalogExhausted { .. }
        )
    }
}
