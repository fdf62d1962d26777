use courier_core::Frequency;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The clock has no period configured for this cadence (e.g. trying to
    /// register a batch under `immediate`).
    #[error("no period configured for cadence: {0}")]
    UnknownCadence(Frequency),

    #[error("cadence already registered: {0}")]
    AlreadyRegistered(Frequency),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
