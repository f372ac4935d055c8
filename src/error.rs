//! Unified error types for the tank monitoring core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! service's error handling uniform.  All variants are `Copy` so they can be
//! passed through the scheduler and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A dimension required by the tank shape is missing, zero, negative or
    /// not finite.  Capacity and volume are undefined.
    InvalidDimensions(&'static str),
    /// A settings snapshot failed validation and was not accepted.
    InvalidSettings(&'static str),
    /// The sensor collaborator could not supply a usable reading.
    SensorUnavailable,
    /// The autolog scheduler could not arm; it stays `Stopped`.
    SchedulerStartFailed(StartFailure),
    /// The log-write collaborator rejected an entry.
    LogWriteFailed,
    /// A hand-entered log amount is not a positive number.
    InvalidAmount(&'static str),
    /// The settings store could not supply a snapshot.
    SettingsUnavailable,
    /// The settings store could not persist a snapshot.
    SettingsSaveFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions(msg) => write!(f, "invalid dimensions: {msg}"),
            Self::InvalidSettings(msg) => write!(f, "invalid settings: {msg}"),
            Self::SensorUnavailable => write!(f, "sensor unavailable"),
            Self::SchedulerStartFailed(cause) => write!(f, "scheduler start failed: {cause}"),
            Self::LogWriteFailed => write!(f, "log write failed"),
            Self::InvalidAmount(msg) => write!(f, "invalid amount: {msg}"),
            Self::SettingsUnavailable => write!(f, "settings unavailable"),
            Self::SettingsSaveFailed => write!(f, "settings save failed"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Scheduler start failures
// ---------------------------------------------------------------------------

/// Why [`AutologScheduler::start`](crate::scheduler::AutologScheduler::start)
/// could not arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartFailure {
    /// The initial baseline sample could not be read.
    SensorUnavailable,
    /// The settings describe a tank with no defined volume.
    InvalidDimensions(&'static str),
}

impl fmt::Display for StartFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorUnavailable => write!(f, "sensor unavailable"),
            Self::InvalidDimensions(msg) => write!(f, "invalid dimensions: {msg}"),
        }
    }
}

impl From<StartFailure> for Error {
    fn from(e: StartFailure) -> Self {
        Self::SchedulerStartFailed(e)
    }
}

impl StartFailure {
    /// Map an error raised while sampling the baseline.
    pub(crate) fn from_sample_error(e: Error) -> Self {
        match e {
            Error::InvalidDimensions(msg) => Self::InvalidDimensions(msg),
            _ => Self::SensorUnavailable,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
