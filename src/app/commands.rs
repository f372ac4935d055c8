//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (settings form,
//! autolog toggle) that the [`TankService`](super::service::TankService)
//! interprets and acts upon.

use crate::config::TankSettings;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Validate, persist and apply a whole settings snapshot.
    UpdateSettings(TankSettings),

    /// Turn autolog on or off, keeping every other setting.
    SetAutologEnabled(bool),

    /// Re-arm the autolog scheduler after a failed start.
    RetryAutolog,
}
