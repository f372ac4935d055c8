//! In-memory settings store.
//!
//! Implements [`SettingsPort`] by holding a postcard-encoded snapshot, the
//! same bytes a flash-backed store would persist.  Used by tests and by the
//! host binary when `--ephemeral` is given.
//!
//! Settings are validated before they are encoded; a rejected snapshot never
//! replaces the stored one.

use core::cell::{Cell, RefCell};

use log::{info, warn};

use crate::app::ports::SettingsPort;
use crate::config::TankSettings;
use crate::error::{Error, Result};
use crate::settings;

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    blob: RefCell<Option<Vec<u8>>>,
    read_only: Cell<bool>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        info!("MemorySettingsStore: empty");
        Self::default()
    }

    /// Store pre-seeded with `settings` (validation is skipped).
    pub fn with_settings(settings: &TankSettings) -> Result<Self> {
        let blob = postcard::to_allocvec(settings).map_err(|_| Error::SettingsSaveFailed)?;
        Ok(Self {
            blob: RefCell::new(Some(blob)),
            read_only: Cell::new(false),
        })
    }

    /// Make every subsequent save fail with [`Error::SettingsSaveFailed`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn is_empty(&self) -> bool {
        self.blob.borrow().is_none()
    }
}

impl SettingsPort for MemorySettingsStore {
    fn load(&self) -> Result<TankSettings> {
        let blob = self.blob.borrow();
        let bytes = blob.as_deref().ok_or(Error::SettingsUnavailable)?;
        postcard::from_bytes(bytes).map_err(|_| {
            warn!("MemorySettingsStore: corrupted snapshot");
            Error::SettingsUnavailable
        })
    }

    fn save(&self, settings: &TankSettings) -> Result<()> {
        if self.read_only.get() {
            return Err(Error::SettingsSaveFailed);
        }
        settings::validate(settings)?;
        let bytes = postcard::to_allocvec(settings).map_err(|_| Error::SettingsSaveFailed)?;
        *self.blob.borrow_mut() = Some(bytes);
        info!("MemorySettingsStore: saved ({:?})", settings.shape);
        Ok(())
    }
}
