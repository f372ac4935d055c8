//! JSON file adapter.
//!
//! Implements [`SensorPort`], [`LogPort`] and [`SettingsPort`] on top of a
//! data directory shared with the ingest service:
//!
//! | File           | Port         | Content                          |
//! |----------------|--------------|----------------------------------|
//! | `sensor.json`  | SensorPort   | latest [`SensorReading`]         |
//! | `logs.jsonl`   | LogPort      | one [`LogEntry`] per line        |
//! | `settings.json`| SettingsPort | whole [`TankSettings`] snapshot  |
//!
//! Settings writes go through a temporary file and a rename so a crash never
//! leaves a half-written snapshot behind.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app::ports::{LogPort, SensorPort, SettingsPort};
use crate::config::TankSettings;
use crate::error::{Error, Result};
use crate::level::SensorReading;
use crate::scheduler::LogEntry;

const SENSOR_FILE: &str = "sensor.json";
const LOG_FILE: &str = "logs.jsonl";
const SETTINGS_FILE: &str = "settings.json";

pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        info!("FileBackend: data directory {}", dir.display());
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Every entry in the log journal.  Unparseable lines are skipped; a
    /// journal that exists but cannot be read is an I/O error.
    pub fn read_log(&self) -> std::io::Result<Vec<LogEntry>> {
        let contents = match fs::read_to_string(self.path(LOG_FILE)) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                warn!("FileBackend: cannot read {}: {}", LOG_FILE, e);
                return Err(e);
            }
        };
        let mut entries = Vec::new();
        for (n, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("FileBackend: skipping {}:{}: {}", LOG_FILE, n + 1, e),
            }
        }
        Ok(entries)
    }

    /// Overwrite the latest reading (used by tests and the ingest side).
    pub fn write_reading(&self, reading: &SensorReading) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(reading)?;
        write_atomic(&self.path(SENSOR_FILE), &json)
    }
}

impl SensorPort for FileBackend {
    async fn read(&self) -> Result<SensorReading> {
        let bytes = fs::read(self.path(SENSOR_FILE)).map_err(|e| {
            warn!("FileBackend: cannot read {}: {}", SENSOR_FILE, e);
            Error::SensorUnavailable
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("FileBackend: malformed {}: {}", SENSOR_FILE, e);
            Error::SensorUnavailable
        })
    }
}

impl LogPort for FileBackend {
    async fn write(&self, entry: &LogEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry).map_err(|_| Error::LogWriteFailed)?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(LOG_FILE))
            .map_err(|e| {
                warn!("FileBackend: cannot open {}: {}", LOG_FILE, e);
                Error::LogWriteFailed
            })?;
        file.write_all(&line).map_err(|e| {
            warn!("FileBackend: append to {} failed: {}", LOG_FILE, e);
            Error::LogWriteFailed
        })?;
        debug!("FileBackend: appended {:?}", entry.activity_type);
        Ok(())
    }
}

impl SettingsPort for FileBackend {
    fn load(&self) -> Result<TankSettings> {
        let bytes = fs::read(self.path(SETTINGS_FILE)).map_err(|e| {
            warn!("FileBackend: cannot read {}: {}", SETTINGS_FILE, e);
            Error::SettingsUnavailable
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("FileBackend: malformed {}: {}", SETTINGS_FILE, e);
            Error::SettingsUnavailable
        })
    }

    fn save(&self, settings: &TankSettings) -> Result<()> {
        let json = serde_json::to_vec_pretty(settings).map_err(|_| Error::SettingsSaveFailed)?;
        write_atomic(&self.path(SETTINGS_FILE), &json).map_err(|e| {
            warn!("FileBackend: cannot write {}: {}", SETTINGS_FILE, e);
            Error::SettingsSaveFailed
        })
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}
