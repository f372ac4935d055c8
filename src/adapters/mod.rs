//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `file`         | SensorPort         | `sensor.json`            |
//! |                | LogPort            | `logs.jsonl`             |
//! |                | SettingsPort       | `settings.json`          |
//! | `log_sink`     | EventSink          | Console log output       |
//! | `memory`       | SettingsPort       | postcard blob in RAM     |
//! | `time`         | Clock              | Host wall clock          |

pub mod file;
pub mod log_sink;
pub mod memory;
pub mod time;
