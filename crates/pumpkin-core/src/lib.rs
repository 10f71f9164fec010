//! # Pumpkin Bingo Core Library
//!
//! This library tracks which of the 100 numbered event pumpkins a player
//! has claimed, counts down to the hourly wave reset and drives the
//! wave-end alarm. The `pumpkin-bingo` CLI is a thin renderer over the same
//! core library.
//!
//! ## Architecture
//!
//! - **Clock**: wall-clock countdown to the next top of the hour; the
//!   caller samples it on its own polling interval
//! - **Claims**: the claimed set and the all-claimed celebration latch
//! - **Alarm**: threshold-crossing state machine with a re-arming latch
//! - **Codec**: lenient JSON export/import document
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: owner of all user state
//! - [`AlarmMachine`]: wave-end alarm state machine
//! - [`Countdown`]: time remaining to the top of the hour
//! - [`Database`]: key-value persistence
//! - [`Config`]: application configuration management

pub mod alarm;
pub mod claims;
pub mod clock;
pub mod codec;
pub mod collaborators;
pub mod error;
pub mod events;
pub mod links;
pub mod storage;
pub mod tracker;

pub use alarm::{AlarmChannel, AlarmConfig, AlarmMachine, NotificationPermission};
pub use claims::{ClaimedSet, PumpkinNumber};
pub use clock::{Clock, Countdown, FixedClock, SystemClock};
pub use codec::PersistedState;
pub use collaborators::{Clipboard, FileDownload, NotificationService, Prompt};
pub use error::{CollaboratorError, ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use links::{LinkTable, MapTemplate};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use tracker::{ExportOutcome, Tracker, TrackerView};
