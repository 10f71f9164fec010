pub mod alarm;
pub mod claim;
pub mod config;
pub mod settings;
pub mod transfer;
pub mod watch;
