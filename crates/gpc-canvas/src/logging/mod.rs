//! Logger installation.
//!
//! The crate itself only talks to the `log` facade; this module is a
//! convenience for hosts that want `env_logger` with sensible defaults.

mod init;

pub use init::{LoggingConfig, init_logging};
