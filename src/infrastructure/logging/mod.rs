//! Logging subsystem (SPEC_FULL §6 "Logging"): tracing subscriber setup,
//! rotation/retention, and secret scrubbing for anything derived from
//! operator-supplied request fields.

pub mod config;
pub mod logger;
pub mod rotation;
pub mod secret_scrubbing;

pub use config::LogConfig;
pub use logger::LoggerHandle;
pub use rotation::LogRotator;
pub use secret_scrubbing::SecretScrubber;
