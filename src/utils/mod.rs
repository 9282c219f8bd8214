//! # Utility Modules
//!
//! Supporting utilities shared by the codecs.
//!
//! ## Components
//! - **Logging**: structured logging bootstrap from [`LoggingConfig`](crate::config::LoggingConfig)

pub mod logging;

pub use logging::init_logging;
