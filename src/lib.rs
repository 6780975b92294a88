//! Hand-gesture control for map views.
//!
//! [`gesture`] turns per-frame hand observations into discrete zoom, pan,
//! pitch and bearing events. [`bridge`] runs the classifier in a tokio task
//! and fans the results out to transport clients as JSON messages.

pub mod bridge;
pub mod config;
pub mod fallback;
pub mod gesture;
pub mod replay;
