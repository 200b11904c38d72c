//! Geometric drop-position resolution
//!
//! Turns a live pointer position plus the rendered bounds of the form's
//! elements into a [`DropIntent`]: which row, which sibling, before or after,
//! row break or same-row insertion, and where to draw the indicator.

pub mod config;
pub mod resolver;
pub mod types;

pub use config::{ConfigError, DropConfig};
pub use resolver::DropResolver;
pub use types::*;
