//! Core systems for Horizon Shortcuts.
//!
//! This crate provides the foundational pieces shared by the shortcut engine:
//!
//! - **Hook channels**: [`Signal`], an ordered list of listeners addressed
//!   by [`ConnectionId`] tokens
//! - **Logging**: tracing targets, [`PerfSpan`] and the
//!   `shortcuts_*!` macros
//!
//! # Hook Channel Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_shortcuts_core::Signal;
//!
//! let mut changed: Signal<dyn Fn(&str) + Send + Sync> = Signal::new();
//! let conn_id = changed.connect(Arc::new(|name| println!("{name} changed")));
//!
//! for slot in changed.slots() {
//!     slot("chain");
//! }
//!
//! changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::{targets, PerfSpan};
pub use signal::{ConnectionId, Signal};
