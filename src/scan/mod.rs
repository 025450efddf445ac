// SPDX-License-Identifier: MIT
//! Site scan engine.
//!
//! One scan is one pass: [`enumerate()`] builds the ordered probe list from
//! the content inventory, [`Prober`] fetches and classifies each URL, and
//! [`Scanner`] folds the results into a single [`HealthReport`] that
//! [`render`](crate::scan::render::render) turns into one of three payloads
//! (health flag, JSON, HTML).
//!
//! # Usage
//! ```ignore
//! use sitepulse::scan::{OutputMode, Prober, Scanner};
//!
//! let prober = Prober::new(client, "https://www.example.org", None);
//! let scanner = Scanner::new(prober, 4);
//! let rendered = scanner
//!     .run_and_render(&repo, &states, false, OutputMode::Json, "https://www.example.org")
//!     .await?;
//! ```

pub mod enumerate;
pub mod probe;
pub mod render;
pub mod reporter;

// Convenience re-exports.
pub use enumerate::{enumerate, ProbeTarget};
pub use probe::{ProbeResult, Prober};
pub use render::{OutputMode, Rendered};
pub use reporter::{HealthReport, Scanner};
