//! # Report Module
//!
//! Turns a finished snapshot and sentiment board into the static HTML digest
//! and puts it on disk.
//!
//! ## Contained Modules:
//!
//! - **`html`**: Cell formatting and `render_digest`, which fills the
//!   `templates/digest.html` askama template. Cells are auto-escaped.
//! - **`writer`**: `write_report`, which creates missing directories and
//!   writes the page as UTF-8.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Page rendering.
pub mod html;
/// File output.
pub mod writer;

pub use html::{render_digest, DigestReport};
pub use writer::{write_report, ReportError};
