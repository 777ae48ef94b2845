//! Review (relecture) surface.
//!
//! # Responsibility
//! - Hold the explicit review state (view mode, hovered entry).
//! - Lay out a loaded snapshot under the selected view mode.
//! - Drive the link-authoring panel and the gentle reminder.
//!
//! # Invariants
//! - Everything here is pure over an already-loaded snapshot, except the
//!   authoring panel's submit which delegates one write to `LinkService`.
//! - Missing link endpoints are skipped, never a panic.

pub mod authoring;
pub mod layout;
pub mod mode;
pub mod reminder;
