//! Core use-case services.
//!
//! # Responsibility
//! - Turn repository calls into use-case APIs scoped by the signed-in
//!   session.
//! - Validate input before any storage call and log failures at the call
//!   site.
//!
//! # Invariants
//! - Services never bypass repository validation contracts.
//! - Services stay storage-agnostic (generic over repository traits).

pub mod entry_service;
pub mod link_service;
pub mod review_service;
