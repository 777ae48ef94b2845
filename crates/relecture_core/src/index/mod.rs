//! In-memory queries over a loaded link snapshot.

pub mod link_index;
