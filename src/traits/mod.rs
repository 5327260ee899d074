//! # Collaborator Traits
//!
//! The seams where an inode meets the filesystem that owns it.
//!
//! | Trait | Supplied by | Default implementations |
//! |-------|-------------|-------------------------|
//! | [`Clock`] | the filesystem | [`SystemClock`], [`SimulatedClock`] |
//! | [`DirentEncoder`] | the protocol layer | [`FuseDirentEncoder`] |
//!
//! ## Thread Safety
//!
//! Both traits require `Send + Sync`, because inodes are shared across
//! request-handling threads.

mod clock;
mod dirent_encoder;

pub use clock::{Clock, SimulatedClock, SystemClock};
pub use dirent_encoder::{DirentEncoder, FuseDirentEncoder};
