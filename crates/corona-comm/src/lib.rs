//! Point-to-point exchange primitive for Corona.
//!
//! The flux core only needs persistent send/receive pairs between
//! Cartesian neighbours with explicit post and wait. [`Communicator`] and
//! [`PersistentChannel`] describe that contract; [`LocalComm`] implements
//! it for ranks running as threads of one process, linked by bounded
//! `crossbeam-channel` queues.
//!
//! # Pairing
//!
//! The channel a rank opens for `(dir, face)` talks to the rank behind
//! that face, which in turn uses its `(dir, face.opposite())` channel.
//! Messages in both directions of one pairing travel between the same
//! two ranks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod local;

pub use channel::{Communicator, PersistentChannel};
pub use local::{spawn_world, LocalChannel, LocalComm};
