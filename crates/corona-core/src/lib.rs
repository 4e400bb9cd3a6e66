//! Core types for the Corona finite-volume MHD flux core.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the sweep directions and faces, the variable layout shared by primitive
//! and conserved states, the [`Array3`] field storage, and the error
//! taxonomy used throughout the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dir;
pub mod error;
pub mod field;
pub mod var;

pub use dir::{Dir, Face};
pub use error::{ConfigError, ExchangeError, StageError};
pub use field::Array3;
pub use var::{VarVec, BX1, BX2, BX3, ENG, MX1, MX2, MX3, NVAR, PRS, RHO, VX1, VX2, VX3};
