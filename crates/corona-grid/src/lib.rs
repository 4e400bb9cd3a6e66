//! Block geometry and rank topology for Corona.
//!
//! A run covers a uniform Cartesian domain ([`GridSpec`]) split across a
//! Cartesian arrangement of ranks ([`CartTopology`]). Each rank owns one
//! [`Grid`]: its interior cells plus ghost layers on every active axis.
//!
//! # Index conventions
//!
//! Arrays are stored `(k, j, i)`. On an active axis `d` the interior
//! occupies `beg(d)..end(d)`; face index `n` along `d` is the lower face
//! of cell `n`, so the interior faces are `beg(d)..=end(d)`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod error;
pub mod grid;
pub mod topology;

pub use boundary::Boundary;
pub use error::GridError;
pub use grid::{Grid, GridSpec};
pub use topology::CartTopology;
