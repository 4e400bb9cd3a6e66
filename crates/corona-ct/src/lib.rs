//! Constrained transport for Corona.
//!
//! The directional fluxes of a sub-step are turned into edge-centered
//! electric fields ([`EmfStage`]), made consistent across rank boundaries
//! by a persistent-channel exchange, and applied to the face-centered
//! magnetic field by [`induction::update_staggered`]. Because every face
//! is updated from the same edge values as its neighbours, the discrete
//! divergence of the staggered field is preserved to rounding.
//!
//! Constrained transport needs at least two active axes. In 2-D only
//! `ez` exists and the out-of-plane field stays cell-centered.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod emf;
pub mod exchange;
pub mod induction;

pub use emf::{EdgeEmf, EmfConfig, EmfStage};
pub use exchange::EmfExchange;
pub use induction::{average_to_cells, divergence, max_divergence, update_staggered, Staggered};
