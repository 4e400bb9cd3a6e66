//! Corona: the finite-volume flux core of a magnetohydrodynamics code.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Corona sub-crates. For most users, adding `corona` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use corona::prelude::*;
//!
//! // A 2-D periodic block of 16x16 cells on a single rank.
//! let grid = Grid::single(&GridSpec::new(2, [16, 16, 1])).unwrap();
//! let config = RunConfig::default().with_scheme(Scheme::Hlld);
//! let mut stage = FluxStage::new(config, &grid, None).unwrap();
//!
//! // Uniform magnetized flow.
//! let w = {
//!     let mut w = [0.0; NVAR];
//!     w[RHO] = 1.0;
//!     w[VX1] = 0.5;
//!     w[BX1] = 0.3;
//!     w[BX3] = 0.2;
//!     w[PRS] = 1.0;
//!     w
//! };
//! let mut prim = Array3::new(grid.shape(), w);
//! let out = stage.run(StageInput::new(&mut prim), SubStep::Explicit).unwrap();
//! assert_eq!(out.fluxes.len(), 2);
//! assert!(out.edges.is_some());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `corona-core` | Directions, variable slots, 3-D arrays, errors |
//! | [`grid`] | `corona-grid` | Block geometry and Cartesian rank topology |
//! | [`comm`] | `corona-comm` | Persistent neighbour channels and the in-process world |
//! | [`flux`] | `corona-flux` | Physics, Riemann schemes, shock detection, dispatch |
//! | [`parabolic`] | `corona-parabolic` | Diffusive terms and the frame shift |
//! | [`ct`] | `corona-ct` | Edge EMFs, their exchange and the staggered update |
//! | [`engine`] | `corona-engine` | Run configuration and the per-sub-step flux stage |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Directions, variable slots, arrays and errors (`corona-core`).
///
/// Contains [`types::Dir`], the [`types::VarVec`] slot constants,
/// [`types::Array3`] and the error enums shared by every crate.
pub use corona_core as types;

/// Block geometry and rank topology (`corona-grid`).
///
/// [`grid::GridSpec`] describes the global domain, [`grid::CartTopology`]
/// its decomposition and [`grid::Grid`] one rank's block with ghosts.
pub use corona_grid as grid;

/// Neighbour communication (`corona-comm`).
///
/// The [`comm::Communicator`] trait opens [`comm::PersistentChannel`]s;
/// [`comm::spawn_world`] runs one thread per rank over in-process channels.
pub use corona_comm as comm;

/// Riemann dispatch (`corona-flux`).
///
/// [`flux::Physics`], the [`flux::Scheme`] family, the
/// [`flux::ShockDetector`] and the [`flux::RiemannDispatcher`] sweep.
pub use corona_flux as flux;

/// Diffusive fluxes (`corona-parabolic`).
///
/// [`parabolic::DiffusiveFluxAccumulator`] adds viscous, resistive and
/// non-ideal fluxes; [`parabolic::FrameShift`] removes a background flow
/// around the viscous pass.
pub use corona_parabolic as parabolic;

/// Constrained transport (`corona-ct`).
///
/// [`ct::EmfStage`] reduces face fluxes to edge EMFs and exchanges shared
/// edges; [`ct::update_staggered`] advances the face-centered field.
pub use corona_ct as ct;

/// Flux stage orchestration (`corona-engine`).
///
/// [`engine::RunConfig`] validates a run once; [`engine::FluxStage`]
/// executes sub-steps.
pub use corona_engine as engine;

/// Common imports for typical Corona usage.
///
/// ```rust
/// use corona::prelude::*;
/// ```
///
/// This imports the configuration builders, the stage, the grid types and
/// the error enums.
pub mod prelude {
    // Core types
    pub use corona_core::{
        Array3, Dir, Face, VarVec, BX1, BX2, BX3, ENG, MX1, MX2, MX3, NVAR, PRS, RHO, VX1, VX2,
        VX3,
    };

    // Errors
    pub use corona_core::{ConfigError, ExchangeError, StageError};
    pub use corona_grid::GridError;

    // Grid and communication
    pub use corona_comm::{spawn_world, Communicator, LocalComm};
    pub use corona_grid::{Boundary, CartTopology, Grid, GridSpec};

    // Physics and schemes
    pub use corona_flux::{Physics, Scheme, SoundSpeed};

    // Diffusive terms
    pub use corona_parabolic::{
        DiffusiveTerm, FrameShift, ParabolicConfig, SubStep, Treatment, Viscosity,
    };

    // Constrained transport
    pub use corona_ct::{update_staggered, EdgeEmf, EmfConfig, Staggered};

    // Engine
    pub use corona_engine::{
        conservative_update, FluxStage, RunConfig, SourceTerms, StageInput, StageMetrics,
        StageOutput,
    };
}
