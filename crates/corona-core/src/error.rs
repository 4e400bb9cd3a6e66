//! Error types for the Corona flux core.
//!
//! Organized by subsystem: configuration (detected once at startup) and
//! distributed exchange (detected during a sub-step). Both are fatal;
//! numerical pathologies are not reported here.

use std::error::Error;
use std::fmt;

use crate::dir::{Dir, Face};

/// Errors detected while validating a run configuration.
///
/// Every variant is fatal: a run never starts with a configuration that
/// failed validation.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A scheme name did not match any known flux scheme.
    UnknownScheme {
        /// The name that failed to parse.
        name: String,
    },
    /// The selected scheme cannot handle the selected physics
    /// (e.g. a hydro-only scheme for a magnetized run).
    UnsupportedScheme {
        /// Name of the selected scheme.
        scheme: &'static str,
        /// Name of the physics module.
        physics: &'static str,
    },
    /// Adiabatic index must be finite and strictly above one.
    InvalidGamma {
        /// The rejected value.
        value: f64,
    },
    /// An isothermal run was configured without a sound speed.
    MissingSoundSpeed,
    /// A non-ideal MHD term was requested for a hydrodynamic run.
    NonIdealWithoutMhd {
        /// Name of the offending term.
        term: &'static str,
    },
    /// A diffusion coefficient is negative or not finite.
    InvalidCoefficient {
        /// Name of the offending term.
        term: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The frame-shift profile does not fit the grid.
    FrameShiftMismatch {
        /// Expected profile length.
        expected: usize,
        /// Supplied profile length.
        got: usize,
    },
    /// Shock-flattening threshold must be finite and positive.
    InvalidThreshold {
        /// The rejected value.
        value: f64,
    },
    /// EMF tie weight must lie in `[0, 1]`.
    InvalidTieWeight {
        /// The rejected value.
        value: f64,
    },
    /// The grid or rank topology is inconsistent with the run.
    Topology {
        /// Description of the inconsistency.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScheme { name } => write!(f, "unknown flux scheme '{name}'"),
            Self::UnsupportedScheme { scheme, physics } => {
                write!(f, "flux scheme {scheme} does not support {physics} physics")
            }
            Self::InvalidGamma { value } => {
                write!(f, "adiabatic index must be finite and > 1, got {value}")
            }
            Self::MissingSoundSpeed => f.write_str("isothermal physics needs a sound speed"),
            Self::NonIdealWithoutMhd { term } => {
                write!(f, "{term} requires MHD physics")
            }
            Self::InvalidCoefficient { term, value } => {
                write!(f, "{term} coefficient must be finite and >= 0, got {value}")
            }
            Self::FrameShiftMismatch { expected, got } => {
                write!(f, "frame-shift profile has {got} entries, grid needs {expected}")
            }
            Self::InvalidThreshold { value } => {
                write!(f, "shock threshold must be finite and > 0, got {value}")
            }
            Self::InvalidTieWeight { value } => {
                write!(f, "EMF tie weight must be in [0, 1], got {value}")
            }
            Self::Topology { reason } => write!(f, "invalid topology: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Errors from the point-to-point exchange runtime.
///
/// A failed exchange leaves the edge EMFs on this rank inconsistent with
/// its neighbours, which cannot be repaired locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// The peer's end of the channel has been dropped.
    Disconnected {
        /// Rank of the peer.
        peer: usize,
    },
    /// A received buffer did not have the registered length.
    SizeMismatch {
        /// Registered buffer length.
        expected: usize,
        /// Length actually received or supplied.
        got: usize,
    },
    /// The channel for this axis and face was already opened or never existed.
    ChannelUnavailable {
        /// Axis of the channel.
        dir: Dir,
        /// Face of the channel.
        face: Face,
    },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { peer } => write!(f, "peer rank {peer} disconnected"),
            Self::SizeMismatch { expected, got } => {
                write!(f, "exchange buffer length {got}, expected {expected}")
            }
            Self::ChannelUnavailable { dir, face } => {
                write!(f, "no channel available for {dir} {face:?}")
            }
        }
    }
}

impl Error for ExchangeError {}

/// Errors surfaced by a flux sub-step.
#[derive(Clone, Debug, PartialEq)]
pub enum StageError {
    /// The stage was built from an invalid configuration.
    Config(ConfigError),
    /// The rank-boundary EMF exchange failed.
    Exchange(ExchangeError),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Exchange(e) => write!(f, "exchange: {e}"),
        }
    }
}

impl Error for StageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Exchange(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StageError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ExchangeError> for StageError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_descriptive() {
        let e = ConfigError::UnsupportedScheme {
            scheme: "HLLC",
            physics: "MHD",
        };
        assert_eq!(e.to_string(), "flux scheme HLLC does not support MHD physics");
        let e = ExchangeError::Disconnected { peer: 3 };
        assert_eq!(e.to_string(), "peer rank 3 disconnected");
    }

    #[test]
    fn stage_error_wraps_source() {
        let e: StageError = ExchangeError::SizeMismatch {
            expected: 4,
            got: 2,
        }
        .into();
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("exchange:"));
    }
}
