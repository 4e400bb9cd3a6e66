//! The [`Communicator`] and [`PersistentChannel`] traits.

use corona_core::{Dir, ExchangeError, Face};
use corona_grid::CartTopology;

/// A pre-registered send/receive pair with one neighbour rank.
///
/// # Contract
///
/// - A channel is opened once and reused every step; dropping it releases it.
/// - `post_send` never blocks on the peer's progress beyond one message
///   in flight.
/// - `wait_recv` blocks until the peer's matching post arrives. There is no
///   timeout: a stalled peer stalls this rank.
/// - Messages are delivered in post order.
pub trait PersistentChannel: Send {
    /// Rank of the peer.
    fn peer(&self) -> usize;

    /// Registered message length in `f64` values.
    fn len(&self) -> usize;

    /// `true` for a zero-length registration.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Post `buf` to the peer.
    ///
    /// Returns `Err(ExchangeError::SizeMismatch)` if `buf` does not have
    /// the registered length, or `Err(ExchangeError::Disconnected)` if the
    /// peer released its end.
    fn post_send(&mut self, buf: &[f64]) -> Result<(), ExchangeError>;

    /// Wait for the peer's next message and copy it into `buf`.
    fn wait_recv(&mut self, buf: &mut [f64]) -> Result<(), ExchangeError>;
}

/// Access to the distributed runtime of one rank.
pub trait Communicator: Send {
    /// This rank's index in the topology.
    fn rank(&self) -> usize;

    /// The Cartesian topology shared by all ranks.
    fn topology(&self) -> &CartTopology;

    /// Register a persistent channel with the neighbour behind `face`
    /// along `dir`, carrying messages of `len` values.
    ///
    /// Returns `Ok(None)` when no neighbour exists (open domain edge).
    fn open_channel(
        &mut self,
        dir: Dir,
        face: Face,
        len: usize,
    ) -> Result<Option<Box<dyn PersistentChannel>>, ExchangeError>;
}
