//! In-process exchange runtime: one [`LocalComm`] per rank, ranks on threads.

use crossbeam_channel::{bounded, Receiver, Sender};

use corona_core::{Dir, ExchangeError, Face};
use corona_grid::CartTopology;

use crate::channel::{Communicator, PersistentChannel};

type Link = (Sender<Vec<f64>>, Receiver<Vec<f64>>);

/// Communicator for ranks that live in the same process.
///
/// Built in one go for every rank of a topology by [`LocalComm::world`];
/// each communicator is then moved onto its rank's thread.
pub struct LocalComm {
    rank: usize,
    topology: CartTopology,
    links: [[Option<Link>; 2]; 3],
}

impl LocalComm {
    /// Create the communicators of every rank in `topology`, fully linked.
    ///
    /// Each neighbour pairing gets a bounded(1) queue in each direction,
    /// so at most one message per channel is ever in flight.
    pub fn world(topology: &CartTopology) -> Vec<LocalComm> {
        let size = topology.size();
        let mut senders: Vec<[[Option<Sender<Vec<f64>>>; 2]; 3]> =
            (0..size).map(|_| Default::default()).collect();
        let mut receivers: Vec<[[Option<Receiver<Vec<f64>>>; 2]; 3]> =
            (0..size).map(|_| Default::default()).collect();

        for rank in 0..size {
            for dir in Dir::ALL {
                for face in Face::BOTH {
                    if let Some(peer) = topology.neighbour(rank, dir, face) {
                        let (tx, rx) = bounded(1);
                        senders[rank][dir.index()][face.index()] = Some(tx);
                        receivers[peer][dir.index()][face.opposite().index()] = Some(rx);
                    }
                }
            }
        }

        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (mut tx, mut rx))| {
                let mut links: [[Option<Link>; 2]; 3] = Default::default();
                for d in 0..3 {
                    for f in 0..2 {
                        if let (Some(s), Some(r)) = (tx[d][f].take(), rx[d][f].take()) {
                            links[d][f] = Some((s, r));
                        }
                    }
                }
                LocalComm {
                    rank,
                    topology: topology.clone(),
                    links,
                }
            })
            .collect()
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn topology(&self) -> &CartTopology {
        &self.topology
    }

    fn open_channel(
        &mut self,
        dir: Dir,
        face: Face,
        len: usize,
    ) -> Result<Option<Box<dyn PersistentChannel>>, ExchangeError> {
        let Some(peer) = self.topology.neighbour(self.rank, dir, face) else {
            return Ok(None);
        };
        let (tx, rx) = self.links[dir.index()][face.index()]
            .take()
            .ok_or(ExchangeError::ChannelUnavailable { dir, face })?;
        log::debug!(
            "rank {}: opened {dir} {face:?} channel to rank {peer} ({len} values)",
            self.rank
        );
        Ok(Some(Box::new(LocalChannel {
            peer,
            len,
            tx,
            rx,
            pool: vec![Vec::with_capacity(len)],
        })))
    }
}

/// One persistent channel of a [`LocalComm`].
///
/// Message buffers circulate: a buffer received from the peer is kept and
/// reused for the next send, so steady-state exchange does not allocate.
pub struct LocalChannel {
    peer: usize,
    len: usize,
    tx: Sender<Vec<f64>>,
    rx: Receiver<Vec<f64>>,
    pool: Vec<Vec<f64>>,
}

impl PersistentChannel for LocalChannel {
    fn peer(&self) -> usize {
        self.peer
    }

    fn len(&self) -> usize {
        self.len
    }

    fn post_send(&mut self, buf: &[f64]) -> Result<(), ExchangeError> {
        if buf.len() != self.len {
            return Err(ExchangeError::SizeMismatch {
                expected: self.len,
                got: buf.len(),
            });
        }
        let mut msg = self
            .pool
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.len));
        msg.clear();
        msg.extend_from_slice(buf);
        self.tx
            .send(msg)
            .map_err(|_| ExchangeError::Disconnected { peer: self.peer })
    }

    fn wait_recv(&mut self, buf: &mut [f64]) -> Result<(), ExchangeError> {
        if buf.len() != self.len {
            return Err(ExchangeError::SizeMismatch {
                expected: self.len,
                got: buf.len(),
            });
        }
        let msg = self
            .rx
            .recv()
            .map_err(|_| ExchangeError::Disconnected { peer: self.peer })?;
        if msg.len() != self.len {
            return Err(ExchangeError::SizeMismatch {
                expected: self.len,
                got: msg.len(),
            });
        }
        buf.copy_from_slice(&msg);
        self.pool.push(msg);
        Ok(())
    }
}

impl Drop for LocalChannel {
    fn drop(&mut self) {
        log::debug!("releasing persistent channel to rank {}", self.peer);
    }
}

/// Run `f` once per rank of `topology`, each on its own scoped thread, and
/// collect the results in rank order.
///
/// A panic on any rank is resumed on the calling thread.
pub fn spawn_world<T, F>(topology: &CartTopology, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(LocalComm) -> T + Sync,
{
    let comms = LocalComm::world(topology);
    std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                let f = &f;
                s.spawn(move || f(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(v) => v,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_grid::Boundary;
    use proptest::prelude::*;

    fn ring(n: usize) -> CartTopology {
        CartTopology::new([n, 1, 1], [Boundary::Periodic; 3]).unwrap()
    }

    #[test]
    fn open_edge_has_no_channel() {
        let topo = CartTopology::new([2, 1, 1], [Boundary::Open; 3]).unwrap();
        let mut comms = LocalComm::world(&topo);
        assert!(comms[0].open_channel(Dir::X1, Face::Left, 4).unwrap().is_none());
        assert!(comms[0].open_channel(Dir::X1, Face::Right, 4).unwrap().is_some());
    }

    #[test]
    fn channel_opens_once() {
        let mut comms = LocalComm::world(&ring(2));
        assert!(comms[0].open_channel(Dir::X1, Face::Left, 1).is_ok());
        let err = comms[0].open_channel(Dir::X1, Face::Left, 1).err();
        assert_eq!(
            err,
            Some(ExchangeError::ChannelUnavailable {
                dir: Dir::X1,
                face: Face::Left
            })
        );
    }

    #[test]
    fn self_neighbour_loops_back() {
        let mut comms = LocalComm::world(&CartTopology::single());
        let comm = &mut comms[0];
        let mut left = comm.open_channel(Dir::X2, Face::Left, 2).unwrap().unwrap();
        let mut right = comm.open_channel(Dir::X2, Face::Right, 2).unwrap().unwrap();
        left.post_send(&[1.0, 2.0]).unwrap();
        right.post_send(&[3.0, 4.0]).unwrap();
        let mut buf = [0.0; 2];
        right.wait_recv(&mut buf).unwrap();
        assert_eq!(buf, [1.0, 2.0]);
        left.wait_recv(&mut buf).unwrap();
        assert_eq!(buf, [3.0, 4.0]);
    }

    #[test]
    fn size_mismatch_rejected() {
        let mut comms = LocalComm::world(&ring(2));
        let mut ch = comms[0].open_channel(Dir::X1, Face::Right, 3).unwrap().unwrap();
        assert_eq!(
            ch.post_send(&[1.0]),
            Err(ExchangeError::SizeMismatch {
                expected: 3,
                got: 1
            })
        );
    }

    #[test]
    fn dropped_peer_is_disconnected() {
        let mut comms = LocalComm::world(&ring(2));
        let mut ch = comms[0].open_channel(Dir::X1, Face::Right, 1).unwrap().unwrap();
        drop(comms.pop());
        let mut buf = [0.0];
        assert_eq!(
            ch.wait_recv(&mut buf),
            Err(ExchangeError::Disconnected { peer: 1 })
        );
    }

    #[test]
    fn ring_exchange_on_threads() {
        let topo = ring(4);
        let results = spawn_world(&topo, |mut comm| {
            let rank = comm.rank() as f64;
            let mut left = comm.open_channel(Dir::X1, Face::Left, 1).unwrap().unwrap();
            let mut right = comm.open_channel(Dir::X1, Face::Right, 1).unwrap().unwrap();
            let mut got = (0.0, 0.0);
            for step in 0..3 {
                let payload = rank + 10.0 * step as f64;
                left.post_send(&[payload]).unwrap();
                right.post_send(&[payload]).unwrap();
                let mut a = [0.0];
                let mut b = [0.0];
                left.wait_recv(&mut a).unwrap();
                right.wait_recv(&mut b).unwrap();
                got = (a[0], b[0]);
            }
            got
        });
        for (rank, (from_left, from_right)) in results.into_iter().enumerate() {
            let l = (rank + 3) % 4;
            let r = (rank + 1) % 4;
            assert_eq!(from_left, l as f64 + 20.0);
            assert_eq!(from_right, r as f64 + 20.0);
        }
    }

    proptest! {
        #[test]
        fn every_neighbour_has_a_channel(
            ranks in prop::array::uniform3(1usize..4),
            periodic in prop::array::uniform3(any::<bool>()),
        ) {
            let bounds = periodic.map(|p| if p { Boundary::Periodic } else { Boundary::Open });
            let topo = CartTopology::new(ranks, bounds).unwrap();
            for mut comm in LocalComm::world(&topo) {
                let rank = comm.rank();
                for dir in Dir::ALL {
                    for face in Face::BOTH {
                        let ch = comm.open_channel(dir, face, 1).unwrap();
                        let peer = topo.neighbour(rank, dir, face);
                        prop_assert_eq!(ch.map(|c| c.peer()), peer);
                    }
                }
            }
        }

        #[test]
        fn messages_arrive_in_post_order(
            msgs in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 5), 1..8),
        ) {
            let mut comms = LocalComm::world(&CartTopology::single());
            let comm = &mut comms[0];
            let mut left = comm.open_channel(Dir::X1, Face::Left, 5).unwrap().unwrap();
            let mut right = comm.open_channel(Dir::X1, Face::Right, 5).unwrap().unwrap();
            let mut buf = [0.0; 5];
            for m in &msgs {
                left.post_send(m).unwrap();
                right.wait_recv(&mut buf).unwrap();
                prop_assert_eq!(&buf[..], &m[..]);
            }
        }
    }
}
