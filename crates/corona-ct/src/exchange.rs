//! Rank-boundary exchange of edge EMFs.
//!
//! An edge on a block boundary plane is computed independently by every
//! rank that shares it. After the exchange each copy holds
//! `0.5 * (local + remote)`, which is bit-identical on both sides.
//! Axes are processed in the fixed order X1, X2, X3; an edge on a block
//! corner is averaged again by each later axis, so all of its copies end
//! up identical.

use std::fmt;
use std::ops::Range;

use smallvec::SmallVec;

use corona_comm::{Communicator, PersistentChannel};
use corona_core::{Array3, Dir, ExchangeError, Face};
use corona_grid::Grid;

use crate::emf::{edge_components, EdgeEmf};

/// Persistent exchange channels and buffers of one EMF stage.
pub struct EmfExchange {
    axes: SmallVec<[AxisExchange; 3]>,
}

struct AxisExchange {
    axis: Dir,
    /// Edge components lying on the planes normal to `axis`, in pack order.
    components: SmallVec<[Dir; 2]>,
    channels: [Option<Box<dyn PersistentChannel>>; 2],
    send: [Vec<f64>; 2],
    recv: [Vec<f64>; 2],
}

impl EmfExchange {
    /// Open one channel per axis and face with a neighbour and allocate the
    /// buffers. Axes without any neighbour are left out.
    pub fn new(comm: &mut dyn Communicator, grid: &Grid) -> Result<Self, ExchangeError> {
        let edge = edge_components(grid.dims());
        let mut axes = SmallVec::new();
        for axis in grid.active_dirs() {
            let components: SmallVec<[Dir; 2]> =
                edge.iter().copied().filter(|&c| c != axis).collect();
            let len = components
                .iter()
                .map(|&c| plane_len(grid, axis, c))
                .sum();
            let mut channels: [Option<Box<dyn PersistentChannel>>; 2] = [None, None];
            for face in Face::BOTH {
                channels[face.index()] = comm.open_channel(axis, face, len)?;
            }
            if channels.iter().all(Option::is_none) {
                continue;
            }
            axes.push(AxisExchange {
                axis,
                components,
                channels,
                send: [vec![0.0; len], vec![0.0; len]],
                recv: [vec![0.0; len], vec![0.0; len]],
            });
        }
        Ok(Self { axes })
    }

    /// Number of open channels.
    pub fn channel_count(&self) -> usize {
        self.axes
            .iter()
            .map(|x| x.channels.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    /// Message length on `axis`, or `None` if the axis exchanges nothing.
    pub fn message_len(&self, axis: Dir) -> Option<usize> {
        self.axes
            .iter()
            .find(|x| x.axis == axis)
            .map(|x| x.send[0].len())
    }

    /// Exchange and average the boundary-plane edges of `edges`.
    ///
    /// For each axis every send buffer is packed and posted before any
    /// receive is awaited, and nothing is unpacked before all receives of
    /// the axis have completed.
    pub fn run(&mut self, grid: &Grid, edges: &mut EdgeEmf) -> Result<(), ExchangeError> {
        for x in &mut self.axes {
            for face in Face::BOTH {
                let f = face.index();
                if x.channels[f].is_some() {
                    pack(grid, x.axis, face, &x.components, edges, &mut x.send[f]);
                }
            }
            for (ch, buf) in x.channels.iter_mut().zip(&x.send) {
                if let Some(ch) = ch {
                    ch.post_send(buf)?;
                }
            }
            for (ch, buf) in x.channels.iter_mut().zip(&mut x.recv) {
                if let Some(ch) = ch {
                    ch.wait_recv(buf)?;
                }
            }
            for face in Face::BOTH {
                let f = face.index();
                if x.channels[f].is_some() {
                    average(grid, x.axis, face, &x.components, edges, &x.recv[f]);
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EmfExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for x in &self.axes {
            let peers: Vec<Option<usize>> = x
                .channels
                .iter()
                .map(|c| c.as_ref().map(|c| c.peer()))
                .collect();
            list.entry(&(x.axis, peers, x.send[0].len()));
        }
        list.finish()
    }
}

impl Drop for EmfExchange {
    fn drop(&mut self) {
        log::debug!("releasing {} EMF exchange channel(s)", self.channel_count());
    }
}

/// Index ranges `[i, j, k]` of the edges of component `c` on the plane
/// normal to `axis` at index `plane`.
fn plane_ranges(grid: &Grid, axis: Dir, c: Dir, plane: usize) -> [Range<usize>; 3] {
    let range = |d: Dir| {
        if d == axis {
            plane..plane + 1
        } else if d == c {
            grid.beg(d)..grid.end(d)
        } else {
            grid.beg(d)..grid.end(d) + grid.face_offset(d)
        }
    };
    [range(Dir::X1), range(Dir::X2), range(Dir::X3)]
}

fn plane_len(grid: &Grid, axis: Dir, c: Dir) -> usize {
    plane_ranges(grid, axis, c, 0).iter().map(|r| r.len()).product()
}

fn plane_index(grid: &Grid, axis: Dir, face: Face) -> usize {
    match face {
        Face::Left => grid.beg(axis),
        Face::Right => grid.end(axis),
    }
}

/// Visit the plane edges of every component in pack order.
fn for_each_edge(
    grid: &Grid,
    axis: Dir,
    face: Face,
    components: &[Dir],
    mut f: impl FnMut(Dir, (usize, usize, usize)),
) {
    let plane = plane_index(grid, axis, face);
    for &c in components {
        let [ri, rj, rk] = plane_ranges(grid, axis, c, plane);
        for k in rk {
            for j in rj.clone() {
                for i in ri.clone() {
                    f(c, (k, j, i));
                }
            }
        }
    }
}

fn pack(
    grid: &Grid,
    axis: Dir,
    face: Face,
    components: &[Dir],
    edges: &EdgeEmf,
    buf: &mut [f64],
) {
    let mut n = 0;
    for_each_edge(grid, axis, face, components, |c, p| {
        buf[n] = edges.get(c)[p];
        n += 1;
    });
    debug_assert_eq!(n, buf.len());
}

fn average(
    grid: &Grid,
    axis: Dir,
    face: Face,
    components: &[Dir],
    edges: &mut EdgeEmf,
    remote: &[f64],
) {
    let mut n = 0;
    for_each_edge(grid, axis, face, components, |c, p| {
        let e: &mut Array3<f64> = edges.get_mut(c);
        e[p] = 0.5 * (e[p] + remote[n]);
        n += 1;
    });
    debug_assert_eq!(n, remote.len());
}
