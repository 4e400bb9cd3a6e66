//! Test fixtures for Corona development.
//!
//! Builders for primitive fields and staggered magnetic fields on a
//! [`Grid`], plus helpers for running one global problem on several
//! ranks. Every fixture is a function of global coordinates, so blocks of
//! a decomposed domain see exactly the values of the undecomposed one,
//! ghost zones included.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use corona_core::{Array3, Dir};
use corona_grid::{CartTopology, Grid, GridSpec};

pub use fixtures::{
    discontinuity, fill_global, shearing_box, staggered_from_potential, state, uniform,
    wavy_potential, ShearingBox,
};

/// Every rank's block of `spec` under `topo`, in rank order.
pub fn blocks(spec: &GridSpec, topo: &CartTopology) -> Vec<Grid> {
    (0..topo.size())
        .map(|r| Grid::block(spec, topo, r).expect("valid decomposition"))
        .collect()
}

/// Largest absolute difference between two scalar fields of equal shape.
pub fn max_abs_diff(a: &Array3<f64>, b: &Array3<f64>) -> f64 {
    assert_eq!(a.shape(), b.shape());
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .fold(0.0, |m, (x, y)| m.max((x - y).abs()))
}

/// Iterate the interior cells of `grid` as `(k, j, i)`.
pub fn interior(grid: &Grid) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    let (ks, ke) = (grid.beg(Dir::X3), grid.end(Dir::X3));
    let (js, je) = (grid.beg(Dir::X2), grid.end(Dir::X2));
    let (is, ie) = (grid.beg(Dir::X1), grid.end(Dir::X1));
    (ks..ke).flat_map(move |k| (js..je).flat_map(move |j| (is..ie).map(move |i| (k, j, i))))
}
