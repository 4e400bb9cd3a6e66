//! Face states and first-order reconstruction.

use rayon::prelude::*;

use corona_core::var::mag;
use corona_core::{Array3, Dir, VarVec, NVAR};
use corona_grid::Grid;

/// Primitive states on either side of every face normal to one direction.
///
/// `left[(k, j, i)]` and `right[(k, j, i)]` belong to the lower face of
/// cell `(k, j, i)`.
#[derive(Clone, Debug)]
pub struct FaceStates {
    /// State on the lower-index side.
    pub left: Array3<VarVec>,
    /// State on the upper-index side.
    pub right: Array3<VarVec>,
}

impl FaceStates {
    /// Zeroed states for blocks shaped like `grid`.
    pub fn new(grid: &Grid) -> Self {
        let shape = grid.shape();
        Self {
            left: Array3::new(shape, [0.0; NVAR]),
            right: Array3::new(shape, [0.0; NVAR]),
        }
    }

    /// Array shape `[nk, nj, ni]`.
    pub fn shape(&self) -> [usize; 3] {
        self.left.shape()
    }
}

/// Donor-cell (piecewise constant) reconstruction along `dir`.
///
/// The left state of a face is the cell below it and the right state the
/// cell above. Faces on the first layer have no cell below and copy the
/// cell above to both sides. When `staggered` holds the face-centered
/// normal field it replaces the normal component of both states.
pub fn donor_cell(
    prim: &Array3<VarVec>,
    grid: &Grid,
    dir: Dir,
    staggered: Option<&Array3<f64>>,
    states: &mut FaceStates,
) {
    let shape = grid.shape();
    let (nj, ni) = (shape[1], shape[2]);
    let (dk, dj, di) = dir.offset();
    let bn = mag(dir);

    states
        .left
        .as_mut_slice()
        .par_chunks_mut(ni)
        .zip(states.right.as_mut_slice().par_chunks_mut(ni))
        .enumerate()
        .for_each(|(row, (left, right))| {
            let (k, j) = (row / nj, row % nj);
            for i in 0..ni {
                let idx = [i, j, k][dir.index()];
                let upper = prim[(k, j, i)];
                let lower = if idx > 0 {
                    prim[(k - dk, j - dj, i - di)]
                } else {
                    upper
                };
                left[i] = lower;
                right[i] = upper;
                if let Some(bs) = staggered {
                    left[i][bn] = bs[(k, j, i)];
                    right[i][bn] = bs[(k, j, i)];
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{BX2, RHO};
    use corona_grid::GridSpec;

    #[test]
    fn donor_cell_picks_neighbours() {
        let g = Grid::single(&GridSpec::new(2, [4, 4, 1])).unwrap();
        let prim = Array3::from_fn(g.shape(), |_, j, i| {
            let mut w = [0.0; NVAR];
            w[RHO] = (10 * j + i) as f64;
            w
        });
        let mut st = FaceStates::new(&g);
        donor_cell(&prim, &g, Dir::X2, None, &mut st);
        assert_eq!(st.left[(0, 3, 2)][RHO], 22.0);
        assert_eq!(st.right[(0, 3, 2)][RHO], 32.0);
        assert_eq!(st.left[(0, 0, 5)][RHO], 5.0);

        let bs = Array3::new(g.shape(), 0.25);
        donor_cell(&prim, &g, Dir::X2, Some(&bs), &mut st);
        assert_eq!(st.left[(0, 3, 2)][BX2], 0.25);
        assert_eq!(st.right[(0, 3, 2)][BX2], 0.25);
    }
}
