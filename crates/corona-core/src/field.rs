//! Dense three-dimensional field storage.
//!
//! [`Array3`] stores one value per grid location in `(k, j, i)` order
//! with `i` fastest. Cell-, face- and edge-centered quantities all use
//! the same storage; the location a given index refers to is a
//! convention of the owning component.

use std::ops::{Index, IndexMut};

/// A dense 3-D array indexed by `(k, j, i)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Array3<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T: Clone> Array3<T> {
    /// Allocate an array of shape `[nk, nj, ni]` filled with `value`.
    pub fn new(shape: [usize; 3], value: T) -> Self {
        let len = shape[0] * shape[1] * shape[2];
        Self {
            shape,
            data: vec![value; len],
        }
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Array3<T> {
    /// Build an array by evaluating `f(k, j, i)` at every location.
    pub fn from_fn(shape: [usize; 3], mut f: impl FnMut(usize, usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(shape[0] * shape[1] * shape[2]);
        for k in 0..shape[0] {
            for j in 0..shape[1] {
                for i in 0..shape[2] {
                    data.push(f(k, j, i));
                }
            }
        }
        Self { shape, data }
    }

    /// Shape as `[nk, nj, ni]`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if any extent is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of elements in one `k` slab (`nj * ni`).
    #[inline]
    pub fn slab_len(&self) -> usize {
        self.shape[1] * self.shape[2]
    }

    /// Flat offset of `(k, j, i)`.
    #[inline]
    pub fn offset(&self, k: usize, j: usize, i: usize) -> usize {
        debug_assert!(
            k < self.shape[0] && j < self.shape[1] && i < self.shape[2],
            "index ({k}, {j}, {i}) out of bounds for shape {:?}",
            self.shape
        );
        (k * self.shape[1] + j) * self.shape[2] + i
    }

    /// Inverse of [`offset`](Self::offset).
    #[inline]
    pub fn coords(&self, offset: usize) -> (usize, usize, usize) {
        let i = offset % self.shape[2];
        let rest = offset / self.shape[2];
        (rest / self.shape[1], rest % self.shape[1], i)
    }

    /// Borrow the element at `(k, j, i)`, or `None` when out of bounds.
    pub fn get(&self, k: usize, j: usize, i: usize) -> Option<&T> {
        if k < self.shape[0] && j < self.shape[1] && i < self.shape[2] {
            Some(&self.data[(k * self.shape[1] + j) * self.shape[2] + i])
        } else {
            None
        }
    }

    /// Flat view of the storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat view of the storage.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate over `(k, j, i, &value)`.
    pub fn indexed_iter(&self) -> impl Iterator<Item = ((usize, usize, usize), &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(n, v)| (self.coords(n), v))
    }
}

impl<T> Index<(usize, usize, usize)> for Array3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (k, j, i): (usize, usize, usize)) -> &T {
        &self.data[self.offset(k, j, i)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Array3<T> {
    #[inline]
    fn index_mut(&mut self, (k, j, i): (usize, usize, usize)) -> &mut T {
        let n = self.offset(k, j, i);
        &mut self.data[n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_fills_every_element() {
        let a = Array3::new([2, 3, 4], 1.5f64);
        assert_eq!(a.len(), 24);
        assert_eq!(a.slab_len(), 12);
        assert!(a.as_slice().iter().all(|&v| v == 1.5));
    }

    #[test]
    fn from_fn_uses_kji_order() {
        let a = Array3::from_fn([2, 2, 3], |k, j, i| k * 100 + j * 10 + i);
        assert_eq!(a[(1, 0, 2)], 102);
        assert_eq!(a.as_slice()[1], 1);
        assert_eq!(a.as_slice()[3], 10);
    }

    #[test]
    fn get_is_bounds_checked() {
        let a = Array3::new([1, 1, 1], 0u8);
        assert!(a.get(0, 0, 0).is_some());
        assert!(a.get(0, 1, 0).is_none());
    }

    #[test]
    fn index_mut_writes_through() {
        let mut a = Array3::new([2, 2, 2], 0i32);
        a[(1, 1, 0)] = 7;
        assert_eq!(a.as_slice()[a.offset(1, 1, 0)], 7);
        a.fill(3);
        assert_eq!(a[(1, 1, 0)], 3);
    }

    proptest! {
        #[test]
        fn offset_coords_round_trip(
            nk in 1usize..6, nj in 1usize..6, ni in 1usize..6,
            k in 0usize..6, j in 0usize..6, i in 0usize..6,
        ) {
            let a = Array3::new([nk, nj, ni], 0u8);
            let (k, j, i) = (k % nk, j % nj, i % ni);
            prop_assert_eq!(a.coords(a.offset(k, j, i)), (k, j, i));
        }
    }
}
