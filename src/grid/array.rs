//! Flat-storage 3-D and 2-D arrays.
//!
//! All field data is stored in a single contiguous `Vec` with the innermost
//! (fastest) index along x1, matching the sweep order of the integrator.
//! Indexing is `(k, j, i)` for [`Array3`] and `(k, j)` for [`Array2`].

use std::ops::{Index, IndexMut};

use crate::error::IntegrateError;

/// Dense 3-D array with `(k, j, i)` indexing and x1-contiguous storage.
#[derive(Clone, Debug)]
pub struct Array3<T> {
    data: Vec<T>,
    n1: usize,
    n2: usize,
    n3: usize,
}

impl<T: Clone + Default> Array3<T> {
    /// Allocate a zero-initialised array of extents `(n3, n2, n1)`.
    ///
    /// Reservation is fallible so that an oversized request surfaces as an
    /// [`IntegrateError::Allocation`] instead of aborting the process.
    pub fn new(n3: usize, n2: usize, n1: usize) -> Result<Self, IntegrateError> {
        let len = n1
            .checked_mul(n2)
            .and_then(|n| n.checked_mul(n3))
            .ok_or(IntegrateError::Allocation {
                n1,
                n2,
                n3,
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| IntegrateError::Allocation { n1, n2, n3 })?;
        data.resize(len, T::default());
        Ok(Self { data, n1, n2, n3 })
    }

    /// Reset every entry to the default value.
    pub fn fill_default(&mut self) {
        self.data.fill(T::default());
    }
}

impl<T> Array3<T> {
    /// Extents as `(n3, n2, n1)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.n3, self.n2, self.n1)
    }

    #[inline(always)]
    fn offset(&self, k: usize, j: usize, i: usize) -> usize {
        debug_assert!(i < self.n1 && j < self.n2 && k < self.n3);
        (k * self.n2 + j) * self.n1 + i
    }

    /// Flat view of the storage, x1 fastest.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat view of the storage.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<(usize, usize, usize)> for Array3<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, (k, j, i): (usize, usize, usize)) -> &T {
        &self.data[self.offset(k, j, i)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Array3<T> {
    #[inline(always)]
    fn index_mut(&mut self, (k, j, i): (usize, usize, usize)) -> &mut T {
        let n = self.offset(k, j, i);
        &mut self.data[n]
    }
}

/// Dense 2-D array with `(k, j)` indexing, used for boundary-plane buffers.
#[derive(Clone, Debug)]
pub struct Array2<T> {
    data: Vec<T>,
    n2: usize,
    n3: usize,
}

impl<T: Clone + Default> Array2<T> {
    /// Allocate a zero-initialised array of extents `(n3, n2)`.
    pub fn new(n3: usize, n2: usize) -> Result<Self, IntegrateError> {
        let len = n2.checked_mul(n3).ok_or(IntegrateError::Allocation {
            n1: 1,
            n2,
            n3,
        })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| IntegrateError::Allocation { n1: 1, n2, n3 })?;
        data.resize(len, T::default());
        Ok(Self { data, n2, n3 })
    }
}

impl<T> Array2<T> {
    /// Extents as `(n3, n2)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.n3, self.n2)
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, (k, j): (usize, usize)) -> &T {
        debug_assert!(j < self.n2 && k < self.n3);
        &self.data[k * self.n2 + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2<T> {
    #[inline(always)]
    fn index_mut(&mut self, (k, j): (usize, usize)) -> &mut T {
        debug_assert!(j < self.n2 && k < self.n3);
        &mut self.data[k * self.n2 + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array3_indexing() {
        let mut a: Array3<f64> = Array3::new(2, 3, 4).unwrap();
        assert_eq!(a.dims(), (2, 3, 4));
        a[(1, 2, 3)] = 7.5;
        a[(0, 0, 0)] = -1.0;
        assert_eq!(a[(1, 2, 3)], 7.5);
        assert_eq!(a[(0, 0, 0)], -1.0);
        // Storage is x1-contiguous
        assert_eq!(a.as_slice()[(1 * 3 + 2) * 4 + 3], 7.5);
    }

    #[test]
    fn test_array3_zero_initialised() {
        let a: Array3<f64> = Array3::new(2, 2, 2).unwrap();
        assert!(a.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_array3_fill_default() {
        let mut a: Array3<f64> = Array3::new(1, 1, 4).unwrap();
        a[(0, 0, 2)] = 3.0;
        a.fill_default();
        assert!(a.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_array3_overflow_is_error() {
        let r: Result<Array3<f64>, _> = Array3::new(usize::MAX, usize::MAX, 2);
        assert!(r.is_err());
    }

    #[test]
    fn test_array2_indexing() {
        let mut a: Array2<f64> = Array2::new(3, 2).unwrap();
        a[(2, 1)] = 4.0;
        assert_eq!(a[(2, 1)], 4.0);
        assert_eq!(a[(0, 0)], 0.0);
    }
}
