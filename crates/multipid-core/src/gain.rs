//! Diagonal gain representation.
//!
//! A PID gain for `N` independent variables is an `N × N` diagonal matrix;
//! since variables are never cross-coupled, only the diagonal is stored and
//! applying the gain is an elementwise product.

use num_traits::Float;

/// One independent gain per controlled variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagonalGain<T, const N: usize> {
    diagonal: [T; N],
}

impl<T: Float, const N: usize> DiagonalGain<T, N> {
    /// Build a gain from its per-variable diagonal.
    pub fn new(diagonal: [T; N]) -> Self {
        Self { diagonal }
    }

    /// Broadcast `gain` to every diagonal entry.
    pub fn uniform(gain: T) -> Self {
        Self { diagonal: [gain; N] }
    }

    /// The all-zero gain (an inactive term).
    pub fn zero() -> Self {
        Self::uniform(T::zero())
    }

    pub fn diagonal(&self) -> &[T; N] {
        &self.diagonal
    }

    /// Multiply `vector` by this diagonal matrix.
    pub fn apply(&self, vector: &[T; N]) -> [T; N] {
        let mut out = [T::zero(); N];
        for (o, (g, v)) in out.iter_mut().zip(self.diagonal.iter().zip(vector)) {
            *o = *g * *v;
        }
        out
    }
}

impl<T: Float, const N: usize> From<[T; N]> for DiagonalGain<T, N> {
    fn from(diagonal: [T; N]) -> Self {
        Self::new(diagonal)
    }
}
