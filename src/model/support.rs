//! Append-only set of weighted support vectors

use crate::core::{Result, SVMError};
use crate::kernel::{check_dimensions, Kernel};

/// Growing collection of (weight, vector) pairs
///
/// Every vector shares the dimension of the first one appended, which must
/// be at least one. Entries are never removed and their weights never change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SupportVectorSet {
    dimension: Option<usize>,
    weights: Vec<f64>,
    vectors: Vec<Vec<f64>>,
}

impl SupportVectorSet {
    /// Create an empty set; the dimension is fixed by the first append
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension shared by all vectors, if any vector has been appended
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of support vectors
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weights in admission order
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Vectors in admission order
    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Iterate over (weight, vector) pairs in admission order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.weights
            .iter()
            .copied()
            .zip(self.vectors.iter().map(Vec::as_slice))
    }

    /// Sum of all weights
    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Fail with `DimensionMismatch` if `x` cannot be evaluated against this set
    ///
    /// An empty set accepts any dimension.
    pub fn check_dimension(&self, x: &[f64]) -> Result<()> {
        match self.dimension {
            Some(expected) => check_dimensions(expected, x.len()),
            None => Ok(()),
        }
    }

    /// Append a new support vector
    pub fn append(&mut self, weight: f64, vector: Vec<f64>) -> Result<()> {
        if vector.is_empty() {
            return Err(SVMError::InvalidParameter(
                "Support vectors need at least one feature".to_string(),
            ));
        }
        self.check_dimension(&vector)?;
        if !weight.is_finite() {
            return Err(SVMError::NumericInstability(format!(
                "support vector weight is not finite: {weight}"
            )));
        }
        self.dimension.get_or_insert(vector.len());
        self.weights.push(weight);
        self.vectors.push(vector);
        Ok(())
    }

    /// offset + Σ weight_i * K(sv_i, x)
    ///
    /// An empty set evaluates to `offset`.
    pub fn evaluate<K: Kernel + ?Sized>(&self, kernel: &K, offset: f64, x: &[f64]) -> Result<f64> {
        self.check_dimension(x)?;
        let sum: f64 = self
            .iter()
            .map(|(weight, sv)| weight * kernel.compute(sv, x))
            .sum();
        Ok(offset + sum)
    }

    /// Rebuild a set from weights and row-major flattened vectors
    pub(crate) fn from_flattened(
        dimension: usize,
        weights: Vec<f64>,
        flattened: &[f64],
    ) -> Result<Self> {
        let count = weights.len();
        let expected = count.checked_mul(dimension).ok_or_else(|| {
            SVMError::InvalidParameter(format!(
                "{count} support vectors of dimension {dimension} overflow"
            ))
        })?;
        check_dimensions(expected, flattened.len())?;

        if count == 0 {
            return Ok(Self::new());
        }
        if dimension == 0 {
            return Err(SVMError::InvalidParameter(format!(
                "{count} support vectors cannot have dimension 0"
            )));
        }

        Ok(Self {
            dimension: Some(dimension),
            weights,
            vectors: flattened.chunks(dimension).map(<[f64]>::to_vec).collect(),
        })
    }

    /// Row-major concatenation of all vectors
    pub(crate) fn flattened(&self) -> Vec<f64> {
        self.vectors.iter().flatten().copied().collect()
    }
}
