//! Seeded train/evaluation split

use crate::error::{DatasetLoadError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_samples` with a fixed seed and hold out
/// `ceil(test_size * n_samples)` rows for evaluation.
///
/// The same `(n_samples, test_size, seed)` always yields the same partition.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<SplitIndices> {
    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(DatasetLoadError::malformed(format!(
            "{} usable rows cannot be split with test_size {}",
            n_samples, test_size
        ))
        .into());
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(SplitIndices { train, test: indices })
}
