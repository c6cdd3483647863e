// ============================================================
// Layer 4 — Batch-Count Splitter
// ============================================================
// The dataset is split by number of BATCHES, not samples:
//
//   N     = ceil(samples / batch_size)
//   train = floor(0.7 · N)
//   val   = floor(0.2 · N) + 1
//   test  = floor(0.1 · N) + 1
//
// The +1 terms can ask for up to 2 batches more than exist
// (N = 10 → 7 + 3 + 2 = 12). Each share is therefore clamped
// to what is left after the previous ones, which is exactly
// what taking/skipping past the end of a batch stream yields:
//
//   N = 10 → train 7, val 3, test 0
//   N = 20 → train 14, val 5, test 1
//
// Samples are shuffled once with a seeded RNG before batching,
// so the three shares are disjoint and reproducible.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

/// Requested share of the batch count per split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitFractions {
    pub train: f64,
    pub val:   f64,
    pub test:  f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self { train: 0.7, val: 0.2, test: 0.1 }
    }
}

/// Number of batches assigned to each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSplit {
    pub train: usize,
    pub val:   usize,
    pub test:  usize,
}

impl BatchSplit {
    /// Apply the batch-count formula to `total` batches, clamped to `total`.
    pub fn plan(total: usize, fractions: &SplitFractions) -> Self {
        let share = |f: f64| (total as f64 * f) as usize;

        let train = share(fractions.train).min(total);
        let val   = share(fractions.val).saturating_add(1).min(total - train);
        let test  = share(fractions.test).saturating_add(1).min(total - train - val);

        let requested = share(fractions.train)
            .saturating_add(share(fractions.val))
            .saturating_add(share(fractions.test))
            .saturating_add(2);
        if requested > total {
            tracing::debug!(
                "Split asked for {} batches but only {} exist; clamped to {}/{}/{}",
                requested, total, train, val, test
            );
        }

        Self { train, val, test }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

/// Number of batches `samples` items form at `batch_size` (last one may be partial).
pub fn batch_count(samples: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    samples.div_ceil(batch_size)
}

/// Fisher-Yates shuffle with a fixed seed.
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Cut `samples` at batch boundaries into (train, val, test).
/// Batches beyond the planned split are dropped.
pub fn partition<T>(
    mut samples: Vec<T>,
    batch_size:  usize,
    split:       &BatchSplit,
) -> (Vec<T>, Vec<T>, Vec<T>) {
    let train_end = (split.train * batch_size).min(samples.len());
    let val_end   = ((split.train + split.val) * batch_size).min(samples.len());
    let test_end  = (split.total() * batch_size).min(samples.len());

    samples.truncate(test_end);
    let test  = samples.split_off(val_end);
    let val   = samples.split_off(train_end);
    let train = samples;

    tracing::debug!(
        "Partitioned samples: {} train, {} validation, {} test",
        train.len(), val.len(), test.len()
    );

    (train, val, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn plan(n: usize) -> BatchSplit {
        BatchSplit::plan(n, &SplitFractions::default())
    }

    #[test]
    fn test_ten_batches_truncates_test() {
        // Literal formula asks for 7 + 3 + 2 = 12
        assert_eq!(plan(10), BatchSplit { train: 7, val: 3, test: 0 });
    }

    #[test]
    fn test_twenty_batches() {
        assert_eq!(plan(20), BatchSplit { train: 14, val: 5, test: 1 });
    }

    #[test]
    fn test_large_dataset_matches_formula() {
        // 700 + 201 + 101 = 1002 > 1000 → test clamped to 99
        assert_eq!(plan(1000), BatchSplit { train: 700, val: 201, test: 99 });
        // 37 + 11 + 6 = 54 > 53 → test clamped to 5
        assert_eq!(plan(53), BatchSplit { train: 37, val: 11, test: 5 });
        // 13 + 4 + 2 = 19 → fits exactly, no clamping
        assert_eq!(plan(19), BatchSplit { train: 13, val: 4, test: 2 });
    }

    #[test]
    fn test_never_exceeds_total() {
        for n in 0..500 {
            let s = plan(n);
            assert!(s.total() <= n, "n={n} gave {s:?}");
        }
    }

    #[test]
    fn test_huge_fraction_saturates_instead_of_overflowing() {
        // 10 × 1e30 casts to usize::MAX
        let fractions = SplitFractions { train: 0.7, val: 1e30, test: 0.1 };
        let s = BatchSplit::plan(10, &fractions);
        assert_eq!(s, BatchSplit { train: 7, val: 3, test: 0 });
        assert!(s.total() <= 10);
    }

    #[test]
    fn test_tiny_datasets() {
        assert_eq!(plan(0), BatchSplit { train: 0, val: 0, test: 0 });
        assert_eq!(plan(1), BatchSplit { train: 0, val: 1, test: 0 });
        assert_eq!(plan(2), BatchSplit { train: 1, val: 1, test: 0 });
    }

    #[test]
    fn test_batch_count_rounds_up() {
        assert_eq!(batch_count(100, 10), 10);
        assert_eq!(batch_count(101, 10), 11);
        assert_eq!(batch_count(0, 10), 0);
        assert_eq!(batch_count(5, 0), 0);
    }

    #[test]
    fn test_partition_on_batch_boundaries() {
        let items: Vec<usize> = (0..95).collect();
        let split             = plan(batch_count(items.len(), 10)); // 10 batches → 7/3/0
        let (train, val, test) = partition(items, 10, &split);

        assert_eq!(train.len(), 70);
        assert_eq!(val.len(),   25); // last batch is partial
        assert!(test.is_empty());
        assert_eq!(val[0], 70);
    }

    #[test]
    fn test_partition_drops_unplanned_batches() {
        let items: Vec<usize> = (0..50).collect();
        let split             = BatchSplit { train: 2, val: 1, test: 1 };
        let (train, val, test) = partition(items, 10, &split);

        assert_eq!((train.len(), val.len(), test.len()), (20, 10, 10));
        assert_eq!(test[9], 39);
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let mut a: Vec<usize> = (0..100).collect();
        let mut b = a.clone();
        shuffle_seeded(&mut a, 7);
        shuffle_seeded(&mut b, 7);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }
}
