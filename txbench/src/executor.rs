//! Batched insert executor.
//!
//! Splits a record slice into contiguous chunks of `batch_size` and commits
//! each chunk as one transaction. The first failing chunk aborts the call;
//! its transaction has already been rolled back by the datastore.

use crate::record::Record;
use crate::store::Datastore;
use anyhow::{bail, Context, Result};
use std::time::{Duration, Instant};

/// Outcome of one [`insert_batched`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertStats {
    pub elapsed: Duration,
    pub rows: usize,
    pub transactions: usize,
}

impl InsertStats {
    /// Rows per second, or `None` when the elapsed time is too small to
    /// measure.
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            Some(self.rows as f64 / secs)
        } else {
            None
        }
    }
}

/// Insert every record, `batch_size` records per transaction, and time the
/// whole sequence.
pub fn insert_batched<D>(
    store: &mut D,
    records: &[Record],
    batch_size: usize,
) -> Result<InsertStats>
where
    D: Datastore + ?Sized,
{
    if batch_size == 0 {
        bail!("batch size must be at least 1");
    }

    let start = Instant::now();
    let mut transactions = 0;

    for (index, chunk) in records.chunks(batch_size).enumerate() {
        let first = index * batch_size;
        store.insert_transaction(chunk).with_context(|| {
            format!(
                "transaction for rows {}..{} failed",
                first,
                first + chunk.len()
            )
        })?;
        transactions += 1;
        log::trace!("Committed {} rows (transaction {})", chunk.len(), transactions);
    }

    Ok(InsertStats {
        elapsed: start.elapsed(),
        rows: records.len(),
        transactions,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::generate;
    use anyhow::anyhow;

    /// Records every transaction it is asked to run. Optionally fails the
    /// transaction with the given index.
    #[derive(Default)]
    pub(crate) struct RecordingStore {
        pub rows: u64,
        pub transactions: Vec<usize>,
        pub clears: usize,
        pub fail_on: Option<usize>,
    }

    impl Datastore for RecordingStore {
        fn clear(&mut self) -> Result<()> {
            self.rows = 0;
            self.clears += 1;
            Ok(())
        }

        fn insert_transaction(&mut self, rows: &[Record]) -> Result<()> {
            if self.fail_on == Some(self.transactions.len()) {
                return Err(anyhow!("injected failure"));
            }
            self.transactions.push(rows.len());
            self.rows += rows.len() as u64;
            Ok(())
        }

        fn row_count(&mut self) -> Result<u64> {
            Ok(self.rows)
        }
    }

    #[test]
    fn non_divisible_input_has_short_final_transaction() {
        let mut store = RecordingStore::default();
        let stats = insert_batched(&mut store, &generate(10), 3).unwrap();
        assert_eq!(store.transactions, vec![3, 3, 3, 1]);
        assert_eq!(stats.rows, 10);
        assert_eq!(stats.transactions, 4);
        assert_eq!(store.rows, 10);
    }

    #[test]
    fn divisible_input_has_equal_transactions() {
        let mut store = RecordingStore::default();
        insert_batched(&mut store, &generate(12), 4).unwrap();
        assert_eq!(store.transactions, vec![4, 4, 4]);
    }

    #[test]
    fn batch_larger_than_input_is_one_transaction() {
        let mut store = RecordingStore::default();
        insert_batched(&mut store, &generate(5), 1_000).unwrap();
        assert_eq!(store.transactions, vec![5]);
    }

    #[test]
    fn stops_at_first_failed_transaction() {
        let mut store = RecordingStore {
            fail_on: Some(1),
            ..Default::default()
        };
        let err = insert_batched(&mut store, &generate(9), 3).unwrap_err();
        assert_eq!(store.transactions, vec![3]);
        assert!(format!("{err:#}").contains("rows 3..6"));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut store = RecordingStore::default();
        assert!(insert_batched(&mut store, &generate(3), 0).is_err());
        assert!(store.transactions.is_empty());
    }

    #[test]
    fn empty_input_runs_no_transactions() {
        let mut store = RecordingStore::default();
        let stats = insert_batched(&mut store, &[], 10).unwrap();
        assert_eq!(stats.transactions, 0);
        assert_eq!(stats.rows, 0);
    }

    #[test]
    fn throughput_from_elapsed() {
        let stats = InsertStats {
            elapsed: Duration::from_millis(500),
            rows: 1_000,
            transactions: 1,
        };
        assert_eq!(stats.throughput(), Some(2_000.0));
        let instant = InsertStats {
            elapsed: Duration::ZERO,
            ..stats
        };
        assert_eq!(instant.throughput(), None);
    }
}
