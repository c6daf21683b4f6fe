//! Warmup cycles run before measurement starts. Timings are discarded.

use crate::executor::insert_batched;
use crate::record::Record;
use crate::store::Datastore;
use anyhow::{Context, Result};

/// Run `cycles` insert cycles over the first `batch_size` records, clearing
/// the table before each cycle and once more at the end.
pub fn run_warmup<D>(
    store: &mut D,
    records: &[Record],
    batch_size: usize,
    cycles: u32,
) -> Result<()>
where
    D: Datastore + ?Sized,
{
    let warmup_rows = &records[..batch_size.min(records.len())];
    log::info!(
        "  Running {cycles} warmup cycle(s) of {} rows...",
        warmup_rows.len()
    );

    for cycle in 1..=cycles {
        store.clear()?;
        insert_batched(store, warmup_rows, batch_size)
            .with_context(|| format!("warmup cycle {cycle} failed"))?;
    }

    store.clear()?;
    Ok(())
}
