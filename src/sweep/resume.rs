//! Resume point selection from the sweep ledger

use crate::storage::Storage;
use crate::sweep::TokenRange;
use crate::SweepError;

/// Narrows `range` to the tokens the interrupted sweep has not finished
///
/// The latest run decides: a completed run leaves nothing to resume, and a
/// resumable one continues after the last token finished by it or by the runs
/// it continued.
///
/// # Returns
///
/// * `Ok(Some(range))` - The tokens still to sweep
/// * `Ok(None)` - Nothing is left to sweep
/// * `Err(SweepError)` - The ledger could not be read
pub fn resume_range<St>(storage: &St, range: TokenRange) -> Result<Option<TokenRange>, SweepError>
where
    St: Storage + ?Sized,
{
    let Some(run) = storage.get_latest_run()? else {
        tracing::info!("No previous run found, starting at {}", range.start());
        return Ok(Some(range));
    };

    if !run.status.is_resumable() {
        tracing::info!("Latest run {} completed, nothing to resume", run.id);
        return Ok(None);
    }

    let Some(last) = storage.last_finished_token(run.id)? else {
        tracing::info!(
            "Run {} finished no tokens, restarting at {}",
            run.id,
            range.start()
        );
        return Ok(Some(range));
    };

    let resumed = last.next().and_then(|next| range.resume_from(next));
    match &resumed {
        Some(r) => tracing::info!("Resuming run {} after token {}: {}", run.id, last, r),
        None => tracing::info!("Run {} already reached token {}, nothing to resume", run.id, last),
    }
    Ok(resumed)
}
