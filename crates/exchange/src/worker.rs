//! Background offload for the synchronous tree walks
//!
//! Parsing and serializing are plain CPU-bound functions. They run on
//! tokio's blocking pool so the calling task never stalls on a large tree.
//!
//! Cancellation is observable in three places:
//! 1. before hand-off (job never starts)
//! 2. inside the job, through the token it is given
//! 3. at hand-back (a finished result is discarded)
//!
//! Dropping the returned future cancels the job's token as well.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Cancelled;

/// Run `job` on a blocking worker, racing it against `cancel`
///
/// The job receives a child token of `cancel` for cooperative checks.
/// A panic inside the job is resumed on the caller.
pub async fn offload<T, F>(
    label: &'static str,
    cancel: &CancellationToken,
    job: F,
) -> Result<T, Cancelled>
where
    F: FnOnce(CancellationToken) -> T + Send + 'static,
    T: Send + 'static,
{
    let job_id = Uuid::now_v7();

    if cancel.is_cancelled() {
        tracing::debug!("{} job {} cancelled before start", label, job_id);
        return Err(Cancelled);
    }

    let job_token = cancel.child_token();
    // Cancels the job if this future is dropped mid-flight
    let _guard = job_token.clone().drop_guard();

    tracing::debug!("{} job {} handed to worker", label, job_id);
    let worker_token = job_token.clone();
    let handle = tokio::task::spawn_blocking(move || job(worker_token));

    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            tracing::debug!("{} job {} cancelled while running", label, job_id);
            Err(Cancelled)
        }
        joined = handle => match joined {
            Ok(_) if cancel.is_cancelled() => {
                tracing::debug!(
                    "{} job {} finished after cancellation, result dropped",
                    label,
                    job_id
                );
                Err(Cancelled)
            }
            Ok(value) => {
                tracing::debug!("{} job {} finished", label, job_id);
                Ok(value)
            }
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                tracing::warn!("{} job {} aborted by runtime: {}", label, job_id, err);
                Err(Cancelled)
            }
        },
    }
}
