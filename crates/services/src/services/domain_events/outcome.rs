//! Maps a handler body's result onto the job's terminal state.

use tracing::{error, info, warn};

use super::HandlerError;
use crate::services::platform::{PlatformApi, models::JobOutcome};

/// Completes the job on `Ok`, fails it with `failure_message` on `Err`.
///
/// Exactly one terminal call reaches the platform unless completing itself
/// errors, in which case the job is failed instead so it does not stay
/// acknowledged. The detailed error only goes to the logs; users see the
/// generic message. Returns `Err` only when the fail call could not be made.
pub async fn settle_job(
    platform: &dyn PlatformApi,
    job_id: &str,
    result: Result<JobOutcome, HandlerError>,
    failure_message: &str,
) -> Result<(), HandlerError> {
    let error = match result {
        Ok(outcome) => match platform.complete_job(job_id, &outcome).await {
            Ok(()) => {
                info!(job_id = %job_id, "Job completed: {}", outcome.message);
                return Ok(());
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Completing job failed");
                HandlerError::from(e)
            }
        },
        Err(e) => e,
    };

    error!(job_id = %job_id, error = %error, "Job failed");
    platform
        .fail_job(job_id, &JobOutcome::new(failure_message))
        .await?;
    Ok(())
}
