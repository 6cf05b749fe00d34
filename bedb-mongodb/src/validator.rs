//! Post-open liveness check.

use std::time::Duration;

use bedb_core::{DbError, DbResult, Stage};
use tokio::time::{Instant, timeout_at};
use tracing::{info, warn};

use crate::driver::MongoDriver;

/// Ping `handle` before `deadline`.
///
/// On success the handle is returned unchanged. On any failure the handle is
/// closed and a connectivity error is returned: [`DbError::Timeout`] when the
/// deadline passed, [`DbError::Rejected`] otherwise. `budget` is the full
/// connect budget and is only used for reporting.
pub async fn validate<D: MongoDriver>(
    driver: &D,
    handle: D::Handle,
    deadline: Instant,
    target: &str,
    budget: Duration,
) -> DbResult<D::Handle> {
    let outcome = match timeout_at(deadline, driver.ping(&handle)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) if err.is_connectivity() => Err(err),
        Ok(Err(err)) => Err(DbError::rejected(target, Stage::Ping, err)),
        Err(_) => Err(DbError::timeout(target, Stage::Ping, millis(budget))),
    };

    match outcome {
        Ok(()) => {
            info!(connection = %target, "ping successful");
            Ok(handle)
        }
        Err(err) => {
            warn!(connection = %target, error = %err, "ping failed, closing client");
            driver.close(handle).await;
            Err(err)
        }
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
