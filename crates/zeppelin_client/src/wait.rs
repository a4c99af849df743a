use std::future::Future;
use std::time::Duration;

use zeppelin_logging::{zeppelin_debug, zeppelin_trace};

use crate::{ClientError, Clock};

/// Spin-poll `query` at a fixed `interval` until `is_done` holds.
///
/// Each iteration is one query. The limit is checked after a non-terminal
/// answer, so a wait can overrun `limit` by at most one round trip plus one
/// interval. `None` waits forever.
pub(crate) async fn poll_until<T, Q, Fut, P>(
    clock: &dyn Clock,
    interval: Duration,
    target: &str,
    limit: Option<Duration>,
    mut query: Q,
    is_done: P,
) -> Result<T, ClientError>
where
    Q: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    P: Fn(&T) -> bool,
{
    let start = clock.now();
    let mut polls: u64 = 0;
    loop {
        let snapshot = query().await?;
        polls += 1;
        if is_done(&snapshot) {
            zeppelin_debug!("{target} done after {polls} poll(s)");
            return Ok(snapshot);
        }

        if let Some(limit) = limit {
            let elapsed = clock.now().saturating_duration_since(start);
            if elapsed > limit {
                return Err(ClientError::Timeout {
                    target: target.to_string(),
                    limit,
                });
            }
        }

        zeppelin_trace!("{target} not done yet (poll {polls}), sleeping {interval:?}");
        clock.sleep(interval).await;
    }
}
