use crate::error::BackendError;
use crate::options::ExecutionMode;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Run `count` indexed calls and return their outputs in index order.
///
/// Concurrent: every call is in flight at once; each output lands in the
/// slot of the index that produced it, whatever order they finish in.
/// Sequential: one call at a time, in index order.
/// The first error wins; outstanding calls are dropped with it.
pub async fn fan_out<T, F, Fut>(
    mode: ExecutionMode,
    count: usize,
    call: F,
) -> Result<Vec<T>, BackendError>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    match mode {
        ExecutionMode::SequentialThrottled => {
            let mut out = Vec::with_capacity(count);
            for i in 0..count {
                out.push(call(i).await?);
            }
            Ok(out)
        }
        ExecutionMode::Concurrent => {
            let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
            let mut pending = (0..count)
                .map(|i| {
                    let fut = call(i);
                    async move { (i, fut.await) }
                })
                .collect::<FuturesUnordered<_>>();

            while let Some((i, res)) = pending.next().await {
                slots[i] = Some(res?);
            }
            Ok(slots.into_iter().flatten().collect())
        }
    }
}

/// Fixed-delay pause between aspect groups.
pub async fn pause(delay: Option<Duration>, after: &str) {
    if let Some(d) = delay {
        info!("throttle: sleeping {:?} after {}", d, after);
        tokio::time::sleep(d).await;
    }
}
