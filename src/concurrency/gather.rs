//! Order-preserving concurrent gather

use futures_util::future::join_all;
use std::fmt::Display;
use std::future::Future;

/// Runs every operation concurrently and returns their outputs in input order
///
/// Completion order is irrelevant: `result[i]` always belongs to
/// `operations[i]`. Operations are polled on the calling task, so admission
/// limits come from the gates the operations themselves acquire. An empty
/// input returns immediately.
pub async fn gather_ordered<I>(operations: I) -> Vec<<I::Item as Future>::Output>
where
    I: IntoIterator,
    I::Item: Future,
{
    let operations: Vec<_> = operations.into_iter().collect();
    if operations.is_empty() {
        return Vec::new();
    }
    join_all(operations).await
}

/// Like [`gather_ordered`], but each failed item becomes `T::default()`
///
/// Failures are logged and never affect sibling items.
pub async fn gather_or_default<I, T, E>(what: &str, operations: I) -> Vec<T>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<T, E>>,
    T: Default,
    E: Display,
{
    gather_ordered(operations)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{} #{} failed, using empty result: {}", what, index, e);
                T::default()
            }
        })
        .collect()
}
