//! Stream collection for walk tests.

use futures_core::Stream;
use std::future::poll_fn;
use std::pin::Pin;

/// Collect at most `limit` items from a stream.
pub async fn collect_stream<S, T, E>(mut stream: Pin<&mut S>, limit: usize) -> Vec<Result<T, E>>
where
    S: Stream<Item = Result<T, E>>,
{
    let mut results = Vec::new();
    while results.len() < limit {
        match poll_fn(|cx| stream.as_mut().poll_next(cx)).await {
            Some(item) => results.push(item),
            None => break,
        }
    }
    results
}
