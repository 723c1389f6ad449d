// Stream combinators used to route dashboard reads
use futures::stream::{BoxStream, Stream, StreamExt};

/// Drops items equal to the one emitted just before them.
pub fn distinct_until_changed<S, T>(stream: S) -> BoxStream<'static, T>
where
    S: Stream<Item = T> + Send + 'static,
    T: Clone + PartialEq + Send + 'static,
{
    async_stream::stream! {
        futures::pin_mut!(stream);
        let mut last: Option<T> = None;
        while let Some(item) = stream.next().await {
            if last.as_ref() != Some(&item) {
                last = Some(item.clone());
                yield item;
            }
        }
    }
    .boxed()
}

enum Step<C, T> {
    Switch(Option<C>),
    Inner(Option<T>),
}

/// Follows the inner stream produced for the latest outer value.
///
/// Each outer value drops the current inner stream before the next one is
/// built, all inside the single task polling the result, so nothing from an
/// abandoned inner stream can be delivered after a switch. When the outer
/// stream ends, the last inner stream keeps running until it ends too.
pub fn switch_latest<C, T, F>(outer: BoxStream<'static, C>, mut subscribe: F) -> BoxStream<'static, T>
where
    C: Send + 'static,
    T: Send + 'static,
    F: FnMut(C) -> BoxStream<'static, T> + Send + 'static,
{
    async_stream::stream! {
        let mut outer = outer;
        let mut outer_done = false;
        let mut inner: Option<BoxStream<'static, T>> = None;
        let mut generation: u64 = 0;

        loop {
            if outer_done && inner.is_none() {
                break;
            }

            let step = tokio::select! {
                biased;
                condition = outer.next(), if !outer_done => Step::Switch(condition),
                item = next_inner(&mut inner), if inner.is_some() => Step::Inner(item),
            };

            match step {
                Step::Switch(Some(condition)) => {
                    // The old subscription is gone before the new one exists.
                    drop(inner.take());
                    generation += 1;
                    tracing::trace!(generation, "switching inner stream");
                    inner = Some(subscribe(condition));
                }
                Step::Switch(None) => outer_done = true,
                Step::Inner(Some(item)) => yield item,
                Step::Inner(None) => inner = None,
            }
        }
    }
    .boxed()
}

async fn next_inner<T>(inner: &mut Option<BoxStream<'static, T>>) -> Option<T> {
    match inner {
        Some(stream) => stream.next().await,
        None => None,
    }
}
