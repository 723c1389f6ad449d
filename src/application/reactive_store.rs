// Reactive key-value store - In-memory map whose changes can be observed as streams
use futures::stream::{BoxStream, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Observable associative store.
///
/// The whole map lives inside a `watch` channel: every mutation runs inside the
/// channel's write lock, so writes are serialized per store and readers only
/// ever see complete snapshots. Subscribers compute their own projection of the
/// snapshot and drop consecutive duplicates.
///
/// Values written faster than a subscriber polls may be conflated; the latest
/// value is always delivered.
pub struct ReactiveStore<K, V> {
    state: Arc<watch::Sender<BTreeMap<K, V>>>,
}

impl<K, V> Clone for ReactiveStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<K, V> Default for ReactiveStore<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ReactiveStore<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::from_entries(std::iter::empty())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let (state, _) = watch::channel(entries.into_iter().collect());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.state.borrow().get(key).cloned()
    }

    /// Runs `f` against the current snapshot.
    pub fn read<T>(&self, f: impl FnOnce(&BTreeMap<K, V>) -> T) -> T {
        f(&self.state.borrow())
    }

    pub fn put(&self, key: K, value: V) {
        self.state.send_if_modified(|map| {
            if map.get(&key) == Some(&value) {
                return false;
            }
            map.insert(key, value);
            true
        });
    }

    /// Removes `key`, returning the previous value. Absent keys notify nobody.
    pub fn delete(&self, key: &K) -> Option<V> {
        let mut removed = None;
        self.state.send_if_modified(|map| {
            removed = map.remove(key);
            removed.is_some()
        });
        removed
    }

    /// Applies several mutations as one atomic step.
    ///
    /// `f` reports whether it changed the map; subscribers are only woken
    /// when it did.
    pub fn update(&self, f: impl FnOnce(&mut BTreeMap<K, V>) -> bool) -> bool {
        self.state.send_if_modified(f)
    }

    /// Current value of `key`, then every distinct change.
    pub fn observe(&self, key: K) -> BoxStream<'static, Option<V>> {
        self.observe_projection(move |map| map.get(&key).cloned())
    }

    /// Projection of the whole map, re-emitted when it changes.
    pub fn observe_projection<T, F>(&self, project: F) -> BoxStream<'static, T>
    where
        T: Clone + PartialEq + Send + 'static,
        F: Fn(&BTreeMap<K, V>) -> T + Send + 'static,
    {
        let mut rx = self.state.subscribe();
        async_stream::stream! {
            let mut last: Option<T> = None;
            loop {
                let current = {
                    let snapshot = rx.borrow_and_update();
                    project(&snapshot)
                };
                if last.as_ref() != Some(&current) {
                    last = Some(current.clone());
                    yield current;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
        .boxed()
    }
}
