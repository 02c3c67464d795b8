//! In-process event registry: synchronous publish/subscribe plus
//! continuations that complete on a later emission.
//!
//! Subscribers run on the emitting thread, in registration order, over a
//! snapshot of the list taken when the emission starts. The registry lock is
//! never held while a subscriber runs, so subscribers may emit, subscribe, or
//! unsubscribe re-entrantly.
//!
//! Two flavours of continuation exist:
//! - [`EventRegistry::emit_async`] emits, then waits for the next emission of
//!   an end *name*. Concurrent waits on the same name join one continuation.
//! - [`EventRegistry::request`] waits for the end name *and* the request id
//!   carried by the event, so concurrent requests never collide. It is armed
//!   before the request is dispatched, so a synchronous reply is not lost.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

use bookshelf_domain::error::BusError;
use bookshelf_domain::id::RequestId;

use crate::ports::{EventPublisher, Routed};

type Subscriber<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registered<E> {
    token: u64,
    subscriber: Subscriber<E>,
}

struct Correlated<E: Routed> {
    end: E::Name,
    sender: oneshot::Sender<E>,
}

struct State<E: Routed> {
    next_token: u64,
    subscribers: HashMap<E::Name, Vec<Registered<E>>>,
    pending: HashMap<E::Name, Vec<oneshot::Sender<E>>>,
    correlated: HashMap<RequestId, Correlated<E>>,
}

impl<E: Routed> Default for State<E> {
    fn default() -> Self {
        Self {
            next_token: 0,
            subscribers: HashMap::new(),
            pending: HashMap::new(),
            correlated: HashMap::new(),
        }
    }
}

fn lock<E: Routed>(state: &Mutex<State<E>>) -> MutexGuard<'_, State<E>> {
    // Subscribers never run under the lock, so poisoning can only come from
    // a panic inside this module's own bookkeeping.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: Routed> State<E> {
    /// Drop waits whose caller gave up (dropped or timed out).
    fn prune_abandoned(&mut self) {
        self.pending.retain(|_, waiters| {
            waiters.retain(|sender| !sender.is_closed());
            !waiters.is_empty()
        });
        self.correlated.retain(|_, entry| !entry.sender.is_closed());
    }
}

/// Which correlated continuation an emission may resolve.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Settle {
    Any,
    /// The request event itself: its own continuation stays armed.
    NotOwn,
}

fn dispatch<E: Routed>(state: &Mutex<State<E>>, event: E, settle: Settle) {
    let name = event.name();
    let snapshot: Vec<Subscriber<E>> = lock(state)
        .subscribers
        .get(&name)
        .map(|list| list.iter().map(|r| Arc::clone(&r.subscriber)).collect())
        .unwrap_or_default();

    debug!(event = %name, subscribers = snapshot.len(), "dispatching");
    for subscriber in &snapshot {
        subscriber(&event);
    }

    let (waiters, correlated) = {
        let mut state = lock(state);
        let waiters = state.pending.remove(&name).unwrap_or_default();
        let mut correlated = None;
        if settle == Settle::Any
            && let Some(id) = event.correlation()
            && state.correlated.get(&id).is_some_and(|entry| entry.end == name)
        {
            correlated = state.correlated.remove(&id);
        }
        (waiters, correlated)
    };

    if !waiters.is_empty() {
        debug!(event = %name, waiters = waiters.len(), "resolving continuation");
    }
    for waiter in waiters {
        // A dropped receiver means the caller stopped waiting.
        let _ = waiter.send(event.clone());
    }
    if let Some(entry) = correlated {
        debug!(event = %name, "resolving correlated continuation");
        let _ = entry.sender.send(event);
    }
}

/// Named subscriber lists plus pending continuations.
///
/// Cloning yields another handle to the same registry. The registry lives as
/// long as its last handle; [`Emitter`]s and [`Subscription`]s do not keep it
/// alive.
pub struct EventRegistry<E: Routed> {
    state: Arc<Mutex<State<E>>>,
}

impl<E: Routed> Clone for EventRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<E: Routed> Default for EventRegistry<E> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }
}

impl<E: Routed> EventRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `subscriber` to the list for `name`.
    ///
    /// The returned [`Subscription`] removes exactly this subscriber.
    pub fn on<F>(&self, name: E::Name, subscriber: F) -> Subscription<E>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut state = lock(&self.state);
        state.next_token += 1;
        let token = state.next_token;
        state.subscribers.entry(name).or_default().push(Registered {
            token,
            subscriber: Arc::new(subscriber),
        });
        debug!(event = %name, token, "subscribed");

        Subscription {
            state: Arc::downgrade(&self.state),
            name,
            token,
        }
    }

    /// Run every subscriber of `event.name()`, then resolve any continuation
    /// waiting for it.
    pub fn emit(&self, event: E) {
        dispatch(&self.state, event, Settle::Any);
    }

    /// Emit `event`, then wait for the next emission named `end`.
    ///
    /// If a continuation for `end` is still pending after the emission, this
    /// call joins it: both awaiters complete with the same emission. The wait
    /// starts after `event` is dispatched, so neither `event` itself nor an
    /// `end` emitted synchronously by its subscribers resolves it; use
    /// [`request`](Self::request) for that.
    pub fn emit_async(&self, event: E, end: E::Name) -> Continuation<E> {
        self.emit(event);
        let (sender, receiver) = oneshot::channel();
        let mut state = lock(&self.state);
        state.prune_abandoned();
        let waiters = state.pending.entry(end).or_default();
        if !waiters.is_empty() {
            debug!(event = %end, "joining pending continuation");
        }
        waiters.push(sender);
        Continuation::new(receiver, end)
    }

    /// Emit `event` and wait for the emission named `end` that carries the
    /// same request id.
    ///
    /// The wait is armed before `event` is dispatched, so a subscriber that
    /// answers synchronously still resolves it; `event` itself never does,
    /// even when its name is `end`. Events without a request id fall back to
    /// [`emit_async`](Self::emit_async). Reusing a request id that is still
    /// pending abandons the earlier wait.
    pub fn request(&self, event: E, end: E::Name) -> Continuation<E> {
        let Some(id) = event.correlation() else {
            return self.emit_async(event, end);
        };

        let (sender, receiver) = oneshot::channel();
        let replaced = {
            let mut state = lock(&self.state);
            state.prune_abandoned();
            state.correlated.insert(id, Correlated { end, sender }).is_some()
        };
        if replaced {
            debug!(request = %id, "request id reused; earlier wait abandoned");
        }
        dispatch(&self.state, event, Settle::NotOwn);
        Continuation::new(receiver, end)
    }

    /// A publishing handle that does not keep the registry alive.
    #[must_use]
    pub fn emitter(&self) -> Emitter<E> {
        Emitter {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Number of subscribers currently registered for `name`.
    #[must_use]
    pub fn subscriber_count(&self, name: E::Name) -> usize {
        lock(&self.state).subscribers.get(&name).map_or(0, Vec::len)
    }

    /// Number of continuations still waiting, counting a joined name once.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        let state = lock(&self.state);
        state.pending.len() + state.correlated.len()
    }
}

impl<E: Routed> EventPublisher<E> for EventRegistry<E> {
    fn publish(&self, event: E) {
        self.emit(event);
    }
}

/// Capability to remove one subscriber.
pub struct Subscription<E: Routed> {
    state: Weak<Mutex<State<E>>>,
    name: E::Name,
    token: u64,
}

impl<E: Routed> Subscription<E> {
    /// Remove the subscriber from its list.
    ///
    /// No-op when it is already gone or the registry has been dropped. An
    /// emission already being dispatched still reaches it.
    pub fn unsubscribe(&self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut state = lock(&state);
        if let Some(list) = state.subscribers.get_mut(&self.name) {
            let before = list.len();
            list.retain(|r| r.token != self.token);
            if list.len() < before {
                debug!(event = %self.name, token = self.token, "unsubscribed");
            }
        }
    }
}

/// Weak publishing handle given to output ports.
///
/// Emissions after the registry is dropped are discarded.
pub struct Emitter<E: Routed> {
    state: Weak<Mutex<State<E>>>,
}

impl<E: Routed> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            state: Weak::clone(&self.state),
        }
    }
}

impl<E: Routed> EventPublisher<E> for Emitter<E> {
    fn publish(&self, event: E) {
        match self.state.upgrade() {
            Some(state) => dispatch(&state, event, Settle::Any),
            None => debug!(event = %event.name(), "registry dropped; emission discarded"),
        }
    }
}

/// Completes with the event that resolved it.
///
/// Fails with [`BusError::Abandoned`] when the registry is dropped first.
/// Never completes on its own otherwise; use [`within`](Self::within) to bound
/// the wait.
#[must_use = "a continuation does nothing unless awaited"]
pub struct Continuation<E> {
    receiver: oneshot::Receiver<E>,
    end: String,
}

impl<E> Continuation<E> {
    fn new(receiver: oneshot::Receiver<E>, end: impl ToString) -> Self {
        Self {
            receiver,
            end: end.to_string(),
        }
    }

    /// Wait at most `after`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TimedOut`] when the deadline passes first, or
    /// [`BusError::Abandoned`] when the registry is dropped.
    pub async fn within(self, after: Duration) -> Result<E, BusError> {
        let event = self.end.clone();
        match tokio::time::timeout(after, self).await {
            Ok(result) => result,
            Err(_) => Err(BusError::TimedOut { event, after }),
        }
    }
}

impl<E> Future for Continuation<E> {
    type Output = Result<E, BusError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver).poll(cx).map(|result| {
            result.map_err(|_| BusError::Abandoned {
                event: this.end.clone(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping {
        name: &'static str,
        args: Vec<u32>,
        request: Option<RequestId>,
    }

    impl Ping {
        fn new(name: &'static str, args: &[u32]) -> Self {
            Self {
                name,
                args: args.to_vec(),
                request: None,
            }
        }

        fn for_request(mut self, request: RequestId) -> Self {
            self.request = Some(request);
            self
        }
    }

    impl Routed for Ping {
        type Name = &'static str;

        fn name(&self) -> &'static str {
            self.name
        }

        fn correlation(&self) -> Option<RequestId> {
            self.request
        }
    }

    type Probe = Box<dyn Fn(&Ping) + Send + Sync>;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Probe) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = Arc::clone(&seen);
        let make = move |label: &'static str| -> Probe {
            let seen = Arc::clone(&handle);
            Box::new(move |ping: &Ping| {
                seen.lock().unwrap().push(format!("{label}:{:?}", ping.args));
            })
        };
        (seen, make)
    }

    #[test]
    fn should_invoke_subscriber_once_with_args() {
        let registry = EventRegistry::<Ping>::new();
        let (seen, make) = recorder();
        registry.on("tick", make("a"));

        registry.emit(Ping::new("tick", &[1, 2]));

        assert_eq!(*seen.lock().unwrap(), vec!["a:[1, 2]"]);
    }

    #[test]
    fn should_not_invoke_subscriber_after_unsubscribe() {
        let registry = EventRegistry::<Ping>::new();
        let (seen, make) = recorder();
        let subscription = registry.on("tick", make("a"));

        subscription.unsubscribe();
        registry.emit(Ping::new("tick", &[1]));

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(registry.subscriber_count("tick"), 0);
    }

    #[test]
    fn should_ignore_repeated_unsubscribe() {
        let registry = EventRegistry::<Ping>::new();
        let (_seen, make) = recorder();
        let first = registry.on("tick", make("a"));
        let _second = registry.on("tick", make("b"));

        first.unsubscribe();
        first.unsubscribe();

        assert_eq!(registry.subscriber_count("tick"), 1);
    }

    #[test]
    fn should_ignore_unsubscribe_after_registry_dropped() {
        let registry = EventRegistry::<Ping>::new();
        let subscription = registry.on("tick", |_| {});
        drop(registry);

        subscription.unsubscribe();
    }

    #[test]
    fn should_invoke_subscribers_in_registration_order() {
        let registry = EventRegistry::<Ping>::new();
        let (seen, make) = recorder();
        registry.on("tick", make("a"));
        registry.on("tick", make("b"));
        registry.on("tick", make("c"));

        registry.emit(Ping::new("tick", &[]));

        assert_eq!(*seen.lock().unwrap(), vec!["a:[]", "b:[]", "c:[]"]);
    }

    #[test]
    fn should_only_invoke_subscribers_of_emitted_name() {
        let registry = EventRegistry::<Ping>::new();
        let (seen, make) = recorder();
        registry.on("tick", make("tick"));
        registry.on("tock", make("tock"));

        registry.emit(Ping::new("tock", &[9]));

        assert_eq!(*seen.lock().unwrap(), vec!["tock:[9]"]);
    }

    #[test]
    fn should_deliver_in_progress_emission_to_subscriber_removed_mid_dispatch() {
        let registry = EventRegistry::<Ping>::new();
        let (seen, make) = recorder();
        let victim: Arc<Mutex<Option<Subscription<Ping>>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&victim);
        registry.on("tick", move |_| {
            if let Some(subscription) = slot.lock().unwrap().as_ref() {
                subscription.unsubscribe();
            }
        });
        *victim.lock().unwrap() = Some(registry.on("tick", make("b")));

        registry.emit(Ping::new("tick", &[1]));
        registry.emit(Ping::new("tick", &[2]));

        assert_eq!(*seen.lock().unwrap(), vec!["b:[1]"]);
    }

    #[test]
    fn should_allow_subscriber_to_emit_reentrantly() {
        let registry = EventRegistry::<Ping>::new();
        let (seen, make) = recorder();
        let emitter = registry.emitter();
        registry.on("ping", move |ping: &Ping| {
            emitter.publish(Ping::new("pong", &ping.args));
        });
        registry.on("pong", make("pong"));

        registry.emit(Ping::new("ping", &[4]));

        assert_eq!(*seen.lock().unwrap(), vec!["pong:[4]"]);
    }

    #[tokio::test]
    async fn should_resolve_emit_async_with_next_end_emission() {
        let registry = EventRegistry::<Ping>::new();
        let (seen, make) = recorder();
        registry.on("get", make("get"));

        let continuation = registry.emit_async(Ping::new("get", &[1]), "got");
        assert_eq!(*seen.lock().unwrap(), vec!["get:[1]"]);

        registry.emit(Ping::new("got", &[7, 8]));

        let resolved = continuation.await.unwrap();
        assert_eq!(resolved.args, vec![7, 8]);
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn should_resolve_only_once_when_end_emitted_twice() {
        let registry = EventRegistry::<Ping>::new();
        let continuation = registry.emit_async(Ping::new("get", &[]), "got");

        registry.emit(Ping::new("got", &[1]));
        registry.emit(Ping::new("got", &[2]));

        assert_eq!(continuation.await.unwrap().args, vec![1]);
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn should_join_pending_continuation_when_emit_async_called_twice() {
        let registry = EventRegistry::<Ping>::new();
        let first = registry.emit_async(Ping::new("get", &[]), "got");
        let second = registry.emit_async(Ping::new("get", &[]), "got");
        assert_eq!(registry.pending_count(), 1);

        registry.emit(Ping::new("got", &[3]));

        assert_eq!(first.await.unwrap().args, vec![3]);
        assert_eq!(second.await.unwrap().args, vec![3]);
    }

    #[tokio::test]
    async fn should_not_resolve_emit_async_with_its_own_event() {
        let registry = EventRegistry::<Ping>::new();

        let continuation = registry.emit_async(Ping::new("tick", &[1]), "tick");
        registry.emit(Ping::new("tick", &[2]));

        let resolved = continuation.within(Duration::from_millis(50)).await.unwrap();
        assert_eq!(resolved.args, vec![2]);
    }

    #[tokio::test]
    async fn should_give_fresh_wait_after_own_emission_resolved_pending() {
        let registry = EventRegistry::<Ping>::new();
        let first = registry.emit_async(Ping::new("get", &[]), "got");

        let second = registry.emit_async(Ping::new("got", &[1]), "got");
        registry.emit(Ping::new("got", &[2]));

        assert_eq!(first.await.unwrap().args, vec![1]);
        assert_eq!(second.await.unwrap().args, vec![2]);
    }

    #[tokio::test]
    async fn should_miss_synchronous_completion_with_emit_async() {
        let registry = EventRegistry::<Ping>::new();
        let emitter = registry.emitter();
        registry.on("get", move |_| emitter.publish(Ping::new("got", &[5])));

        let result = registry
            .emit_async(Ping::new("get", &[]), "got")
            .within(Duration::from_millis(20))
            .await;

        assert!(matches!(result, Err(BusError::TimedOut { .. })));
    }

    #[tokio::test]
    async fn should_resolve_request_when_subscriber_answers_synchronously() {
        let registry = EventRegistry::<Ping>::new();
        let emitter = registry.emitter();
        registry.on("get", move |ping: &Ping| {
            let mut reply = Ping::new("got", &[5]);
            reply.request = ping.request;
            emitter.publish(reply);
        });

        let resolved = registry
            .request(Ping::new("get", &[]).for_request(RequestId::new()), "got")
            .within(Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(resolved.args, vec![5]);
    }

    #[tokio::test]
    async fn should_not_resolve_request_with_its_own_event() {
        let registry = EventRegistry::<Ping>::new();
        let id = RequestId::new();

        let continuation = registry.request(Ping::new("tick", &[1]).for_request(id), "tick");
        assert_eq!(registry.pending_count(), 1);
        registry.emit(Ping::new("tick", &[2]).for_request(id));

        let resolved = continuation.within(Duration::from_millis(50)).await.unwrap();
        assert_eq!(resolved.args, vec![2]);
    }

    #[tokio::test]
    async fn should_prune_waits_abandoned_by_their_caller() {
        let registry = EventRegistry::<Ping>::new();
        drop(registry.emit_async(Ping::new("get", &[]), "gone"));
        assert_eq!(registry.pending_count(), 1);

        let timed_out = registry
            .request(Ping::new("get", &[]).for_request(RequestId::new()), "got")
            .within(Duration::from_millis(5))
            .await;
        assert!(timed_out.is_err());
        assert_eq!(registry.pending_count(), 1);

        let _live = registry.request(Ping::new("get", &[]).for_request(RequestId::new()), "got");

        assert_eq!(registry.pending_count(), 1);
    }

    #[tokio::test]
    async fn should_correlate_concurrent_requests_independently() {
        let registry = EventRegistry::<Ping>::new();
        let (first_id, second_id) = (RequestId::new(), RequestId::new());

        let first = registry.request(Ping::new("get", &[]).for_request(first_id), "got");
        let second = registry.request(Ping::new("get", &[]).for_request(second_id), "got");
        assert_eq!(registry.pending_count(), 2);

        registry.emit(Ping::new("got", &[2]).for_request(second_id));
        registry.emit(Ping::new("got", &[1]).for_request(first_id));

        assert_eq!(first.await.unwrap().args, vec![1]);
        assert_eq!(second.await.unwrap().args, vec![2]);
    }

    #[tokio::test]
    async fn should_not_resolve_request_on_other_name_with_same_id() {
        let registry = EventRegistry::<Ping>::new();
        let id = RequestId::new();

        let continuation = registry.request(Ping::new("get", &[]).for_request(id), "got");
        registry.emit(Ping::new("other", &[1]).for_request(id));
        assert_eq!(registry.pending_count(), 1);

        registry.emit(Ping::new("got", &[2]).for_request(id));
        assert_eq!(continuation.await.unwrap().args, vec![2]);
    }

    #[tokio::test]
    async fn should_abandon_continuation_when_registry_dropped() {
        let registry = EventRegistry::<Ping>::new();
        let continuation = registry.emit_async(Ping::new("get", &[]), "got");

        drop(registry);

        assert_eq!(
            continuation.await,
            Err(BusError::Abandoned {
                event: "got".to_string()
            })
        );
    }

    #[tokio::test]
    async fn should_time_out_when_end_never_emitted() {
        let registry = EventRegistry::<Ping>::new();
        let after = Duration::from_millis(10);

        let result = registry
            .emit_async(Ping::new("get", &[]), "got")
            .within(after)
            .await;

        assert_eq!(
            result,
            Err(BusError::TimedOut {
                event: "got".to_string(),
                after,
            })
        );
    }

    #[test]
    fn should_discard_emission_after_registry_dropped() {
        let registry = EventRegistry::<Ping>::new();
        let emitter = registry.emitter();
        drop(registry);

        emitter.publish(Ping::new("tick", &[]));
    }
}
