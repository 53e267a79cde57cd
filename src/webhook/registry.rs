//! Event handler registry and fan-out dispatch.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

use super::{EventType, WebhookEvent};

/// Outcome of one handler invocation.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Something that reacts to webhook events.
///
/// Implemented directly for stateful handlers; [`handler_fn`] and
/// [`async_handler_fn`] cover plain closures.
pub trait EventHandler: Send + Sync {
    /// Handles one event.
    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, HandlerResult>;
}

struct FnHandler<F>(F);

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&WebhookEvent) -> HandlerResult + Send + Sync,
{
    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, HandlerResult> {
        // Runs on first poll so a panic lands inside dispatch's guard
        Box::pin(async move { (self.0)(event) })
    }
}

struct AsyncFnHandler<F>(F);

impl<F, Fut> EventHandler for AsyncFnHandler<F>
where
    F: Fn(WebhookEvent) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move { (self.0)(event.clone()).await })
    }
}

/// Wraps a synchronous closure as a handler.
///
/// # Example
///
/// ```
/// use agentflow::webhook::{EventType, HandlerRegistry, handler_fn};
///
/// let registry = HandlerRegistry::new();
/// registry.register(
///     EventType::ExecutionCompleted,
///     handler_fn(|event| {
///         println!("execution finished: {}", event.data);
///         Ok(())
///     }),
/// );
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(&WebhookEvent) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// Wraps an async closure as a handler. The closure receives its own copy
/// of the event.
pub fn async_handler_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(WebhookEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(AsyncFnHandler(f))
}

/// Counts from one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Handlers invoked
    pub invoked: usize,
    /// Handlers that returned an error or panicked
    pub failed: usize,
}

/// Maps event types, wildcard included, to ordered handler sets.
///
/// Handlers are compared by reference: registering the same `Arc` twice
/// under one type has no effect, while two separately created handlers
/// are distinct even if they wrap the same closure.
///
/// [`HandlerRegistry::dispatch`] works on a snapshot taken when it starts,
/// so registrations made while handlers are running apply to the next
/// dispatch only.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<EventType, Vec<Arc<dyn EventHandler>>>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registered_types", &self.registered_types())
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` under `event_type`.
    ///
    /// Returns false if that exact handler was already registered there.
    pub fn register(&self, event_type: EventType, handler: Arc<dyn EventHandler>) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let set = handlers.entry(event_type).or_default();
        if set.iter().any(|h| same_handler(h, &handler)) {
            return false;
        }
        set.push(handler);
        true
    }

    /// Removes `handler` from `event_type`, dropping the type once empty.
    ///
    /// Returns false if it was not registered there.
    pub fn unregister(&self, event_type: EventType, handler: &Arc<dyn EventHandler>) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(set) = handlers.get_mut(&event_type) else {
            return false;
        };
        let before = set.len();
        set.retain(|h| !same_handler(h, handler));
        let removed = set.len() != before;
        if set.is_empty() {
            handlers.remove(&event_type);
        }
        removed
    }

    /// Types with at least one handler, in declaration order.
    #[must_use]
    pub fn registered_types(&self) -> Vec<EventType> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut types: Vec<_> = handlers.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Number of handlers registered under exactly `event_type`.
    #[must_use]
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_type)
            .map_or(0, Vec::len)
    }

    /// Removes every handler.
    pub fn clear(&self) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Runs the handlers for `event.event` and then the wildcard handlers,
    /// all concurrently on the calling task, and waits for every one.
    ///
    /// A handler that errors or panics is logged and counted; the others
    /// still run to completion.
    pub async fn dispatch(&self, event: &WebhookEvent) -> DispatchOutcome {
        let handlers = self.snapshot(event.event);
        if handlers.is_empty() {
            tracing::debug!(event_type = %event.event, event_id = %event.id, "No handlers registered");
            return DispatchOutcome::default();
        }

        // `handle` itself runs inside the guard so an eager panic is contained too
        let runs = handlers.iter().map(|handler| {
            AssertUnwindSafe(async move { handler.handle(event).await }).catch_unwind()
        });
        let results = join_all(runs).await;

        let mut outcome = DispatchOutcome {
            invoked: results.len(),
            failed: 0,
        };
        for result in results {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    outcome.failed += 1;
                    tracing::error!(
                        event_type = %event.event,
                        event_id = %event.id,
                        "Webhook handler failed: {e}"
                    );
                }
                Err(panic) => {
                    outcome.failed += 1;
                    tracing::error!(
                        event_type = %event.event,
                        event_id = %event.id,
                        "Webhook handler panicked: {}",
                        panic_message(panic.as_ref())
                    );
                }
            }
        }
        outcome
    }

    fn snapshot(&self, event_type: EventType) -> Vec<Arc<dyn EventHandler>> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = handlers.get(&event_type).cloned().unwrap_or_default();
        if !event_type.is_wildcard() {
            if let Some(wildcard) = handlers.get(&EventType::Any) {
                snapshot.extend(wildcard.iter().cloned());
            }
        }
        snapshot
    }
}

fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
