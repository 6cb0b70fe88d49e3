//! EventDispatcher: name-addressed, synchronous event delivery
//!
//! The handler registry lives behind an [`ArcSwap`]. Mutations clone the
//! current registry, apply the change and swap the pointer (`rcu`), while
//! `notify` works on the snapshot it loaded when it started:
//! - a notification in flight never sees a half-applied change
//! - handlers may call back into the dispatcher without deadlocking
//! - changes made during a notification apply to the next one
//!
//! Each `register` and successful `unregister` copies the whole map (every
//! name and every handler list), so a mutation costs O(total handlers).
//! `clear` and `notify` never copy. Registries are expected to be small and
//! mostly read.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use compact_str::CompactString;
use tracing::{debug, debug_span, trace, warn};

use super::event::{Event, EventHandler, HandlerRef, same_handler};
use super::registry::HandlerRegistry;
use super::stats::{DispatcherStats, StatsSnapshot};
use crate::config::{DispatcherConfig, FailurePolicy};
use crate::error::{HandlerFailure, NotifyError};

/// Outcome of a successful `notify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyReport {
    pub event: CompactString,

    /// Handlers invoked, duplicates counted once per entry.
    pub invoked: usize,

    pub elapsed: Duration,
}

impl NotifyReport {
    fn unrouted(event: &str) -> Self {
        Self {
            event: event.into(),
            invoked: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// At least one handler received the event.
    pub fn delivered(&self) -> bool {
        self.invoked > 0
    }
}

pub type NotifyResult = Result<NotifyReport, NotifyError>;

pub struct EventDispatcher<E: Event + 'static> {
    registry: ArcSwap<HandlerRegistry<E>>,
    config: DispatcherConfig,
    stats: DispatcherStats,
}

impl<E: Event + 'static> EventDispatcher<E> {
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            registry: ArcSwap::from_pointee(HandlerRegistry::new()),
            config,
            stats: DispatcherStats::default(),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Append `handler` to the handlers of `event_name`.
    ///
    /// No uniqueness check: registering the same handler twice makes it run
    /// twice per notification.
    pub fn register(&self, event_name: impl Into<CompactString>, handler: HandlerRef<E>) {
        let event_name: CompactString = event_name.into();

        self.registry.rcu(|current| {
            let mut next: HandlerRegistry<E> = (**current).clone();
            next.register(event_name.clone(), Arc::clone(&handler));
            next
        });

        debug!(event = %event_name, handler = handler.name(), "handler registered");
    }

    /// Wrap `handler` in a [`HandlerRef`], register it and hand the reference
    /// back for a later `unregister`.
    pub fn register_handler<H>(&self, event_name: impl Into<CompactString>, handler: H) -> HandlerRef<E>
    where
        H: EventHandler<E> + 'static,
    {
        let handler: HandlerRef<E> = Arc::new(handler);
        self.register(event_name, Arc::clone(&handler));
        handler
    }

    /// Remove the first registration of `handler` under `event_name`.
    ///
    /// Unknown names and handlers are ignored. The name stays known even when
    /// its last handler goes away.
    pub fn unregister(&self, event_name: &str, handler: &HandlerRef<E>) -> bool {
        let present = self
            .registry
            .load()
            .handlers(event_name)
            .is_some_and(|list| list.iter().any(|h| same_handler(h, handler)));

        if !present {
            trace!(event = event_name, handler = handler.name(), "unregister: not registered");
            return false;
        }

        let mut removed = false;
        self.registry.rcu(|current| {
            let mut next: HandlerRegistry<E> = (**current).clone();
            removed = next.unregister(event_name, handler);
            next
        });

        debug!(event = event_name, handler = handler.name(), removed, "handler unregistered");
        removed
    }

    /// Forget every event name and handler.
    pub fn clear(&self) {
        let previous = self.registry.swap(Arc::new(HandlerRegistry::new()));
        debug!(
            events = previous.len(),
            handlers = previous.total_handlers(),
            "registry cleared"
        );
    }

    /// Deliver `event` to every handler registered under its name, in
    /// registration order, on the calling thread.
    ///
    /// An unknown name is not an error. Handler failures are isolated or
    /// abort delivery according to [`DispatcherConfig::failure_policy`].
    pub fn notify(&self, event: &E) -> NotifyResult {
        let event_name = event.name();
        let snapshot = self.registry.load_full();
        self.stats.record_notification();

        let handlers = match snapshot.handlers(event_name) {
            Some(handlers) if !handlers.is_empty() => handlers,
            _ => {
                self.stats.record_unrouted();
                trace!(event = event_name, "no handlers registered");
                return Ok(NotifyReport::unrouted(event_name));
            }
        };

        let span = debug_span!("notify", event = event_name, handlers = handlers.len());
        let _enter = span.enter();

        let started = Instant::now();
        let mut failures: Vec<HandlerFailure> = Vec::new();

        for (position, handler) in handlers.iter().enumerate() {
            let Err(failure) = self.invoke(position, handler, event) else {
                continue;
            };

            warn!(
                handler = %failure.handler,
                position,
                panicked = failure.panicked,
                error = %failure.message,
                "handler failed"
            );

            if self.config.failure_policy == FailurePolicy::Abort {
                return Err(NotifyError::Aborted {
                    event: event_name.into(),
                    invoked: position + 1,
                    skipped: handlers.len() - position - 1,
                    failure,
                });
            }

            failures.push(failure);
        }

        let elapsed = started.elapsed();
        debug!(
            invoked = handlers.len(),
            failed = failures.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "event delivered"
        );

        if failures.is_empty() {
            Ok(NotifyReport {
                event: event_name.into(),
                invoked: handlers.len(),
                elapsed,
            })
        } else {
            Err(NotifyError::HandlersFailed {
                event: event_name.into(),
                invoked: handlers.len(),
                failures,
            })
        }
    }

    fn invoke(&self, position: usize, handler: &HandlerRef<E>, event: &E) -> Result<(), HandlerFailure> {
        self.stats.record_invocation();
        trace!(handler = handler.name(), position, "invoking handler");

        let started = Instant::now();
        let outcome = if self.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
                Ok(result) => result.map_err(|e| (e.to_string(), false)),
                Err(payload) => Err((panic_message(payload.as_ref()), true)),
            }
        } else {
            handler.handle(event).map_err(|e| (e.to_string(), false))
        };

        let elapsed = started.elapsed();
        if elapsed > self.config.slow_handler_threshold {
            self.stats.record_slow();
            warn!(
                handler = handler.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.config.slow_handler_threshold.as_millis() as u64,
                "slow handler"
            );
        }

        outcome.map_err(|(message, panicked)| {
            self.stats.record_failure();
            HandlerFailure {
                handler: handler.name().into(),
                position,
                message,
                panicked,
            }
        })
    }

    /// Immutable view of the registry as of now.
    pub fn snapshot(&self) -> Arc<HandlerRegistry<E>> {
        self.registry.load_full()
    }

    /// Handlers currently registered under `event_name`, in order.
    pub fn handlers(&self, event_name: &str) -> Option<Vec<HandlerRef<E>>> {
        self.registry
            .load()
            .handlers(event_name)
            .map(|list| list.to_vec())
    }

    pub fn handler_count(&self, event_name: &str) -> usize {
        self.registry.load().handler_count(event_name)
    }

    pub fn contains_event(&self, event_name: &str) -> bool {
        self.registry.load().contains_event(event_name)
    }

    pub fn event_names(&self) -> Vec<CompactString> {
        self.registry
            .load()
            .event_names()
            .map(CompactString::from)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.load().is_empty()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Zero the delivery counters. Registrations are untouched.
    pub fn reset_stats(&self) {
        self.stats.reset();
        debug!("dispatcher stats reset");
    }
}

impl<E: Event + 'static> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event + 'static> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.load();
        f.debug_struct("EventDispatcher")
            .field("event_count", &registry.len())
            .field("handler_count", &registry.total_handlers())
            .field("failure_policy", &self.config.failure_policy)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
