//! Event and handler capabilities.
//!
//! An [`Event`] is addressed by its name; the dispatcher only ever reads
//! `name()` and hands the event by reference to every [`EventHandler`]
//! registered under that name.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::HandlerError;

/// Immutable, named notification of a state change.
pub trait Event: Send + Sync {
    /// Payload type carried by the event.
    type Data;

    /// Channel the event is delivered on.
    fn name(&self) -> &str;

    fn data(&self) -> &Self::Data;

    /// Moment the event was constructed.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Reaction to events of type `E`.
///
/// Handlers are shared with the dispatcher through [`HandlerRef`] and must
/// not rely on being owned by it.
pub trait EventHandler<E: Event>: Send + Sync {
    /// Process a single event.
    fn handle(&self, event: &E) -> Result<(), HandlerError>;

    /// Handler name for diagnostics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Shared reference to a registered handler.
pub type HandlerRef<E> = Arc<dyn EventHandler<E>>;

/// Identity comparison of two handler references.
///
/// Two references are the same handler when they point at the same
/// allocation, regardless of the concrete type behind them.
#[inline]
pub fn same_handler<E: Event>(a: &HandlerRef<E>, b: &HandlerRef<E>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn short_type_name(full: &str) -> &str {
    // Generic parameters contain `::` too; only strip the leading path.
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
