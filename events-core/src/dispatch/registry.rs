//! HandlerRegistry: event name -> ordered handler sequence
//!
//! - Registration order is preserved per name, duplicates included
//! - Removal is by handler identity and never fails
//! - A name stays known after its last handler is removed, until `clear`

use std::fmt;
use std::sync::Arc;

use ahash::RandomState;
use compact_str::CompactString;
use indexmap::IndexMap;
use smallvec::SmallVec;

use super::event::{Event, HandlerRef, same_handler};

/// Most event names carry a handful of handlers.
pub type HandlerList<E> = SmallVec<[HandlerRef<E>; 4]>;

/// Mapping from event name to the handlers registered for it.
pub struct HandlerRegistry<E: Event + 'static> {
    entries: IndexMap<CompactString, HandlerList<E>, RandomState>,
}

impl<E: Event + 'static> HandlerRegistry<E> {
    /// Create new empty handler registry
    pub fn new() -> Self {
        Self {
            entries: IndexMap::with_hasher(RandomState::new()),
        }
    }

    /// Append `handler` to the sequence for `event_name`.
    pub fn register(&mut self, event_name: impl Into<CompactString>, handler: HandlerRef<E>) {
        self.entries
            .entry(event_name.into())
            .or_default()
            .push(handler);
    }

    /// Remove the first entry identical to `handler` under `event_name`.
    ///
    /// Returns whether an entry was removed.
    pub fn unregister(&mut self, event_name: &str, handler: &HandlerRef<E>) -> bool {
        let Some(list) = self.entries.get_mut(event_name) else {
            return false;
        };

        match list.iter().position(|h| same_handler(h, handler)) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every name and every handler.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Handlers for `event_name`, in registration order.
    ///
    /// `None` means the name was never registered (or was cleared); an empty
    /// slice means every handler was unregistered.
    pub fn handlers(&self, event_name: &str) -> Option<&[HandlerRef<E>]> {
        self.entries.get(event_name).map(|list| list.as_slice())
    }

    pub fn handler_count(&self, event_name: &str) -> usize {
        self.entries.get(event_name).map_or(0, SmallVec::len)
    }

    pub fn contains_event(&self, event_name: &str) -> bool {
        self.entries.contains_key(event_name)
    }

    /// Known event names, in order of first registration.
    pub fn event_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(CompactString::as_str)
    }

    /// Handler count across all names.
    pub fn total_handlers(&self) -> usize {
        self.entries.values().map(SmallVec::len).sum()
    }

    /// Number of known event names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: Event + 'static> Default for HandlerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

// Cloning shares the handlers; only the sequences are copied.
impl<E: Event + 'static> Clone for HandlerRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(name, list)| (name.clone(), list.iter().map(Arc::clone).collect()))
                .collect(),
        }
    }
}

impl<E: Event + 'static> fmt::Debug for HandlerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, list) in &self.entries {
            let names: Vec<&str> = list.iter().map(|h| h.name()).collect();
            map.entry(name, &names);
        }
        map.finish()
    }
}
