pub mod error;

pub mod config;

pub mod dispatch {
    pub mod event;
    pub use event::{Event, EventHandler, HandlerRef, same_handler};

    pub mod registry;
    pub use registry::HandlerRegistry;

    pub mod dispatcher;
    pub use dispatcher::{EventDispatcher, NotifyReport, NotifyResult};

    pub mod stats;
    pub use stats::{DispatcherStats, StatsSnapshot};
}

pub mod domain {
    pub mod address;
    pub use address::Address;

    pub mod customer;
    pub use customer::Customer;

    pub mod events;
    pub use events::{DomainEvent, EventPayload};

    pub mod handlers;
}

pub mod logging;
pub use logging::LoggerBuilder;

pub use config::{Config, DispatcherConfig, FailurePolicy};
pub use dispatch::{Event, EventDispatcher, EventHandler, HandlerRef};
pub use error::{DispatchError, DispatchResult, HandlerError, HandlerFailure, NotifyError};
