use chrono::{DateTime, Utc};
use compact_str::CompactString;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::dispatch::event::{Event, EventHandler};
use crate::domain::events::{DomainEvent, EventPayload};
use crate::error::HandlerError;

/// Email queued by [`SendEmailWhenProductIsCreated`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub to: CompactString,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

/// Queues an announcement email for every new product.
///
/// Delivery is out of scope; emails stay in the outbox until drained.
#[derive(Debug)]
pub struct SendEmailWhenProductIsCreated {
    recipient: CompactString,
    outbox: Mutex<Vec<OutgoingEmail>>,
}

impl SendEmailWhenProductIsCreated {
    pub fn new(recipient: impl Into<CompactString>) -> Self {
        Self {
            recipient: recipient.into(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Take every queued email.
    pub fn drain_outbox(&self) -> Vec<OutgoingEmail> {
        std::mem::take(&mut *self.outbox.lock())
    }

    pub fn pending(&self) -> usize {
        self.outbox.lock().len()
    }
}

impl Default for SendEmailWhenProductIsCreated {
    fn default() -> Self {
        Self::new("catalog@example.com")
    }
}

impl EventHandler<DomainEvent> for SendEmailWhenProductIsCreated {
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let EventPayload::ProductCreated {
            name,
            description,
            price,
        } = event.data()
        else {
            return Err(HandlerError::unexpected_payload(self.name(), event.name()));
        };

        let email = OutgoingEmail {
            to: self.recipient.clone(),
            subject: format!("New product: {name}"),
            body: format!("{name} ({price:.2})\n\n{description}"),
            queued_at: Utc::now(),
        };

        info!(
            event_id = %event.id(),
            to = %email.to,
            subject = %email.subject,
            "Sending email for new product"
        );

        self.outbox.lock().push(email);
        Ok(())
    }
}
