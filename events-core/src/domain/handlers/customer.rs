//! Handlers reacting to customer events.
//!
//! Each handler logs one line per event. `message` exposes the text without
//! logging it.

use tracing::info;

use crate::dispatch::event::{Event, EventHandler};
use crate::domain::events::{DomainEvent, EventPayload};
use crate::error::HandlerError;

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstMessageWhenCustomerIsCreated;

impl FirstMessageWhenCustomerIsCreated {
    pub fn message(&self, event: &DomainEvent) -> Result<String, HandlerError> {
        match event.data() {
            EventPayload::CustomerCreated { .. } => {
                Ok(format!("This is the first log of the event: {}", event.name()))
            }
            _ => Err(HandlerError::unexpected_payload(self.name(), event.name())),
        }
    }
}

impl EventHandler<DomainEvent> for FirstMessageWhenCustomerIsCreated {
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let message = self.message(event)?;
        info!(event_id = %event.id(), "{message}");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SecondMessageWhenCustomerIsCreated;

impl SecondMessageWhenCustomerIsCreated {
    pub fn message(&self, event: &DomainEvent) -> Result<String, HandlerError> {
        match event.data() {
            EventPayload::CustomerCreated { .. } => {
                Ok(format!("This is the second log of the event: {}", event.name()))
            }
            _ => Err(HandlerError::unexpected_payload(self.name(), event.name())),
        }
    }
}

impl EventHandler<DomainEvent> for SecondMessageWhenCustomerIsCreated {
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let message = self.message(event)?;
        info!(event_id = %event.id(), "{message}");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SendMessageWhenCustomerAddressIsChanged;

impl SendMessageWhenCustomerAddressIsChanged {
    pub fn message(&self, event: &DomainEvent) -> Result<String, HandlerError> {
        match event.data() {
            EventPayload::CustomerAddressChanged {
                customer_id,
                customer_name,
                address,
            } => Ok(format!(
                "Address of customer {customer_id}, {customer_name} changed to: {address}"
            )),
            _ => Err(HandlerError::unexpected_payload(self.name(), event.name())),
        }
    }
}

impl EventHandler<DomainEvent> for SendMessageWhenCustomerAddressIsChanged {
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let message = self.message(event)?;
        info!(event_id = %event.id(), "{message}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::Address;
    use crate::domain::customer::Customer;

    #[test]
    fn test_created_messages() {
        let customer = Customer::new("1", "John Doe").expect("valid");
        let event = customer.created_event();

        assert_eq!(
            FirstMessageWhenCustomerIsCreated.message(&event).expect("created"),
            "This is the first log of the event: CustomerCreatedEvent"
        );
        assert_eq!(
            SecondMessageWhenCustomerIsCreated.message(&event).expect("created"),
            "This is the second log of the event: CustomerCreatedEvent"
        );
        assert!(FirstMessageWhenCustomerIsCreated.handle(&event).is_ok());
    }

    #[test]
    fn test_address_changed_message() {
        let mut customer = Customer::new("1", "John Doe").expect("valid");
        let address = Address::new("Main Street", 100, "12345", "Springfield").expect("valid");
        let event = customer.change_address(address);

        assert_eq!(
            SendMessageWhenCustomerAddressIsChanged
                .message(&event)
                .expect("address changed"),
            "Address of customer 1, John Doe changed to: Main Street, 100, 12345 Springfield"
        );
    }

    #[test]
    fn test_wrong_payload_is_rejected() {
        let event = DomainEvent::customer_created("1", "John Doe");

        let err = SendMessageWhenCustomerAddressIsChanged
            .handle(&event)
            .expect_err("wrong payload");

        assert_eq!(
            err.to_string(),
            "SendMessageWhenCustomerAddressIsChanged cannot handle payload of CustomerCreatedEvent"
        );
    }
}
