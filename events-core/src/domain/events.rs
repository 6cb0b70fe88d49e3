//! Domain events raised by customers and products.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dispatch::event::Event;
use crate::error::{DispatchError, DispatchResult};

pub const CUSTOMER_CREATED: &str = "CustomerCreatedEvent";
pub const CUSTOMER_ADDRESS_CHANGED: &str = "CustomerAddressChangedEvent";
pub const PRODUCT_CREATED: &str = "ProductCreatedEvent";

/// Payload of a [`DomainEvent`], tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    CustomerCreated {
        customer_id: CompactString,
        customer_name: CompactString,
    },

    CustomerAddressChanged {
        customer_id: CompactString,
        customer_name: CompactString,
        address: String,
    },

    ProductCreated {
        name: CompactString,
        description: String,
        price: f64,
    },
}

impl EventPayload {
    /// Channel this payload is published on.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::CustomerCreated { .. } => CUSTOMER_CREATED,
            Self::CustomerAddressChanged { .. } => CUSTOMER_ADDRESS_CHANGED,
            Self::ProductCreated { .. } => PRODUCT_CREATED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    id: Uuid,
    name: CompactString,
    occurred_at: DateTime<Utc>,
    payload: EventPayload,
}

impl DomainEvent {
    /// Stamp `payload` with a fresh id and the current time.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: CompactString::const_new(payload.event_name()),
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn customer_created(
        customer_id: impl Into<CompactString>,
        customer_name: impl Into<CompactString>,
    ) -> Self {
        Self::new(EventPayload::CustomerCreated {
            customer_id: customer_id.into(),
            customer_name: customer_name.into(),
        })
    }

    pub fn customer_address_changed(
        customer_id: impl Into<CompactString>,
        customer_name: impl Into<CompactString>,
        address: impl Into<String>,
    ) -> Self {
        Self::new(EventPayload::CustomerAddressChanged {
            customer_id: customer_id.into(),
            customer_name: customer_name.into(),
            address: address.into(),
        })
    }

    pub fn product_created(
        name: impl Into<CompactString>,
        description: impl Into<String>,
        price: f64,
    ) -> DispatchResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DispatchError::invalid_input("name", "product name is required"));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(DispatchError::invalid_input(
                "price",
                format!("price must be a non-negative number, got {price}"),
            ));
        }

        Ok(Self::new(EventPayload::ProductCreated {
            name,
            description: description.into(),
            price,
        }))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn to_json(&self) -> DispatchResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Event for DomainEvent {
    type Data = EventPayload;

    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> &Self::Data {
        &self.payload
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_follows_payload_kind() {
        let event = DomainEvent::customer_created("1", "John Doe");
        assert_eq!(event.name(), CUSTOMER_CREATED);

        let event = DomainEvent::customer_address_changed("1", "John Doe", "Main Street, 100");
        assert_eq!(event.name(), CUSTOMER_ADDRESS_CHANGED);

        let event = DomainEvent::product_created("Product 1", "Product 1 Description", 100.0)
            .expect("valid product");
        assert_eq!(event.name(), PRODUCT_CREATED);
    }

    #[test]
    fn test_events_get_distinct_ids() {
        let first = DomainEvent::customer_created("1", "John Doe");
        let second = DomainEvent::customer_created("1", "John Doe");

        assert_ne!(first.id(), second.id());
        assert!(first.occurred_at() <= second.occurred_at());
    }

    #[test]
    fn test_product_validation() {
        assert!(DomainEvent::product_created("", "desc", 1.0).is_err());
        assert!(DomainEvent::product_created("P", "desc", -1.0).is_err());
        assert!(DomainEvent::product_created("P", "desc", f64::NAN).is_err());
        assert!(DomainEvent::product_created("P", "desc", 0.0).is_ok());
    }

    #[test]
    fn test_json_carries_kind_tag() {
        let event = DomainEvent::customer_created("c-7", "Ada");
        let json = event.to_json().expect("serializable");

        assert!(json.contains("\"kind\":\"customer_created\""));
        assert!(json.contains("\"name\":\"CustomerCreatedEvent\""));

        let parsed: DomainEvent = serde_json::from_str(&json).expect("parses");
        assert_eq!(parsed, event);
    }
}
