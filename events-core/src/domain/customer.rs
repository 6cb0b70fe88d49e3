use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::events::DomainEvent;
use crate::error::{DispatchError, DispatchResult};

/// Customer aggregate.
///
/// Mutators that matter to other parts of the system return the event they
/// raise; the caller decides where to `notify` it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CompactString,
    name: CompactString,
    address: Option<Address>,
    active: bool,
    reward_points: u64,
}

impl Customer {
    pub fn new(id: impl Into<CompactString>, name: impl Into<CompactString>) -> DispatchResult<Self> {
        let customer = Self {
            id: id.into(),
            name: name.into(),
            address: None,
            active: false,
            reward_points: 0,
        };
        customer.validate()?;
        Ok(customer)
    }

    fn validate(&self) -> DispatchResult<()> {
        if self.id.trim().is_empty() {
            return Err(DispatchError::invalid_input("id", "id is required"));
        }
        if self.name.trim().is_empty() {
            return Err(DispatchError::invalid_input("name", "name is required"));
        }
        Ok(())
    }

    /// Event announcing this customer's creation.
    pub fn created_event(&self) -> DomainEvent {
        DomainEvent::customer_created(self.id.clone(), self.name.clone())
    }

    pub fn change_name(&mut self, name: impl Into<CompactString>) -> DispatchResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DispatchError::invalid_input("name", "name is required"));
        }
        self.name = name;
        Ok(())
    }

    /// Store the new address and return the resulting address-changed event.
    pub fn change_address(&mut self, address: Address) -> DomainEvent {
        let formatted = address.to_string();
        self.address = Some(address);
        DomainEvent::customer_address_changed(self.id.clone(), self.name.clone(), formatted)
    }

    pub fn activate(&mut self) -> DispatchResult<()> {
        if self.address.is_none() {
            return Err(DispatchError::invalid_input(
                "address",
                "address is mandatory to activate a customer",
            ));
        }
        self.active = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn add_reward_points(&mut self, points: u64) {
        self.reward_points = self.reward_points.saturating_add(points);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reward_points(&self) -> u64 {
        self.reward_points
    }
}
