use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

/// Postal address value object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: CompactString,
    number: u32,
    zip: CompactString,
    city: CompactString,
}

impl Address {
    pub fn new(
        street: impl Into<CompactString>,
        number: u32,
        zip: impl Into<CompactString>,
        city: impl Into<CompactString>,
    ) -> DispatchResult<Self> {
        let address = Self {
            street: street.into(),
            number,
            zip: zip.into(),
            city: city.into(),
        };
        address.validate()?;
        Ok(address)
    }

    fn validate(&self) -> DispatchResult<()> {
        for (field, value) in [
            ("street", &self.street),
            ("zip", &self.zip),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(DispatchError::invalid_input(field, format!("{field} is required")));
            }
        }

        if self.number == 0 {
            return Err(DispatchError::invalid_input("number", "number must be positive"));
        }

        Ok(())
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn zip(&self) -> &str {
        &self.zip
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {} {}", self.street, self.number, self.zip, self.city)
    }
}
