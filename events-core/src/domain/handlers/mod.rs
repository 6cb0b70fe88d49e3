pub mod customer;
pub use customer::{
    FirstMessageWhenCustomerIsCreated, SecondMessageWhenCustomerIsCreated,
    SendMessageWhenCustomerAddressIsChanged,
};

pub mod product;
pub use product::{OutgoingEmail, SendEmailWhenProductIsCreated};
