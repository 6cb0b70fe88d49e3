//! src/main.rs
//! Demo: wires the customer and product handlers to a dispatcher and replays
//! customer creation, an address change and a product launch.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use tracing::{info, warn};

use events_core::{
    Config, EventDispatcher,
    domain::{
        Address, Customer, DomainEvent,
        events::{CUSTOMER_ADDRESS_CHANGED, CUSTOMER_CREATED, PRODUCT_CREATED},
        handlers::{
            FirstMessageWhenCustomerIsCreated, SecondMessageWhenCustomerIsCreated,
            SendEmailWhenProductIsCreated, SendMessageWhenCustomerAddressIsChanged,
        },
    },
    logging::init_logging_with_config,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (config, fallback) = load_config().await.context("Failed to load configuration")?;

    let _log_guard = init_logging_with_config(config.logging.clone())
        .await
        .context("Failed to initialize logging")?;

    match fallback {
        Some(e) => warn!("Falling back to default configuration: {e:#}"),
        None => info!(dispatcher = ?config.dispatcher, "Configuration loaded"),
    }

    info!(policy = ?config.dispatcher.failure_policy, "Starting event dispatcher demo");

    let dispatcher: EventDispatcher<DomainEvent> =
        EventDispatcher::with_config(config.dispatcher.clone());

    dispatcher.register_handler(CUSTOMER_CREATED, FirstMessageWhenCustomerIsCreated);
    dispatcher.register_handler(CUSTOMER_CREATED, SecondMessageWhenCustomerIsCreated);
    dispatcher.register_handler(CUSTOMER_ADDRESS_CHANGED, SendMessageWhenCustomerAddressIsChanged);

    let mailer = Arc::new(SendEmailWhenProductIsCreated::default());
    dispatcher.register(PRODUCT_CREATED, mailer.clone());

    let mut customer = Customer::new("1", "John Doe")?;
    dispatcher.notify(&customer.created_event())?;

    let address = Address::new("Main Street", 100, "12345", "Springfield")?;
    let changed = customer.change_address(address);
    info!(payload = %changed.to_json()?, "customer address changed");
    dispatcher.notify(&changed)?;

    let product = DomainEvent::product_created("Product 1", "Product 1 Description", 100.0)?;
    dispatcher.notify(&product)?;

    for email in mailer.drain_outbox() {
        info!(to = %email.to, subject = %email.subject, "email ready for delivery");
    }

    let stats = dispatcher.stats();
    info!(
        notifications = stats.notifications,
        invocations = stats.invocations,
        failures = stats.failures,
        "Demo finished"
    );

    Ok(())
}

/// `events [CONFIG_PATH]`: an explicit path wins over the platform default.
///
/// Runs before logging is up, so a fallback error is returned for the caller
/// to report.
async fn load_config() -> Result<(Config, Option<anyhow::Error>)> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Ok((Config::load_from(&path).await?, None)),
        None => Ok(Config::load_or_default().await),
    }
}
