//! Walk through a monitor's life: register, receive events while targets come
//! and go, then tear down.
//!
//! Run with `DEVNOTIFY_LOG_MODE=debug cargo run --example arrival_demo` to see
//! the dispatcher's per-target decisions.

use std::sync::Arc;

use arrival_monitor::logging::{init_logging, LoggingMode};
use arrival_monitor::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    if std::env::var("DEVNOTIFY_LOG_MODE").is_ok() {
        arrival_monitor::logging::init_logging_from_env()?;
    } else {
        init_logging(LoggingMode::Development)?;
    }

    let provider = Arc::new(LocalProvider::new());
    let registry = Arc::new(InMemoryTargetRegistry::new());

    let kitchen = registry.add_target(Some(ProviderId(0x10)), TargetState::Started);
    registry.set_property(kitchen, PropertyKind::FriendlyName, "Kitchen Toaster");

    let garage = registry.add_target(Some(ProviderId(0x20)), TargetState::Created);
    registry.set_property(garage, PropertyKind::DeviceDescription, "Toaster Device");

    let monitor = ArrivalMonitor::new(
        Arc::clone(&provider),
        Arc::clone(&registry),
        TracingSink,
        MonitorConfig::default(),
    )?;

    let subscription = monitor.register()?;
    println!(
        "Subscribed to {} on {}",
        subscription.event_class(),
        subscription.block()
    );

    // Matches the started kitchen target
    provider.fire(ProviderId(0x10), DEVICE_ARRIVAL_EVENT, b"");

    // Garage target is not started yet, so nothing is reported
    provider.fire(ProviderId(0x20), DEVICE_ARRIVAL_EVENT, b"");

    registry.set_state(garage, TargetState::Started);
    provider.fire(ProviderId(0x20), DEVICE_ARRIVAL_EVENT, b"");

    // Unknown device
    provider.fire(ProviderId(0x30), DEVICE_ARRIVAL_EVENT, b"");

    monitor.unregister();
    println!(
        "Released subscription; {} block(s) still open",
        provider.open_block_count()
    );

    Ok(())
}
