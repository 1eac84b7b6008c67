//! End-to-end tests driving the monitor through the in-process provider.

mod test_helpers;

use arrival_monitor::{
    EventGuid, MonitorConfig, MonitorError, PropertyError, PropertyKind, ProviderId, TargetState,
    DEVICE_ARRIVAL_EVENT,
};
use test_helpers::Harness;

const MEDIA_CONNECT_EVENT: EventGuid =
    EventGuid::from_fields(0x981f_2d7d, 0xb1f3, 0x11d0, [0x8d, 0xd7, 0, 0xc0, 0x4f, 0xc3, 0x35, 0x8c]);

#[test]
fn test_register_twice_keeps_one_subscription() {
    let harness = Harness::new();

    let first = harness.monitor.register().unwrap();
    let second = harness.monitor.register();

    assert!(matches!(second, Err(MonitorError::AlreadyRegistered)));
    assert_eq!(harness.provider.open_count(), 1);
    assert_eq!(harness.provider.open_block_count(), 1);
    assert_eq!(harness.monitor.subscription(), Some(first));
}

#[test]
fn test_unregister_is_idempotent() {
    let harness = Harness::new();

    // Never registered
    harness.monitor.unregister();
    assert_eq!(harness.provider.release_count(), 0);

    harness.monitor.register().unwrap();
    harness.monitor.unregister();
    harness.monitor.unregister();

    assert!(!harness.monitor.is_registered());
    assert_eq!(harness.provider.release_count(), 1);
    assert_eq!(harness.provider.open_block_count(), 0);
}

#[test]
fn test_provider_unavailable() {
    let harness = Harness::new();
    harness.provider.fail_next_open();

    let result = harness.monitor.register();

    assert!(matches!(result, Err(MonitorError::ProviderUnavailable(_))));
    assert_eq!(harness.provider.open_count(), 0);
    assert!(!harness.monitor.is_registered());

    // The failure is not sticky
    assert!(harness.monitor.register().is_ok());
}

#[test]
fn test_callback_install_failure_does_not_leak_block() {
    let harness = Harness::new();
    harness.provider.fail_next_callback_install();

    let result = harness.monitor.register();

    assert!(matches!(result, Err(MonitorError::CallbackInstallFailed(_))));
    assert_eq!(harness.provider.open_count(), 1);
    assert_eq!(harness.provider.release_count(), 1);
    assert_eq!(harness.provider.open_block_count(), 0);
    assert!(!harness.monitor.is_registered());
}

#[test]
fn test_arrival_reported_for_matching_target() {
    let harness = Harness::new();
    harness.add_named_target(5, TargetState::Stopped, "Stopped Toaster");
    harness.add_named_target(5, TargetState::Started, "Other Toaster");
    harness.add_named_target(7, TargetState::Started, "Kitchen Toaster");
    let trailing = harness.add_named_target(7, TargetState::Started, "Spare Toaster");
    harness.monitor.register().unwrap();

    assert_eq!(harness.provider.fire(ProviderId(7), DEVICE_ARRIVAL_EVENT, b""), 1);

    assert_eq!(
        harness.sink.messages(),
        vec!["Kitchen Toaster fired a device arrival event"]
    );
    assert_eq!(harness.registry.property_queries().len(), 1);
    assert!(!harness.registry.identity_queries().contains(&trailing));
}

#[test]
fn test_identity_only_match_keeps_scanning() {
    let harness = Harness::with_config(MonitorConfig::default());
    let b = harness.add_named_target(5, TargetState::Started, "B");
    let c = harness.add_named_target(7, TargetState::Started, "C");

    // Bypass the subscription, which only receives its own event class
    let event = arrival_monitor::NotificationEvent::new(ProviderId(5), MEDIA_CONNECT_EVENT, &[]);
    let summary = harness.monitor.dispatcher().dispatch(&event).unwrap();

    assert_eq!(summary.unknown_events, 1);
    assert_eq!(summary.matched, None);
    assert_eq!(harness.registry.identity_queries(), vec![b, c]);
    assert!(harness.registry.property_queries().is_empty());
    assert_eq!(harness.sink.messages().len(), 1);
    assert!(harness.sink.arrivals().is_empty());
}

#[test]
fn test_only_subscribed_class_is_delivered() {
    let harness = Harness::new();
    harness.add_named_target(7, TargetState::Started, "Toaster");
    harness.monitor.register().unwrap();

    assert_eq!(harness.provider.fire(ProviderId(7), MEDIA_CONNECT_EVENT, b""), 0);
    assert!(harness.sink.messages().is_empty());
}

#[test]
fn test_custom_event_class_subscription() {
    let harness = Harness::with_config(MonitorConfig::new().with_event_class(MEDIA_CONNECT_EVENT));
    harness.add_named_target(3, TargetState::Started, "Ethernet Adapter");
    harness.monitor.register().unwrap();

    assert_eq!(harness.provider.fire(ProviderId(3), DEVICE_ARRIVAL_EVENT, b""), 0);
    assert_eq!(harness.provider.fire(ProviderId(3), MEDIA_CONNECT_EVENT, b""), 1);
    assert_eq!(
        harness.sink.arrivals(),
        vec!["Ethernet Adapter fired a device arrival event"]
    );
}

#[test]
fn test_description_used_when_friendly_name_missing() {
    let harness = Harness::new();
    let target = harness.registry.add_target(Some(ProviderId(9)), TargetState::Started);
    harness
        .registry
        .set_property(target, PropertyKind::DeviceDescription, "Toaster Device");
    harness.monitor.register().unwrap();

    harness.provider.fire(ProviderId(9), DEVICE_ARRIVAL_EVENT, b"");

    assert_eq!(
        harness.sink.arrivals(),
        vec!["Toaster Device fired a device arrival event"]
    );
}

#[test]
fn test_resource_failure_is_reported_not_retried() {
    let harness = Harness::new();
    let target = harness.registry.add_target(Some(ProviderId(9)), TargetState::Started);
    harness.registry.set_property_error(
        target,
        PropertyKind::FriendlyName,
        PropertyError::InsufficientResources,
    );
    harness
        .registry
        .set_property(target, PropertyKind::DeviceDescription, "Toaster Device");
    harness.monitor.register().unwrap();

    harness.provider.fire(ProviderId(9), DEVICE_ARRIVAL_EVENT, b"");

    assert_eq!(
        harness.registry.property_queries(),
        vec![(target, PropertyKind::FriendlyName)]
    );
    let messages = harness.sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Insufficient resources"));
}

#[test]
fn test_target_lifecycle_changes_are_observed() {
    let harness = Harness::new();
    let target = harness.add_named_target(4, TargetState::Created, "Toaster");
    harness.monitor.register().unwrap();

    harness.provider.fire(ProviderId(4), DEVICE_ARRIVAL_EVENT, b"");
    assert!(harness.sink.arrivals().is_empty());

    harness.registry.set_state(target, TargetState::Started);
    harness.provider.fire(ProviderId(4), DEVICE_ARRIVAL_EVENT, b"");
    assert_eq!(harness.sink.arrivals().len(), 1);

    harness.registry.remove_target(target);
    harness.provider.fire(ProviderId(4), DEVICE_ARRIVAL_EVENT, b"");
    assert_eq!(harness.sink.arrivals().len(), 1);
}

#[test]
fn test_no_delivery_after_unregister() {
    let harness = Harness::new();
    harness.add_named_target(7, TargetState::Started, "Toaster");
    harness.monitor.register().unwrap();
    harness.monitor.unregister();

    assert_eq!(harness.provider.fire(ProviderId(7), DEVICE_ARRIVAL_EVENT, b""), 0);
    assert!(harness.sink.messages().is_empty());
    assert_eq!(harness.registry.lock_acquisitions(), 0);
}
