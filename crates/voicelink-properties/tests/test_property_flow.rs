//! End-to-end property flows: derivation from item metadata, record
//! serialization, rehydration on the directive path and bidirectional value
//! transcoding.

use serde_json::{json, Value};

use voicelink_core::item::{Item, ItemType, MetadataEntry, StateDescription};
use voicelink_core::units::UnitSystem;
use voicelink_core::{AssetCatalog, Settings};
use voicelink_properties::{Property, PropertyContext, PropertyKind};

fn derive(kind: PropertyKind, item: &Item, config: Value) -> Property {
    let settings = Settings::default();
    let catalog = AssetCatalog::new();
    let ctx = PropertyContext::new(&settings, &catalog);
    let mut metadata = MetadataEntry::new(kind.as_str());
    if let Value::Object(map) = config {
        metadata.config = map;
    }
    Property::derive(kind, item, &metadata, None, None, &ctx).expect("property should derive")
}

/// A derived property rehydrated from its serialized record keeps the same
/// transcoding behavior.
#[test]
fn test_record_round_trip_preserves_transcoding() {
    let mut item = Item::new("shutter", ItemType::Rollershutter);
    item.state = Some("25".into());
    let derived = derive(PropertyKind::OpenState, &item, json!({"inverted": false}));

    let record = serde_json::to_value(&derived).unwrap();
    assert_eq!(record["name"], "openState");
    assert_eq!(record["item"]["name"], "shutter");
    assert_eq!(record["item"]["type"], "Rollershutter");

    let normalized = Property::normalize(
        PropertyKind::OpenState,
        record["item"]["name"].as_str().unwrap(),
        record["item"]["type"].as_str().unwrap(),
        None,
        None,
        record["parameters"].as_object().unwrap(),
    )
    .unwrap();

    for value in ["OPEN", "CLOSED"] {
        assert_eq!(
            derived.get_command(&json!(value)),
            normalized.get_command(&json!(value)),
            "{}",
            value
        );
    }
    assert_eq!(normalized.get_state("0"), Some(json!("OPEN")));
    assert_eq!(normalized.get_state("100"), Some(json!("CLOSED")));
}

/// Command and state stay symmetric under inversion.
#[test]
fn test_inversion_symmetry() {
    let item = Item::new("valve", ItemType::Switch);
    for inverted in [false, true] {
        let property = derive(PropertyKind::OpenState, &item, json!({"inverted": inverted}));
        for raw in ["ON", "OFF"] {
            let external = property.get_state(raw).unwrap();
            assert_eq!(property.get_command(&external), Some(raw.into()));
        }
    }
}

/// Color temperature on a dimmer-backed white channel scales inversely: 0%
/// is the coldest point of the range.
#[test]
fn test_color_temperature_percent_scaling() {
    let item = Item::new("whiteChannel", ItemType::Dimmer);
    let property = derive(
        PropertyKind::ColorTemperature,
        &item,
        json!({"range": "2000:6500"}),
    );
    assert_eq!(property.get_state("0"), Some(json!(6500)));
    assert_eq!(property.get_state("100"), Some(json!(2000)));
    assert_eq!(property.get_command(&json!(2000)), Some("100".into()));
}

/// A sensor-tagged property is usable only next to its untagged counterpart
/// of the same kind.
#[test]
fn test_decoupled_sensor_needs_counterpart() {
    let settings = Settings::default();
    let catalog = AssetCatalog::new();
    let ctx = PropertyContext::new(&settings, &catalog);
    let metadata = MetadataEntry::new("lockState");

    let sensor_item = Item::new("doorSensor", ItemType::Contact);
    let sensor = Property::derive(
        PropertyKind::LockState,
        &sensor_item,
        &metadata,
        None,
        Some("sensor"),
        &ctx,
    )
    .unwrap();
    assert!(!sensor.has_required_linked_properties(&[]));

    let target_item = Item::new("doorLock", ItemType::Switch);
    let target = Property::derive(
        PropertyKind::LockState,
        &target_item,
        &metadata,
        None,
        None,
        &ctx,
    )
    .unwrap();
    assert!(sensor.has_required_linked_properties(std::slice::from_ref(&target)));

    // The tagged instance reads, the untagged one commands.
    assert_eq!(sensor.get_command(&json!("LOCKED")), None);
    assert_eq!(sensor.get_state("CLOSED"), Some(json!("LOCKED")));
    assert_eq!(target.get_command(&json!("LOCKED")), Some("ON".into()));
}

/// Mode resources resolve against the supplemental catalog and the account
/// language, deduplicating labels across entries.
#[test]
fn test_mode_resources_with_custom_catalog() {
    let settings = Settings::new("de", UnitSystem::Metric);
    let catalog = AssetCatalog::from_json(&json!({
        "Custom.Eco": [{"text": "Öko", "locale": "de-DE"}]
    }))
    .unwrap();
    let ctx = PropertyContext::new(&settings, &catalog);

    let item = Item::new("washer", ItemType::String);
    let metadata = MetadataEntry::new("mode").with_config(
        "supportedModes",
        "Normal=Normal:Shared,Eco=@Custom.Eco:Shared,Bad=Shared",
    );
    let property =
        Property::derive(PropertyKind::Mode, &item, &metadata, None, None, &ctx).unwrap();

    let configuration = property.configuration(&ctx).unwrap();
    let modes = configuration["supportedModes"].as_array().unwrap();
    // "Bad" only carried an already-claimed label and is dropped.
    assert_eq!(modes.len(), 2);
    assert_eq!(modes[0]["value"], json!("Normal"));
    assert_eq!(
        modes[1]["modeResources"]["friendlyNames"][0],
        json!({"type": "asset", "assetId": "Custom.Eco"})
    );
}

/// Range value derives its bounds from the item's state description and its
/// unit from the regional measurement system.
#[test]
fn test_range_value_derivation_from_item() {
    let mut item = Item::new(
        "setpoint",
        ItemType::Number(Some(voicelink_core::Dimension::Temperature)),
    );
    item.state_description = Some(StateDescription {
        minimum: Some(10.0),
        maximum: Some(30.0),
        step: Some(0.5),
        ..Default::default()
    });

    let settings = Settings::new("en-US", UnitSystem::Imperial);
    let catalog = AssetCatalog::new();
    let ctx = PropertyContext::new(&settings, &catalog);
    let metadata = MetadataEntry::new("rangeValue");
    let property =
        Property::derive(PropertyKind::RangeValue, &item, &metadata, None, None, &ctx).unwrap();

    let configuration = property.configuration(&ctx).unwrap();
    assert_eq!(
        configuration["supportedRange"],
        json!({"minimum": 10, "maximum": 30, "precision": 0.5})
    );
    assert_eq!(configuration["unitOfMeasure"], json!("Temperature.Fahrenheit"));

    assert_eq!(property.get_command(&json!(25)), Some("25".into()));
    assert_eq!(property.get_command(&json!(95)), Some("30".into()));
}

/// Semantic mappings coalesce identifiers that target the same directive or
/// value.
#[test]
fn test_semantics_coalescing() {
    let item = Item::new("blind", ItemType::Rollershutter);
    let property = derive(
        PropertyKind::RangeValue,
        &item,
        json!({
            "actionMappings": "Close=0,Open=100,Raise=100",
            "stateMappings": "Closed=0,Open=100",
        }),
    );
    let semantics = property.semantics().unwrap();
    assert_eq!(semantics.action_mappings.len(), 2);
    assert_eq!(
        semantics.action_mappings[1].actions,
        vec!["Actions.Open", "Actions.Raise"]
    );
    assert_eq!(semantics.state_mappings.len(), 2);
}

/// An item that the hub does not auto-update yields a non-retrievable
/// property unless configured otherwise.
#[test]
fn test_retrievability_follows_auto_update() {
    let mut item = Item::new("fan", ItemType::Switch);
    item.metadata
        .insert("autoupdate".into(), MetadataEntry::new("false"));
    let property = derive(PropertyKind::PowerState, &item, json!({}));
    assert!(!property.is_retrievable());
    assert!(!property.is_reportable());

    let reported = derive(
        PropertyKind::PowerState,
        &item,
        json!({"proactivelyReported": true}),
    );
    assert!(reported.is_reportable());
}
