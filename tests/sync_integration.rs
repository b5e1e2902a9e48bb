//! Integration tests for attribute tree serialization and synchronization
//!
//! Covers the sender/receiver cycle end to end: mutate a synced tree, flush,
//! ship the bytes, apply them to a mirror.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use attribute_tree::{
    Attribute, AttributeConfig, AttributeError, ContentCategory, ContentRegistry,
    ItemStackAttribute, JsonAttributeConverter, PathUpdate, SyncPacket, SyncedTreeAttribute,
    TreeAttribute,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn partial_bytes(packet: Option<SyncPacket>) -> Vec<u8> {
    match packet {
        Some(SyncPacket::Partial(bytes)) => bytes,
        other => panic!("expected partial update, got {:?}", other),
    }
}

/// Entity data three levels deep with every array flavour
fn sample_entity() -> TreeAttribute {
    let mut stats = TreeAttribute::new();
    stats.set_double("current", 12.5);
    stats.set_double("max", 20.0);
    stats.set_int_array("history", vec![20, 18, 12]);

    let mut body = TreeAttribute::new();
    body.set_tree("stats", stats);
    body.set_float_array("scale", vec![1.0, 0.5]);

    let mut enchant = TreeAttribute::new();
    enchant.set_int("sharpness", 3);
    let sword = ItemStackAttribute::new(ContentCategory::Item, "sword", 1).with_attributes(enchant);

    let mut entity = TreeAttribute::new();
    entity.set_tree("body", body);
    entity.set_string("name", "wolf");
    entity.set_long("spawned", 1_700_000_000_000);
    entity.set_bool_array("flags", vec![true, false, true]);
    entity.set_double_array("path", vec![0.25, -3.5]);
    entity.set_long_array("ids", vec![i64::MIN, 0, i64::MAX]);
    entity.set_string_array("tags", vec!["hostile".to_string(), "pack".to_string()]);
    entity.set_bytes("blob", vec![0, 255, 7]);
    entity.set_item_stack("weapon", sword);
    entity
}

#[test]
fn test_nested_tree_round_trip() {
    init_logging();
    let entity = sample_entity();
    let decoded = TreeAttribute::from_bytes(&entity.to_bytes()).unwrap();

    assert_eq!(decoded, entity);
    assert_eq!(
        decoded.get_attribute_by_path("body/stats/current"),
        Some(&Attribute::Double(12.5))
    );
    assert_eq!(
        decoded.tree_at_path("body/stats").unwrap().get_int_array("history", &[]),
        &[20, 18, 12]
    );
    let weapon = decoded.get_item_stack("weapon").unwrap();
    assert_eq!(weapon.code, "sword");
    assert_eq!(weapon.attributes.as_ref().unwrap().get_int("sharpness", 0), 3);
}

#[test]
fn test_flush_and_apply_scenario() {
    init_logging();
    let mut source = SyncedTreeAttribute::new();
    source.set_float("speed", 1.5);
    source.set_int("ticks", 10);

    let bytes = partial_bytes(source.flush());
    let updates = PathUpdate::decode_all(&bytes).unwrap();
    assert_eq!(
        updates,
        vec![
            PathUpdate::set("speed", Attribute::Double(1.5)),
            PathUpdate::set("ticks", Attribute::Int(10)),
        ]
    );

    let mut mirror = SyncedTreeAttribute::new();
    mirror.apply_partial_update(&bytes).unwrap();
    assert_eq!(mirror, source);
    assert!(!mirror.is_all_dirty());
    assert_eq!(mirror.dirty_path_count(), 0);

    assert!(source.flush().is_none());
    assert_eq!(PathUpdate::decode_all(&source.encode_partial_update()).unwrap().len(), 0);
}

#[test]
fn test_nested_path_setters_reach_mirror() {
    init_logging();
    let mut source = SyncedTreeAttribute::new();
    source.set_float("health/current", 10.0);
    let mut mirror = SyncedTreeAttribute::new();
    mirror.apply_packet(&source.flush().unwrap()).unwrap();

    source.set_int("health/current", 99);
    mirror.apply_packet(&source.flush().unwrap()).unwrap();

    assert_eq!(
        mirror.get_attribute_by_path("health/current"),
        Some(&Attribute::Int(99))
    );
    assert_eq!(mirror, source);
}

#[test]
fn test_nan_survives_round_trip() {
    let mut tree = TreeAttribute::new();
    tree.set_double("x", f64::NAN);
    tree.set_float_array("samples", vec![f32::NAN, 1.0]);

    let bytes = tree.to_bytes();
    let decoded = TreeAttribute::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, tree);
    assert_eq!(decoded.to_bytes(), bytes);
}

#[test]
fn test_full_update_replicates_nested_tree() {
    init_logging();
    let mut source = SyncedTreeAttribute::from_tree(sample_entity());
    let packet = source.flush().unwrap();
    assert!(matches!(packet, SyncPacket::Full(_)));

    let mut mirror = SyncedTreeAttribute::new();
    mirror.set_int("stale", 1);
    mirror.mark_clean();
    mirror.apply_packet(&packet).unwrap();

    assert_eq!(mirror.tree(), &sample_entity());
    assert!(!mirror.contains_key("stale"));
}

#[test]
fn test_partial_apply_is_idempotent() {
    init_logging();
    let mut source = SyncedTreeAttribute::from_tree(sample_entity());
    let mut mirror = SyncedTreeAttribute::new();
    mirror.apply_packet(&source.flush().unwrap()).unwrap();

    source
        .set_attribute_by_path("body/stats/current", 8.0_f64)
        .unwrap();
    source.set_attribute_by_path("body/armor/plates", 4_i32).unwrap();
    let bytes = partial_bytes(source.flush());

    mirror.apply_partial_update(&bytes).unwrap();
    let once = mirror.tree().clone();
    mirror.apply_partial_update(&bytes).unwrap();

    assert_eq!(mirror.tree(), &once);
    assert_eq!(mirror, source);
    assert_eq!(mirror.tree_at_path("body/armor").unwrap().get_int("plates", 0), 4);
}

#[test]
fn test_type_change_replaces_attribute() {
    let mut source = SyncedTreeAttribute::new();
    let mut mirror = SyncedTreeAttribute::new();
    source.set_int("level", 3);
    mirror.apply_packet(&source.flush().unwrap()).unwrap();

    source.set_string("level", "max");
    mirror.apply_packet(&source.flush().unwrap()).unwrap();

    assert_eq!(mirror.get("level"), Some(&Attribute::String("max".to_string())));
}

#[test]
fn test_removal_sends_whole_tree() {
    let mut source = SyncedTreeAttribute::from_tree(sample_entity());
    let mut mirror = SyncedTreeAttribute::new();
    mirror.apply_packet(&source.flush().unwrap()).unwrap();

    assert!(source.delete_attribute_by_path("body/stats").is_some());
    let packet = source.flush().unwrap();
    assert!(matches!(packet, SyncPacket::Full(_)));

    mirror.apply_packet(&packet).unwrap();
    assert!(mirror.tree_at_path("body/stats").is_none());
    assert_eq!(mirror, source);
}

#[test]
fn test_threshold_from_config() {
    let config = AttributeConfig::from_toml_str("dirty_path_threshold = 2").unwrap();
    let mut tree = SyncedTreeAttribute::with_config(config);

    tree.set_int("a", 1);
    tree.set_int("b", 2);
    assert!(!tree.is_all_dirty());
    tree.set_int("c", 3);
    assert!(tree.is_all_dirty());
    assert!(matches!(tree.flush(), Some(SyncPacket::Full(_))));
}

#[test]
fn test_truncated_partial_update_leaves_mirror_untouched() {
    let mut source = SyncedTreeAttribute::new();
    source.set_string("name", "wolf");
    source.set_int("ticks", 10);
    let bytes = partial_bytes(source.flush());

    let mut mirror = SyncedTreeAttribute::new();
    mirror.set_int("ticks", 1);
    mirror.mark_clean();

    let err = mirror
        .apply_partial_update(&bytes[..bytes.len() - 2])
        .unwrap_err();
    assert!(matches!(err, AttributeError::UnexpectedEof { .. }));
    assert_eq!(mirror.get_int("ticks", 0), 1);
    assert!(!mirror.contains_key("name"));
}

#[test]
fn test_listeners_fire_on_remote_updates() {
    let mut source = SyncedTreeAttribute::new();
    let mut mirror = SyncedTreeAttribute::new();

    let health_hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&health_hits);
    mirror.register_modified_listener(
        Some("health"),
        Arc::new(move |tree: &TreeAttribute| {
            assert!(tree.contains_key("health"));
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    source.set_attribute_by_path("health/current", 5.0_f64).unwrap();
    source.set_int("speed", 2);
    mirror.apply_packet(&source.flush().unwrap()).unwrap();

    assert_eq!(health_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_json_bridge_feeds_synced_tree() {
    init_logging();
    let mut registry = ContentRegistry::new();
    registry.register_block("stone");

    let converter = JsonAttributeConverter::new(&registry);
    let tree = converter
        .tree_from_json_str(
            r#"{
                "name": "quarry",
                "depth": 12,
                "rates": [0.5, 1.5],
                "owner": {"type": "long", "value": "42"},
                "output": {"class": "Block", "code": "stone", "quantity": "3"},
                "missing": null
            }"#,
        )
        .unwrap()
        .unwrap();

    assert!(!tree.contains_key("missing"));
    assert_eq!(tree.get_long("owner", 0), 42);
    let output = tree.get_item_stack("output").unwrap();
    assert_eq!(output.quantity, 3);
    assert!(output.is_resolved());

    let mut source = SyncedTreeAttribute::from_tree(tree.clone());
    let mut mirror = SyncedTreeAttribute::new();
    mirror.apply_packet(&source.flush().unwrap()).unwrap();
    assert_eq!(mirror.tree(), &tree);
}
