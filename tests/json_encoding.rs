//! JSON encoding of replicas, as exchanged between peers.

use chrono::{TimeZone, Utc};
use lww_crdt::prelude::*;
use serde_json::json;

fn ts(secs: i64, nanos: u32) -> Timestamp {
    Utc.timestamp_opt(1_700_000_000 + secs, nanos).unwrap()
}

#[test]
fn set_encodes_additions_and_removals() {
    let s = LWWSet::new();
    s.add("x".to_string(), ts(0, 0));
    s.remove("y".to_string(), ts(1, 0));

    let value = serde_json::to_value(&s).unwrap();
    assert_eq!(
        value,
        json!({
            "additions": { "x": "2023-11-14T22:13:20Z" },
            "removals": { "y": "2023-11-14T22:13:21Z" },
        })
    );
}

#[test]
fn set_round_trip_preserves_nanoseconds() {
    let s = LWWSet::new();
    s.add("a".to_string(), ts(0, 123_456_789));
    s.add("b".to_string(), ts(1, 1));
    s.remove("a".to_string(), ts(0, 123_456_790));

    let encoded = serde_json::to_string(&s).unwrap();
    let decoded: LWWSet<String> = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, s);
    assert_eq!(
        decoded.removals().added_at(&"a".to_string()),
        Some(ts(0, 123_456_790))
    );
    assert!(!decoded.exists(&"a".to_string()));
}

#[test]
fn set_decodes_peer_payload() {
    let payload = r#"{
        "additions": {"apple": "2024-01-01T00:00:00.000000001Z", "pear": "2024-01-01T00:00:00Z"},
        "removals": {"pear": "2024-01-01T00:00:00Z"}
    }"#;
    let peer: LWWSet<String> = serde_json::from_str(payload).unwrap();

    let local = LWWSet::new();
    local.merge(&peer).unwrap();
    assert_eq!(local.get(), vec!["apple".to_string()]);
}

#[test]
fn graph_round_trip() {
    let g = LWWGraph::new();
    g.add_vertex("A".to_string());
    g.add_vertex("B".to_string());
    g.add_edge("A".to_string(), "B".to_string()).unwrap();
    g.remove_edge("B".to_string(), "C".to_string());

    let encoded = serde_json::to_value(&g).unwrap();
    assert!(encoded["vertices"]["additions"]["A"].is_string());
    assert!(encoded["edges"]["A"]["additions"]["B"].is_string());
    assert!(encoded["edges"]["C"]["removals"]["B"].is_string());

    let decoded: LWWGraph<String> = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, g);
    assert!(decoded.edge_exists(&"A".to_string(), &"B".to_string()));
}

#[test]
fn graph_merge_through_json() {
    let alice = LWWGraph::new();
    alice.add_vertex(1u32);
    alice.add_vertex(2u32);
    alice.add_edge(1, 2).unwrap();

    let bob: LWWGraph<u32> =
        serde_json::from_str(&serde_json::to_string(&alice).unwrap()).unwrap();
    bob.add_vertex(3);
    bob.add_edge(2, 3).unwrap();

    let wire: LWWGraph<u32> =
        serde_json::from_str(&serde_json::to_string(&bob).unwrap()).unwrap();
    alice.merge(&wire).unwrap();

    assert_eq!(alice.find_path(&1, &3).unwrap(), vec![1, 2, 3]);
}

#[test]
fn delta_round_trip() {
    let s1 = LWWSet::new();
    s1.add("a".to_string(), ts(0, 5));
    let s2 = LWWSet::new();

    let delta = s1.delta(&s2);
    let encoded = serde_json::to_string(&delta).unwrap();
    let decoded: lww_crdt::LWWSetDelta<String> = serde_json::from_str(&encoded).unwrap();

    s2.apply_delta(&decoded);
    assert_eq!(s1, s2);
}
