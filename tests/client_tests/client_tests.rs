//! Tests for Client
//!
//! Scripted relays check the requests the client builds and how each reply
//! is classified. The in-memory store checks the command semantics end to
//! end.

#[path = "../common/mod.rs"]
mod common;

use std::io::Read;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use common::{client_for, memory_store, scripted};
use serde_json::{json, Value};
use speicher::network::Relay;
use speicher::protocol::{read_frame, write_frame, Request};
use speicher::{Client, Lookup, SpeicherError};

// =============================================================================
// Key Validation Tests
// =============================================================================

#[test]
fn test_empty_key_rejected_before_network() {
    let (relay, seen) = scripted(json!({"status_code": 200, "value": "bar"}));
    let mut client = client_for(&relay);

    assert!(matches!(client.get(""), Err(SpeicherError::InvalidArgument(_))));
    assert!(matches!(client.delete(b""), Err(SpeicherError::InvalidArgument(_))));
    assert!(matches!(
        client.set("", "bar"),
        Err(SpeicherError::InvalidArgument(_))
    ));

    assert!(seen.lock().is_empty());
    assert!(!client.is_connected());
}

#[test]
fn test_byte_and_text_keys_match_on_wire() {
    let (relay, seen) = scripted(json!({"status_code": 200, "value": "bar"}));
    let mut client = client_for(&relay);

    client.get("foo").unwrap();
    client.get(b"foo").unwrap();

    let seen = seen.lock();
    assert_eq!(seen[0], seen[1]);
}

// =============================================================================
// Reply Shape Tests
// =============================================================================

#[test]
fn test_malformed_reply() {
    let (relay, _) = scripted(json!({}));
    let mut client = client_for(&relay);

    assert!(matches!(client.get("foo"), Err(SpeicherError::MalformedReply(_))));
}

#[test]
fn test_bad_reply() {
    let (relay, _) = scripted(Value::Null);
    let mut client = client_for(&relay);

    assert!(matches!(client.get("foo"), Err(SpeicherError::MalformedReply(_))));
}

#[test]
fn test_unknown_code() {
    let (relay, _) = scripted(json!({"status_code": 100}));
    let mut client = client_for(&relay);

    assert!(matches!(client.get("foo"), Err(SpeicherError::MalformedReply(_))));
    assert!(matches!(client.reset(), Err(SpeicherError::MalformedReply(_))));
}

#[test]
fn test_server_error() {
    let (relay, _) = scripted(json!({"status_code": 503}));
    let mut client = client_for(&relay);

    let err = client.get("foo").unwrap_err();
    assert!(matches!(err, SpeicherError::Server(503)));
    assert_eq!(err.status_code(), Some(503));
}

#[test]
fn test_client_error_other_than_not_found() {
    let (relay, _) = scripted(json!({"status_code": 400}));
    let mut client = client_for(&relay);

    assert!(matches!(client.get("foo"), Err(SpeicherError::Client(400))));
    assert!(matches!(client.delete("foo"), Err(SpeicherError::Client(400))));
    assert!(matches!(client.set("foo", "bar"), Err(SpeicherError::Client(400))));
}

#[test]
fn test_server_error_on_delete_and_reset() {
    let (relay, _) = scripted(json!({"status_code": 500}));
    let mut client = client_for(&relay);

    assert!(matches!(client.delete("foo"), Err(SpeicherError::Server(500))));
    assert!(matches!(client.reset(), Err(SpeicherError::Server(500))));
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_get() {
    let (relay, seen) = scripted(json!({"status_code": 200, "value": "bar"}));
    let mut client = client_for(&relay);

    assert_eq!(client.get("foo").unwrap(), Lookup::Found(json!("bar")));
    assert_eq!(seen.lock()[0], json!({"command": "GET", "key": "foo"}));
}

#[test]
fn test_get_not_exist() {
    let (relay, seen) = scripted(json!({"status_code": 404}));
    let mut client = client_for(&relay);

    assert_eq!(client.get("foo").unwrap(), Lookup::Absent);
    assert_eq!(seen.lock()[0], json!({"command": "GET", "key": "foo"}));
}

#[test]
fn test_get_not_exist_float_code() {
    let (relay, _) = scripted(json!({"status_code": 404.0}));
    let mut client = client_for(&relay);

    assert_eq!(client.get("foo").unwrap(), Lookup::Absent);
    assert!(!client.delete("foo").unwrap());
}

#[test]
fn test_get_malformed() {
    let (relay, _) = scripted(json!({"status_code": 200}));
    let mut client = client_for(&relay);

    assert!(matches!(client.get("foo"), Err(SpeicherError::MalformedReply(_))));
}

#[test]
fn test_set() {
    let (relay, seen) = scripted(json!({"status_code": 200}));
    let mut client = client_for(&relay);

    client.set("foo", "bar").unwrap();
    assert_eq!(
        seen.lock()[0],
        json!({"command": "SET", "key": "foo", "value": "bar"})
    );
}

#[test]
fn test_set_none() {
    let (relay, seen) = scripted(json!({"status_code": 200}));
    let mut client = client_for(&relay);

    client.set("foo", &None::<String>).unwrap();
    client.set("foo", &Value::Null).unwrap();

    let seen = seen.lock();
    assert_eq!(seen[0], json!({"command": "DEL", "key": "foo"}));
    assert_eq!(seen[1], json!({"command": "DEL", "key": "foo"}));
}

#[test]
fn test_set_none_ignores_missing_key() {
    let (relay, _) = scripted(json!({"status_code": 404}));
    let mut client = client_for(&relay);

    client.set("foo", &Value::Null).unwrap();
}

#[test]
fn test_set_does_not_treat_404_as_absent() {
    let (relay, _) = scripted(json!({"status_code": 404}));
    let mut client = client_for(&relay);

    let err = client.set("foo", "bar").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete() {
    let (relay, seen) = scripted(json!({"status_code": 200}));
    let mut client = client_for(&relay);

    assert!(client.delete("foo").unwrap());
    assert_eq!(seen.lock()[0], json!({"command": "DEL", "key": "foo"}));
}

#[test]
fn test_delete_not_exist() {
    let (relay, _) = scripted(json!({"status_code": 404}));
    let mut client = client_for(&relay);

    assert!(!client.delete("foo").unwrap());
}

#[test]
fn test_reset() {
    let (relay, seen) = scripted(json!({"status_code": 200}));
    let mut client = client_for(&relay);

    client.reset().unwrap();
    assert_eq!(seen.lock()[0], json!({"command": "RST"}));
}

#[test]
fn test_execute_raw_request() {
    let (relay, seen) = scripted(json!({"status_code": 200, "extra": [1, 2]}));
    let mut client = client_for(&relay);

    let reply = client
        .execute(&Request::new("PING").with_field("payload", json!("hi")))
        .unwrap();

    assert_eq!(reply.field("extra"), Some(&json!([1, 2])));
    assert_eq!(seen.lock()[0], json!({"command": "PING", "payload": "hi"}));
}

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (relay, _) = scripted(json!({"status_code": 200}));
    let mut client = client_for(&relay);

    client.close();
    client.reset().unwrap();
    assert!(client.is_connected());

    client.close();
    client.close();
    assert!(!client.is_connected());
}

#[test]
fn test_connection_failure_then_recovery() {
    let relay = Relay::framed(|request| {
        if request.get("key") == Some(&json!("boom")) {
            None
        } else {
            Some(json!({"status_code": 200, "value": "ok"}))
        }
    })
    .unwrap();
    let mut client = client_for(&relay);

    let err = client.get("boom").unwrap_err();
    assert!(err.is_connection());
    assert!(!client.is_connected());

    assert_eq!(client.get("fine").unwrap(), Lookup::Found(json!("ok")));
}

#[test]
fn test_drop_closes_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let mut client = Client::connect_to(addr.ip().to_string(), addr.port());

    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let _: Value = read_frame(&mut stream).unwrap();
        write_frame(&mut stream, &json!({"status_code": 200})).unwrap();
        stream
    });

    client.reset().unwrap();
    let mut stream = peer.join().unwrap();
    assert!(client.is_connected());
    drop(client);

    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(stream.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_unreachable_server() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut client = Client::connect_to("127.0.0.1", port);

    assert!(client.get("foo").unwrap_err().is_connection());
}

// =============================================================================
// Store Semantics Tests
// =============================================================================

#[test]
fn test_set_get() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    assert_eq!(client.get(b"foo").unwrap(), Lookup::Absent);
    client.set(b"foo", "bar").unwrap();
    assert_eq!(client.get(b"foo").unwrap(), Lookup::Found(json!("bar")));
}

#[test]
fn test_set_get_structured_values() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    let values = [
        json!(["b", "a", "r"]),
        json!({"nested": {"list": [1, 2.5, null, true]}}),
        json!(42),
        json!(""),
    ];
    for (i, value) in values.iter().enumerate() {
        let key = format!("key-{i}");
        client.set(&key, value).unwrap();
        assert_eq!(client.get(&key).unwrap(), Lookup::Found(value.clone()));
    }
}

#[test]
fn test_set_none_deletes() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    assert_eq!(client.get(b"foo").unwrap(), Lookup::Absent);
    client.set(b"foo", "bar").unwrap();
    client.set(b"foo", &Value::Null).unwrap();
    assert!(!client.delete(b"foo").unwrap());
}

#[test]
fn test_delete_then_get() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    client.set(b"foo", "bar").unwrap();
    assert_eq!(client.get(b"foo").unwrap(), Lookup::Found(json!("bar")));
    assert!(client.delete(b"foo").unwrap());
    assert_eq!(client.get(b"foo").unwrap(), Lookup::Absent);
    assert!(!client.delete(b"foo").unwrap());
}

#[test]
fn test_reset_clears_everything() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    for key in ["a", "b", "c"] {
        client.set(key, key).unwrap();
    }
    client.reset().unwrap();
    for key in ["a", "b", "c"] {
        assert_eq!(client.get(key).unwrap(), Lookup::Absent);
    }
}

#[test]
fn test_wrong_command() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    let err = client.execute(&Request::new("UNKNOWN")).unwrap_err();
    assert!(matches!(err, SpeicherError::Client(400)));
}

#[test]
fn test_wrong_get_arguments() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    assert!(matches!(
        client.execute(&Request::new("GET")),
        Err(SpeicherError::Client(_))
    ));
}

#[test]
fn test_typed_lookup() {
    let relay = memory_store();
    let mut client = client_for(&relay);

    client.set("count", &7u32).unwrap();
    let count: Option<u32> = client.get("count").unwrap().deserialize().unwrap();
    assert_eq!(count, Some(7));
}
