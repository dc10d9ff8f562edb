//! Push delivery through the registered callback, driven by the stub.

use std::sync::{Arc, Mutex};

use skate::{
    Client, ConnectionConfig, PushKind, PushMessage, SubscriptionMode, Value, DEFAULT_PORT,
};
use skate_testkit::session;

fn push_config(name: &str) -> ConnectionConfig {
    ConnectionConfig::new()
        .address("localhost", DEFAULT_PORT)
        .client_name(name)
        .subscribe(SubscriptionMode::Exact, "news")
}

fn collecting_client(name: &str) -> (Client, Arc<Mutex<Vec<PushMessage>>>) {
    skate_testkit::init_tracing();
    let received: Arc<Mutex<Vec<PushMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let client = Client::connect_with_push(&push_config(name), move |message| {
        sink.lock().unwrap().push(message);
    })
    .expect("stub connect");
    (client, received)
}

#[test]
fn channel_messages_reach_the_handler() {
    let (client, received) = collecting_client("push-basic");
    let stub = session("push-basic");

    assert!(stub.push(0, b"news", b"hello world", None));
    let _ = &client;

    let messages = received.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, PushKind::Message);
    assert!(messages[0].kind.is_message());
    assert_eq!(messages[0].channel_utf8(), Some("news"));
    assert_eq!(messages[0].message, b"hello world".to_vec());
    assert_eq!(messages[0].pattern, None);
}

#[test]
fn pattern_messages_carry_the_matching_pattern() {
    let (client, received) = collecting_client("push-pattern");
    let stub = session("push-pattern");

    assert!(stub.push(1, b"news.tech", b"payload", Some(b"news.*")));
    let _ = &client;

    let messages = received.lock().unwrap();
    assert_eq!(messages[0].kind, PushKind::PMessage);
    assert_eq!(messages[0].pattern.as_deref(), Some(&b"news.*"[..]));
}

#[test]
fn unknown_push_kinds_are_preserved() {
    let (client, received) = collecting_client("push-unknown-kind");
    let stub = session("push-unknown-kind");

    assert!(stub.push(77, b"chan", b"m", None));
    let _ = &client;

    let messages = received.lock().unwrap();
    assert_eq!(messages[0].kind, PushKind::Other(77));
    assert!(!messages[0].kind.is_message());
}

#[test]
fn closing_the_client_unregisters_the_callback() {
    let (client, received) = collecting_client("push-after-close");
    let stub = session("push-after-close");

    client.close();
    assert!(!stub.push(0, b"news", b"late", None));
    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn clients_without_a_handler_register_no_callback() {
    skate_testkit::init_tracing();
    let stub = session("push-no-handler");
    let client = Client::connect(&push_config("push-no-handler")).unwrap();

    assert!(!stub.push(0, b"news", b"dropped", None));
    let _ = &client;
}

#[test]
fn subscriptions_ride_in_the_connection_config() {
    let (client, _) = collecting_client("push-config");
    let _ = &client;
    let stub = session("push-config");

    let config = stub.config().expect("config recorded");
    assert_eq!(config["subscriptions"][0]["mode"], "exact");
    assert_eq!(config["subscriptions"][0]["channel"], "news");
}

#[test]
fn publish_returns_the_receiver_count() {
    let (client, _) = collecting_client("push-publish");
    let stub = session("push-publish");
    stub.reset();

    stub.enqueue(Value::Int(3));
    assert_eq!(client.publish("news", "hello").unwrap(), 3);

    stub.enqueue(Value::Int(1));
    assert_eq!(client.spublish("shard-chan", "hello").unwrap(), 1);

    let commands = stub.drain_commands();
    assert_eq!(commands[0].args_utf8(), vec!["news", "hello"]);
    assert_eq!(commands[1].args_utf8(), vec!["shard-chan", "hello"]);
}
