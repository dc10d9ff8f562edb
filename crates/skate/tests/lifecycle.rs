//! Handle lifecycle: the engine handle is released exactly once, close is
//! idempotent, and a closed client rejects every call.

use skate::{Client, ConnectionConfig, Error, DEFAULT_PORT};
use skate_testkit::{orphan_close_count, session};

fn config(name: &str) -> ConnectionConfig {
    ConnectionConfig::new()
        .address("localhost", DEFAULT_PORT)
        .client_name(name)
}

#[test]
fn close_releases_the_handle_exactly_once() {
    skate_testkit::init_tracing();
    let stub = session("lifecycle-close-once");
    let orphans_before = orphan_close_count();

    let client = Client::connect(&config("lifecycle-close-once")).unwrap();
    assert_eq!(stub.connect_count(), 1);
    assert!(!client.is_closed());

    client.close();
    client.close();
    client.close();
    assert!(client.is_closed());

    // One real close, and none of the repeats reached the engine with a
    // stale handle.
    assert_eq!(stub.close_count(), 1);
    assert_eq!(orphan_close_count(), orphans_before);
}

#[test]
fn dropping_the_client_closes_the_handle() {
    let stub = session("lifecycle-drop");
    {
        let _client = Client::connect(&config("lifecycle-drop")).unwrap();
        assert_eq!(stub.close_count(), 0);
    }
    assert_eq!(stub.close_count(), 1);
}

#[test]
fn explicit_close_then_drop_does_not_double_release() {
    let stub = session("lifecycle-close-then-drop");
    {
        let client = Client::connect(&config("lifecycle-close-then-drop")).unwrap();
        client.close();
    }
    assert_eq!(stub.close_count(), 1);
}

#[test]
fn closed_clients_reject_every_call() {
    let stub = session("lifecycle-closed-calls");
    stub.reset();

    let client = Client::connect(&config("lifecycle-closed-calls")).unwrap();
    client.close();

    assert!(matches!(client.ping(), Err(Error::ClosedClient)));
    assert!(matches!(client.get("key"), Err(Error::ClosedClient)));
    let mut batch = skate::Batch::pipeline();
    batch.ping();
    assert!(matches!(
        client.exec_batch(&batch, true),
        Err(Error::ClosedClient)
    ));
    // Nothing crossed the boundary after the close.
    assert!(stub.drain_commands().is_empty());
    assert!(stub.drain_batches().is_empty());
}

#[test]
fn invalid_configs_fail_before_connecting() {
    let stub = session("lifecycle-bad-config");
    let connects_before = stub.connect_count();

    let empty = ConnectionConfig::new().client_name("lifecycle-bad-config");
    assert!(matches!(Client::connect(&empty), Err(Error::Config(_))));

    let conflicting = config("lifecycle-bad-config")
        .cluster_mode(true)
        .database_id(2);
    assert!(matches!(Client::connect(&conflicting), Err(Error::Config(_))));

    assert_eq!(stub.connect_count(), connects_before);
}
