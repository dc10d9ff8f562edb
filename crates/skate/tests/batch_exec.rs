//! Batch submission through the stub engine: one engine call per batch,
//! slot order, atomicity, and the two error-reporting modes.

use skate::{Batch, Client, ConnectionConfig, Error, Value, DEFAULT_PORT};
use skate_testkit::{session, ErrorKind, StubSession};

fn connect(name: &str) -> (Client, StubSession) {
    skate_testkit::init_tracing();
    let stub = session(name);
    stub.reset();
    let config = ConnectionConfig::new()
        .address("localhost", DEFAULT_PORT)
        .client_name(name);
    let client = Client::connect(&config).expect("stub connect");
    (client, stub)
}

#[test]
fn pipeline_slots_come_back_in_queue_order() {
    let (client, stub) = connect("batch-order");

    stub.enqueue(Value::Ok);
    stub.enqueue(Value::from("v"));
    stub.enqueue(Value::Int(3));

    let mut batch = Batch::pipeline();
    batch.set("k", "v").get("k").incr("counter");
    let results = client.exec_batch(&batch, true).unwrap();
    assert_eq!(
        results,
        vec![Value::Ok, Value::Bytes(b"v".to_vec()), Value::Int(3)]
    );

    let records = stub.drain_batches();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].len, 3);
    assert!(!records[0].atomic);
    assert!(records[0].raise_on_error);

    let commands = stub.drain_commands();
    assert_eq!(commands.len(), 3);
    assert!(commands.iter().all(|cmd| cmd.in_batch));
    assert_eq!(commands[2].args_utf8(), vec!["counter"]);
}

#[test]
fn transactions_submit_as_atomic() {
    let (client, stub) = connect("batch-atomic");

    stub.enqueue(Value::Ok);
    stub.enqueue(Value::Int(1));

    let mut batch = Batch::transaction();
    batch.set("a", "1").incr("a");
    client.exec_batch(&batch, true).unwrap();

    let records = stub.drain_batches();
    assert!(records[0].atomic);
}

#[test]
fn failing_slots_stay_in_place_without_raise_on_error() {
    let (client, stub) = connect("batch-slot-errors");

    stub.enqueue(Value::Ok);
    stub.enqueue_error(ErrorKind::Unspecified, "WRONGTYPE wrong kind of value");
    stub.enqueue(Value::Int(2));

    let mut batch = Batch::pipeline();
    batch.set("k", "v").incr("k").incr("counter");
    let results = client.exec_batch(&batch, false).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Value::Ok);
    assert!(
        matches!(&results[1], Value::ServerError(msg) if msg.starts_with("WRONGTYPE")),
        "slot 1 should carry the server error, got {:?}",
        results[1]
    );
    assert_eq!(results[2], Value::Int(2));
}

#[test]
fn raise_on_error_fails_the_whole_batch() {
    let (client, stub) = connect("batch-raise");

    stub.enqueue(Value::Ok);
    stub.enqueue_error(ErrorKind::Unspecified, "WRONGTYPE wrong kind of value");

    let mut batch = Batch::pipeline();
    batch.set("k", "v").incr("k").incr("counter");
    let err = client.exec_batch(&batch, true).unwrap_err();
    assert!(matches!(err, Error::Command(msg) if msg.starts_with("WRONGTYPE")));
}

#[test]
fn slot_converters_reject_wrong_shapes() {
    let (client, stub) = connect("batch-converters");

    stub.enqueue(Value::from("not a number"));
    let mut batch = Batch::pipeline();
    batch.incr("counter");
    let err = client.exec_batch(&batch, true).unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponse { expected: "int", .. }));
}

#[test]
fn empty_batches_never_reach_the_engine() {
    let (client, stub) = connect("batch-empty");

    let results = client.exec_batch(&Batch::pipeline(), true).unwrap();
    assert!(results.is_empty());
    assert!(stub.drain_batches().is_empty());
}

#[test]
fn untyped_entries_pass_replies_through_unchecked() {
    let (client, stub) = connect("batch-untyped");

    stub.enqueue(Value::Map(vec![(Value::from("k"), Value::Int(1))]));
    let mut batch = Batch::pipeline();
    batch.custom(["CONFIG", "GET", "maxmemory"]);
    let results = client.exec_batch(&batch, true).unwrap();
    assert!(matches!(results[0], Value::Map(_)));
}
