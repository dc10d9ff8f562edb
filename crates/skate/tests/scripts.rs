//! Script storage, invocation, and engine-side cleanup on drop.

use skate::{Client, ConnectionConfig, Route, Script, Value, DEFAULT_PORT};
use skate_testkit::{script_source, session, StubSession};

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
fn storing_a_script_registers_its_source() {
    let code = b"return redis.call('GET', KEYS[1])";
    let script = Script::new(code).unwrap();
    let hash = script.hash_utf8().expect("hash is ascii").to_string();
    assert_eq!(script_source(&hash).as_deref(), Some(&code[..]));
}

#[test]
fn invocations_carry_keys_args_and_route() {
    let (client, stub) = connect("scripts-invoke");
    let script = Script::new("return ARGV[1]").unwrap();

    stub.enqueue(Value::from("result"));
    let reply = client
        .invoke_script_routed(
            &script,
            ["key1", "key2"],
            ["arg1"],
            Some(&Route::slot_key("key1")),
        )
        .unwrap();
    assert_eq!(reply, Value::from("result"));

    let invocations = stub.drain_script_invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].hash, script.hash_utf8().unwrap());
    assert_eq!(invocations[0].keys, vec![b"key1".to_vec(), b"key2".to_vec()]);
    assert_eq!(invocations[0].args, vec![b"arg1".to_vec()]);
    let route = invocations[0].route.as_ref().expect("route present");
    assert_eq!(route["kind"], "slot_key");
}

#[test]
fn scripts_without_keys_or_args_invoke_cleanly() {
    let (client, stub) = connect("scripts-no-args");
    let script = Script::new("return 1").unwrap();

    stub.enqueue(Value::Int(1));
    let reply = client
        .invoke_script(&script, Vec::<Vec<u8>>::new(), Vec::<Vec<u8>>::new())
        .unwrap();
    assert_eq!(reply, Value::Int(1));

    let invocations = stub.drain_script_invocations();
    assert!(invocations[0].keys.is_empty());
    assert!(invocations[0].args.is_empty());
}

#[test]
fn dropping_the_last_clone_drops_the_engine_entry() {
    let script = Script::new("return 'clone me'").unwrap();
    let hash = script.hash_utf8().unwrap().to_string();
    let clone = script.clone();

    drop(script);
    assert!(script_source(&hash).is_some(), "clone keeps the entry alive");

    drop(clone);
    assert!(script_source(&hash).is_none(), "last drop releases the entry");
}

#[test]
fn script_exists_decodes_per_hash_flags() {
    let (client, stub) = connect("scripts-exists");

    stub.enqueue(Value::Array(vec![Value::Int(1), Value::Int(0)]));
    let flags = client.script_exists(["abc123", "def456"]).unwrap();
    assert_eq!(flags, vec![true, false]);

    let commands = stub.drain_commands();
    assert_eq!(commands[0].args_utf8(), vec!["abc123", "def456"]);
}

#[test]
fn script_flush_expects_ok() {
    let (client, stub) = connect("scripts-flush");
    client.script_flush().unwrap();
    assert_eq!(stub.drain_commands().len(), 1);
}
