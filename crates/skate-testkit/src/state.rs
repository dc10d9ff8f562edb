//! Session registry and the per-client scripting surface tests talk to.

use std::collections::{HashMap, VecDeque};
use std::os::raw::c_void;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use skate_ffi::{ErrorKind, PushCallback, RequestType, Value};

/// One reply the stub will hand back for the next command.
#[derive(Clone, Debug)]
pub enum StubReply {
    Value(Value),
    Error { kind: ErrorKind, message: String },
}

/// A command descriptor as the stub received it, decoded for assertions.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedCommand {
    /// `None` when the raw code is outside the known catalog.
    pub request_type: Option<RequestType>,
    pub raw_request_type: i32,
    pub args: Vec<Vec<u8>>,
    pub route: Option<serde_json::Value>,
    pub in_batch: bool,
}

impl ReceivedCommand {
    /// Arguments reinterpreted as UTF-8, for readable assertions.
    pub fn args_utf8(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| String::from_utf8_lossy(arg).into_owned())
            .collect()
    }
}

/// One batch submission as observed by the stub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchRecord {
    pub len: usize,
    pub atomic: bool,
    pub raise_on_error: bool,
}

/// One script invocation as observed by the stub.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptInvocation {
    pub hash: String,
    pub keys: Vec<Vec<u8>>,
    pub args: Vec<Vec<u8>>,
    pub route: Option<serde_json::Value>,
}

pub(crate) struct PushTarget {
    pub(crate) callback: PushCallback,
    pub(crate) ctx: *mut c_void,
}

// The context pointer is owned by the client being tested; the stub only
// passes it back through the callback.
unsafe impl Send for PushTarget {}

#[derive(Default)]
pub(crate) struct StubState {
    pub(crate) commands: Mutex<Vec<ReceivedCommand>>,
    pub(crate) batches: Mutex<Vec<BatchRecord>>,
    pub(crate) replies: Mutex<VecDeque<StubReply>>,
    pub(crate) invocations: Mutex<Vec<ScriptInvocation>>,
    pub(crate) config: Mutex<Option<serde_json::Value>>,
    pub(crate) push: Mutex<Option<PushTarget>>,
    pub(crate) connects: AtomicU64,
    pub(crate) closes: AtomicU64,
}

impl StubState {
    pub(crate) fn next_reply(&self) -> StubReply {
        self.replies
            .lock()
            .pop_front()
            .unwrap_or(StubReply::Value(Value::Ok))
    }
}

fn sessions() -> &'static Mutex<HashMap<String, Arc<StubState>>> {
    static SESSIONS: OnceLock<Mutex<HashMap<String, Arc<StubState>>>> = OnceLock::new();
    SESSIONS.get_or_init(|| Mutex::new(HashMap::new()))
}

pub(crate) fn state_for(name: &str) -> Arc<StubState> {
    Arc::clone(
        sessions()
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(StubState::default())),
    )
}

pub(crate) fn scripts() -> &'static Mutex<HashMap<String, Vec<u8>>> {
    static SCRIPTS: OnceLock<Mutex<HashMap<String, Vec<u8>>>> = OnceLock::new();
    SCRIPTS.get_or_init(|| Mutex::new(HashMap::new()))
}

pub(crate) fn orphan_closes() -> &'static AtomicU64 {
    static ORPHANS: AtomicU64 = AtomicU64::new(0);
    &ORPHANS
}

/// Number of close calls that arrived with an unknown handle. Such calls
/// are tolerated (never a crash) but counted.
pub fn orphan_close_count() -> u64 {
    orphan_closes().load(Ordering::Relaxed)
}

/// Source bytes of a stored script, if the hash is known.
pub fn script_source(hash: &str) -> Option<Vec<u8>> {
    scripts().lock().get(hash).cloned()
}

/// Control handle for one stub session.
pub struct StubSession {
    state: Arc<StubState>,
}

/// Opens (or creates) the session a client with the given `client_name`
/// will attach to. Safe to call before the client connects.
pub fn session(name: &str) -> StubSession {
    StubSession {
        state: state_for(name),
    }
}

impl StubSession {
    /// Queues a reply for the next command. With an empty queue, commands
    /// answer [`Value::Ok`].
    pub fn enqueue(&self, value: Value) {
        self.state.replies.lock().push_back(StubReply::Value(value));
    }

    /// Queues an engine-side failure for the next command.
    pub fn enqueue_error(&self, kind: ErrorKind, message: &str) {
        self.state.replies.lock().push_back(StubReply::Error {
            kind,
            message: message.to_string(),
        });
    }

    /// Removes and returns every command received so far.
    pub fn drain_commands(&self) -> Vec<ReceivedCommand> {
        std::mem::take(&mut *self.state.commands.lock())
    }

    pub fn drain_batches(&self) -> Vec<BatchRecord> {
        std::mem::take(&mut *self.state.batches.lock())
    }

    pub fn drain_script_invocations(&self) -> Vec<ScriptInvocation> {
        std::mem::take(&mut *self.state.invocations.lock())
    }

    /// The connection config the last client handed to the engine.
    pub fn config(&self) -> Option<serde_json::Value> {
        self.state.config.lock().clone()
    }

    pub fn connect_count(&self) -> u64 {
        self.state.connects.load(Ordering::Relaxed)
    }

    pub fn close_count(&self) -> u64 {
        self.state.closes.load(Ordering::Relaxed)
    }

    /// Delivers a push message through the registered callback, the way the
    /// engine would. Returns false when no live client has a callback.
    pub fn push(&self, kind: i32, channel: &[u8], message: &[u8], pattern: Option<&[u8]>) -> bool {
        let target = {
            let slot = self.state.push.lock();
            match &*slot {
                Some(target) => PushTarget {
                    callback: target.callback,
                    ctx: target.ctx,
                },
                None => return false,
            }
        };
        let (pattern_ptr, pattern_len) = match pattern {
            Some(bytes) => (bytes.as_ptr(), bytes.len() as i64),
            None => (std::ptr::null(), 0),
        };
        (target.callback)(
            target.ctx,
            kind,
            message.as_ptr(),
            message.len() as i64,
            channel.as_ptr(),
            channel.len() as i64,
            pattern_ptr,
            pattern_len,
        );
        true
    }

    /// Clears queued replies and recorded traffic, keeping counters.
    pub fn reset(&self) {
        self.state.commands.lock().clear();
        self.state.batches.lock().clear();
        self.state.replies.lock().clear();
        self.state.invocations.lock().clear();
    }
}
