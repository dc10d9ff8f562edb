//! Request-side marshalling: flat argument lists as pointer/length pairs.
//!
//! The engine reads argument memory only for the duration of a call, but
//! nothing on the C side copies eagerly, so the backing buffers must stay
//! alive until the call returns. `CmdArgs`/`BatchArgs` own those buffers and
//! hand out views that borrow from them, which pins the lifetimes.

use std::ptr;

use crate::types::{BatchInfo, CmdInfo};
use crate::RequestType;

/// Owns the byte buffers and derived pointer arrays for one command.
///
/// Moving a `CmdArgs` is fine: the pointer arrays reference the buffers'
/// heap allocations, which do not move with the struct.
pub struct CmdArgs {
    request_type: RequestType,
    buffers: Vec<Vec<u8>>,
    ptrs: Vec<*const u8>,
    lens: Vec<usize>,
}

impl CmdArgs {
    pub fn new(request_type: RequestType, args: impl IntoIterator<Item = Vec<u8>>) -> Self {
        let buffers: Vec<Vec<u8>> = args.into_iter().collect();
        let ptrs = buffers.iter().map(|buf| buf.as_ptr()).collect();
        let lens = buffers.iter().map(Vec::len).collect();
        Self {
            request_type,
            buffers,
            ptrs,
            lens,
        }
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn arg_count(&self) -> usize {
        self.buffers.len()
    }

    /// Descriptor view for the engine. Valid only while `self` is alive.
    pub fn info(&self) -> CmdInfo {
        let (args, arg_lengths) = if self.buffers.is_empty() {
            (ptr::null(), ptr::null())
        } else {
            (self.ptrs.as_ptr(), self.lens.as_ptr())
        };
        CmdInfo {
            request_type: self.request_type as i32,
            args,
            arg_lengths,
            arg_count: self.buffers.len(),
        }
    }
}

// The raw pointers only reference buffers owned by the same struct.
unsafe impl Send for CmdArgs {}
unsafe impl Sync for CmdArgs {}

/// Owns the command descriptors for one batch submission.
pub struct BatchArgs {
    cmds: Vec<CmdArgs>,
    infos: Vec<CmdInfo>,
    info_ptrs: Vec<*const CmdInfo>,
    is_atomic: bool,
}

impl BatchArgs {
    pub fn new(cmds: Vec<CmdArgs>, is_atomic: bool) -> Self {
        let infos: Vec<CmdInfo> = cmds.iter().map(CmdArgs::info).collect();
        let info_ptrs = infos.iter().map(|info| info as *const CmdInfo).collect();
        Self {
            cmds,
            infos,
            info_ptrs,
            is_atomic,
        }
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn is_atomic(&self) -> bool {
        self.is_atomic
    }

    /// Descriptor view for the engine. Valid only while `self` is alive.
    pub fn info(&self) -> BatchInfo {
        BatchInfo {
            cmd_count: self.infos.len(),
            cmds: if self.info_ptrs.is_empty() {
                ptr::null()
            } else {
                self.info_ptrs.as_ptr()
            },
            is_atomic: self.is_atomic,
        }
    }
}

unsafe impl Send for BatchArgs {}
unsafe impl Sync for BatchArgs {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::slice;

    fn args(parts: &[&[u8]]) -> Vec<Vec<u8>> {
        parts.iter().map(|part| part.to_vec()).collect()
    }

    #[test]
    fn cmd_info_reads_back_the_arguments() {
        let cmd = CmdArgs::new(RequestType::Set, args(&[b"key", b"value", b"EX", b"5"]));
        let info = cmd.info();
        assert_eq!(info.request_type, RequestType::Set as i32);
        assert_eq!(info.arg_count, 4);

        let ptrs = unsafe { slice::from_raw_parts(info.args, info.arg_count) };
        let lens = unsafe { slice::from_raw_parts(info.arg_lengths, info.arg_count) };
        let read: Vec<&[u8]> = ptrs
            .iter()
            .zip(lens)
            .map(|(ptr, len)| unsafe { slice::from_raw_parts(*ptr, *len) })
            .collect();
        assert_eq!(read, vec![&b"key"[..], b"value", b"EX", b"5"]);
    }

    #[test]
    fn cmd_info_survives_a_move() {
        let cmd = CmdArgs::new(RequestType::Get, args(&[b"some-key"]));
        let moved = cmd;
        let info = moved.info();
        let ptrs = unsafe { slice::from_raw_parts(info.args, info.arg_count) };
        let lens = unsafe { slice::from_raw_parts(info.arg_lengths, info.arg_count) };
        let first = unsafe { slice::from_raw_parts(ptrs[0], lens[0]) };
        assert_eq!(first, b"some-key");
    }

    #[test]
    fn zero_argument_command_has_null_arrays() {
        let cmd = CmdArgs::new(RequestType::Ping, Vec::new());
        let info = cmd.info();
        assert_eq!(info.arg_count, 0);
        assert!(info.args.is_null());
        assert!(info.arg_lengths.is_null());
    }

    #[test]
    fn empty_argument_is_kept_with_zero_length() {
        let cmd = CmdArgs::new(RequestType::Set, args(&[b"key", b""]));
        let info = cmd.info();
        assert_eq!(info.arg_count, 2);
        let lens = unsafe { slice::from_raw_parts(info.arg_lengths, info.arg_count) };
        assert_eq!(lens[1], 0);
    }

    #[test]
    fn batch_info_preserves_order_and_atomicity() {
        let cmds = vec![
            CmdArgs::new(RequestType::Set, args(&[b"k", b"v"])),
            CmdArgs::new(RequestType::Get, args(&[b"k"])),
        ];
        let batch = BatchArgs::new(cmds, true);
        let info = batch.info();
        assert_eq!(info.cmd_count, 2);
        assert!(info.is_atomic);

        let descriptors = unsafe { slice::from_raw_parts(info.cmds, info.cmd_count) };
        let first = unsafe { &*descriptors[0] };
        let second = unsafe { &*descriptors[1] };
        assert_eq!(first.request_type, RequestType::Set as i32);
        assert_eq!(second.request_type, RequestType::Get as i32);
    }
}
