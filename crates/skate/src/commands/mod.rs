//! Command façade, grouped by family.
//!
//! Each module extends [`crate::Client`] with methods for one command
//! family. The pattern is uniform: validate locally, flatten everything into
//! wire arguments, dispatch through `Client::execute`, then check the reply
//! shape. No method interprets server state beyond its own reply.

pub mod cluster;
pub mod generic;
pub mod hashes;
pub mod lists;
pub mod pubsub;
pub mod scripting;
pub mod server;
pub mod sets;
pub mod sorted_sets;
pub mod streams;
pub mod strings;

pub(crate) fn fmt_int(value: i64) -> Vec<u8> {
    value.to_string().into_bytes()
}

pub(crate) fn fmt_uint(value: u64) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// Formats a score the way the server parses it, including infinities.
pub(crate) fn fmt_float(value: f64) -> Vec<u8> {
    if value == f64::INFINITY {
        b"+inf".to_vec()
    } else if value == f64::NEG_INFINITY {
        b"-inf".to_vec()
    } else {
        value.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_format_for_the_wire() {
        assert_eq!(fmt_float(1.5), b"1.5".to_vec());
        assert_eq!(fmt_float(2.0), b"2".to_vec());
        assert_eq!(fmt_float(f64::INFINITY), b"+inf".to_vec());
        assert_eq!(fmt_float(f64::NEG_INFINITY), b"-inf".to_vec());
    }

    #[test]
    fn ints_format_as_decimal() {
        assert_eq!(fmt_int(-42), b"-42".to_vec());
        assert_eq!(fmt_uint(0), b"0".to_vec());
    }
}
