//! Arbitrary symbol streams must never panic the decoders, and the whole-buffer
//! and streaming decoders must agree on what they accept.

#![no_main]
use std::io::Read;

use base8::{decode, Decoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let buffered = decode(data);

    let mut streamed = Vec::new();
    let result = Decoder::new(data).read_to_end(&mut streamed);

    // Inputs whose length is not a multiple of 8 may fail differently: the
    // stream reports a truncated quantum where the buffer reports an offset.
    if data.len() % 8 == 0 {
        match buffered {
            Ok(bytes) => assert_eq!(result.map(|_| streamed).ok(), Some(bytes)),
            Err(err) => assert!(result.is_err(), "stream accepted input rejected at {err}"),
        }
    }
});
