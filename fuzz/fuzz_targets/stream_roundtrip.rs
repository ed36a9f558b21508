#![no_main]
use std::io::{Read, Write};

use base8::{Decoder, Encoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u8, u8)| {
    let (input, write_size, read_size) = data;
    let write_size = write_size as usize % 16 + 1;
    let read_size = read_size as usize % 16 + 1;

    let mut encoder = Encoder::new(Vec::new());
    for chunk in input.chunks(write_size) {
        encoder.write_all(chunk).unwrap();
    }
    let encoded = encoder.finish().unwrap();
    assert_eq!(encoded, base8::encode(&input).into_bytes());

    let mut decoder = Decoder::new(&encoded[..]);
    let mut buf = vec![0u8; read_size];
    let mut output = Vec::new();
    loop {
        let n = decoder.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        output.extend_from_slice(&buf[..n]);
    }

    assert_eq!(input, output);
});
