use std::io::{Read, Write};

use base8::{Decoder, Encoder};

fn main() -> std::io::Result<()> {
    let input = (0..10000).map(|i| (i % 251) as u8).collect::<Vec<_>>();
    let mut buf = [0u8; 7];

    for _ in 0..1000 {
        let mut encoder = Encoder::new(Vec::new());
        for chunk in input.chunks(5) {
            encoder.write_all(chunk)?;
        }
        let encoded = encoder.finish()?;

        let mut decoder = Decoder::new(&encoded[..]);
        while decoder.read(&mut buf)? > 0 {}
    }
    Ok(())
}
