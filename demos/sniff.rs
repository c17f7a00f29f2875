//! Format sniffing over a non-seekable stream.
//!
//! Peeks at the first bytes to guess a format, then reads the whole stream
//! including the bytes that were peeked.
//!
//! Run with:
//!     cargo run --example sniff -- [FILE]
//!
//! Without a file argument, stdin is used.

use std::env;
use std::fs::File;
use std::io::{self, Read};

use peekrs::{Ownership, Peek, PeekableAdapter, Source};

fn guess(head: &[u8]) -> &'static str {
    match head {
        [0x1f, 0x8b, ..] => "gzip",
        [0x89, b'P', b'N', b'G', ..] => "png",
        [b'P', b'K', 0x03, 0x04, ..] => "zip",
        [0x28, 0xb5, 0x2f, 0xfd, ..] => "zstd",
        [0xef, 0xbb, 0xbf, ..] => "utf-8 text (bom)",
        [b'{', ..] | [b'[', ..] => "json",
        [b'<', ..] => "xml/html",
        [] => "empty",
        _ => "unknown",
    }
}

fn sniff<S: Source>(source: S) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = PeekableAdapter::new(source, Ownership::Owned)?;

    // Collect up to 8 bytes of lookahead, tolerating short reads
    let mut head = [0u8; 8];
    let mut seen = 0;
    while seen < head.len() {
        let n = reader.peek(&mut head[seen..])?;
        if n == 0 {
            break;
        }
        seen += n;
    }

    println!("format:   {}", guess(&head[..seen]));
    println!("head:     {:02x?}", &head[..seen]);
    println!("position: {} (after peeking)", Peek::position(&reader));

    let mut total = 0u64;
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }

    println!("read:     {} bytes", total);
    println!("position: {}", reader.position());
    if let Ok(len) = reader.length() {
        println!("length:   {}", len);
    }

    reader.dispose()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match env::args().nth(1) {
        Some(path) => sniff(File::open(path)?),
        None => sniff(io::stdin()),
    }
}
