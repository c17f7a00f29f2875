#![no_main]

use std::io::{self, Read};

use libfuzzer_sys::fuzz_target;
use peekrs::{Ownership, PeekConfig, PeekableAdapter, ReadSource, SharedPool};

/// Source that hands out at most `step` bytes per read.
struct Chunked<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.step).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fuzz_target!(|input: (Vec<u8>, Vec<u8>, u8, u8)| {
    let (data, ops, step, min_grow) = input;
    let source = Chunked {
        data: &data,
        step: step as usize % 17 + 1,
    };
    let config = PeekConfig::new(min_grow as usize % 32 + 1).unwrap();
    let pool = SharedPool::new();
    let mut reader =
        PeekableAdapter::with_pool(ReadSource::new(source), Ownership::Owned, pool, config)
            .unwrap();

    // Model: bytes read so far and bytes peeked ahead of them
    let mut read_back = Vec::new();
    let mut staged = 0usize;
    let mut scratch = [0u8; 64];

    for op in ops {
        let len = (op >> 1) as usize % scratch.len();
        let position = read_back.len();

        if op & 1 == 0 {
            let n = reader.peek(&mut scratch[..len]).unwrap();
            let at = position + staged;
            // Peeked bytes continue right after what is already staged
            assert_eq!(&scratch[..n], &data[at..at + n]);
            staged += n;
        } else {
            let n = reader.read(&mut scratch[..len]).unwrap();
            assert_eq!(&scratch[..n], &data[position..position + n]);
            read_back.extend_from_slice(&scratch[..n]);
            staged = staged.saturating_sub(n);
        }

        // Peeks never move the position; reads move it by their count
        assert_eq!(reader.position(), read_back.len() as u64);
        assert_eq!(reader.staged_len(), staged);
        assert_eq!(reader.staged(), &data[read_back.len()..read_back.len() + staged]);
        if staged == 0 {
            assert!(!reader.holds_buffer());
        }
    }

    // Whatever remains comes out in order
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();
    read_back.extend_from_slice(&rest);
    assert_eq!(read_back, data);
});
