// Integration tests for the PeekableAdapter API
// Tests cover: peek/read interleaving, positions, pooling, disposal, edge cases

use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use peekrs::{
    BufferPool, HeapPool, Ownership, Peek, PeekConfig, PeekError, PeekableAdapter, PoolConfig,
    ReadSource, SharedPool, Source,
};

fn numbers() -> Vec<u8> {
    (0..100).collect()
}

fn adapter(data: &[u8]) -> PeekableAdapter<&[u8]> {
    PeekableAdapter::new(data, Ownership::Owned).expect("slices are readable")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_peek_bytes_then_read_bytes() {
    let data = numbers();
    let mut reader = adapter(&data);

    assert_eq!(reader.peek_byte().unwrap(), Some(0));
    assert_eq!(reader.peek_byte().unwrap(), Some(1));
    assert_eq!(reader.peek_byte().unwrap(), Some(2));
    assert_eq!(reader.position(), 0, "peeking must not move the position");

    assert_eq!(reader.read_byte().unwrap(), Some(0));
    assert_eq!(reader.read_byte().unwrap(), Some(1));
    assert_eq!(reader.read_byte().unwrap(), Some(2));
    assert_eq!(reader.position(), 3);
}

#[test]
fn test_read_longer_than_peek() {
    let data = numbers();
    let mut reader = adapter(&data);

    let mut buf10 = [0u8; 10];
    assert_eq!(reader.peek(&mut buf10).unwrap(), 10);
    assert_eq!(&buf10[..], &data[..10]);
    assert_eq!(reader.position(), 0);

    let mut buf20 = [0u8; 20];
    assert_eq!(
        reader.read(&mut buf20).unwrap(),
        20,
        "10 staged bytes plus 10 fresh ones"
    );
    assert_eq!(&buf20[..], &data[..20]);
    assert_eq!(reader.position(), 20);
}

#[test]
fn test_peek_after_read_returns_same_bytes_as_next_read() {
    let data = numbers();
    let mut reader = adapter(&data);
    let mut buf3 = [0u8; 3];

    reader.read(&mut buf3).unwrap();
    assert_eq!(buf3, [0, 1, 2]);

    reader.peek(&mut buf3).unwrap();
    assert_eq!(buf3, [3, 4, 5]);
    assert_eq!(reader.position(), 3);

    let mut again = [0u8; 3];
    reader.read(&mut again).unwrap();
    assert_eq!(again, buf3, "read must return the peeked bytes");
    assert_eq!(reader.position(), 6);
}

// ============================================================================
// Position Properties
// ============================================================================

#[test]
fn test_peek_then_read_same_count_for_all_sizes() {
    let data = numbers();
    for n in 1..=data.len() {
        let mut reader = adapter(&data);
        let mut peeked = vec![0u8; n];
        let mut read = vec![0u8; n];

        let p = reader.peek(&mut peeked).unwrap();
        let r = reader.read(&mut read).unwrap();

        assert_eq!(p, n);
        assert_eq!(r, n);
        assert_eq!(peeked, read);
        assert_eq!(reader.position(), n as u64);
        assert!(!reader.holds_buffer(), "fully drained after n = {n}");
    }
}

#[test]
fn test_position_tracks_only_reads() {
    let data = numbers();
    let mut reader = adapter(&data);
    let mut buf = [0u8; 7];
    let mut expected = 0u64;

    for round in 0..12 {
        if round % 3 == 0 {
            reader.peek(&mut buf).unwrap();
        } else {
            expected += reader.read(&mut buf).unwrap() as u64;
        }
        assert_eq!(reader.position(), expected);
    }
}

#[test]
fn test_oversized_requests_are_short_not_errors() {
    let data = numbers();
    let mut reader = adapter(&data);

    let mut big = vec![0u8; 500];
    assert_eq!(reader.peek(&mut big).unwrap(), 100);
    assert_eq!(reader.peek(&mut big).unwrap(), 0);
    assert_eq!(reader.read(&mut big).unwrap(), 100);
    assert_eq!(&big[..100], &data[..]);
    assert_eq!(reader.read(&mut big).unwrap(), 0);
    assert_eq!(reader.position(), 100);
}

#[test]
fn test_empty_source() {
    let mut reader = adapter(&[]);
    let mut buf = [0u8; 8];

    assert_eq!(reader.peek_byte().unwrap(), None);
    assert_eq!(reader.peek(&mut buf).unwrap(), 0);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
    assert_eq!(reader.position(), 0);
    assert!(!reader.holds_buffer());
}

// ============================================================================
// Pooling
// ============================================================================

/// Pool that counts outstanding buffers across threads.
#[derive(Default)]
struct TrackingPool {
    outstanding: AtomicUsize,
    rents: AtomicUsize,
}

impl BufferPool for TrackingPool {
    fn rent(&self, min_size: usize) -> Vec<u8> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.rents.fetch_add(1, Ordering::SeqCst);
        vec![0u8; min_size]
    }

    fn release(&self, _buf: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn test_drained_adapter_holds_no_buffer() {
    let data = numbers();
    let pool = TrackingPool::default();
    let mut reader =
        PeekableAdapter::with_pool(&data[..], Ownership::Owned, &pool, PeekConfig::default())
            .unwrap();

    let mut buf = [0u8; 5];
    reader.peek(&mut buf).unwrap();
    assert_eq!(pool.outstanding.load(Ordering::SeqCst), 1);

    reader.read(&mut buf).unwrap();
    assert_eq!(pool.outstanding.load(Ordering::SeqCst), 0);

    // Next peek rents again and sees fresh data
    reader.peek(&mut buf).unwrap();
    assert_eq!(buf, [5, 6, 7, 8, 9]);
    assert_eq!(pool.rents.load(Ordering::SeqCst), 2);
}

#[test]
fn test_min_grow_sets_first_capacity() {
    let data = numbers();
    let config = PeekConfig::new(64).unwrap();
    let mut reader =
        PeekableAdapter::with_pool(&data[..], Ownership::Owned, HeapPool, config).unwrap();

    reader.peek_byte().unwrap();
    assert_eq!(reader.staging_capacity(), 64);
}

#[test]
fn test_dispose_returns_buffer() {
    let data = numbers();
    let pool = TrackingPool::default();
    let mut reader =
        PeekableAdapter::with_pool(&data[..], Ownership::Owned, &pool, PeekConfig::default())
            .unwrap();

    let mut buf = [0u8; 30];
    reader.peek(&mut buf).unwrap();
    reader.dispose().unwrap();
    assert_eq!(pool.outstanding.load(Ordering::SeqCst), 0);
}

#[test]
fn test_shared_pool_across_threads() {
    let pool = Arc::new(TrackingPool::default());
    let shared = SharedPool::with_config(PoolConfig::default().with_max_pooled(8));

    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let pool = Arc::clone(&pool);
            let shared = shared.clone();
            std::thread::spawn(move || {
                let data: Vec<u8> = (0..200).map(|i: u32| (i as u8).wrapping_add(t)).collect();

                let mut tracked = PeekableAdapter::with_pool(
                    Cursor::new(data.clone()),
                    Ownership::Owned,
                    Arc::clone(&pool),
                    PeekConfig::default(),
                )
                .unwrap();
                let mut pooled = PeekableAdapter::with_pool(
                    Cursor::new(data.clone()),
                    Ownership::Owned,
                    shared,
                    PeekConfig::default(),
                )
                .unwrap();

                for reader in [&mut tracked as &mut dyn Peek, &mut pooled] {
                    let mut head = [0u8; 16];
                    reader.peek_exact(&mut head).unwrap();
                    let mut all = Vec::new();
                    reader.read_to_end(&mut all).unwrap();
                    assert_eq!(all, data);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(pool.outstanding.load(Ordering::SeqCst), 0);
    assert!(shared.pooled() >= 1);
}

// ============================================================================
// Sources, Ownership and Errors
// ============================================================================

/// Source that records close calls and can refuse to be read.
struct Handle {
    inner: Cursor<Vec<u8>>,
    readable: bool,
    closes: Arc<AtomicUsize>,
}

impl Read for Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Source for Handle {
    fn is_readable(&self) -> bool {
        self.readable
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn handle(readable: bool) -> (Handle, Arc<AtomicUsize>) {
    let closes = Arc::new(AtomicUsize::new(0));
    let handle = Handle {
        inner: Cursor::new(numbers()),
        readable,
        closes: Arc::clone(&closes),
    };
    (handle, closes)
}

#[test]
fn test_unreadable_source_is_invalid_argument() {
    let (source, closes) = handle(false);
    match PeekableAdapter::new(source, Ownership::Owned) {
        Err(PeekError::InvalidArgument { .. }) => {}
        other => panic!("expected invalid argument, got {:?}", other.err()),
    }
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_owned_source_closed_once() {
    let (source, closes) = handle(true);
    let mut reader = PeekableAdapter::new(source, Ownership::Owned).unwrap();
    reader.dispose().unwrap();
    reader.dispose().unwrap();
    drop(reader);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_borrowed_source_left_open() {
    let (source, closes) = handle(true);
    let reader = PeekableAdapter::new(source, Ownership::Borrowed).unwrap();
    assert_eq!(reader.ownership(), Ownership::Borrowed);
    drop(reader);
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_length_known_and_unknown() {
    let data = numbers();
    let known = PeekableAdapter::new(Cursor::new(&data[..]), Ownership::Owned).unwrap();
    assert_eq!(known.length().unwrap(), 100);

    let unknown = PeekableAdapter::new(ReadSource::new(&data[..]), Ownership::Owned).unwrap();
    let err = unknown.length().unwrap_err();
    assert!(matches!(err, PeekError::Unsupported { .. }));
    let err: io::Error = err.into();
    assert_eq!(err.kind(), io::ErrorKind::Unsupported);

    // A bare slice cannot tell its total length either
    assert!(adapter(&data).length().is_err());
}

#[test]
fn test_length_stable_across_peek() {
    let data = numbers();
    let mut reader = PeekableAdapter::new(Cursor::new(data), Ownership::Owned).unwrap();
    assert_eq!(reader.length().unwrap(), 100);

    let mut head = [0u8; 10];
    reader.peek_exact(&mut head).unwrap();
    assert_eq!(reader.length().unwrap(), 100);
    assert_eq!(reader.position(), 0);

    reader.read_exact(&mut head).unwrap();
    assert_eq!(reader.length().unwrap(), 100);
}

#[test]
fn test_source_error_after_staged_bytes() {
    /// Yields its data but fails once at `fail_at`.
    struct Flaky {
        data: Vec<u8>,
        pos: usize,
        fail_at: Option<(usize, io::ErrorKind)>,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some((at, kind)) = self.fail_at {
                if at == self.pos {
                    self.fail_at = None;
                    return Err(io::Error::new(kind, "flaky source"));
                }
            }
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl Source for Flaky {}

    let data: Vec<u8> = (0..10).collect();

    // Interrupted is retried by read_to_end; nothing may go missing
    let flaky = Flaky {
        data: data.clone(),
        pos: 0,
        fail_at: Some((4, io::ErrorKind::Interrupted)),
    };
    let mut reader = PeekableAdapter::new(flaky, Ownership::Owned).unwrap();
    let mut head = [0u8; 4];
    reader.peek_exact(&mut head).unwrap();
    let mut all = Vec::new();
    reader.read_to_end(&mut all).unwrap();
    assert_eq!(all, data);
    assert_eq!(reader.position(), 10);

    // Other errors arrive on the call after the staged bytes
    let flaky = Flaky {
        data: data.clone(),
        pos: 0,
        fail_at: Some((4, io::ErrorKind::BrokenPipe)),
    };
    let mut reader = PeekableAdapter::new(flaky, Ownership::Owned).unwrap();
    reader.peek_exact(&mut head).unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], &data[..4]);
    assert_eq!(reader.position(), 4);

    let err = reader.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    assert_eq!(reader.position(), 4);

    assert_eq!(reader.read(&mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], &data[4..]);
    assert_eq!(reader.position(), 10);
}

#[test]
fn test_source_error_is_not_wrapped() {
    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::TimedOut, "source timed out"))
        }
    }

    impl Source for Failing {}

    let mut reader = PeekableAdapter::new(Failing, Ownership::Owned).unwrap();
    let mut buf = [0u8; 4];

    let err = reader.peek(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    assert_eq!(err.to_string(), "source timed out");

    let err = reader.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    assert!(!reader.holds_buffer());
}

#[test]
fn test_file_source() {
    let path = std::env::temp_dir().join(format!("peekrs-test-{}.bin", std::process::id()));
    std::fs::write(&path, numbers()).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let mut reader = PeekableAdapter::new(file, Ownership::Owned).unwrap();
    assert_eq!(reader.length().unwrap(), 100);

    let mut head = [0u8; 4];
    reader.peek_exact(&mut head).unwrap();
    let mut all = Vec::new();
    reader.read_to_end(&mut all).unwrap();
    assert_eq!(all, numbers());

    drop(reader);
    std::fs::remove_file(&path).unwrap();
}
