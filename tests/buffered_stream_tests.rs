//! Buffered stream behaviour against an on-disk source.
//!
//! Every read is checked byte for byte against the file contents, and a
//! counting wrapper around the source makes the underlying I/O observable.

use seekbuf::source::{FileSource, SeekableSource};
use seekbuf::{BufferedSeekableStream, Error, ReadStatus, Result};
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use tempfile::NamedTempFile;

const FILE_SIZE: usize = 20000;

/// Deterministic xorshift bytes so failures are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn create_test_file(length: usize) -> (NamedTempFile, Vec<u8>) {
    let mut rng = XorShift(0x9e3779b97f4a7c15);
    let expected: Vec<u8> = (0..length).map(|_| rng.next() as u8).collect();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&expected).unwrap();
    file.flush().unwrap();
    (file, expected)
}

#[derive(Default)]
struct Counters {
    seeks: Cell<usize>,
    reads: Cell<usize>,
    bytes: Cell<usize>,
}

/// Source wrapper counting the calls that reach the file.
struct CountingSource {
    inner: FileSource,
    counters: Rc<Counters>,
}

impl SeekableSource for CountingSource {
    fn seek(&mut self, position: u64) -> Result<()> {
        self.counters.seeks.set(self.counters.seeks.get() + 1);
        self.inner.seek(position)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.inner.read(buf)?;
        self.counters.reads.set(self.counters.reads.get() + 1);
        self.counters.bytes.set(self.counters.bytes.get() + n);
        Ok(n)
    }

    fn length(&self) -> Option<u64> {
        self.inner.length()
    }

    fn describe(&self) -> String {
        format!("counting {}", self.inner.describe())
    }
}

fn counting_stream(
    file: &NamedTempFile,
    capacity: usize,
) -> (BufferedSeekableStream<CountingSource>, Rc<Counters>) {
    let counters = Rc::new(Counters::default());
    let source = CountingSource {
        inner: FileSource::open(file.path()).unwrap(),
        counters: counters.clone(),
    };
    (BufferedSeekableStream::new(source, capacity).unwrap(), counters)
}

fn assert_reads(
    stream: &mut BufferedSeekableStream<impl SeekableSource>,
    expected: &[u8],
    pos: usize,
    len: usize,
) {
    let mut buffer = vec![0u8; len];
    stream.seek(pos as u64).unwrap();
    let status = stream.read_fully(&mut buffer).unwrap();
    assert_eq!(status, ReadStatus::Complete(len), "read of {} at {}", len, pos);
    for (i, b) in buffer.iter().enumerate() {
        assert_eq!(*b, expected[pos + i], "byte {} of read at {}", i, pos);
    }
    assert_eq!(stream.position(), (pos + len) as u64);
}

#[test]
fn test_read_single_bytes() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let mut stream = BufferedSeekableStream::new(FileSource::open(file.path()).unwrap(), 50).unwrap();

    // Somewhere in the middle, near the end, the beginning, the last byte
    for pos in [700, FILE_SIZE - 100, 0, FILE_SIZE - 1] {
        stream.seek(pos as u64).unwrap();
        assert_eq!(stream.read_byte().unwrap(), Some(expected[pos]), "byte at {}", pos);
    }

    stream.seek(FILE_SIZE as u64).unwrap();
    assert_eq!(stream.read_byte().unwrap(), None);

    stream.close().unwrap();
}

#[test]
fn test_read_buffers_larger_than_capacity() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let capacity = 50;
    let mut stream =
        BufferedSeekableStream::new(FileSource::open(file.path()).unwrap(), capacity).unwrap();

    // At the end, in the middle, at the beginning
    assert_reads(&mut stream, &expected, FILE_SIZE - 100, 100);
    assert_reads(&mut stream, &expected, 700, 100);
    assert_reads(&mut stream, &expected, 0, 100);

    // Overlap left
    stream.seek(10000).unwrap();
    stream.read_byte().unwrap();
    assert_reads(&mut stream, &expected, 10000 - 75, 100);

    // Overlap right
    stream.seek(5000).unwrap();
    stream.read_byte().unwrap();
    assert_reads(&mut stream, &expected, 5000 + capacity - 25, 100);

    // Overlap both ends
    stream.seek(7000).unwrap();
    stream.read_byte().unwrap();
    assert_reads(&mut stream, &expected, 7000 - capacity - 25, 1000);

    // Completely contained
    stream.seek(3000).unwrap();
    stream.read_byte().unwrap();
    assert_reads(&mut stream, &expected, 3000 + 10, 20);

    assert!(stream.stats().bypasses >= 6);
    assert_eq!(stream.stats().hits, 1);
}

#[test]
fn test_read_buffers_smaller_than_capacity() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let capacity = 200;
    let mut stream =
        BufferedSeekableStream::new(FileSource::open(file.path()).unwrap(), capacity).unwrap();

    assert_reads(&mut stream, &expected, FILE_SIZE - 100, 100);
    assert_reads(&mut stream, &expected, 700, 100);
    assert_reads(&mut stream, &expected, 0, 100);

    stream.seek(10000).unwrap();
    stream.read_byte().unwrap();
    assert_reads(&mut stream, &expected, 10000 - 75, 100);

    stream.seek(5000).unwrap();
    stream.read_byte().unwrap();
    assert_reads(&mut stream, &expected, 5000 + capacity - 25, 100);

    stream.seek(3000).unwrap();
    stream.read_byte().unwrap();
    assert_reads(&mut stream, &expected, 3000 + 10, 20);

    let stats = stream.stats();
    assert_eq!(stats.bypasses, 0);
    assert_eq!(stats.refills, 2);
}

#[test]
fn test_contained_read_does_no_io() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let (mut stream, counters) = counting_stream(&file, 64);

    stream.seek(3000).unwrap();
    stream.read_byte().unwrap();
    let seeks = counters.seeks.get();
    let reads = counters.reads.get();

    assert_reads(&mut stream, &expected, 3010, 20);
    assert_reads(&mut stream, &expected, 3000, 64);
    assert_eq!(counters.seeks.get(), seeks);
    assert_eq!(counters.reads.get(), reads);
}

#[test]
fn test_repeated_seeks_do_no_io() {
    let (file, _) = create_test_file(FILE_SIZE);
    let (mut stream, counters) = counting_stream(&file, 64);

    for _ in 0..10 {
        stream.seek(1234).unwrap();
    }
    stream.seek(FILE_SIZE as u64 * 2).unwrap();

    assert_eq!(counters.seeks.get(), 0);
    assert_eq!(counters.reads.get(), 0);
}

#[test]
fn test_left_overlap_fetches_only_left_gap() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let capacity = 100;
    let (mut stream, counters) = counting_stream(&file, capacity);

    stream.seek(10000).unwrap();
    stream.read_byte().unwrap();
    assert_eq!(counters.bytes.get(), capacity);

    let k = 30;
    assert_reads(&mut stream, &expected, 10000 - k, 60);
    assert_eq!(counters.bytes.get(), capacity + k);
    assert_eq!(counters.seeks.get(), 2);
}

#[test]
fn test_right_overlap_fetches_only_right_gap() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let capacity = 100;
    let (mut stream, counters) = counting_stream(&file, capacity);

    stream.seek(5000).unwrap();
    stream.read_byte().unwrap();

    // window 5000..5100, new window 5075..5175
    assert_reads(&mut stream, &expected, 5075, 50);
    assert_eq!(counters.bytes.get(), capacity + 75);
    assert_eq!(counters.seeks.get(), 2);
    assert_eq!(stream.window(), Some(5075..5175));
}

#[test]
fn test_oversized_read_invalidates_window() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let (mut stream, counters) = counting_stream(&file, 50);

    stream.seek(100).unwrap();
    stream.read_byte().unwrap();

    assert_reads(&mut stream, &expected, 100, 500);
    assert_eq!(stream.window(), None);

    let before = counters.bytes.get();
    stream.seek(110).unwrap();
    assert_eq!(stream.read_byte().unwrap(), Some(expected[110]));
    assert_eq!(counters.bytes.get(), before + 50);
}

#[test]
fn test_read_past_end_is_short() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let mut stream = BufferedSeekableStream::new(FileSource::open(file.path()).unwrap(), 64).unwrap();

    let mut buffer = vec![0u8; 100];
    stream.seek(FILE_SIZE as u64 - 40).unwrap();
    assert_eq!(stream.read_fully(&mut buffer).unwrap(), ReadStatus::Short(40));
    assert_eq!(&buffer[..40], &expected[FILE_SIZE - 40..]);
    assert!(buffer[40..].iter().all(|&b| b == 0));

    assert_eq!(stream.read_fully(&mut buffer).unwrap(), ReadStatus::EndOfStream);

    // oversized requests end the same way
    let mut big = vec![0u8; 1000];
    stream.seek(FILE_SIZE as u64 - 10).unwrap();
    assert_eq!(stream.read_fully(&mut big).unwrap(), ReadStatus::Short(10));
}

#[test]
fn test_matches_ground_truth_for_random_access() {
    let (file, expected) = create_test_file(FILE_SIZE);
    let mut rng = XorShift(42);

    for capacity in [1, 7, 50, 512] {
        let mut stream =
            BufferedSeekableStream::new(FileSource::open(file.path()).unwrap(), capacity).unwrap();

        for _ in 0..2000 {
            let pos = rng.below(FILE_SIZE as u64 + 100) as usize;
            let len = rng.below(capacity as u64 * 3 + 1) as usize;

            // half the time read near the last position to exercise overlaps
            let pos = if rng.below(2) == 0 {
                let last = stream.position() as usize;
                last.saturating_sub(capacity).saturating_add(pos % (capacity * 2 + 1))
            } else {
                pos
            };

            let mut buffer = vec![0u8; len];
            stream.seek(pos as u64).unwrap();
            let status = stream.read_fully(&mut buffer).unwrap();

            let available = FILE_SIZE.saturating_sub(pos).min(len);
            let filled = status.filled();
            assert_eq!(filled, available, "capacity {} read {} at {}", capacity, len, pos);
            if filled > 0 {
                assert_eq!(&buffer[..filled], &expected[pos..pos + filled]);
            }

            match status {
                ReadStatus::Complete(n) => assert_eq!(n, len),
                ReadStatus::Short(n) => assert!(n > 0 && n < len),
                ReadStatus::EndOfStream => assert!(len > 0 && pos >= FILE_SIZE),
            }
        }
    }
}

#[test]
fn test_closed_stream_rejects_reads() {
    let (file, _) = create_test_file(100);
    let mut stream = BufferedSeekableStream::new(FileSource::open(file.path()).unwrap(), 16).unwrap();
    stream.close().unwrap();

    let mut buffer = [0u8; 4];
    assert!(matches!(stream.read_fully(&mut buffer), Err(Error::Closed)));
    assert!(matches!(stream.close(), Err(Error::Closed)));
}
