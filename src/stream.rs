//! Byte-stream abstraction consumed by sound file readers
//!
//! Readers pull bytes through the minimal `InputStream` contract instead of
//! `std::io` directly: short reads are legal, end of stream is a zero-length
//! read, and a failed seek is a `None` rather than an error. A blanket impl
//! makes any `std::io` reader+seeker (`File`, `Cursor`, ...) usable as-is.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Minimal read/seek contract for audio byte streams
pub trait InputStream {
    /// Read up to `buf.len()` bytes into `buf`
    ///
    /// Returns the number of bytes actually read. A short read is not an
    /// error; 0 means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Reposition the stream to an absolute byte offset
    ///
    /// Returns the new position, or `None` if the stream could not seek
    /// there.
    fn seek(&mut self, offset: u64) -> Option<u64>;
}

/// An `InputStream` a reader can own and carry across threads
pub trait SoundStream: InputStream + Send + Sync {}

impl<T: InputStream + Send + Sync> SoundStream for T {}

impl<T: Read + Seek> InputStream for T {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        // A single io::Read call may return less than the source holds;
        // keep filling until the buffer is full or the source is done.
        let mut total = 0;
        while total < buf.len() {
            match Read::read(self, &mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        total
    }

    fn seek(&mut self, offset: u64) -> Option<u64> {
        Seek::seek(self, SeekFrom::Start(offset)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_cursor_read_full() {
        let mut stream = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let mut buf = [0u8; 5];
        assert_eq!(InputStream::read(&mut stream, &mut buf), 5);
        assert_eq!(buf, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_cursor_read_short_at_end() {
        let mut stream = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        assert_eq!(InputStream::read(&mut stream, &mut buf), 3);
        assert_eq!(InputStream::read(&mut stream, &mut buf), 0);
    }

    #[test]
    fn test_cursor_seek_absolute() {
        let mut stream = Cursor::new(vec![10u8, 20, 30, 40]);
        assert_eq!(InputStream::seek(&mut stream, 2), Some(2));
        let mut buf = [0u8; 4];
        assert_eq!(InputStream::read(&mut stream, &mut buf), 2);
        assert_eq!(&buf[..2], &[30, 40]);
    }

    #[test]
    fn test_cursor_seek_past_end_reads_nothing() {
        let mut stream = Cursor::new(vec![0u8; 4]);
        assert_eq!(InputStream::seek(&mut stream, 100), Some(100));
        let mut buf = [0u8; 4];
        assert_eq!(InputStream::read(&mut stream, &mut buf), 0);
    }

    #[test]
    fn test_stream_is_object_safe() {
        fn takes_dyn(stream: &mut dyn InputStream) -> usize {
            let mut buf = [0u8; 2];
            stream.read(&mut buf)
        }
        let mut stream = Cursor::new(vec![7u8, 8, 9]);
        assert_eq!(takes_dyn(&mut stream), 2);
    }

    #[test]
    fn test_cursor_boxes_as_sound_stream() {
        let stream: Box<dyn SoundStream> = Box::new(Cursor::new(vec![0u8; 16]));
        drop(stream);
    }
}
