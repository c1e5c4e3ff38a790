//! Adapter presenting an `InputStream` to the codec engine
//!
//! symphonia pulls bytes through its `MediaSource` trait (`io::Read` +
//! `io::Seek` + length/seekability queries). `StreamAdapter` bridges the
//! crate's stream contract into that shape, tracking the absolute cursor
//! so relative seeks can be emulated on a contract that only has absolute
//! ones.

use std::io::{self, Read, Seek, SeekFrom};

use symphonia::core::io::MediaSource;

use crate::stream::SoundStream;

/// Wraps a `SoundStream` as a codec-facing `MediaSource`
///
/// A fresh adapter is built for every open, so no cursor state survives
/// across streams. Seek failures surface as I/O errors; each request is
/// attempted exactly once.
pub(crate) struct StreamAdapter {
    stream: Box<dyn SoundStream>,
    /// Absolute byte position of the underlying stream
    pos: u64,
}

impl StreamAdapter {
    pub(crate) fn new(stream: Box<dyn SoundStream>) -> Self {
        Self { stream, pos: 0 }
    }
}

impl Read for StreamAdapter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stream.read(buf);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for StreamAdapter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "seek before start of stream")
            })?,
            // The stream contract has no size query.
            SeekFrom::End(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "seek relative to end is not supported",
                ));
            }
        };
        match self.stream.seek(target) {
            Some(new_pos) => {
                self.pos = new_pos;
                Ok(new_pos)
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "stream seek failed")),
        }
    }
}

impl MediaSource for StreamAdapter {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::InputStream;
    use std::io::Cursor;

    /// Stream double whose seeks always fail
    struct UnseekableStream {
        data: Vec<u8>,
        pos: usize,
    }

    impl InputStream for UnseekableStream {
        fn read(&mut self, buf: &mut [u8]) -> usize {
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            n
        }

        fn seek(&mut self, _offset: u64) -> Option<u64> {
            None
        }
    }

    fn adapter_over(bytes: Vec<u8>) -> StreamAdapter {
        StreamAdapter::new(Box::new(Cursor::new(bytes)))
    }

    // `StreamAdapter` is reachable through both `io::Read`/`io::Seek` and
    // the blanket `InputStream` impl, so calls here name the trait.

    #[test]
    fn test_read_advances_tracked_position() {
        let mut adapter = adapter_over(vec![1, 2, 3, 4, 5, 6]);
        let mut buf = [0u8; 4];
        assert_eq!(Read::read(&mut adapter, &mut buf).unwrap(), 4);
        assert_eq!(Seek::seek(&mut adapter, SeekFrom::Current(0)).unwrap(), 4);
    }

    #[test]
    fn test_seek_from_start() {
        let mut adapter = adapter_over(vec![10, 20, 30, 40]);
        assert_eq!(Seek::seek(&mut adapter, SeekFrom::Start(3)).unwrap(), 3);
        let mut buf = [0u8; 1];
        assert_eq!(Read::read(&mut adapter, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], 40);
    }

    #[test]
    fn test_seek_relative_backwards() {
        let mut adapter = adapter_over(vec![10, 20, 30, 40]);
        let mut buf = [0u8; 3];
        Read::read(&mut adapter, &mut buf).unwrap();
        assert_eq!(Seek::seek(&mut adapter, SeekFrom::Current(-2)).unwrap(), 1);
        let mut one = [0u8; 1];
        Read::read(&mut adapter, &mut one).unwrap();
        assert_eq!(one[0], 20);
    }

    #[test]
    fn test_seek_before_start_is_error() {
        let mut adapter = adapter_over(vec![0u8; 8]);
        let err = Seek::seek(&mut adapter, SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_seek_from_end_unsupported() {
        let mut adapter = adapter_over(vec![0u8; 8]);
        let err = Seek::seek(&mut adapter, SeekFrom::End(0)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_failed_stream_seek_is_io_error() {
        let stream = UnseekableStream {
            data: vec![0u8; 8],
            pos: 0,
        };
        let mut adapter = StreamAdapter::new(Box::new(stream));
        assert!(Seek::seek(&mut adapter, SeekFrom::Start(2)).is_err());
    }

    #[test]
    fn test_adapter_serves_both_stream_traits() {
        let mut adapter = adapter_over(vec![1, 2, 3, 4]);
        let mut buf = [0u8; 2];
        assert_eq!(InputStream::read(&mut adapter, &mut buf), 2);
        assert_eq!(InputStream::seek(&mut adapter, 0), Some(0));
        assert_eq!(Read::read(&mut adapter, &mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
    }

    #[test]
    fn test_media_source_queries() {
        let adapter = adapter_over(vec![0u8; 8]);
        assert!(adapter.is_seekable());
        assert_eq!(adapter.byte_len(), None);
    }
}
