use std::io::{self, ErrorKind};

use crate::{Error, Result};

/// Bytes provides exact-length reads from a reader, failing fast on short reads.
///
/// Bytes that are not needed can be pushed back, i.e., Peek-and-push. Pushed bytes
/// are returned in the order they were read.
pub struct Bytes<R>
where
    R: io::Read + Send,
{
    reader: R,
    num_read: usize,
    cache: Vec<u8>,
    buf: [u8; 1],
}

impl<R> Bytes<R>
where
    R: io::Read + Send,
{
    pub fn new(reader: R) -> Self {
        Bytes {
            reader,
            num_read: 0,
            cache: Vec::new(),
            buf: [0u8; 1],
        }
    }

    /// Read a single byte.
    ///
    /// # Errors
    /// `ErrorKind::UnexpectedEof` if the reader has no more bytes.
    pub fn next(&mut self) -> io::Result<u8> {
        if !self.cache.is_empty() {
            return Ok(self.cache.remove(0));
        }
        let n = self.reader.read(&mut self.buf)?;
        if n == 0 {
            return Err(io::Error::from(ErrorKind::UnexpectedEof));
        }
        self.num_read += 1;
        Ok(self.buf[0])
    }

    /// Fill `buf` completely.
    ///
    /// # Errors
    /// [Error::UnexpectedEof] naming `context` if the stream ends first, or [Error::Io]
    /// for any other read failure.
    pub fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<()> {
        let cached = self.cache.len().min(buf.len());
        buf[..cached].copy_from_slice(&self.cache[..cached]);
        self.cache.drain(..cached);

        if let Err(err) = self.reader.read_exact(&mut buf[cached..]) {
            if err.kind() == ErrorKind::UnexpectedEof {
                return Err(Error::UnexpectedEof {
                    context,
                    wanted: buf.len(),
                });
            }
            return Err(err.into());
        }
        self.num_read += buf.len() - cached;
        Ok(())
    }

    /// Read exactly `len` bytes into a new buffer.
    ///
    /// # Errors
    /// See [Bytes::read_exact].
    pub fn take(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf, context)?;
        Ok(buf)
    }

    /// Read and discard exactly `len` bytes.
    ///
    /// # Errors
    /// See [Bytes::read_exact].
    pub fn skip(&mut self, len: usize, context: &'static str) -> Result<()> {
        self.take(len, context).map(|_| ())
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf, context)?;
        Ok(buf[0])
    }

    pub fn read_u16_le(&mut self, context: &'static str) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf, context)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Returns true if the reader is exhausted. Does not consume any bytes.
    ///
    /// # Errors
    /// Any read error other than end of stream.
    pub fn at_eof(&mut self) -> Result<bool> {
        match self.next() {
            Ok(b) => {
                self.push(&[b]);
                Ok(false)
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(true),
            Err(err) => Err(err.into()),
        }
    }

    pub fn push(&mut self, dat: &[u8]) {
        self.cache.extend_from_slice(dat);
    }

    /// Number of bytes consumed from the stream.
    pub fn offset(&self) -> usize {
        self.num_read - self.cache.len()
    }
}

/// Bounds-checked cursor over an immutable block of bytes.
///
/// Every advance is checked against the block length before the read happens.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Bytes from the current position to the end of the block.
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                Error::malformed(
                    self.pos,
                    format!(
                        "read of {len} bytes exceeds block of {} bytes",
                        self.data.len()
                    ),
                )
            })?;
        let dat = &self.data[self.pos..end];
        self.pos = end;
        Ok(dat)
    }

    pub(crate) fn advance(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16_le(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test() {
        let dat = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut bytes = Bytes::new(&dat[..]);

        let b = bytes
            .next()
            .expect("Should have produced a byte for first call to next");
        assert_eq!(b, 0, "first byte has bad value");
        assert_eq!(bytes.offset(), 1);

        let b = bytes
            .next()
            .expect("Should have produced a byte after second call to next");
        assert_eq!(b, 1, "second byte has bad value");
        assert_eq!(bytes.offset(), 2);

        bytes.push(&[b]);
        assert_eq!(bytes.cache, [1]);
        assert_eq!(bytes.offset(), 1);

        let b = bytes
            .next()
            .expect("Should have produced a byte after third call to next");
        assert_eq!(
            b, 1,
            "Byte should be the same as second call to next following a push"
        );
        assert_eq!(bytes.offset(), 2);
        assert_eq!(bytes.cache.len(), 0);

        let buf = &mut [0u8; 3][..];
        bytes.read_exact(buf, "test").expect("read_exact should not have failed");
        assert_eq!(bytes.cache.len(), 0);
        assert_eq!(bytes.offset(), 5);
        assert_eq!(buf, [2, 3, 4]);
    }

    #[test]
    fn read_exact_partially_from_cache() {
        let dat = [1, 2, 3, 4, 5, 6];
        let mut bytes = Bytes::new(&dat[..]);

        let buf = bytes.take(3, "test").unwrap();
        bytes.push(&buf);
        assert_eq!(bytes.num_read, 3, "should have still only read 3 bytes");
        assert_eq!(
            bytes.offset(),
            0,
            "but the offset should be num_read - cache.len"
        );

        let buf = bytes.take(4, "test").unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(bytes.num_read, 4);
        assert_eq!(bytes.offset(), 4);
    }

    #[test]
    fn short_read_is_unexpected_eof() {
        let dat = [1, 2];
        let mut bytes = Bytes::new(&dat[..]);

        let err = bytes.take(3, "summary record").unwrap_err();
        assert!(
            matches!(
                err,
                Error::UnexpectedEof {
                    context: "summary record",
                    wanted: 3
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn little_endian_reads() {
        let dat = [0x34, 0x12, 0x7f];
        let mut bytes = Bytes::new(&dat[..]);

        assert_eq!(bytes.read_u16_le("u16").unwrap(), 0x1234);
        assert_eq!(bytes.read_u8("u8").unwrap(), 0x7f);
        assert!(bytes.read_u8("u8").is_err());
    }

    #[test]
    fn at_eof_does_not_consume() {
        let dat = [9u8];
        let mut bytes = Bytes::new(&dat[..]);

        assert!(!bytes.at_eof().unwrap());
        assert_eq!(bytes.offset(), 0);
        assert_eq!(bytes.read_u8("byte").unwrap(), 9);
        assert!(bytes.at_eof().unwrap());
    }

    #[test]
    fn cursor_bounds() {
        let dat = [0xf3, 0x01, 0x02, 0x03];
        let mut cur = Cursor::new(&dat);

        assert_eq!(cur.u8().unwrap(), 0xf3);
        assert_eq!(cur.u16_le().unwrap(), 0x0201);
        assert_eq!(cur.pos(), 3);

        let err = cur.u32_le().unwrap_err();
        assert!(
            matches!(err, Error::MalformedRecord { offset: 3, .. }),
            "{err:?}"
        );
        // failed read does not move the cursor
        assert_eq!(cur.pos(), 3);
        assert_eq!(cur.rest(), [0x03]);
        cur.advance(1).unwrap();
        assert!(cur.is_empty());
    }
}
