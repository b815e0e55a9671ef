use std::io::Read;

use tracing::trace;

use crate::bytes::Bytes;
use crate::config::DecoderConfig;
use crate::dive::{read_dive, Dive};
use crate::events::{DecodeEvent, Decoded, Events};
use crate::header::Header;
use crate::Result;

/// Streaming reader for a complete `.asd` file.
///
/// The file header is read when the reader is created; dives are then read one at a
/// time by iterating. Iteration ends at a clean end of stream. After the first error
/// the stream position is unknown and iteration stops.
///
/// # Example
/// ```no_run
/// use smarttrak::{AsdReader, DecoderConfig};
///
/// let file = std::fs::File::open("logbook.asd").unwrap();
/// let reader = AsdReader::new(std::io::BufReader::new(file), DecoderConfig::default()).unwrap();
/// println!("logbook: {}", reader.header().name);
/// for zult in reader {
///     let dive = zult.unwrap().value;
///     println!("dive {} at {}", dive.sequence, dive.time);
/// }
/// ```
pub struct AsdReader<R>
where
    R: Read + Send,
{
    bytes: Bytes<R>,
    config: DecoderConfig,
    header: Header,
    header_events: Vec<DecodeEvent>,
    done: bool,
}

impl<R> AsdReader<R>
where
    R: Read + Send,
{
    /// Create a reader, reading the file header from `reader`.
    ///
    /// # Errors
    /// Any error reading the header, see [read_header].
    pub fn new(reader: R, config: DecoderConfig) -> Result<Self> {
        let mut bytes = Bytes::new(reader);
        let Decoded { value, events } = read_header(&mut bytes, &config)?;
        Ok(AsdReader {
            bytes,
            config,
            header: value,
            header_events: events,
            done: false,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Events produced while reading the header.
    pub fn header_events(&self) -> &[DecodeEvent] {
        &self.header_events
    }

    /// Read the next dive, or `None` at a clean end of stream.
    ///
    /// # Errors
    /// Any error decoding the dive. A stream ending inside a record is an error.
    pub fn read_dive(&mut self) -> Result<Option<Decoded<Dive>>> {
        if self.bytes.at_eof()? {
            trace!(offset = self.bytes.offset(), "end of stream");
            return Ok(None);
        }
        read_dive(&mut self.bytes, &self.config).map(Some)
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.bytes.offset()
    }
}

impl<R> Iterator for AsdReader<R>
where
    R: Read + Send,
{
    type Item = Result<Decoded<Dive>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_dive() {
            Ok(Some(dive)) => Some(Ok(dive)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Read the file header, leaving `bytes` positioned at the first dive.
///
/// # Errors
/// [crate::Error::UnexpectedEof] on a short read or [crate::Error::Framing] if a
/// framed string marker does not match.
pub fn read_header<R>(bytes: &mut Bytes<R>, config: &DecoderConfig) -> Result<Decoded<Header>>
where
    R: Read + Send,
{
    let mut events = Events::new(config.collect_events);
    let header = Header::read(bytes, &mut events)?;
    Ok(Decoded::new(header, events))
}
