//! File preamble.
//!
//! ```text
//! [4B magic][16B signature][name][38B][suit type][2B][weather][27B]
//! ```
//! where each string is framed as `FF FE FF`, a 1 byte length `L`, and `L` little-endian
//! 16-bit code units.
use std::io::Read;

use serde::Serialize;
use tracing::trace;

use crate::bytes::Bytes;
use crate::events::{DecodeEvent, Events, HeaderField};
use crate::{Error, Result};

/// Marker preceding every framed string.
pub const STRING_MARKER: [u8; 3] = [0xFF, 0xFE, 0xFF];

const MAGIC_LEN: usize = 4;
/// "CTravelTrakCEDoc" plus a pad byte.
const SIGNATURE_LEN: usize = 16;
const AFTER_NAME_LEN: usize = 38;
const AFTER_SUIT_LEN: usize = 2;
const AFTER_WEATHER_LEN: usize = 27;

/// Logbook header. Parsed once per file; not attached to any dive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Logbook name.
    pub name: String,
}

impl Header {
    /// Read the file preamble, leaving `bytes` positioned at the first dive record.
    ///
    /// The magic is not validated.
    ///
    /// # Errors
    /// [Error::UnexpectedEof] on a short read or [Error::Framing] if a string marker
    /// does not match.
    pub(crate) fn read<R>(bytes: &mut Bytes<R>, events: &mut Events) -> Result<Header>
    where
        R: Read + Send,
    {
        bytes.skip(MAGIC_LEN, "header magic")?;
        bytes.skip(SIGNATURE_LEN, "header signature")?;

        let name = read_framed_string(bytes)?;
        trace!(name, "logbook name");
        bytes.skip(AFTER_NAME_LEN, "header padding")?;

        let suit_type = read_framed_string(bytes)?;
        events.push(DecodeEvent::HeaderText {
            field: HeaderField::SuitType,
            value: suit_type,
        });
        bytes.skip(AFTER_SUIT_LEN, "header padding")?;

        let weather = read_framed_string(bytes)?;
        events.push(DecodeEvent::HeaderText {
            field: HeaderField::Weather,
            value: weather,
        });
        bytes.skip(AFTER_WEATHER_LEN, "header padding")?;

        Ok(Header { name })
    }
}

/// Read a framed string.
///
/// Each code unit is taken as a scalar value directly; there is no surrogate pair
/// handling and a unit that is not a valid `char` becomes U+FFFD.
pub(crate) fn read_framed_string<R>(bytes: &mut Bytes<R>) -> Result<String>
where
    R: Read + Send,
{
    let mut marker = [0u8; 3];
    bytes.read_exact(&mut marker, "string marker")?;
    if marker != STRING_MARKER {
        return Err(Error::Framing { found: marker });
    }

    let len = bytes.read_u8("string length")?;
    let mut s = String::with_capacity(usize::from(len));
    for _ in 0..len {
        let unit = bytes.read_u16_le("string code unit")?;
        s.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    Ok(s)
}
