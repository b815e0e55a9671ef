//! Tagged timeseries block.
//!
//! The block following a summary record is a sequence of one byte tags, each followed
//! by a tag dependent number of bytes:
//!
//! |tag|bytes|contents|
//! |---|---|---|
//! |`0xF0`|1|diagnostic|
//! |`0xF2`|1|diagnostic|
//! |`0xF3`|2|diagnostic, u16|
//! |`0xF4`|2|diagnostic, u16|
//! |`0xF8`|4|diagnostic, u32|
//! |`0xF9`|1|diagnostic|
//! |`0xFA`|variable|profile run, see [crate::profile]|
//! |`0xFB`|`L`|`L`, sub-type, `L - 2` payload bytes|
use tracing::trace;

use crate::bytes::Cursor;
use crate::events::{DecodeEvent, Events};
use crate::profile::ProfileDecoder;
use crate::{Error, Result};

pub const TAG_DIAG_A: u8 = 0xF0;
pub const TAG_DIAG_B: u8 = 0xF2;
pub const TAG_DIAG_C: u8 = 0xF3;
pub const TAG_DIAG_D: u8 = 0xF4;
pub const TAG_DIAG_E: u8 = 0xF8;
pub const TAG_DIAG_F: u8 = 0xF9;
pub const TAG_PROFILE: u8 = 0xFA;
pub const TAG_BLOCK: u8 = 0xFB;

/// `0xFB` sub-type carrying the gas mixture.
pub const BLOCK_GAS_MIXTURE: u8 = 32;
/// `0xFB` sub-type carrying no-stop limits.
pub const BLOCK_NO_STOP: u8 = 26;

/// Gas mixture from a [BLOCK_GAS_MIXTURE] block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GasMix {
    pub(crate) percent_o2: u16,
    pub(crate) percent_he: u16,
    pub(crate) max_po2: u16,
}

/// Decode a timeseries block, feeding profile runs to `profile`.
///
/// Returns the gas mixture if the block contained one; the last one wins.
///
/// # Errors
/// [Error::MalformedRecord] for an unknown tag or any read past the end of `block`.
pub(crate) fn decode_block(
    block: &[u8],
    profile: &mut ProfileDecoder,
    events: &mut Events,
) -> Result<Option<GasMix>> {
    let mut cur = Cursor::new(block);
    let mut mix = None;

    while !cur.is_empty() {
        let offset = cur.pos();
        let tag = cur.u8()?;
        match tag {
            TAG_DIAG_A | TAG_DIAG_B | TAG_DIAG_F => {
                let value = u32::from(cur.u8()?);
                events.push(DecodeEvent::Diagnostic { tag, offset, value });
            }
            TAG_DIAG_C | TAG_DIAG_D => {
                let value = u32::from(cur.u16_le()?);
                events.push(DecodeEvent::Diagnostic { tag, offset, value });
            }
            TAG_DIAG_E => {
                let value = cur.u32_le()?;
                events.push(DecodeEvent::Diagnostic { tag, offset, value });
            }
            TAG_PROFILE => {
                let consumed = profile.decode_run(cur.rest(), cur.pos(), events)?;
                cur.advance(consumed)?;
            }
            TAG_BLOCK => {
                if let Some(m) = decode_sub_block(&mut cur, offset, events)? {
                    mix = Some(m);
                }
            }
            _ => {
                return Err(Error::malformed(
                    offset,
                    format!("unexpected tag {tag:#04x}"),
                ))
            }
        }
    }
    trace!(len = block.len(), "timeseries block");

    Ok(mix)
}

fn decode_sub_block(
    cur: &mut Cursor,
    offset: usize,
    events: &mut Events,
) -> Result<Option<GasMix>> {
    let len = usize::from(cur.u8()?);
    let sub_type = cur.u8()?;
    if len < 2 {
        return Err(Error::malformed(
            offset,
            format!("block length {len} shorter than its own header"),
        ));
    }
    let payload = cur.take(len - 2)?;
    let field = |at: usize, n: usize| {
        payload.get(at..at + n).ok_or_else(|| {
            Error::malformed(
                offset,
                format!(
                    "block type {sub_type} payload of {} bytes too short",
                    payload.len()
                ),
            )
        })
    };

    match sub_type {
        BLOCK_GAS_MIXTURE => {
            let le16 = |at: usize| field(at, 2).map(|b| u16::from_le_bytes([b[0], b[1]]));
            let mix = GasMix {
                percent_o2: le16(0)?,
                percent_he: le16(2)?,
                max_po2: le16(8)?,
            };
            events.push(DecodeEvent::GasMixture {
                percent_o2: mix.percent_o2,
                percent_he: mix.percent_he,
                max_po2: mix.max_po2,
            });
            Ok(Some(mix))
        }
        BLOCK_NO_STOP => {
            let b = field(0, 2)?;
            events.push(DecodeEvent::NoStopLimits {
                no_stop_min: b[0],
                no_stop_mb_min: b[1],
            });
            Ok(None)
        }
        _ => {
            events.push(DecodeEvent::UnknownBlock {
                sub_type,
                offset,
                payload_len: payload.len(),
            });
            Ok(None)
        }
    }
}
