//! Locating dive records in a whole file without stream decoding.
//!
//! Each summary record stores the device id at offset 8, so records from one device
//! can be found by scanning for its little-endian bytes. Located records are
//! independent of each other and can be decoded in parallel.
use rayon::prelude::*;
use tracing::debug;

use crate::config::DecoderConfig;
use crate::dive::{decode_dive, Dive, FOOTER_LEN};
use crate::events::Decoded;
use crate::summary::Summary;
use crate::Result;

/// Offset of the device id within a summary record.
const DEVICE_ID_OFFSET: usize = 8;

/// Return the start offsets of the records for `device_id` in `data`.
///
/// Matches falling inside a record already located, as given by its summary's block
/// length, are not record starts. A located record whose summary cannot be parsed
/// does not hide later matches.
#[must_use]
pub fn find_records(data: &[u8], device_id: u32) -> Vec<usize> {
    let delim = device_id.to_le_bytes();
    let mut offsets = Vec::default();
    let mut next_start = 0;
    for (idx, win) in data.windows(delim.len()).enumerate() {
        if idx < DEVICE_ID_OFFSET || win != delim {
            continue;
        }
        let start = idx - DEVICE_ID_OFFSET;
        if start < next_start {
            continue;
        }
        offsets.push(start);
        next_start = match data.get(start..start + Summary::LEN).map(Summary::parse) {
            Some(Ok(summary)) => start + Summary::LEN + summary.block_len() + FOOTER_LEN,
            _ => start + 1,
        };
    }
    offsets
}

/// Split `data` into one slice per record, each running to the start of the next.
#[must_use]
pub fn split_records(data: &[u8], device_id: u32) -> Vec<&[u8]> {
    let offsets = find_records(data, device_id);
    offsets
        .iter()
        .enumerate()
        .map(|(idx, &start)| {
            let end = offsets.get(idx + 1).copied().unwrap_or(data.len());
            &data[start..end]
        })
        .collect()
}

/// Decode every record for `device_id` in `data` in parallel.
///
/// Results are in file order, one per located record. A record failing to decode
/// does not affect the others.
pub fn decode_records(
    data: &[u8],
    device_id: u32,
    config: &DecoderConfig,
) -> Vec<Result<Decoded<Dive>>> {
    let records = split_records(data, device_id);
    debug!(count = records.len(), device_id, "located records");
    records
        .par_iter()
        .map(|record| decode_dive(record, config))
        .collect()
}
