use std::io::stdout;
use std::path::Path;

use anyhow::{Context, Result};
use smarttrak::{scan::decode_records, DecoderConfig};
use tracing::{info, warn};

use crate::info::{write_dives, DiveInfo};
use crate::Format;

pub(crate) fn scan(fpath: &Path, device_id: u32, format: Format) -> Result<()> {
    let data = std::fs::read(fpath).with_context(|| format!("reading {fpath:?}"))?;
    let results = decode_records(&data, device_id, &DecoderConfig::default());
    info!("found {} records for device {device_id:#x}", results.len());

    let mut dives = Vec::default();
    for (idx, zult) in results.into_iter().enumerate() {
        match zult {
            Ok(decoded) => dives.push(DiveInfo {
                dive: decoded.value,
                events: decoded.events,
            }),
            Err(err) => warn!("record {idx}: {err}"),
        }
    }

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &dives).context("serializing to json")
        }
        Format::Text => write_dives(&mut stdout().lock(), &dives, false),
    }
}
