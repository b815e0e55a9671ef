use std::io::Read;

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;
use tracing::debug;

use crate::bytes::Bytes;
use crate::config::{DecoderConfig, Layout};
use crate::events::{DecodeEvent, Decoded, Events};
use crate::profile::{DataPoint, ProfileDecoder};
use crate::rescale::rescale_temperatures;
use crate::summary::{as_seconds, Summary, WaterType};
use crate::timeseries::{self, GasMix};
use crate::Result;

/// Unused bytes following each tagged record.
pub const FOOTER_LEN: usize = 8;

/// A single decoded dive.
///
/// Built in one pass from a summary record and its timeseries block; never modified
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dive {
    pub device_id: u32,
    pub sequence: u16,
    /// Start of the dive in the device's recorded UTC offset.
    pub time: DateTime<FixedOffset>,
    #[serde(serialize_with = "as_seconds")]
    pub duration: Duration,
    #[serde(serialize_with = "as_seconds")]
    pub surface_interval: Duration,
    #[serde(serialize_with = "as_seconds")]
    pub time_limit: Duration,
    pub water_type: WaterType,
    pub max_depth: f64,
    pub average_depth: f64,
    pub depth_limit: f64,
    pub air_temperature: f64,
    pub deco_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub pressure_start: f64,
    pub pressure_end: f64,
    pub tank_warning: f64,
    pub tank_reserve: f64,
    pub percent_o2: u16,
    pub percent_he: u16,
    pub profile: Vec<DataPoint>,

    // Retained, not decoded
    pub work_sensitivity: u16,
    pub desat_before: u16,
    pub feature_set: u32,
    pub settings1: u32,
    pub settings2: u32,
    /// Not certain; from the summary record.
    pub max_po2: f64,
    /// Not certain; raw value from the gas mixture block.
    pub mix_max_po2: Option<u16>,
}

impl Dive {
    fn new(summary: Summary, mix: Option<GasMix>, profile: Vec<DataPoint>) -> Self {
        let Summary {
            device_id,
            sequence,
            time,
            duration,
            surface_interval,
            time_limit,
            water_type,
            max_depth,
            average_depth,
            depth_limit,
            air_temperature,
            deco_temperature,
            min_temperature,
            max_temperature,
            pressure_start,
            pressure_end,
            tank_warning,
            tank_reserve,
            work_sensitivity,
            desat_before,
            feature_set,
            settings1,
            settings2,
            max_po2,
            ..
        } = summary;
        let mix_max_po2 = mix.map(|m| m.max_po2);
        let mix = mix.unwrap_or_default();

        Dive {
            device_id,
            sequence,
            time,
            duration,
            surface_interval,
            time_limit,
            water_type,
            max_depth,
            average_depth,
            depth_limit,
            air_temperature,
            deco_temperature,
            min_temperature,
            max_temperature,
            pressure_start,
            pressure_end,
            tank_warning,
            tank_reserve,
            percent_o2: mix.percent_o2,
            percent_he: mix.percent_he,
            profile,
            work_sensitivity,
            desat_before,
            feature_set,
            settings1,
            settings2,
            max_po2,
            mix_max_po2,
        }
    }

    /// Profile depths in order, one per [crate::SAMPLE_INTERVAL_SECS].
    pub fn depths(&self) -> impl Iterator<Item = f64> + '_ {
        self.profile.iter().map(|p| p.depth)
    }
}

/// Read a single dive record from `bytes`.
///
/// # Errors
/// [crate::Error::UnexpectedEof] if the stream ends inside the record, or any error
/// decoding its summary or timeseries block. No partial dive is returned.
pub fn read_dive<R>(bytes: &mut Bytes<R>, config: &DecoderConfig) -> Result<Decoded<Dive>>
where
    R: Read + Send,
{
    let mut events = Events::new(config.collect_events);
    let dive = decode(bytes, config, &mut events)?;
    Ok(Decoded::new(dive, events))
}

/// Decode a single dive record from an isolated slice.
///
/// Bytes left over after the record are reported as [DecodeEvent::TrailingBytes].
///
/// # Example
/// ```
/// use smarttrak::{decode_dive, DecoderConfig};
///
/// // A summary record declaring an empty timeseries block, and the footer.
/// let dat = [0u8; 195 + 8];
/// let dive = decode_dive(&dat, &DecoderConfig::default()).unwrap().value;
/// assert!(dive.profile.is_empty());
/// ```
///
/// # Errors
/// See [read_dive].
pub fn decode_dive(data: &[u8], config: &DecoderConfig) -> Result<Decoded<Dive>> {
    let mut events = Events::new(config.collect_events);
    let mut bytes = Bytes::new(data);
    let dive = decode(&mut bytes, config, &mut events)?;
    let count = data.len() - bytes.offset();
    if count > 0 {
        events.push(DecodeEvent::TrailingBytes { count });
    }
    Ok(Decoded::new(dive, events))
}

fn decode<R>(bytes: &mut Bytes<R>, config: &DecoderConfig, events: &mut Events) -> Result<Dive>
where
    R: Read + Send,
{
    let start = bytes.offset();
    let (summary, mix, mut profile) = match config.layout {
        Layout::Tagged => {
            let summary = Summary::parse(&bytes.take(Summary::LEN, "summary record")?)?;
            let block = bytes.take(summary.block_len(), "timeseries block")?;
            let mut profile = ProfileDecoder::new(summary.time);
            let mix = timeseries::decode_block(&block, &mut profile, events)?;
            bytes.skip(FOOTER_LEN, "record footer")?;
            (summary, mix, profile)
        }
        Layout::Legacy => {
            let record = bytes.take(Layout::LEGACY_RECORD_LEN, "legacy record")?;
            let (head, body) = record.split_at(Summary::LEN);
            let summary = Summary::parse(head)?;
            let mut profile = ProfileDecoder::new(summary.time);
            profile.decode_run(body, 0, events)?;
            (summary, None, profile)
        }
    };

    let range = profile.temperature_range();
    let mut samples = profile.into_samples();
    rescale_temperatures(
        &mut samples,
        range,
        summary.min_temperature,
        summary.max_temperature,
    );

    debug!(
        offset = start,
        sequence = summary.sequence,
        samples = samples.len(),
        "decoded dive"
    );
    Ok(Dive::new(summary, mix, samples))
}
