//! Fixed size per-dive summary record.
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z.
const EPOCH_2000: i64 = 946_684_800;
/// Time zone offsets are recorded in 15 minute units.
const TZ_OFFSET_UNIT_SECS: i32 = 900;

/// Settings bit selecting salt water.
const SETTINGS_SALT_WATER: u32 = 0x0010_0000;

/// Water the dive happened in. The value is the density in grams per liter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WaterType {
    Sweet = 1000,
    Salt = 1025,
}

impl WaterType {
    #[must_use]
    pub fn from_settings(settings: u32) -> Self {
        if settings & SETTINGS_SALT_WATER != 0 {
            WaterType::Salt
        } else {
            WaterType::Sweet
        }
    }

    /// Density in grams per liter.
    #[must_use]
    pub fn density(self) -> f64 {
        f64::from(self as u16)
    }
}

/// Scalar fields of a 195 byte summary record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
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

    // Not decoded
    pub work_sensitivity: u16,
    pub desat_before: u16,
    pub feature_set: u32,
    pub settings1: u32,
    pub settings2: u32,
    /// Not certain; raw value / 1000.
    pub max_po2: f64,

    #[serde(skip)]
    block_len: u16,
}

impl Summary {
    /// Size of a summary record.
    pub const LEN: usize = 195;

    /// Decode a summary record.
    ///
    /// # Errors
    /// [Error::SizeMismatch] if `data` is not exactly [Summary::LEN] bytes, or
    /// [Error::MalformedRecord] if the recorded time cannot be represented.
    pub fn parse(data: &[u8]) -> Result<Summary> {
        let data: &[u8; Self::LEN] = data.try_into().map_err(|_| Error::SizeMismatch {
            expected: Self::LEN,
            actual: data.len(),
        })?;

        let settings1 = le32(data, 82);
        let water_type = WaterType::from_settings(settings1);

        Ok(Summary {
            device_id: le32(data, 8),
            sequence: le16(data, 28),
            time: parse_time(data)?,
            duration: minutes(le16(data, 44)),
            surface_interval: minutes(le16(data, 50)),
            time_limit: minutes(le16(data, 33)),
            water_type,
            max_depth: depth(le16(data, 42), water_type),
            average_depth: depth(le16(data, 158), water_type),
            depth_limit: depth(le16(data, 62), water_type),
            air_temperature: temperature(le16(data, 30)),
            deco_temperature: temperature(le16(data, 70)),
            min_temperature: temperature(le16(data, 46)),
            max_temperature: temperature(le16(data, 160)),
            pressure_start: pressure(le16(data, 54)),
            pressure_end: pressure(le16(data, 56)),
            tank_warning: pressure(le16(data, 64)),
            tank_reserve: pressure(le16(data, 66)),
            work_sensitivity: le16(data, 68),
            desat_before: le16(data, 72),
            feature_set: le32(data, 35),
            settings1,
            settings2: le32(data, 167),
            max_po2: f64::from(le16(data, 60)) / 1000.0,
            block_len: le16(data, 191),
        })
    }

    /// Length of the timeseries block following this record.
    #[must_use]
    pub fn block_len(&self) -> usize {
        usize::from(self.block_len)
    }
}

fn le16(data: &[u8; Summary::LEN], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn le32(data: &[u8; Summary::LEN], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Half-seconds since 2000-01-01 at 16, followed by the UTC offset in 15 minute
/// units at 24.
fn parse_time(data: &[u8; Summary::LEN]) -> Result<DateTime<FixedOffset>> {
    let half_secs = u64::from_le_bytes([
        data[16], data[17], data[18], data[19], data[20], data[21], data[22], data[23],
    ]);
    let offset = i32::from(le16(data, 24) as i16) * TZ_OFFSET_UNIT_SECS;

    let zone = FixedOffset::east_opt(offset)
        .ok_or_else(|| Error::malformed(24, format!("invalid utc offset {offset}s")))?;
    // half_secs / 2 always fits in an i64
    let secs = EPOCH_2000
        .checked_add((half_secs / 2) as i64)
        .ok_or_else(|| Error::malformed(16, "dive time out of range"))?;
    let utc = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::malformed(16, "dive time out of range"))?;

    Ok(utc.with_timezone(&zone))
}

fn minutes(m: u16) -> Duration {
    Duration::minutes(i64::from(m))
}

fn temperature(t: u16) -> f64 {
    f64::from(t as i16) / 10.0
}

fn pressure(p: u16) -> f64 {
    f64::from(p) / 128.0
}

fn depth(d: u16, water_type: WaterType) -> f64 {
    10.0 * f64::from(d) / water_type.density()
}

pub(crate) fn as_seconds<S>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_i64(d.num_seconds())
}
