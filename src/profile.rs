//! Delta encoded dive profile.
//!
//! A profile run is a sequence of one byte instructions, dispatched on the high nibble:
//!
//! |byte|instruction|
//! |---|---|
//! |`0xB_`|temperature step, low nibble is a signed 4-bit delta|
//! |`0xC_`|repeat the current state, low nibble is the sample count|
//! |`0xE_`|event flags, or clear all flags if the low nibble is 0|
//! |`0xFB`|end of run, not consumed|
//! |other `1xxxxxxx`|unknown control byte, skipped|
//! |`0xxxxxxx`|depth delta, 7-bit signed, 1/50 m, emits a sample|
use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;
use tracing::trace;

use crate::events::{DecodeEvent, Events};
use crate::{Error, Result};

/// Seconds between profile samples.
pub const SAMPLE_INTERVAL_SECS: i64 = 4;

const END_OF_RUN: u8 = 0xFB;

const FLAG_WARNING: u8 = 0x01;
const FLAG_ALERT: u8 = 0x02;
const FLAG_HIGH_WORKLOAD: u8 = 0x04;
const FLAG_BOOKMARK: u8 = 0x08;

/// A single profile sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub time: DateTime<FixedOffset>,
    /// Depth in meters.
    pub depth: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    pub alert: bool,
    pub warning: bool,
    pub high_workload: bool,
    pub bookmark: bool,
}

impl DataPoint {
    /// Human readable alert state, e.g., "Warning, Bookmark".
    #[must_use]
    pub fn state(&self) -> String {
        let mut state = if self.alert {
            "Alert"
        } else if self.warning {
            "Warning"
        } else if self.high_workload {
            "High workload"
        } else {
            "No alert/warning"
        }
        .to_string();
        if self.bookmark {
            state.push_str(", Bookmark");
        }
        state
    }
}

/// Signed 4-bit temperature step from the low nibble of `b`.
#[must_use]
pub fn temperature_step(b: u8) -> i8 {
    let mut raw = b & 0x0f;
    if raw & 0x08 != 0 {
        raw |= 0xf0;
    }
    raw as i8
}

/// Depth change in meters for a depth delta instruction.
///
/// Bit 6 is the sign of a 7-bit value and is copied into bit 7 before widening.
#[must_use]
pub fn depth_delta(b: u8) -> f64 {
    let raw = (b & 0x7f) | ((b & 0x40) << 1);
    f64::from(raw as i8) / 50.0
}

/// Running state of the profile decoder.
///
/// State is kept across runs so multiple `0xFA` runs in one block extend the same
/// profile.
#[derive(Debug)]
pub(crate) struct ProfileDecoder {
    time: DateTime<FixedOffset>,
    depth: f64,
    temperature: i32,
    min_temperature: i32,
    max_temperature: i32,
    flags: u8,
    samples: Vec<DataPoint>,
}

impl ProfileDecoder {
    pub(crate) fn new(start: DateTime<FixedOffset>) -> Self {
        ProfileDecoder {
            time: start,
            depth: 0.0,
            temperature: 0,
            min_temperature: 0,
            max_temperature: 0,
            flags: 0,
            samples: Vec::new(),
        }
    }

    /// Decode instructions from `data` until a `0xFB` byte or the end of `data`.
    ///
    /// `base` is the offset of `data` in the enclosing block and is only used for
    /// reporting. Returns the number of bytes consumed, which never includes the
    /// terminating `0xFB`.
    pub(crate) fn decode_run(
        &mut self,
        data: &[u8],
        base: usize,
        events: &mut Events,
    ) -> Result<usize> {
        let first = self.samples.len();
        for (idx, &b) in data.iter().enumerate() {
            match b {
                END_OF_RUN => {
                    trace!(consumed = idx, samples = self.samples.len() - first, "profile run");
                    return Ok(idx);
                }
                0xB0..=0xBF => {
                    self.temperature += i32::from(temperature_step(b));
                    self.min_temperature = self.min_temperature.min(self.temperature);
                    self.max_temperature = self.max_temperature.max(self.temperature);
                }
                0xC0..=0xCF => {
                    for _ in 0..(b & 0x0f) {
                        self.emit(base + idx)?;
                    }
                }
                0xE0..=0xEF => {
                    let flags = b & 0x0f;
                    if flags == 0 {
                        self.flags = 0;
                    } else {
                        self.flags |= flags;
                    }
                }
                0x80..=0xFF => events.push(DecodeEvent::UnknownControlByte {
                    byte: b,
                    offset: base + idx,
                }),
                _ => {
                    self.depth += depth_delta(b);
                    self.emit(base + idx)?;
                }
            }
        }
        trace!(
            consumed = data.len(),
            samples = self.samples.len() - first,
            "profile run to end of block"
        );
        Ok(data.len())
    }

    /// Append the current state as a sample and advance the clock.
    fn emit(&mut self, offset: usize) -> Result<()> {
        self.samples.push(DataPoint {
            time: self.time,
            depth: self.depth,
            temperature: f64::from(self.temperature),
            alert: self.flags & FLAG_ALERT != 0,
            warning: self.flags & FLAG_WARNING != 0,
            high_workload: self.flags & FLAG_HIGH_WORKLOAD != 0,
            bookmark: self.flags & FLAG_BOOKMARK != 0,
        });
        self.time = self
            .time
            .checked_add_signed(Duration::seconds(SAMPLE_INTERVAL_SECS))
            .ok_or_else(|| Error::malformed(offset, "profile time out of range"))?;
        Ok(())
    }

    /// Observed range of the temperature accumulator, including its initial 0.
    pub(crate) fn temperature_range(&self) -> (i32, i32) {
        (self.min_temperature, self.max_temperature)
    }

    pub(crate) fn into_samples(self) -> Vec<DataPoint> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 10, 17, 11, 15, 15)
            .unwrap()
    }

    fn decode(dat: &[u8]) -> (ProfileDecoder, usize, Vec<DecodeEvent>) {
        let mut decoder = ProfileDecoder::new(start());
        let mut events = Events::new(true);
        let n = decoder.decode_run(dat, 0, &mut events).unwrap();
        (decoder, n, events.into_vec())
    }

    #[test_case(0xB0, 0)]
    #[test_case(0xB1, 1)]
    #[test_case(0xB7, 7)]
    #[test_case(0xB8, -8)]
    #[test_case(0xBB, -5)]
    #[test_case(0xBF, -1)]
    fn temperature_nibble(b: u8, expected: i8) {
        assert_eq!(temperature_step(b), expected);
    }

    #[test_case(0x00, 0.0)]
    #[test_case(0x01, 0.02)]
    #[test_case(0x31, 0.98)]
    #[test_case(0x32, 1.0)]
    #[test_case(0x3f, 1.26)]
    #[test_case(0x40, -1.28)]
    #[test_case(0x7f, -0.02)]
    #[test_case(0x7e, -0.04)]
    fn depth_deltas(b: u8, expected: f64) {
        assert!(
            (depth_delta(b) - expected).abs() < 1e-9,
            "{b:#04x} => {}",
            depth_delta(b)
        );
    }

    #[test]
    fn stops_before_end_of_run() {
        let dat = [0x10, 0xC2, 0xFB, 0x10];
        let (decoder, n, _) = decode(&dat);

        assert_eq!(n, 2);
        assert_eq!(decoder.into_samples().len(), 3);
    }

    #[test]
    fn consumes_to_end_without_sentinel() {
        let dat = [0x10, 0x10];
        let (_, n, _) = decode(&dat);
        assert_eq!(n, 2);
    }

    #[test]
    fn sample_count_and_clock() {
        // 3 depth deltas + 2 + 5 repeats
        let dat = [0x05, 0xC2, 0xB1, 0x05, 0xE1, 0xC5, 0x7b];
        let (decoder, _, _) = decode(&dat);
        let samples = decoder.into_samples();

        assert_eq!(samples.len(), 10);
        assert_eq!(samples[0].time, start());
        for pair in samples.windows(2) {
            assert_eq!(pair[1].time - pair[0].time, Duration::seconds(4));
        }
    }

    #[test]
    fn repeat_copies_current_state() {
        let dat = [0x19, 0xB2, 0xC2];
        let (decoder, _, _) = decode(&dat);
        let samples = decoder.into_samples();

        assert_eq!(samples.len(), 3);
        assert!((samples[0].depth - 0.5).abs() < 1e-9);
        assert_eq!(samples[0].temperature, 0.0);
        assert_eq!(samples[1].depth, samples[2].depth);
        assert_eq!(samples[1].temperature, 2.0);
        assert_eq!(samples[2].temperature, 2.0);
    }

    #[test]
    fn zero_repeat_emits_nothing() {
        let (decoder, n, _) = decode(&[0xC0]);
        assert_eq!(n, 1);
        assert!(decoder.into_samples().is_empty());
    }

    #[test]
    fn depth_may_go_negative() {
        let (decoder, _, _) = decode(&[0x7f, 0x7f]);
        let samples = decoder.into_samples();
        assert!((samples[1].depth + 0.04).abs() < 1e-9);
    }

    #[test]
    fn event_flags_accumulate_and_clear() {
        let dat = [0xE1, 0x00, 0xEA, 0x00, 0xE0, 0x00, 0xE4, 0x00];
        let (decoder, _, _) = decode(&dat);
        let s = decoder.into_samples();

        assert!(s[0].warning && !s[0].alert && !s[0].high_workload && !s[0].bookmark);
        assert!(s[1].warning && s[1].alert && !s[1].high_workload && s[1].bookmark);
        assert!(!s[2].warning && !s[2].alert && !s[2].high_workload && !s[2].bookmark);
        assert!(!s[3].warning && !s[3].alert && s[3].high_workload && !s[3].bookmark);
        assert_eq!(s[1].state(), "Alert, Bookmark");
        assert_eq!(s[2].state(), "No alert/warning");
        assert_eq!(s[3].state(), "High workload");
    }

    #[test]
    fn temperature_range_includes_initial_zero() {
        let (decoder, _, _) = decode(&[0xB3, 0xB2]);
        assert_eq!(decoder.temperature_range(), (0, 5));

        let (decoder, _, _) = decode(&[0xBE, 0xB5, 0xB8]);
        assert_eq!(decoder.temperature_range(), (-5, 3));
    }

    #[test]
    fn unknown_control_bytes_are_skipped() {
        let dat = [0x80, 0x05, 0xD3, 0xF0, 0xA1];
        let (decoder, n, events) = decode(&dat);

        assert_eq!(n, dat.len());
        assert_eq!(decoder.into_samples().len(), 1);
        assert_eq!(
            events,
            vec![
                DecodeEvent::UnknownControlByte { byte: 0x80, offset: 0 },
                DecodeEvent::UnknownControlByte { byte: 0xD3, offset: 2 },
                DecodeEvent::UnknownControlByte { byte: 0xF0, offset: 3 },
                DecodeEvent::UnknownControlByte { byte: 0xA1, offset: 4 },
            ]
        );
    }

    #[test]
    fn state_continues_across_runs() {
        let mut decoder = ProfileDecoder::new(start());
        let mut events = Events::new(true);
        decoder.decode_run(&[0x05, 0xB1], 0, &mut events).unwrap();
        decoder.decode_run(&[0x05, 0xC1], 10, &mut events).unwrap();
        let samples = decoder.into_samples();

        assert_eq!(samples.len(), 3);
        assert!((samples[2].depth - 0.2).abs() < 1e-9);
        assert_eq!(samples[2].temperature, 1.0);
        assert_eq!(samples[2].time, start() + Duration::seconds(8));
    }
}
