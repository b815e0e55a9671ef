//! Decoding of SmartTrak `.asd` dive computer logs.
//!
//! An `.asd` file is a preamble carrying the logbook name, followed by one record per
//! dive:
//!
//! ```text
//! [195B summary][timeseries block, length declared in summary][8B footer]
//! ```
//!
//! The summary holds the dive-level values. The timeseries block is a tagged stream
//! which, among diagnostics, carries a delta encoded depth/temperature/event profile
//! sampled every [SAMPLE_INTERVAL_SECS].
//!
//! # Example
//! ```
//! use smarttrak::{decode_dive, DecoderConfig};
//!
//! let mut dat = vec![0u8; 195];
//! // timeseries block length
//! dat[191] = 4;
//! // a profile run of two depth deltas
//! dat.extend_from_slice(&[0xfa, 0x32, 0x32, 0xc1]);
//! dat.extend_from_slice(&[0u8; 8]);
//!
//! let dive = decode_dive(&dat, &DecoderConfig::default()).unwrap().value;
//! assert_eq!(dive.depths().collect::<Vec<_>>(), vec![1.0, 2.0, 2.0]);
//! ```
mod bytes;
mod config;
mod dive;
mod error;
mod events;
mod header;
mod profile;
mod reader;
mod rescale;
pub mod scan;
mod summary;
pub mod timeseries;

pub use bytes::Bytes;
pub use config::{DecoderConfig, Layout};
pub use dive::{decode_dive, read_dive, Dive, FOOTER_LEN};
pub use error::{Error, Result};
pub use events::{DecodeEvent, Decoded, HeaderField};
pub use header::{Header, STRING_MARKER};
pub use profile::{depth_delta, temperature_step, DataPoint, SAMPLE_INTERVAL_SECS};
pub use reader::{read_header, AsdReader};
pub use summary::{Summary, WaterType};
