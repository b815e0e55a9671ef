use serde::Serialize;
use typed_builder::TypedBuilder;

/// On-disk layout of a dive record.
///
/// Two incompatible firmware layouts exist and nothing in a file says which one wrote
/// it, so the caller has to choose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// 195 byte summary, a tagged timeseries block of the length declared in the
    /// summary, then an 8 byte footer.
    #[default]
    Tagged,
    /// Older fixed 316 byte record: the 195 byte summary followed directly by 121
    /// bytes of profile instructions. No tags and no footer.
    Legacy,
}

impl Layout {
    /// Total record size for [Layout::Legacy].
    pub const LEGACY_RECORD_LEN: usize = 316;
}

/// Options for decoding dive records.
///
/// # Example
/// ```
/// use smarttrak::{DecoderConfig, Layout};
///
/// let config = DecoderConfig::builder().layout(Layout::Legacy).build();
/// assert!(config.collect_events);
/// ```
#[derive(TypedBuilder, Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// Record layout to expect.
    #[builder(default)]
    pub layout: Layout,
    /// When false, decode events are only traced and [crate::Decoded::events] is always
    /// empty.
    #[builder(default = true)]
    pub collect_events: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
