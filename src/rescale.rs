//! Temperature calibration.
//!
//! Profile temperatures are only recorded as steps relative to an unknown starting
//! value. The summary record's min/max temperatures are the only calibrated values, so
//! the accumulator range is mapped linearly onto them.
use crate::profile::DataPoint;

/// Remap accumulator-space temperatures in `samples` from `[acc_min, acc_max]` onto
/// `[min, max]`.
///
/// A constant accumulator (`acc_min == acc_max`) leaves the raw values untouched.
pub(crate) fn rescale_temperatures(
    samples: &mut [DataPoint],
    (acc_min, acc_max): (i32, i32),
    min: f64,
    max: f64,
) {
    if acc_min == acc_max {
        return;
    }
    let factor = (max - min) / f64::from(acc_max - acc_min);
    let offset = f64::from(acc_min);
    for sample in samples {
        sample.temperature = min + factor * (sample.temperature - offset);
    }
}
