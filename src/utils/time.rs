use jiff::civil::DateTime;

use crate::err::{DeserializationError, DeserializationResult};
use crate::utils::bcd::bcd_byte;

/// Converts a DVB start time (16-bit big-endian Modified Julian Day followed by BCD
/// hour and minute, the 5th byte being unused) into a civil date-time with zero seconds.
pub fn decode_start_time(raw: &[u8; 5]) -> DeserializationResult<DateTime> {
    let mjd = u16::from_be_bytes([raw[0], raw[1]]);
    let hour = bcd_byte(raw[2]);
    let minute = bcd_byte(raw[3]);

    let invalid = || DeserializationError::InvalidDateTime { mjd, hour, minute };

    let (year, month, day) = mjd_to_ymd(mjd);

    let year = i16::try_from(year).map_err(|_| invalid())?;
    let month = i8::try_from(month).map_err(|_| invalid())?;
    let day = i8::try_from(day).map_err(|_| invalid())?;
    let hour_i8 = i8::try_from(hour).map_err(|_| invalid())?;
    let minute_i8 = i8::try_from(minute).map_err(|_| invalid())?;

    DateTime::new(year, month, day, hour_i8, minute_i8, 0, 0).map_err(|_| invalid())
}

/// Converts three BCD bytes (hours, minutes, seconds) into a duration in seconds.
pub fn decode_duration(raw: &[u8; 3]) -> u32 {
    bcd_byte(raw[0]) * 3600 + bcd_byte(raw[1]) * 60 + bcd_byte(raw[2])
}

// ETSI EN 300 468 Annex C. The order of the floor operations matters around
// month and year boundaries.
fn mjd_to_ymd(mjd: u16) -> (i64, i64, i64) {
    let mjd_f = f64::from(mjd);

    let year0 = ((mjd_f - 15078.2) / 365.25).floor();
    let year_days = (year0 * 365.25).floor();
    let month0 = (((mjd_f - 14956.1) - year_days) / 30.6001).floor();
    let month_days = (month0 * 30.6001).floor();
    let day = i64::from(mjd) - 14956 - year_days as i64 - month_days as i64;

    let year0 = year0 as i64;
    let month0 = month0 as i64;
    let k = if month0 == 14 || month0 == 15 { 1 } else { 0 };

    (year0 + k + 1900, month0 - 1 - 12 * k, day)
}
