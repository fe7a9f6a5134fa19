use std::time::SystemTime;

use chrono::{DateTime, Local, TimeZone};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// `DD Month YYYY HH:MM`, e.g. `05 March 2024 14:07`
const TIMESTAMP_FORMAT: &str = "%d %B %Y %H:%M";

pub fn format_size(bytes: u64) -> String {
    human_readable_size(bytes, 2)
}

/// Express `bytes` in B, KB, MB, GB or TB (powers of 1024).
///
/// The value is rounded to `precision` decimals. Whole numbers drop the
/// decimal part (`4 KB`), anything else keeps every decimal (`1.50 KB`).
pub fn human_readable_size(bytes: u64, precision: usize) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;

    let number = if rounded.fract() == 0.0 {
        group_thousands(&format!("{:.0}", rounded))
    } else {
        let formatted = format!("{:.*}", precision, rounded);
        match formatted.split_once('.') {
            Some((int, frac)) => format!("{}.{}", group_thousands(int), frac),
            None => group_thousands(&formatted),
        }
    };

    format!("{} {}", number, UNITS[unit])
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a modification time in the server's local time zone.
pub fn format_timestamp(time: SystemTime) -> String {
    format_datetime(&DateTime::<Local>::from(time))
}

fn format_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}
