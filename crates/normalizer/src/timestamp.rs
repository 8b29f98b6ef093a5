use chrono::{DateTime, Datelike, Timelike, Utc};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Renders `at` as e.g. `1st April 2021 - 9:30 PM UTC`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    let day = at.day();
    let (hour, meridiem) = twelve_hour(at.hour());
    format!(
        "{day}{} {} {} - {hour}:{:02} {meridiem} UTC",
        ordinal_suffix(day),
        MONTH_NAMES[at.month0() as usize],
        at.year(),
        at.minute(),
    )
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

pub fn twelve_hour(hour: u32) -> (u32, &'static str) {
    match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    }
}
