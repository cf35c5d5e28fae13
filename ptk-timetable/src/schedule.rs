//! Fixed layout of the school week and of the exported data file.

use time::Weekday;
use time::Weekday::{Friday, Monday, Thursday, Tuesday, Wednesday};

/// Number of periods per day.
pub const PERIODS: usize = 10;

/// School days in display order.
pub const DAYS: [Weekday; 5] = [Monday, Tuesday, Wednesday, Thursday, Friday];

/// Selectable grades (ม.1 - ม.6).
pub const GRADES: [&str; 6] = ["1", "2", "3", "4", "5", "6"];

/// Highest grade of lower secondary; these grades get the extended lunch slot.
pub const LOWER_SECONDARY_MAX: u8 = 3;

pub const TIME_SLOTS: [&str; PERIODS] = [
  "08:30-09:20",
  "09:20-10:10",
  "10:10-11:00",
  "11:00-11:50",
  "11:50-12:40",
  "12:40-13:30",
  "13:30-14:20",
  "14:20-15:10",
  "15:10-16:00",
  "16:00-16:50",
];

/// Columns holding the class name, first non-empty wins.
pub const IDENTITY_COLUMNS: [&str; 2] = ["NAME_STUD", "GROUP"];
/// Columns holding the program track, first non-empty wins.
pub const TRACK_COLUMNS: [&str; 2] = ["RUSE", "Program"];
pub const NOTES_COLUMN: &str = "NOTESTUD";

pub const LUNCH_MARKER: &str = "กลางวัน";
pub const LUNCH_LABEL: &str = "พักกลางวัน";
pub const ACTIVITY_MARKER: &str = "กิจกรรม";
pub const ACTIVITY_LABEL: &str = "กิจกรรม";

/// Prefix of the period columns of a school day, `None` on weekends.
pub fn day_prefix(day: Weekday) -> Option<&'static str> {
  match day {
    Monday => Some("S1"),
    Tuesday => Some("S2"),
    Wednesday => Some("S3"),
    Thursday => Some("S4"),
    Friday => Some("S5"),
    _ => None,
  }
}

pub fn day_name(day: Weekday) -> &'static str {
  match day {
    Monday => "จันทร์",
    Tuesday => "อังคาร",
    Wednesday => "พุธ",
    Thursday => "พฤหัสบดี",
    Friday => "ศุกร์",
    Weekday::Saturday => "เสาร์",
    Weekday::Sunday => "อาทิตย์",
  }
}

/// Column name of a period, e.g. `S101` for the first period on monday.
///
/// `period` is zero based.
pub fn period_column(day: Weekday, period: usize) -> Option<String> {
  day_prefix(day).map(|prefix| format!("{}{:02}", prefix, period + 1))
}

/// Whether periods 4 and 5 are both lunch for this grade.
pub fn is_lower_secondary(grade: &str) -> bool {
  grade
    .trim()
    .parse::<u8>()
    .map(|grade| grade <= LOWER_SECONDARY_MAX)
    .unwrap_or(false)
}

/// Zero based period indices that are always lunch for a grade.
pub fn lunch_periods(grade: &str) -> &'static [usize] {
  if is_lower_secondary(grade) {
    &[3, 4]
  } else {
    &[4]
  }
}
