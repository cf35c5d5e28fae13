use crate::class::ClassKey;
use crate::mode::Mode;
use crate::source::Row;

/// Rows of a class belonging to the given track, in file order.
pub fn filter_rows<'a>(rows: &'a [Row], grade: &str, room: &str, mode: Mode) -> Vec<&'a Row> {
  rows
    .iter()
    .filter(|row| match ClassKey::of_row(row) {
      Some(key) => key.grade == grade && key.room == room && mode.accepts(row),
      None => false,
    })
    .collect()
}
