use ptk_timetable::schedule::{day_name, PERIODS};
use ptk_timetable::{Cell, ClassKey, Data, Grid, RoomOption};

fn text(cell: &Cell) -> String {
  match cell {
    Cell::Empty => "-".to_string(),
    Cell::Special(special) => special.label.clone(),
    Cell::Subject(subject) => {
      let mut text = subject.name.clone();
      if let Some(teacher) = &subject.teacher {
        text.push_str(&format!(" ({})", teacher));
      }
      if let Some(room) = &subject.room {
        text.push(' ');
        text.push_str(room);
      }
      text
    }
  }
}

/// Pads by chars, Thai vowel and tone marks make wide columns drift a little.
fn pad(value: &str, width: usize) -> String {
  let len = value.chars().count();
  format!("{}{}", value, " ".repeat(width.saturating_sub(len)))
}

/// Renders a weekly grid, one line per day.
pub fn table(grid: &Grid) -> String {
  let rows = grid
    .days()
    .map(|(day, cells)| {
      let mut row = vec![day_name(day).to_string()];
      row.extend(cells.iter().map(text));
      row
    })
    .collect::<Vec<Vec<String>>>();

  let mut header = vec![String::new()];
  header.extend((1..=PERIODS).map(|period| period.to_string()));

  let widths = (0..=PERIODS)
    .map(|column| {
      rows
        .iter()
        .chain(std::iter::once(&header))
        .map(|row| row[column].chars().count())
        .max()
        .unwrap_or(0)
    })
    .collect::<Vec<usize>>();

  let line = |row: &[String]| {
    row
      .iter()
      .zip(&widths)
      .map(|(value, width)| pad(value, *width))
      .collect::<Vec<String>>()
      .join(" | ")
      .trim_end()
      .to_string()
  };

  let mut buf = String::new();
  buf.push_str(&line(&header));
  buf.push('\n');
  buf.push_str(
    &widths
      .iter()
      .map(|width| "-".repeat(*width))
      .collect::<Vec<String>>()
      .join("-+-"),
  );
  buf.push('\n');

  for row in &rows {
    buf.push_str(&line(row));
    buf.push('\n');
  }

  buf
}

/// Lists the rooms of a grade with the programs each offers.
pub fn rooms(grade: &str, rooms: &[RoomOption], data: &Data) -> String {
  let mut buf = String::new();

  for room in rooms {
    let modes = data
      .modes(&ClassKey::new(grade, room.room.as_str()))
      .iter()
      .map(|mode| format!("{}={}", mode.id(), mode.name()))
      .collect::<Vec<String>>()
      .join(", ");

    buf.push_str(&format!("ม.{}/{} {} [{}]\n", grade, room.room, room.name(), modes));
  }

  buf
}
