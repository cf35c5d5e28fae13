use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::schedule::{NOTES_COLUMN, TRACK_COLUMNS};
use crate::source::Row;

/// Program track a timetable is shown for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
  #[default]
  Combined,
  GiftedThai,
  GiftedEnglish,
}

impl Mode {
  pub const ALL: [Mode; 3] = [Mode::Combined, Mode::GiftedThai, Mode::GiftedEnglish];

  pub fn id(self) -> u8 {
    match self {
      Mode::Combined => 1,
      Mode::GiftedThai => 2,
      Mode::GiftedEnglish => 3,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Mode::Combined => "รวม",
      Mode::GiftedThai => "G-Thai",
      Mode::GiftedEnglish => "G-Eng",
    }
  }

  /// Text marking a row as part of the track.
  pub fn marker(self) -> Option<&'static str> {
    match self {
      Mode::Combined => None,
      Mode::GiftedThai => Some("G.Thai"),
      Mode::GiftedEnglish => Some("G.Eng"),
    }
  }

  pub fn from_id(id: u8) -> Option<Self> {
    Self::ALL.into_iter().find(|mode| mode.id() == id)
  }

  /// Accepts an id or a display name, everything else is [`Mode::Combined`].
  pub fn parse_lenient(value: &str) -> Self {
    let value = value.trim();

    let mode = match value.parse::<u8>() {
      Ok(id) => Self::from_id(id),
      Err(_) => Self::ALL.into_iter().find(|mode| mode.name() == value),
    };

    mode.unwrap_or_else(|| {
      debug!("Unknown mode {:?}, using {}", value, Mode::Combined);
      Mode::Combined
    })
  }

  /// Whether a row belongs to this track. Every row belongs to [`Mode::Combined`].
  pub fn accepts(self, row: &Row) -> bool {
    match self.marker() {
      None => true,
      Some(marker) => has_marker(row, marker),
    }
  }
}

impl Display for Mode {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl Serialize for Mode {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;

    let mut state = serializer.serialize_struct("Mode", 2)?;
    state.serialize_field("id", &self.id())?;
    state.serialize_field("name", self.name())?;
    state.end()
  }
}

/// Program track of a row, e.g. `ห้องเรียนพิเศษ G.Eng`.
pub fn track(row: &Row) -> Option<&str> {
  row.first_of(&TRACK_COLUMNS)
}

/// Checks the track and the notes column of a row for a marker.
pub(crate) fn has_marker(row: &Row, marker: &str) -> bool {
  track(row).is_some_and(|track| track.contains(marker))
    || row
      .get(NOTES_COLUMN)
      .is_some_and(|notes| notes.contains(marker))
}
