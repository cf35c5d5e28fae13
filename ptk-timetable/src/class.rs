use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::schedule::IDENTITY_COLUMNS;
use crate::source::Row;

static CLASS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("([0-9]+)/([0-9]+)").unwrap());
static PREFIXED_CLASS_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new("ม\\.([0-9]+)/([0-9]+)").unwrap());

/// A class section, e.g. `6/3`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassKey {
  pub grade: String,
  pub room: String,
}

impl ClassKey {
  pub fn new(grade: impl Into<String>, room: impl Into<String>) -> Self {
    Self {
      grade: grade.into(),
      room: room.into(),
    }
  }

  /// Identifies the class of a row by its class name column.
  pub fn of_row(row: &Row) -> Option<Self> {
    row.first_of(&IDENTITY_COLUMNS).and_then(extract_class_info)
  }
}

impl Display for ClassKey {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.grade, self.room)
  }
}

/// Extracts grade and room from texts like `6/3` or `ม.6/3`.
pub fn extract_class_info(text: &str) -> Option<ClassKey> {
  if text.is_empty() {
    return None;
  }

  CLASS_REGEX
    .captures(text)
    .or_else(|| PREFIXED_CLASS_REGEX.captures(text))
    .map(|captures| ClassKey::new(&captures[1], &captures[2]))
}
