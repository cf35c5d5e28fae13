use serde::Serialize;
use time::Weekday;

use crate::schedule::{
  lunch_periods, period_column, ACTIVITY_LABEL, ACTIVITY_MARKER, LUNCH_LABEL, LUNCH_MARKER,
};
use crate::source::Row;

const TEACHER_MARKER: char = '7';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
  Lunch,
  Activity,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpecialPeriod {
  pub kind: SpecialKind,
  pub label: String,
}

impl SpecialPeriod {
  pub fn lunch() -> Self {
    Self {
      kind: SpecialKind::Lunch,
      label: LUNCH_LABEL.to_string(),
    }
  }

  pub fn activity() -> Self {
    Self {
      kind: SpecialKind::Activity,
      label: ACTIVITY_LABEL.to_string(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubjectInfo {
  pub name: String,
  pub teacher: Option<String>,
  pub room: Option<String>,
}

/// Content of one period of the timetable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell {
  #[default]
  Empty,
  Special(SpecialPeriod),
  Subject(SubjectInfo),
}

/// Detects lunch breaks and activity periods.
pub fn special_period(content: &str) -> Option<SpecialPeriod> {
  if content.trim().is_empty() {
    return None;
  }

  if content.contains(LUNCH_MARKER) {
    Some(SpecialPeriod::lunch())
  } else if content.contains(ACTIVITY_MARKER) {
    Some(SpecialPeriod::activity())
  } else {
    None
  }
}

/// Parses `SUBJECT [TEACHER] [ROOM...]`.
///
/// A token starting with `7` is a teacher code and wins over the second token.
/// Room tokens are those first seen after the second position.
pub fn parse_subject(content: &str) -> Option<SubjectInfo> {
  let parts = content.split_whitespace().collect::<Vec<&str>>();

  let (name, rest) = match parts.split_first() {
    None => return None,
    Some((name, rest)) => (name.to_string(), rest),
  };

  if rest.is_empty() {
    return Some(SubjectInfo {
      name,
      teacher: None,
      room: None,
    });
  }

  let teacher = parts
    .iter()
    .find_map(|part| part.strip_prefix(TEACHER_MARKER))
    .unwrap_or(rest[0]);

  // a token repeating the name or the second token is never a room
  let room = parts
    .iter()
    .filter(|part| !part.starts_with(TEACHER_MARKER))
    .filter(|part| parts.iter().position(|other| other == *part) > Some(1))
    .copied()
    .collect::<Vec<&str>>()
    .join(" ");

  Some(SubjectInfo {
    name,
    teacher: non_empty(teacher),
    room: non_empty(&room),
  })
}

fn non_empty(value: &str) -> Option<String> {
  if value.is_empty() {
    None
  } else {
    Some(value.to_string())
  }
}

/// Classifies a single period of a class.
///
/// If several rows are given, the first one with content in the period wins.
pub fn resolve_cell(rows: &[&Row], day: Weekday, period: usize, grade: &str) -> Cell {
  if lunch_periods(grade).contains(&period) {
    return Cell::Special(SpecialPeriod::lunch());
  }

  let column = match period_column(day, period) {
    None => return Cell::Empty,
    Some(column) => column,
  };

  let content = rows
    .iter()
    .find_map(|row| row.get(&column))
    .unwrap_or("");

  if let Some(special) = special_period(content) {
    return Cell::Special(special);
  }

  match parse_subject(content) {
    None => Cell::Empty,
    Some(subject) => Cell::Subject(subject),
  }
}
