use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::class::ClassKey;
use crate::mode::{has_marker, track, Mode};
use crate::source::Row;

/// Modes a class offers and the track text of its first row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpecialClassEntry {
  pub modes: Vec<Mode>,
  pub track: String,
}

impl SpecialClassEntry {
  fn new(track: &str) -> Self {
    Self {
      modes: vec![Mode::Combined],
      track: track.to_string(),
    }
  }

  fn add(&mut self, mode: Mode) {
    if !self.modes.contains(&mode) {
      self.modes.push(mode);
    }
  }
}

/// All classes of the data set with their program tracks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
  classes: HashMap<ClassKey, SpecialClassEntry>,
}

impl Registry {
  /// Scans every row once. Gifted modes keep the order they were first seen in.
  pub fn build(rows: &[Row]) -> Self {
    let mut classes: HashMap<ClassKey, SpecialClassEntry> = HashMap::new();

    for row in rows {
      let key = match ClassKey::of_row(row) {
        None => continue,
        Some(key) => key,
      };

      let entry = match classes.entry(key) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(SpecialClassEntry::new(track(row).unwrap_or(""))),
      };

      for mode in [Mode::GiftedThai, Mode::GiftedEnglish] {
        if mode.marker().is_some_and(|marker| has_marker(row, marker)) {
          entry.add(mode);
        }
      }
    }

    Self { classes }
  }

  pub fn get(&self, key: &ClassKey) -> Option<&SpecialClassEntry> {
    self.classes.get(key)
  }

  /// Modes offered by a class, only [`Mode::Combined`] for unknown classes.
  pub fn modes(&self, key: &ClassKey) -> &[Mode] {
    match self.classes.get(key) {
      Some(entry) => &entry.modes,
      None => &[Mode::Combined],
    }
  }

  pub fn len(&self) -> usize {
    self.classes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.classes.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ClassKey, &SpecialClassEntry)> {
    self.classes.iter()
  }
}

/// A selectable room of a grade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomOption {
  pub id: u32,
  pub room: String,
  pub label: String,
}

impl RoomOption {
  /// Display name of the room, the part of the label after `" - "`.
  pub fn name(&self) -> &str {
    self
      .label
      .split_once(" - ")
      .map(|(_, name)| name)
      .unwrap_or("")
  }
}

/// Distinct rooms of a grade ordered by room number.
pub fn rooms(rows: &[Row], grade: &str) -> Vec<RoomOption> {
  let mut seen = HashSet::new();
  let mut rooms = Vec::new();

  for row in rows {
    let key = match ClassKey::of_row(row) {
      Some(key) if key.grade == grade => key,
      _ => continue,
    };

    if !seen.insert(key.room.clone()) {
      continue;
    }

    rooms.push(RoomOption {
      id: key.room.parse().unwrap_or(u32::MAX),
      label: format!("{} - {}", key.room, track(row).unwrap_or("")),
      room: key.room,
    });
  }

  rooms.sort_by_key(|room| room.id);
  rooms
}
