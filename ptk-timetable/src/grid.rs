use serde::Serialize;
use time::Weekday;

use crate::cell::{resolve_cell, Cell};
use crate::filter::filter_rows;
use crate::mode::Mode;
use crate::schedule::{DAYS, PERIODS};
use crate::source::Row;

/// Weekly timetable, monday to friday with ten periods each.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Grid {
  cells: [[Cell; PERIODS]; DAYS.len()],
}

impl Grid {
  pub fn get(&self, day: usize, period: usize) -> Option<&Cell> {
    self.cells.get(day)?.get(period)
  }

  pub fn days(&self) -> impl Iterator<Item = (Weekday, &[Cell; PERIODS])> {
    DAYS.into_iter().zip(self.cells.iter())
  }

  pub fn cells(&self) -> impl Iterator<Item = &Cell> {
    self.cells.iter().flatten()
  }
}

/// `grade_level` decides the forced lunch periods, usually the grade itself.
pub fn build_grid(rows: &[Row], grade: &str, room: &str, mode: Mode, grade_level: &str) -> Grid {
  let filtered = filter_rows(rows, grade, room, mode);

  Grid {
    cells: std::array::from_fn(|day| {
      std::array::from_fn(|period| resolve_cell(&filtered, DAYS[day], period, grade_level))
    }),
  }
}
