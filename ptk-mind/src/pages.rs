use sailfish::TemplateOnce;
use time::macros::format_description;
use time::OffsetDateTime;
use urlencoding::encode;

use ptk_timetable::schedule::{day_name, GRADES, PERIODS, TIME_SLOTS};
use ptk_timetable::{Cell, Grid, Mode, RoomOption, Selection, SpecialKind};

use crate::web::School;

/// Search form: grade, room and, for special classes, the program.
#[derive(TemplateOnce)]
#[template(path = "index.stpl")]
pub struct IndexPage<'a> {
  pub school: &'a School,
  pub grade: String,
  pub rooms: Vec<RoomOption>,
  pub room: Option<String>,
  pub modes: Vec<Mode>,
  pub mode: Mode,
  pub clock: Clock,
}

#[derive(TemplateOnce)]
#[template(path = "timetable.stpl")]
pub struct TimetablePage<'a> {
  pub school: &'a School,
  pub selection: Selection,
  pub room_name: String,
  pub modes: Vec<Mode>,
  pub grid: Grid,
  pub clock: Clock,
}

/// Shown while the data set is loading, after a failed load or on bad input.
#[derive(TemplateOnce)]
#[template(path = "status.stpl")]
pub struct StatusPage<'a> {
  pub school: &'a School,
  pub title: String,
  pub message: String,
  pub loading: bool,
  pub reload: bool,
  pub clock: Clock,
}

pub struct Clock {
  pub now: String,
  pub year: i32,
}

impl Clock {
  pub fn now() -> Self {
    let now = OffsetDateTime::now_utc();

    Self {
      now: now
        .format(format_description!(
          "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_default(),
      year: now.year(),
    }
  }
}

fn cell_class(cell: &Cell) -> &'static str {
  match cell {
    Cell::Empty => "empty",
    Cell::Special(special) => match special.kind {
      SpecialKind::Lunch => "lunch",
      SpecialKind::Activity => "activity",
    },
    Cell::Subject(_) => "subject",
  }
}

fn timetable_href(selection: &Selection, mode: Mode) -> String {
  format!(
    "/timetable?grade={}&room={}&mode={}",
    encode(&selection.grade),
    encode(&selection.room),
    mode.id()
  )
}

fn index_href(selection: &Selection) -> String {
  format!(
    "/?grade={}&room={}",
    encode(&selection.grade),
    encode(&selection.room)
  )
}
