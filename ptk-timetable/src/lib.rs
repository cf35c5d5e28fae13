use std::sync::Arc;

use anyhow::anyhow;
use reqwest::Client;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

pub use crate::cell::{Cell, SpecialKind, SpecialPeriod, SubjectInfo};
pub use crate::class::{extract_class_info, ClassKey};
pub use crate::grid::Grid;
pub use crate::mode::Mode;
pub use crate::registry::{Registry, RoomOption, SpecialClassEntry};
pub use crate::source::{Row, Source};

pub mod cell;
pub mod class;
pub mod filter;
pub mod grid;
pub mod mode;
pub mod registry;
pub mod schedule;
pub mod source;

pub struct Timetable {
  client: Client,
  source: Source,
  status: RwLock<Status>,
  updating: Mutex<()>,
}

#[derive(Clone)]
pub enum Status {
  Loading,
  Failed(String),
  Ready(Arc<Data>),
}

/// A loaded data set. Rows and registry are always replaced together.
pub struct Data {
  pub loaded_at: OffsetDateTime,
  pub rows: Vec<Row>,
  pub registry: Registry,
}

/// The class and track a timetable is requested for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Selection {
  pub grade: String,
  pub room: String,
  pub mode: Mode,
}

impl Selection {
  pub fn key(&self) -> ClassKey {
    ClassKey::new(self.grade.clone(), self.room.clone())
  }
}

impl Data {
  pub fn new(rows: Vec<Row>) -> Self {
    let registry = Registry::build(&rows);

    Self {
      loaded_at: OffsetDateTime::now_utc(),
      rows,
      registry,
    }
  }

  pub fn rooms(&self, grade: &str) -> Vec<RoomOption> {
    registry::rooms(&self.rows, grade)
  }

  pub fn modes(&self, key: &ClassKey) -> &[Mode] {
    self.registry.modes(key)
  }

  /// Mode used for a selection, modes the class does not offer fall back to
  /// [`Mode::Combined`].
  pub fn effective_mode(&self, selection: &Selection) -> Mode {
    if self.modes(&selection.key()).contains(&selection.mode) {
      return selection.mode;
    }

    warn!(
      "Class {} has no {} timetable, showing {}",
      selection.key(),
      selection.mode,
      Mode::Combined
    );
    Mode::Combined
  }

  pub fn grid(&self, selection: &Selection) -> Grid {
    grid::build_grid(
      &self.rows,
      &selection.grade,
      &selection.room,
      self.effective_mode(selection),
      &selection.grade,
    )
  }
}

impl Timetable {
  pub fn new(source: Source) -> Self {
    Self {
      client: Client::new(),
      source,
      status: RwLock::new(Status::Loading),
      updating: Mutex::new(()),
    }
  }

  pub fn source(&self) -> &Source {
    &self.source
  }

  pub async fn status(&self) -> Status {
    self.status.read().await.clone()
  }

  /// The loaded data set, `None` while loading or after a failed first load.
  pub async fn data(&self) -> Option<Arc<Data>> {
    match &*self.status.read().await {
      Status::Ready(data) => Some(data.clone()),
      Status::Loading | Status::Failed(_) => None,
    }
  }

  /// Loads the data source and replaces the current data set.
  ///
  /// A failure keeps previously loaded data. Concurrent updates run one after
  /// another, so the last one to start is the one that stays.
  pub async fn update(&self) -> anyhow::Result<Arc<Data>> {
    let _updating = self.updating.lock().await;
    let result = self.load().await;
    let mut status = self.status.write().await;

    match result {
      Ok(data) => {
        info!(
          "Loaded {} rows with {} classes from {}",
          data.rows.len(),
          data.registry.len(),
          self.source
        );
        *status = Status::Ready(data.clone());
        Ok(data)
      }
      Err(err) => {
        error!("Unable to load timetable from {}: {:#}", self.source, err);
        if !matches!(&*status, Status::Ready(_)) {
          *status = Status::Failed(format!("{:#}", err));
        }
        Err(err)
      }
    }
  }

  async fn load(&self) -> anyhow::Result<Arc<Data>> {
    let text = self.source.fetch(&self.client).await?;
    let rows = source::parse_rows(&text)?;

    if rows.is_empty() {
      return Err(anyhow!("{} contains no rows", self.source));
    }

    Ok(Arc::new(Data::new(rows)))
  }
}
