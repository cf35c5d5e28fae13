use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use include_dir::{include_dir, Dir};
use sailfish::TemplateOnce;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;
use tracing::error;

use ptk_timetable::schedule::GRADES;
use ptk_timetable::{ClassKey, Data, Grid, Mode, RoomOption, Selection, Status, Timetable};

use crate::pages::{Clock, IndexPage, StatusPage, TimetablePage};

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

pub struct AppState {
  pub timetable: Timetable,
  pub school: School,
}

pub struct School {
  pub name: String,
  pub term: String,
}

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/timetable", get(timetable))
    .route("/reload", post(reload))
    .route("/api/status", get(api_status))
    .route("/api/reload", post(api_reload))
    .route("/api/grades", get(api_grades))
    .route("/api/grades/:grade/rooms", get(api_rooms))
    .route("/api/classes/:grade/:room/modes", get(api_modes))
    .route("/api/timetable", get(api_timetable))
    .route("/static/*path", get(asset))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    error!("Request failed: {:#}", self.0);
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      format!("Internal server error: {:#}", self.0),
    )
      .into_response()
  }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
  fn from(err: E) -> Self {
    Self(err.into())
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
  grade: Option<String>,
  room: Option<String>,
  mode: Option<String>,
}

impl SelectionQuery {
  fn grade(&self) -> &str {
    self
      .grade
      .as_deref()
      .map(str::trim)
      .filter(|grade| GRADES.contains(grade))
      .unwrap_or(GRADES[0])
  }

  /// The grade as given, a grade without classes selects nothing.
  fn requested_grade(&self) -> Option<&str> {
    self
      .grade
      .as_deref()
      .map(str::trim)
      .filter(|grade| !grade.is_empty())
  }

  fn room(&self) -> Option<&str> {
    self
      .room
      .as_deref()
      .map(str::trim)
      .filter(|room| !room.is_empty())
  }

  fn mode(&self) -> Mode {
    self
      .mode
      .as_deref()
      .map(Mode::parse_lenient)
      .unwrap_or_default()
  }
}

async fn index(
  State(state): State<Arc<AppState>>,
  Query(query): Query<SelectionQuery>,
) -> Result<Response, AppError> {
  let data = match state.timetable.status().await {
    Status::Ready(data) => data,
    status => return not_ready(&state.school, status),
  };

  let grade = query.grade();
  let rooms = data.rooms(grade);
  let room = query
    .room()
    .and_then(|room| rooms.iter().find(|option| option.room == room))
    .or(rooms.first())
    .map(|option| option.room.clone());

  let modes = match &room {
    Some(room) => data.modes(&ClassKey::new(grade, room.as_str())).to_vec(),
    None => vec![Mode::Combined],
  };
  let mode = Some(query.mode())
    .filter(|mode| modes.contains(mode))
    .unwrap_or(modes[0]);

  let page = IndexPage {
    school: &state.school,
    grade: grade.to_string(),
    rooms,
    room,
    modes,
    mode,
    clock: Clock::now(),
  };

  Ok(Html(page.render_once()?).into_response())
}

async fn timetable(
  State(state): State<Arc<AppState>>,
  Query(query): Query<SelectionQuery>,
) -> Result<Response, AppError> {
  let data = match state.timetable.status().await {
    Status::Ready(data) => data,
    status => return not_ready(&state.school, status),
  };

  let (grade, room) = match (query.requested_grade(), query.room()) {
    (Some(grade), Some(room)) => (grade, room),
    _ => {
      let page = StatusPage {
        school: &state.school,
        title: "ไม่พบห้องเรียน".to_string(),
        message: "กรุณาเลือกระดับชั้นและห้องเรียน".to_string(),
        loading: false,
        reload: false,
        clock: Clock::now(),
      };
      return Ok((StatusCode::BAD_REQUEST, Html(page.render_once()?)).into_response());
    }
  };

  let (selection, grid) = resolve(&data, grade, room, query.mode());
  let room_name = data
    .rooms(&selection.grade)
    .into_iter()
    .find(|option| option.room == selection.room)
    .map(|option| option.name().to_string())
    .unwrap_or_default();

  let page = TimetablePage {
    school: &state.school,
    modes: data.modes(&selection.key()).to_vec(),
    selection,
    room_name,
    grid,
    clock: Clock::now(),
  };

  Ok(Html(page.render_once()?).into_response())
}

async fn reload(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
  if let Err(err) = state.timetable.update().await {
    let page = failed_page(&state.school, format!("{:#}", err));
    return Ok((StatusCode::SERVICE_UNAVAILABLE, Html(page.render_once()?)).into_response());
  }

  Ok(Redirect::to("/").into_response())
}

/// Builds the grid of a selection, replacing a mode the class does not offer.
fn resolve(data: &Data, grade: &str, room: &str, mode: Mode) -> (Selection, Grid) {
  let mut selection = Selection {
    grade: grade.to_string(),
    room: room.to_string(),
    mode,
  };
  selection.mode = data.effective_mode(&selection);
  let grid = data.grid(&selection);

  (selection, grid)
}

fn not_ready(school: &School, status: Status) -> Result<Response, AppError> {
  let page = match status {
    Status::Failed(message) => failed_page(school, message),
    Status::Loading | Status::Ready(_) => StatusPage {
      school,
      title: "กำลังโหลดข้อมูล".to_string(),
      message: "กรุณารอสักครู่".to_string(),
      loading: true,
      reload: false,
      clock: Clock::now(),
    },
  };

  Ok((StatusCode::SERVICE_UNAVAILABLE, Html(page.render_once()?)).into_response())
}

fn failed_page(school: &School, message: String) -> StatusPage<'_> {
  StatusPage {
    school,
    title: "ไม่สามารถโหลดไฟล์ตารางเรียนได้".to_string(),
    message,
    loading: false,
    reload: true,
    clock: Clock::now(),
  }
}

#[derive(Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
enum StatusBody {
  Loading,
  Failed {
    error: String,
  },
  Ready {
    #[serde(with = "time::serde::rfc3339")]
    loaded_at: OffsetDateTime,
    rows: usize,
    classes: usize,
  },
}

impl From<&Status> for StatusBody {
  fn from(status: &Status) -> Self {
    match status {
      Status::Loading => Self::Loading,
      Status::Failed(error) => Self::Failed {
        error: error.clone(),
      },
      Status::Ready(data) => Self::Ready {
        loaded_at: data.loaded_at,
        rows: data.rows.len(),
        classes: data.registry.len(),
      },
    }
  }
}

/// The data set, or the 503 response telling why there is none.
async fn ready(state: &AppState) -> Result<Arc<Data>, Response> {
  match state.timetable.status().await {
    Status::Ready(data) => Ok(data),
    status => Err(
      (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(StatusBody::from(&status)),
      )
        .into_response(),
    ),
  }
}

async fn api_status(State(state): State<Arc<AppState>>) -> Json<StatusBody> {
  Json(StatusBody::from(&state.timetable.status().await))
}

async fn api_reload(State(state): State<Arc<AppState>>) -> Result<Json<StatusBody>, AppError> {
  state.timetable.update().await?;
  Ok(Json(StatusBody::from(&state.timetable.status().await)))
}

async fn api_grades() -> Json<&'static [&'static str]> {
  Json(&GRADES[..])
}

async fn api_rooms(
  State(state): State<Arc<AppState>>,
  Path(grade): Path<String>,
) -> Result<Json<Vec<RoomOption>>, Response> {
  let data = ready(&state).await?;
  Ok(Json(data.rooms(&grade)))
}

async fn api_modes(
  State(state): State<Arc<AppState>>,
  Path((grade, room)): Path<(String, String)>,
) -> Result<Json<Vec<Mode>>, Response> {
  let data = ready(&state).await?;
  Ok(Json(data.modes(&ClassKey::new(grade, room)).to_vec()))
}

#[derive(Serialize)]
struct TimetableBody {
  selection: Selection,
  grid: Grid,
}

async fn api_timetable(
  State(state): State<Arc<AppState>>,
  Query(query): Query<SelectionQuery>,
) -> Result<Json<TimetableBody>, Response> {
  let data = ready(&state).await?;

  let (grade, room) = match (query.requested_grade(), query.room()) {
    (Some(grade), Some(room)) => (grade, room),
    _ => return Err((StatusCode::BAD_REQUEST, "grade and room are required").into_response()),
  };

  let (selection, grid) = resolve(&data, grade, room, query.mode());
  Ok(Json(TimetableBody { selection, grid }))
}

async fn asset(Path(path): Path<String>) -> Response {
  match ASSETS.get_file(&path) {
    None => StatusCode::NOT_FOUND.into_response(),
    Some(file) => {
      let content_type = match file.path().extension().and_then(|ext| ext.to_str()) {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
      };

      ([(header::CONTENT_TYPE, content_type)], file.contents()).into_response()
    }
  }
}

#[cfg(test)]
mod test;
