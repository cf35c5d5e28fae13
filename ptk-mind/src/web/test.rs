use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ptk_timetable::{Source, Timetable};

use crate::web::{router, AppState, School};

fn fixture() -> Source {
  Source::File(
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
      .join("../ptk-timetable/fixtures/schedule.csv"),
  )
}

fn state(source: Source) -> Arc<AppState> {
  Arc::new(AppState {
    timetable: Timetable::new(source),
    school: School {
      name: "โรงเรียนปทุมเทพวิทยาคาร".to_string(),
      term: "ภาคเรียนที่ 1/2567".to_string(),
    },
  })
}

async fn loaded() -> Router {
  let state = state(fixture());
  state.timetable.update().await.unwrap();
  router(state)
}

async fn request(app: Router, method: Method, uri: &str) -> (StatusCode, String) {
  let response = app
    .oneshot(
      Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();

  let status = response.status();
  let body = response.into_body().collect().await.unwrap().to_bytes();
  (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
  request(app, Method::GET, uri).await
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
  let (status, body) = get(app, uri).await;
  (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn loading_page_before_data() {
  let app = router(state(fixture()));

  let (status, body) = get(app.clone(), "/").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(body.contains("กำลังโหลดข้อมูล"));

  let (status, body) = get_json(app.clone(), "/api/status").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["state"], "loading");

  let (status, body) = get_json(app, "/api/timetable?grade=1&room=1").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["state"], "loading");
}

#[tokio::test]
async fn failed_load_offers_reload() {
  let state = state(Source::File(PathBuf::from("/nonexistent/schedule.csv")));
  assert!(state.timetable.update().await.is_err());
  let app = router(state);

  let (status, body) = get(app.clone(), "/timetable?grade=1&room=1").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(body.contains("action=\"/reload\""));

  let (_, body) = get_json(app.clone(), "/api/status").await;
  assert_eq!(body["state"], "failed");
  assert!(body["error"].as_str().unwrap().contains("/nonexistent/schedule.csv"));

  let (status, body) = request(app, Method::POST, "/reload").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(body.contains("/nonexistent/schedule.csv"));
  assert!(body.contains("action=\"/reload\""));
}

#[tokio::test]
async fn failed_reload_is_shown() -> anyhow::Result<()> {
  let path = std::env::temp_dir().join(format!("ptk-mind-reload-{}.csv", std::process::id()));
  std::fs::write(&path, "NAME_STUD,S101\nม.1/1,ค21101\n")?;

  let state = state(Source::File(path.clone()));
  state.timetable.update().await?;
  let app = router(state);

  let (status, _) = request(app.clone(), Method::POST, "/reload").await;
  assert_eq!(status, StatusCode::SEE_OTHER);

  std::fs::write(&path, "garbage")?;
  let (status, body) = request(app.clone(), Method::POST, "/reload").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(body.contains("ไม่สามารถโหลดไฟล์ตารางเรียนได้"));
  assert!(body.contains("action=\"/reload\""));

  // the previous data set stays in use
  let (status, body) = get(app, "/timetable?grade=1&room=1").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("ค21101"));

  std::fs::remove_file(&path)?;
  Ok(())
}

#[tokio::test]
async fn search_form_lists_rooms_of_grade() {
  let (status, body) = get(loaded().await, "/?grade=4").await;

  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("<option value=\"4\" selected>ม.4</option>"));
  let second = body.find("2 - ศิลป์-ภาษา").unwrap();
  let tenth = body.find("10 - วิทย์-คณิต").unwrap();
  assert!(second < tenth);
}

#[tokio::test]
async fn search_form_shows_programs_of_special_class() {
  let (_, body) = get(loaded().await, "/?grade=6&room=3").await;
  assert!(body.contains("โปรแกรม"));
  assert!(body.contains("G-Eng"));

  let (_, body) = get(loaded().await, "/?grade=6&room=4").await;
  assert!(!body.contains("โปรแกรม"));
}

#[tokio::test]
async fn search_disabled_without_rooms() {
  let (status, body) = get(loaded().await, "/?grade=5").await;

  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("กรุณาเลือกห้อง"));
  assert!(body.contains("<button type=\"submit\" disabled>"));
}

#[tokio::test]
async fn timetable_page() {
  let (status, body) = get(loaded().await, "/timetable?grade=6&room=3&mode=3").await;

  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("ตารางเรียน ชั้น ม. 6/3 ห้องเรียนพิเศษ G-Eng"));
  assert!(body.contains("E33101"));
  assert!(body.contains("ครูBrown"));
  assert!(body.contains("ครู123สมชาย"));
  assert!(body.contains("พักกลางวัน"));
  assert!(body.contains("จันทร์"));
  assert!(body.contains("16:00-16:50"));
  assert!(!body.contains("ท33101"));
}

#[tokio::test]
async fn timetable_requires_room() {
  let (status, body) = get(loaded().await, "/timetable?grade=1").await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.contains("กรุณาเลือกระดับชั้นและห้องเรียน"));
}

#[tokio::test]
async fn unknown_grade_selects_nothing() {
  let (status, body) = get(loaded().await, "/timetable?grade=9&room=1").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("ตารางเรียน ชั้น ม. 9/1"));
  assert!(!body.contains("ค21101"));

  let (status, body) = get_json(loaded().await, "/api/timetable?grade=9&room=1").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["selection"]["grade"], "9");
  for day in body["grid"]["cells"].as_array().unwrap() {
    for (period, cell) in day.as_array().unwrap().iter().enumerate() {
      if period == 4 {
        assert_eq!(cell["kind"], "lunch");
      } else {
        assert_eq!(cell["type"], "empty");
      }
    }
  }

  let (status, _) = get(loaded().await, "/api/timetable?room=1").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn links_encode_selection() {
  let (status, body) = get(loaded().await, "/timetable?grade=1&room=1%26mode%3D3").await;

  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("/timetable?grade=1&amp;room=1%26mode%3D3&amp;mode=1"));
  assert!(body.contains("/?grade=1&amp;room=1%26mode%3D3"));
}

#[tokio::test]
async fn api_timetable_grid() {
  let (status, body) = get_json(loaded().await, "/api/timetable?grade=1&room=1").await;
  assert_eq!(status, StatusCode::OK);

  let cells = &body["grid"]["cells"];
  assert_eq!(cells.as_array().unwrap().len(), 5);
  assert_eq!(cells[0].as_array().unwrap().len(), 10);
  assert_eq!(cells[0][0]["type"], "subject");
  assert_eq!(cells[0][0]["name"], "ค21101");
  assert_eq!(cells[0][0]["teacher"], "สมชาย");
  assert_eq!(cells[0][3]["kind"], "lunch");
  assert_eq!(cells[0][6]["kind"], "activity");
  assert_eq!(cells[3][0]["type"], "empty");
}

#[tokio::test]
async fn api_timetable_falls_back_to_combined() {
  let (_, body) = get_json(loaded().await, "/api/timetable?grade=1&room=1&mode=2").await;
  assert_eq!(body["selection"]["mode"]["id"], 1);

  let (_, body) = get_json(loaded().await, "/api/timetable?grade=6&room=3&mode=G-Thai").await;
  assert_eq!(body["selection"]["mode"]["id"], 2);
  assert_eq!(body["grid"]["cells"][0][0]["name"], "ท33101");
}

#[tokio::test]
async fn api_rooms_and_modes() {
  let (_, body) = get_json(loaded().await, "/api/grades/4/rooms").await;
  let rooms = body
    .as_array()
    .unwrap()
    .iter()
    .map(|room| room["room"].as_str().unwrap().to_string())
    .collect::<Vec<_>>();
  assert_eq!(rooms, ["2", "10"]);

  let (_, body) = get_json(loaded().await, "/api/classes/6/3/modes").await;
  let modes = body
    .as_array()
    .unwrap()
    .iter()
    .map(|mode| mode["id"].as_u64().unwrap())
    .collect::<Vec<_>>();
  assert_eq!(modes, [1, 3, 2]);

  let (_, body) = get_json(loaded().await, "/api/grades").await;
  assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn api_reload_reports_status() {
  let app = router(state(fixture()));

  let (status, body) = {
    let (status, body) = request(app, Method::POST, "/api/reload").await;
    (status, serde_json::from_str::<Value>(&body).unwrap())
  };
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["state"], "ready");
  assert_eq!(body["rows"], 8);
  assert_eq!(body["classes"], 6);
}

#[tokio::test]
async fn serves_stylesheet() {
  let response = loaded()
    .await
    .oneshot(
      Request::builder()
        .uri("/static/style.css")
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();

  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(
    response.headers()[header::CONTENT_TYPE],
    "text/css; charset=utf-8"
  );

  let (status, _) = get(loaded().await, "/static/missing.js").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
