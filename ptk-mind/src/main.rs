use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use ptk_timetable::{Mode, Selection, Source, Timetable};

use crate::ascii::table;
use crate::web::{router, AppState, School};

mod ascii;
mod pages;
mod web;

#[derive(Parser)]
#[command(author, version, about, long_about)]
struct Args {
  /// Path or http(s) url of the exported timetable
  #[arg(long, short, env = "PTK_MIND_SOURCE", default_value = "schedule.csv")]
  source: Source,
  #[arg(long, env = "PTK_MIND_SENTRY_DSN")]
  sentry_dsn: Option<String>,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the timetable viewer over http
  Serve(ServeArgs),
  /// Print the timetable of a class
  Show(ShowArgs),
}

#[derive(ClapArgs)]
struct ServeArgs {
  #[arg(long, short, env = "PTK_MIND_LISTEN", default_value = "127.0.0.1:8080")]
  listen: SocketAddr,
  #[arg(long, env = "PTK_MIND_SCHOOL", default_value = "โรงเรียนปทุมเทพวิทยาคาร")]
  school: String,
  #[arg(long, env = "PTK_MIND_TERM", default_value = "ภาคเรียนที่ 1/2567")]
  term: String,
}

#[derive(ClapArgs)]
struct ShowArgs {
  #[arg(long, short)]
  grade: String,
  /// Lists the rooms of the grade if omitted
  #[arg(long, short)]
  room: Option<String>,
  /// Mode id or name, e.g. `2` or `G-Thai`
  #[arg(long, short, default_value = "1")]
  mode: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let _sentry = args.sentry_dsn.as_deref().map(|dsn| {
    sentry::init((
      dsn,
      sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
      },
    ))
  });

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer())
    .with(sentry_tracing::layer())
    .init();

  let timetable = Timetable::new(args.source);

  match args.command {
    Command::Serve(serve) => {
      let state = Arc::new(AppState {
        timetable,
        school: School {
          name: serve.school,
          term: serve.term,
        },
      });

      let loader = state.clone();
      tokio::spawn(async move {
        if let Err(err) = loader.timetable.update().await {
          error!("Initial load failed, waiting for reload: {:#}", err);
        }
      });

      let listener = TcpListener::bind(serve.listen).await?;
      info!("Listening on http://{}", listener.local_addr()?);

      axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    }
    Command::Show(show) => {
      let data = timetable.update().await?;

      match show.room {
        None => {
          let rooms = data.rooms(&show.grade);
          if rooms.is_empty() {
            return Err(anyhow!("grade {} has no rooms", show.grade));
          }
          print!("{}", ascii::rooms(&show.grade, &rooms, &data));
        }
        Some(room) => {
          let selection = Selection {
            grade: show.grade,
            room,
            mode: Mode::parse_lenient(&show.mode),
          };
          let mode = data.effective_mode(&selection);
          let grid = data.grid(&selection);

          println!("ม.{} ({})", selection.key(), mode);
          print!("{}", table(&grid));
        }
      }
    }
  }

  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => info!("Shutting down"),
    Err(err) => {
      error!("Unable to listen for shutdown signal: {}", err);
      std::future::pending::<()>().await;
    }
  }
}
