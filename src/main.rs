use anyhow::Context;
use axum::{
  extract::ws::{Message, WebSocket, WebSocketUpgrade},
  extract::{Query, State},
  http::StatusCode,
  response::{Html, IntoResponse},
  routing::get,
  Json, Router,
};
use clap::Parser;
use futures::{sink::SinkExt, stream::StreamExt};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

mod inline;
mod viewer_html;

/// HTML Preview - render a local HTML file with optional asset inlining
#[derive(Parser, Debug)]
#[command(name = "html-preview")]
#[command(version, about, long_about = None)]
struct Cli {
  /// HTML file to preview
  #[arg(default_value = "index.html")]
  file: PathBuf,

  /// Server port
  #[arg(short, long, default_value = "8080")]
  port: u16,

  /// Bind address
  #[arg(long, default_value = "127.0.0.1")]
  host: String,

  /// Initial preview height in pixels
  #[arg(long, default_value_t = 900, value_parser = clap::value_parser!(u32).range(500..=2000))]
  height: u32,

  /// Start with asset inlining disabled
  #[arg(long)]
  no_inline: bool,

  /// Start with preview scrolling disabled
  #[arg(long)]
  no_scrolling: bool,

  /// Auto-open browser on startup
  #[arg(short, long)]
  open: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FileEvent {
  Changed { filename: String },
}

#[derive(Serialize)]
struct ConfigResponse {
  file_name: String,
  height: u32,
  scrolling: bool,
  inline: bool,
}

#[derive(Deserialize)]
struct PreviewQuery {
  inline: Option<String>,
}

#[derive(Clone)]
struct AppState {
  file: PathBuf,
  base_dir: PathBuf,
  inline_default: bool,
  height: u32,
  scrolling: bool,
  tx: broadcast::Sender<FileEvent>,
}

async fn websocket_handler(
  ws: WebSocketUpgrade,
  State(state): State<AppState>,
) -> impl IntoResponse {
  ws.on_upgrade(move |socket| handle_socket(socket, state.tx))
}

async fn handle_socket(socket: WebSocket, tx: broadcast::Sender<FileEvent>) {
  let (mut sender, mut receiver) = socket.split();
  let mut rx = tx.subscribe();

  // Spawn a task to forward file change events to the WebSocket
  let mut send_task = tokio::spawn(async move {
    while let Ok(event) = rx.recv().await {
      let json = serde_json::to_string(&event).unwrap();
      if sender.send(Message::Text(json)).await.is_err() {
        break;
      }
    }
  });

  // Handle incoming messages (for ping/pong if needed)
  let mut recv_task = tokio::spawn(async move {
    while let Some(Ok(_msg)) = receiver.next().await {
      // Handle incoming messages if needed (e.g., ping)
    }
  });

  // Wait for either task to finish
  tokio::select! {
    _ = (&mut send_task) => recv_task.abort(),
    _ = (&mut recv_task) => send_task.abort(),
  };
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
  let file_name = state
    .file
    .file_name()
    .and_then(|n| n.to_str())
    .unwrap_or("index.html")
    .to_string();

  Json(ConfigResponse {
    file_name,
    height: state.height,
    scrolling: state.scrolling,
    inline: state.inline_default,
  })
}

/// The viewer sends true/false; 1/0 is accepted as shorthand.
fn parse_inline_flag(raw: Option<&str>, default: bool) -> bool {
  match raw {
    Some("1") | Some("true") => true,
    Some("0") | Some("false") => false,
    _ => default,
  }
}

/// Re-reads the document on every call; with inlining off the text passes
/// through unchanged.
fn render_document(file: &Path, base_dir: &Path, inline: bool) -> std::io::Result<String> {
  let bytes = fs::read(file)?;
  // Permissive decoding: invalid UTF-8 is replaced, never an error
  let html = String::from_utf8_lossy(&bytes).into_owned();
  Ok(if inline {
    inline::inline_assets(&html, base_dir)
  } else {
    html
  })
}

async fn serve_preview(
  Query(query): Query<PreviewQuery>,
  State(state): State<AppState>,
) -> impl IntoResponse {
  let inline = parse_inline_flag(query.inline.as_deref(), state.inline_default);
  match render_document(&state.file, &state.base_dir, inline) {
    Ok(html) => Html(html).into_response(),
    Err(_) => {
      let message = format!("<p>{} not found</p>", state.file.display());
      (StatusCode::NOT_FOUND, Html(message)).into_response()
    }
  }
}

async fn serve_viewer() -> Html<&'static str> {
  Html(viewer_html::HTML)
}

/// Extensions that can affect the rendered preview.
fn is_previewable(file_name: &str) -> bool {
  let lower = file_name.to_ascii_lowercase();
  [
    ".html", ".htm", ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg",
    ".webp",
  ]
  .iter()
  .any(|ext| lower.ends_with(ext))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Parse CLI arguments
  let cli = Cli::parse();

  // The missing input file is the one fatal condition: stop before any
  // server starts
  if !cli.file.is_file() {
    anyhow::bail!("{} not found - nothing to preview", cli.file.display());
  }

  // All relative references resolve against the document's directory
  let base_dir = match cli.file.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  };

  // Create broadcast channel for file change events
  let (tx, _rx) = broadcast::channel::<FileEvent>(100);
  let tx_clone = tx.clone();

  // Clone base_dir before moving into async block
  let watch_dir = base_dir.clone();

  // Set up file watcher in a separate task
  tokio::spawn(async move {
    let (watch_tx, mut watch_rx) = tokio::sync::mpsc::channel(100);

    let mut watcher = notify::recommended_watcher(
      move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
          let _ = watch_tx.blocking_send(event);
        }
      },
    )
    .expect("Failed to create file watcher");

    watcher
      .watch(&watch_dir, RecursiveMode::NonRecursive)
      .expect("Failed to watch preview directory");

    println!("File watcher started for {:?}", watch_dir);

    // Debounce map: filename -> last event time
    let mut last_events: HashMap<String, Instant> = HashMap::new();
    let debounce_duration = Duration::from_millis(100);

    while let Some(event) = watch_rx.recv().await {
      if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
      ) {
        continue;
      }

      for path in event.paths {
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
          if !is_previewable(file_name) {
            continue;
          }

          let now = Instant::now();
          let debounced = last_events
            .get(file_name)
            .is_some_and(|last| now.duration_since(*last) < debounce_duration);
          if debounced {
            continue;
          }
          last_events.insert(file_name.to_string(), now);

          println!("File changed: {}", file_name);
          let _ = tx_clone.send(FileEvent::Changed {
            filename: file_name.to_string(),
          });
        }
      }
    }

    // Keep watcher alive
    drop(watcher);
  });

  let state = AppState {
    file: cli.file.clone(),
    base_dir: base_dir.clone(),
    inline_default: !cli.no_inline,
    height: cli.height,
    scrolling: !cli.no_scrolling,
    tx,
  };

  let app = Router::new()
    .route("/", get(serve_viewer))
    .route("/api/config", get(get_config))
    .route("/preview", get(serve_preview))
    .route("/ws", get(websocket_handler))
    // Relative references still resolve when inlining is off
    .fallback_service(ServeDir::new(&base_dir))
    .with_state(state);

  let addr = format!("{}:{}", cli.host, cli.port);
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .with_context(|| format!("failed to bind {}", addr))?;

  println!("HTML Preview running at http://{}", addr);
  println!("Previewing: {}", cli.file.display());
  println!("WebSocket enabled for live preview reload");

  if cli.open {
    println!("Opening browser...");
    let url = format!("http://{}", addr);
    let _ = open::that(&url);
  } else {
    println!("Open your browser to http://{}", addr);
  }

  axum::serve(listener, app).await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn inline_flag_accepts_bool_and_numeric_forms() {
    assert!(parse_inline_flag(Some("true"), false));
    assert!(parse_inline_flag(Some("1"), false));
    assert!(!parse_inline_flag(Some("false"), true));
    assert!(!parse_inline_flag(Some("0"), true));
    assert!(parse_inline_flag(None, true));
    assert!(!parse_inline_flag(Some("maybe"), false));
  }

  #[test]
  fn disabled_inlining_passes_document_through() {
    let dir = TempDir::new().unwrap();
    let html = "<html><link rel=\"stylesheet\" href=\"base.css\"></html>";
    fs::write(dir.path().join("index.html"), html).unwrap();
    fs::write(dir.path().join("base.css"), "body{color:red}").unwrap();

    let file = dir.path().join("index.html");
    let raw = render_document(&file, dir.path(), false).unwrap();
    assert_eq!(raw, html);

    let inlined = render_document(&file, dir.path(), true).unwrap();
    assert!(inlined.contains("<style>"));
  }
}
