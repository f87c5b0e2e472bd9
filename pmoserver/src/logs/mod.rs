//! # Logs consultables à distance
//!
//! Les events `tracing` sont copiés dans un buffer circulaire ([`LogState`])
//! par [`SseLayer`], puis exposés en HTTP :
//!
//! - `/log-sse` : historique puis flux temps réel (Server-Sent Events)
//! - `/log-dump` : contenu du buffer en JSON
//! - `/api/log_setup` : lecture et modification du niveau de log

mod sselayer;

use pmoconfig::get_config;
pub use sselayer::SseLayer;

use std::{
    collections::VecDeque,
    sync::{Arc, RwLock},
    time::SystemTime,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::Level;
use tracing_subscriber::{
    Registry, filter::LevelFilter, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Représente une entrée de log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Buffer circulaire partagé
#[derive(Clone)]
pub struct LogState {
    buffer: Arc<RwLock<VecDeque<LogEntry>>>,
    capacity: usize,
    tx: broadcast::Sender<LogEntry>,
    max_level: Arc<RwLock<Level>>,
    reload_handle: Arc<reload::Handle<LevelFilter, Registry>>,
}

impl LogState {
    pub fn new(
        capacity: usize,
        level: Level,
        reload_handle: reload::Handle<LevelFilter, Registry>,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
            tx: broadcast::channel(1000).0,
            max_level: Arc::new(RwLock::new(level)),
            reload_handle: Arc::new(reload_handle),
        }
    }

    pub fn set_max_level(&self, level: Level) {
        if let Ok(mut max_level) = self.max_level.write() {
            *max_level = level;
        }

        let level_filter = LevelFilter::from_level(level);
        if let Err(e) = self.reload_handle.reload(level_filter) {
            eprintln!("❌ Failed to reload log level filter: {}", e);
        }
    }

    pub fn get_max_level(&self) -> Level {
        self.max_level
            .read()
            .map(|level| *level)
            .unwrap_or(Level::TRACE)
    }

    fn push(&self, entry: LogEntry) {
        if let Ok(mut buf) = self.buffer.write() {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(entry.clone());
        }
        let _ = self.tx.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    pub fn dump(&self) -> Vec<LogEntry> {
        self.buffer
            .read()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Query params pour /log-sse
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub error: Option<bool>,
    #[serde(default)]
    pub warn: Option<bool>,
    #[serde(default)]
    pub info: Option<bool>,
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub trace: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Handler SSE
pub async fn log_sse(
    State(state): State<LogState>,
    Query(params): Query<LogQuery>,
) -> impl IntoResponse {
    let mut rx = state.subscribe();

    let history = state.dump();
    let stream_state = state.clone();
    let current_level = stream_state.get_max_level();

    let stream = async_stream::stream! {
        // Historique filtré par le niveau courant
        for entry in history {
            if !is_level_allowed(&entry.level, current_level) || !filter_entry(&entry, &params) {
                continue;
            }
            let json = serde_json::to_string(&entry).unwrap_or_default();
            yield Ok::<_, axum::Error>(Event::default().data(json));
        }

        // Puis les nouveaux logs en temps réel
        while let Ok(entry) = rx.recv().await {
            let max_level = stream_state.get_max_level();
            if !is_level_allowed(&entry.level, max_level) || !filter_entry(&entry, &params) {
                continue;
            }
            let json = serde_json::to_string(&entry).unwrap_or_default();
            yield Ok::<_, axum::Error>(Event::default().data(json));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handler REST (dump JSON du buffer)
pub async fn log_dump(State(state): State<LogState>) -> impl IntoResponse {
    Json(state.dump())
}

/// Un log est autorisé si son niveau est au moins aussi grave que `max_level`
fn is_level_allowed(log_level: &str, max_level: Level) -> bool {
    match string_to_level(log_level) {
        // ERROR < WARN < INFO < DEBUG < TRACE dans l'ordre de tracing
        Some(entry_level) => entry_level <= max_level,
        None => false,
    }
}

fn filter_entry(entry: &LogEntry, q: &LogQuery) -> bool {
    let lvl = entry.level.to_lowercase();
    let flags = [
        (q.error, "error"),
        (q.warn, "warn"),
        (q.info, "info"),
        (q.debug, "debug"),
        (q.trace, "trace"),
    ];

    // si aucun flag → tout est autorisé
    let any_flag = flags.iter().any(|(flag, _)| flag.unwrap_or(false));
    let mut allowed = !any_flag
        || flags
            .iter()
            .any(|(flag, name)| flag.unwrap_or(false) && lvl == *name);

    if let Some(search) = &q.search {
        allowed &= entry.message.contains(search) || entry.target.contains(search);
    }

    allowed
}

/// Options d'initialisation du système de logging
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Capacité du buffer circulaire (nombre d'entrées conservées)
    pub buffer_capacity: usize,
    /// Activer la sortie vers stderr/stdout
    pub enable_console: bool,
    pub min_level: Level,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
            enable_console: true,
            min_level: Level::INFO,
        }
    }
}

impl LoggingOptions {
    /// Lit les clés `host.logger.*` de la configuration
    pub fn from_config() -> Self {
        let config = get_config();
        let defaults = Self::default();

        Self {
            buffer_capacity: config
                .get_log_cache_size()
                .unwrap_or(defaults.buffer_capacity),
            enable_console: config
                .get_log_enable_console()
                .unwrap_or(defaults.enable_console),
            min_level: config
                .get_log_min_level()
                .ok()
                .and_then(|l| string_to_level(&l))
                .unwrap_or(defaults.min_level),
        }
    }
}

/// Initialise le système de logging avec SSE et optionnellement la console
///
/// Retourne le `LogState` à brancher sur les routes de logs. Si un subscriber
/// global est déjà installé, il est conservé et le buffer reste vide.
///
/// ```rust,no_run
/// use pmoserver::logs::{init_logging, LoggingOptions};
///
/// let log_state = init_logging(LoggingOptions::default());
/// ```
pub fn init_logging(options: LoggingOptions) -> LogState {
    let (filter, reload_handle) = reload::Layer::new(LevelFilter::from_level(options.min_level));
    let log_state = LogState::new(options.buffer_capacity, options.min_level, reload_handle);

    // Le filtre rechargeable doit précéder le SseLayer
    let console = options.enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    let result = Registry::default()
        .with(filter)
        .with(SseLayer::new(log_state.clone()))
        .with(console)
        .try_init();

    if let Err(e) = result {
        eprintln!("⚠️ Logging already initialized: {}", e);
    }

    log_state
}

#[derive(Debug, Deserialize)]
pub struct LogSetupRequest {
    pub level: String,
}

#[derive(Debug, Serialize)]
pub struct LogSetupResponse {
    pub current_level: String,
    pub available_levels: Vec<String>,
}

const AVAILABLE_LEVELS: [&str; 5] = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

fn setup_response(level: Level) -> LogSetupResponse {
    LogSetupResponse {
        current_level: level_to_string(level),
        available_levels: AVAILABLE_LEVELS.iter().map(|l| l.to_string()).collect(),
    }
}

/// GET /api/log_setup
pub async fn log_setup_get(State(state): State<LogState>) -> impl IntoResponse {
    Json(setup_response(state.get_max_level()))
}

/// POST /api/log_setup
pub async fn log_setup_post(
    State(state): State<LogState>,
    Json(payload): Json<LogSetupRequest>,
) -> impl IntoResponse {
    let Some(level) = string_to_level(&payload.level) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Invalid log level. Must be one of: ERROR, WARN, INFO, DEBUG, TRACE"
            })),
        )
            .into_response();
    };

    state.set_max_level(level);
    tracing::info!("Log level changed to: {}", payload.level);

    (StatusCode::OK, Json(setup_response(level))).into_response()
}

pub fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

fn level_to_string(level: Level) -> String {
    level.to_string()
}

/// Router de gestion du niveau de log, à monter sous `/api`
pub fn create_logs_router(log_state: LogState) -> Router {
    Router::new()
        .route("/log_setup", get(log_setup_get).post(log_setup_post))
        .with_state(log_state)
}
