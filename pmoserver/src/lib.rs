//! # pmoserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit une abstraction simple pour héberger les services HTTP du
//! pont Sonos : un [`Server`] auquel on ajoute des routers, et un système de logs
//! consultable à distance.
//!
//! ## Fonctionnalités
//!
//! - 🚀 **API de haut niveau** : routes JSON, handlers avec état, sous-routers
//! - 📡 **Server-Sent Events (SSE)** : logs en temps réel sur `/log-sse`
//! - 🎚️ **Niveau de log dynamique** : `GET/POST /api/log_setup`
//! - ⚡ **Arrêt gracieux** : gestion propre de l'arrêt sur Ctrl+C
//!
//! ## Architecture
//!
//! - [`server`] : implémentation du serveur principal et du builder
//! - [`logs`] : buffer circulaire, layer tracing et handlers HTTP des logs
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use pmoserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "127.0.0.1", 8080).build();
//!     server.init_logging(LoggingOptions::default()).await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions, SseLayer, log_dump, log_sse};
pub use server::{Server, ServerBuilder, ServerInfo};
