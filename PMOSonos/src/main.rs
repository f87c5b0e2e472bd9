use anyhow::Context;
use pmoconfig::get_config;
use pmolibrary::MemoryLibrary;
use pmoserver::{ServerBuilder, logs::LoggingOptions};
use pmosmapi::{
    LibraryServices, SmapiConfig, SonosHelper, SonosServerExt, SonosService,
    register_with_controller,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Catalogue de la bibliothèque, vide si le fichier n'existe pas encore
fn load_library(path: &str) -> anyhow::Result<MemoryLibrary> {
    if !Path::new(path).exists() {
        warn!("⚠️ Library catalog {} not found, starting with an empty library", path);
        return Ok(MemoryLibrary::empty());
    }

    let library = MemoryLibrary::from_yaml_file(path)
        .with_context(|| format!("Cannot load library catalog {}", path))?;
    info!("📚 Library catalog {} loaded ({} media files)", path, library.len());
    Ok(library)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();

    let mut server = ServerBuilder::new_configured().build();
    server.init_logging(LoggingOptions::from_config()).await;
    info!("⚙️ Configuration loaded from {}", config.get_config_file());

    server
        .add_route("/info", || async {
            serde_json::json!({"name": "PMOSonos", "version": env!("CARGO_PKG_VERSION")})
        })
        .await;

    // ========== Bibliothèque et service SMAPI ==========
    let library = Arc::new(load_library(&config.get_library_catalog()?)?);
    let smapi_config = SmapiConfig::from_config(&config)?;
    let register = config.get_sonos_register_on_startup()?;
    if !smapi_config.has_media_server() {
        warn!(
            "⚠️ sonos.media_base_url is empty, stream and cover URLs point to {}",
            smapi_config.base_url()
        );
    }

    let helper = SonosHelper::new(LibraryServices::from_shared(library), smapi_config.clone());
    let service = Arc::new(SonosService::new(helper));
    server.register_sonos_service(service).await;

    server.start().await?;

    // ========== Enregistrement auprès du contrôleur ==========
    if register {
        match register_with_controller(&smapi_config).await {
            Ok(_) => info!("✅ Service '{}' available on the Sonos system", smapi_config.service_name),
            Err(e) => warn!("⚠️ Failed to register with the Sonos controller: {}", e),
        }
    }

    info!("✅ PMOSonos ready, press Ctrl+C to stop");
    server.wait().await;

    Ok(())
}
