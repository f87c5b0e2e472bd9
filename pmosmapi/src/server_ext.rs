//! Extension de [`pmoserver::Server`] pour héberger le service SMAPI

use crate::endpoint::smapi_router;
use crate::service::SonosService;
use pmoserver::Server;
use std::sync::Arc;
use tracing::info;

pub trait SonosServerExt {
    /// Monte le point SOAP et la presentation map à la racine du serveur
    async fn register_sonos_service(&mut self, service: Arc<SonosService>);
}

impl SonosServerExt for Server {
    async fn register_sonos_service(&mut self, service: Arc<SonosService>) {
        let config = service.helper().config();
        info!(
            "🎵 SMAPI endpoint at {} (presentation map {})",
            config.endpoint_url(),
            config.presentation_map_url()
        );

        self.add_router("/", smapi_router(service)).await;
    }
}
