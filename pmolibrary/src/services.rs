//! # Contrats des services de la bibliothèque
//!
//! La façade SMAPI ne fait que traduire : toutes les recherches passent par ces
//! traits. Ils sont asynchrones et `Send + Sync` pour être partagés derrière un
//! `Arc<dyn ...>` par les handlers HTTP.

use crate::Result;
use crate::model::{MediaFile, MusicFolder, Player, Playlist};
use async_trait::async_trait;

/// Accès aux fichiers et répertoires indexés
#[async_trait]
pub trait MediaFileService: Send + Sync {
    /// Récupère un fichier par identifiant, `None` s'il n'existe pas
    async fn get_media_file(&self, id: u32) -> Result<Option<MediaFile>>;

    /// Enfants directs d'un répertoire
    ///
    /// Les répertoires viennent d'abord (triés par titre), puis les fichiers
    /// (par numéro de piste, puis titre). Un fichier feuille n'a pas d'enfants.
    async fn get_children(&self, id: u32) -> Result<Vec<MediaFile>>;
}

/// Stockage des playlists
#[async_trait]
pub trait PlaylistService: Send + Sync {
    async fn get_all_playlists(&self) -> Result<Vec<Playlist>>;

    async fn get_playlist(&self, id: u32) -> Result<Option<Playlist>>;

    /// Fichiers de la playlist dans l'ordre de lecture
    async fn get_files_in_playlist(&self, id: u32) -> Result<Vec<MediaFile>>;
}

/// Gestion des lecteurs
#[async_trait]
pub trait PlayerService: Send + Sync {
    /// Lecteur utilisé pour les requêtes anonymes des enceintes
    async fn get_guest_player(&self) -> Result<Player>;
}

/// Profils de transcodage
#[async_trait]
pub trait TranscodingService: Send + Sync {
    /// Suffixe du flux réellement servi à `player` pour `file`
    async fn get_suffix(&self, player: &Player, file: &MediaFile) -> String;
}

/// Paramètres du serveur
#[async_trait]
pub trait SettingsService: Send + Sync {
    async fn get_all_music_folders(&self) -> Result<Vec<MusicFolder>>;
}
