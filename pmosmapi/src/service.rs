//! # Service SMAPI
//!
//! [`SonosService`] expose une méthode par opération du contrat SMAPI. Les
//! opérations de navigation et de lecture sont implémentées ; les autres
//! (favoris, notation, liaison d'appareil, rapports de lecture...) répondent
//! vide afin que les enceintes continuent de fonctionner.

use crate::error::{Result, SmapiError};
use crate::helper::SonosHelper;
use crate::ids::SonosId;
use crate::model::{AbstractMedia, LastUpdate, MediaList, MediaUriResult};
use crate::paging::create_sub_list;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{debug, info};

/// Longueur des jetons renvoyés par `getLastUpdate`
const UPDATE_TOKEN_LENGTH: usize = 5;

/// Identifiant de session renvoyé à tous les clients
pub const SESSION_ID: &str = "void";

pub struct SonosService {
    helper: SonosHelper,
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(UPDATE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

impl SonosService {
    pub fn new(helper: SonosHelper) -> Self {
        Self { helper }
    }

    pub fn helper(&self) -> &SonosHelper {
        &self.helper
    }

    /// Jetons aléatoires : le contrôleur rafraîchit son cache à chaque sondage
    pub async fn get_last_update(&self) -> Result<LastUpdate> {
        Ok(LastUpdate {
            catalog: random_token(),
            favorites: random_token(),
        })
    }

    /// Navigation paginée dans l'arborescence
    pub async fn get_metadata(
        &self,
        id: &str,
        index: u32,
        count: u32,
        recursive: bool,
    ) -> Result<MediaList> {
        info!(id, index, count, recursive, "getMetadata");

        let sonos_id: SonosId = id.parse()?;
        let list = match sonos_id {
            SonosId::Root => create_sub_list(index, count, self.helper.for_root()),
            SonosId::Library => create_sub_list(index, count, self.helper.for_library().await?),
            SonosId::Playlists => {
                create_sub_list(index, count, self.helper.for_playlists().await?)
            }
            SonosId::Playlist(n) if !recursive => {
                create_sub_list(index, count, self.helper.for_playlist(n).await?)
            }
            SonosId::MediaFile(n) if !recursive => {
                create_sub_list(index, count, self.helper.for_directory_content(n).await?)
            }
            other => create_sub_list(index, count, self.helper.recursive_songs(other).await?),
        };

        debug!(id, returned = list.count, total = list.total, "getMetadata done");
        Ok(list)
    }

    pub async fn get_session_id(&self, username: &str, _password: &str) -> Result<String> {
        debug!(username, "getSessionId");
        Ok(SESSION_ID.to_string())
    }

    /// Métadonnées d'un fichier (ou d'une playlist)
    pub async fn get_media_metadata(&self, id: &str) -> Result<AbstractMedia> {
        debug!(id, "getMediaMetadata");

        match id.parse::<SonosId>()? {
            SonosId::MediaFile(n) => {
                let file = self.helper.media_file(n).await?;
                if file.is_directory() {
                    Ok(self.helper.for_directory(&file).into())
                } else {
                    Ok(self.helper.for_song(&file).await?.into())
                }
            }
            SonosId::Playlist(n) => {
                let playlist = self.helper.playlist(n).await?;
                Ok(self.helper.for_playlist_collection(&playlist).into())
            }
            other => Err(SmapiError::InvalidId(other.to_string())),
        }
    }

    /// URL de lecture d'une piste
    pub async fn get_media_uri(&self, id: &str) -> Result<MediaUriResult> {
        let n = id.parse::<SonosId>()?.media_file_id()?;
        let file = self.helper.media_file(n).await?;
        let uri = self.helper.media_uri(file.id);

        debug!(id, uri = %uri, "getMediaURI");
        Ok(MediaUriResult { uri })
    }

    pub async fn rate_item(&self, id: &str, rating: i32) -> Result<()> {
        debug!(id, rating, "Unsupported operation rateItem");
        Ok(())
    }

    pub async fn create_container(
        &self,
        container_type: &str,
        title: &str,
        parent_id: &str,
        seed_id: &str,
    ) -> Result<()> {
        debug!(container_type, title, parent_id, seed_id, "Unsupported operation createContainer");
        Ok(())
    }

    pub async fn add_to_container(
        &self,
        id: &str,
        parent_id: &str,
        index: i32,
        update_id: &str,
    ) -> Result<()> {
        debug!(id, parent_id, index, update_id, "Unsupported operation addToContainer");
        Ok(())
    }

    pub async fn rename_container(&self, id: &str, title: &str) -> Result<()> {
        debug!(id, title, "Unsupported operation renameContainer");
        Ok(())
    }

    pub async fn get_streaming_metadata(
        &self,
        id: &str,
        start_time: &str,
        duration: i32,
    ) -> Result<()> {
        debug!(id, start_time, duration, "Unsupported operation getStreamingMetadata");
        Ok(())
    }

    pub async fn reorder_container(
        &self,
        id: &str,
        from: &str,
        to: i32,
        update_id: &str,
    ) -> Result<()> {
        debug!(id, from, to, update_id, "Unsupported operation reorderContainer");
        Ok(())
    }

    pub async fn get_extended_metadata_text(&self, id: &str, text_type: &str) -> Result<()> {
        debug!(id, text_type, "Unsupported operation getExtendedMetadataText");
        Ok(())
    }

    pub async fn get_device_link_code(&self, household_id: &str) -> Result<()> {
        debug!(household_id, "Unsupported operation getDeviceLinkCode");
        Ok(())
    }

    pub async fn delete_item(&self, favorite: &str) -> Result<()> {
        debug!(favorite, "Unsupported operation deleteItem");
        Ok(())
    }

    pub async fn report_account_action(&self, action_type: &str) -> Result<()> {
        debug!(action_type, "Unsupported operation reportAccountAction");
        Ok(())
    }

    pub async fn set_played_seconds(&self, id: &str, seconds: i32) -> Result<()> {
        debug!(id, seconds, "Unsupported operation setPlayedSeconds");
        Ok(())
    }

    pub async fn report_play_seconds(&self, id: &str, seconds: i32) -> Result<()> {
        debug!(id, seconds, "Unsupported operation reportPlaySeconds");
        Ok(())
    }

    pub async fn get_device_auth_token(
        &self,
        household_id: &str,
        link_code: &str,
        link_device_id: &str,
    ) -> Result<()> {
        debug!(household_id, link_code, link_device_id, "Unsupported operation getDeviceAuthToken");
        Ok(())
    }

    pub async fn report_status(&self, id: &str, error_code: i32, message: &str) -> Result<()> {
        debug!(id, error_code, message, "Unsupported operation reportStatus");
        Ok(())
    }

    pub async fn get_extended_metadata(&self, id: &str) -> Result<()> {
        debug!(id, "Unsupported operation getExtendedMetadata");
        Ok(())
    }

    pub async fn get_scroll_indices(&self, id: &str) -> Result<()> {
        debug!(id, "Unsupported operation getScrollIndices");
        Ok(())
    }

    pub async fn delete_container(&self, id: &str) -> Result<()> {
        debug!(id, "Unsupported operation deleteContainer");
        Ok(())
    }

    pub async fn report_play_status(&self, id: &str, status: &str) -> Result<()> {
        debug!(id, status, "Unsupported operation reportPlayStatus");
        Ok(())
    }

    pub async fn get_content_key(&self, id: &str, uri: &str) -> Result<()> {
        debug!(id, uri, "Unsupported operation getContentKey");
        Ok(())
    }

    pub async fn search(&self, id: &str, term: &str, index: u32, count: u32) -> Result<()> {
        debug!(id, term, index, count, "Unsupported operation search");
        Ok(())
    }

    pub async fn remove_from_container(
        &self,
        id: &str,
        indices: &str,
        update_id: &str,
    ) -> Result<()> {
        debug!(id, indices, update_id, "Unsupported operation removeFromContainer");
        Ok(())
    }

    pub async fn create_item(&self, favorite: &str) -> Result<()> {
        debug!(favorite, "Unsupported operation createItem");
        Ok(())
    }
}
