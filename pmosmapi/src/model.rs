//! # Formes de réponse SMAPI
//!
//! Chaque type sait se convertir en [`Element`] xmltree. Les éléments enfants
//! sont émis sans préfixe : ils héritent du namespace par défaut posé sur
//! l'élément `…Response` par [`crate::soap::build_soap_response`].
//!
//! L'ordre des enfants suit le schéma SMAPI, les enceintes le vérifient.

use std::fmt;
use xmltree::{Element, XMLNode};

/// Type d'item SMAPI (`itemType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Artist,
    Album,
    Genre,
    Playlist,
    Track,
    Search,
    Stream,
    Show,
    Program,
    Favorites,
    Favorite,
    Collection,
    Container,
    AlbumList,
    TrackList,
    StreamList,
    ArtistTrackList,
    Other,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Artist => "artist",
            ItemType::Album => "album",
            ItemType::Genre => "genre",
            ItemType::Playlist => "playlist",
            ItemType::Track => "track",
            ItemType::Search => "search",
            ItemType::Stream => "stream",
            ItemType::Show => "show",
            ItemType::Program => "program",
            ItemType::Favorites => "favorites",
            ItemType::Favorite => "favorite",
            ItemType::Collection => "collection",
            ItemType::Container => "container",
            ItemType::AlbumList => "albumList",
            ItemType::TrackList => "trackList",
            ItemType::StreamList => "streamList",
            ItemType::ArtistTrackList => "artistTrackList",
            ItemType::Other => "other",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conteneur navigable (menu, répertoire, album, playlist)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCollection {
    pub id: String,
    pub item_type: ItemType,
    pub title: String,
    pub artist: Option<String>,
    pub can_play: bool,
    pub can_enumerate: bool,
    pub album_art_uri: Option<String>,
}

impl MediaCollection {
    /// Collection énumérable, non jouable, sans artiste ni pochette
    pub fn new(id: impl Into<String>, item_type: ItemType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type,
            title: title.into(),
            artist: None,
            can_play: false,
            can_enumerate: true,
            album_art_uri: None,
        }
    }

    pub fn to_element(&self) -> Element {
        let mut elem = Element::new("mediaCollection");
        push_text(&mut elem, "id", &self.id);
        push_text(&mut elem, "itemType", self.item_type.as_str());
        push_text(&mut elem, "title", &self.title);
        push_opt(&mut elem, "artist", self.artist.as_deref());
        push_bool(&mut elem, "canPlay", self.can_play);
        push_bool(&mut elem, "canEnumerate", self.can_enumerate);
        push_opt(&mut elem, "albumArtURI", self.album_art_uri.as_deref());
        elem
    }
}

/// Métadonnées propres à une piste
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    /// Durée en secondes
    pub duration: Option<u32>,
    pub album_art_uri: Option<String>,
    pub track_number: Option<u32>,
    pub can_play: bool,
    pub can_skip: bool,
}

impl TrackMetadata {
    pub fn to_element(&self) -> Element {
        let mut elem = Element::new("trackMetadata");
        push_opt(&mut elem, "artist", self.artist.as_deref());
        push_opt(&mut elem, "album", self.album.as_deref());
        push_opt(&mut elem, "albumArtist", self.album_artist.as_deref());
        if let Some(duration) = self.duration {
            push_text(&mut elem, "duration", &duration.to_string());
        }
        push_opt(&mut elem, "albumArtURI", self.album_art_uri.as_deref());
        if let Some(track_number) = self.track_number {
            push_text(&mut elem, "trackNumber", &track_number.to_string());
        }
        push_bool(&mut elem, "canPlay", self.can_play);
        push_bool(&mut elem, "canSkip", self.can_skip);
        elem
    }
}

/// Item jouable (piste)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub id: String,
    pub item_type: ItemType,
    pub title: String,
    pub mime_type: String,
    pub genre: Option<String>,
    pub track_metadata: TrackMetadata,
}

impl MediaMetadata {
    pub fn to_element(&self) -> Element {
        let mut elem = Element::new("mediaMetadata");
        push_text(&mut elem, "id", &self.id);
        push_text(&mut elem, "itemType", self.item_type.as_str());
        push_text(&mut elem, "title", &self.title);
        push_text(&mut elem, "mimeType", &self.mime_type);
        push_opt(&mut elem, "genre", self.genre.as_deref());
        elem.children
            .push(XMLNode::Element(self.track_metadata.to_element()));
        elem
    }
}

/// Élément d'une liste SMAPI : collection ou piste
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstractMedia {
    Collection(MediaCollection),
    Metadata(MediaMetadata),
}

impl AbstractMedia {
    pub fn id(&self) -> &str {
        match self {
            AbstractMedia::Collection(c) => &c.id,
            AbstractMedia::Metadata(m) => &m.id,
        }
    }

    pub fn to_element(&self) -> Element {
        match self {
            AbstractMedia::Collection(c) => c.to_element(),
            AbstractMedia::Metadata(m) => m.to_element(),
        }
    }
}

impl From<MediaCollection> for AbstractMedia {
    fn from(value: MediaCollection) -> Self {
        AbstractMedia::Collection(value)
    }
}

impl From<MediaMetadata> for AbstractMedia {
    fn from(value: MediaMetadata) -> Self {
        AbstractMedia::Metadata(value)
    }
}

/// Enveloppe paginée, voir [`crate::paging::create_sub_list`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaList {
    pub index: u32,
    pub count: u32,
    pub total: u32,
    pub items: Vec<AbstractMedia>,
}

impl MediaList {
    /// Sérialise la liste sous l'élément `name` (ex: `getMetadataResult`)
    pub fn to_element(&self, name: &str) -> Element {
        let mut elem = Element::new(name);
        push_text(&mut elem, "index", &self.index.to_string());
        push_text(&mut elem, "count", &self.count.to_string());
        push_text(&mut elem, "total", &self.total.to_string());
        for item in &self.items {
            elem.children.push(XMLNode::Element(item.to_element()));
        }
        elem
    }
}

/// Jetons de version du catalogue et des favoris
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastUpdate {
    pub catalog: String,
    pub favorites: String,
}

impl LastUpdate {
    pub fn to_element(&self, name: &str) -> Element {
        let mut elem = Element::new(name);
        push_text(&mut elem, "catalog", &self.catalog);
        push_text(&mut elem, "favorites", &self.favorites);
        elem
    }
}

/// Résultat de `getMediaURI`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUriResult {
    pub uri: String,
}

impl MediaUriResult {
    pub fn to_element(&self, name: &str) -> Element {
        text_element(name, &self.uri)
    }
}

/// Élément feuille `<name>value</name>`
pub fn text_element(name: &str, value: &str) -> Element {
    let mut elem = Element::new(name);
    if !value.is_empty() {
        elem.children.push(XMLNode::Text(value.to_string()));
    }
    elem
}

fn push_text(parent: &mut Element, name: &str, value: &str) {
    parent
        .children
        .push(XMLNode::Element(text_element(name, value)));
}

fn push_opt(parent: &mut Element, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        push_text(parent, name, value);
    }
}

fn push_bool(parent: &mut Element, name: &str, value: bool) {
    push_text(parent, name, if value { "true" } else { "false" });
}
