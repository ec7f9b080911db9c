//! Third-party content services.
//!
//! Search, weather, and music lookups all follow the same contract: send a
//! query, get structured data back, and report failure through
//! [`ExternalServiceError`] so the dispatcher can render a friendly line
//! instead of a stack trace.

use async_trait::async_trait;

use crate::foundation::error::ExternalServiceError;

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Metadata of one webcomic issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicInfo {
    pub number: u32,
    pub title: String,
    pub url: String,
}

/// Web and comic search.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Best wiki article for a query.
    async fn search_wiki(&self, query: &str) -> Result<SearchHit, ExternalServiceError>;

    /// Best comic strip for a query.
    async fn search_comic(&self, query: &str) -> Result<SearchHit, ExternalServiceError>;

    /// The most recently published comic.
    async fn latest_comic(&self) -> Result<ComicInfo, ExternalServiceError>;
}

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    /// Short prose description, e.g. `"scattered clouds"`.
    pub description: String,
    /// Current temperature in °F.
    pub temp: f64,
    /// Daily low in °F.
    pub temp_min: f64,
    /// Daily high in °F.
    pub temp_max: f64,
    /// Cloud cover percentage.
    pub clouds_pct: u8,
    /// Condition icon suitable for attaching to the reply.
    pub icon_url: String,
}

/// Weather lookups.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Current conditions for a city name.
    async fn current(&self, city: &str) -> Result<WeatherReport, ExternalServiceError>;
}

/// One playable track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub name: String,
    /// Credited artists in listing order.
    pub artists: Vec<String>,
    pub album: String,
    /// Web link to the full track.
    pub url: String,
    /// Short preview clip, when the service provides one.
    pub preview_url: Option<String>,
    pub explicit: bool,
}

impl TrackInfo {
    /// Credited artists joined for display.
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// One artist profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistInfo {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Service popularity score, 0 to 100.
    pub popularity: u8,
    pub image_url: Option<String>,
}

/// A playlist as the music service currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSnapshot {
    /// Service-side playlist name.
    pub name: String,
    pub tracks: Vec<TrackInfo>,
}

/// Music catalog lookups.
#[async_trait]
pub trait MusicApi: Send + Sync {
    /// Tracks matching a free-text query, best first.
    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TrackInfo>, ExternalServiceError>;

    /// Best artist match for a free-text query.
    async fn search_artist(&self, query: &str) -> Result<ArtistInfo, ExternalServiceError>;

    /// An artist's most popular tracks.
    async fn top_tracks(&self, artist_id: &str) -> Result<Vec<TrackInfo>, ExternalServiceError>;

    /// A user playlist's current name and tracks.
    async fn playlist_tracks(
        &self,
        owner: &str,
        playlist_id: &str,
    ) -> Result<PlaylistSnapshot, ExternalServiceError>;
}
