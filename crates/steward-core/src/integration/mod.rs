//! Integration layer - External collaborator interfaces.
//!
//! This module defines the capability traits the core calls but never
//! implements:
//! - Message delivery back to the chat platform
//! - Thread and group mutation (titles, colors, membership, polls)
//! - The persisted per-group property store
//! - Third-party content services (search, weather, music)
//!
//! Handlers receive all of them bundled in a [`Capabilities`] value; tests
//! substitute recording fakes behind the same traits.

pub mod capability;
pub mod content;
pub mod messenger;
pub mod platform;
pub mod store;

pub use capability::Capabilities;

pub use content::{
    ArtistInfo, ComicInfo, MusicApi, PlaylistSnapshot, SearchApi, SearchHit, TrackInfo, WeatherApi,
    WeatherReport,
};

pub use messenger::{Mention, Messenger, OutboundMessage};

pub use platform::{ColorSwatch, PlatformHandle, UserProfile};

pub use store::GroupStore;
