//! The capability bundle handed to handlers.

use std::sync::Arc;

use crate::integration::content::{MusicApi, SearchApi, WeatherApi};
use crate::integration::messenger::Messenger;
use crate::integration::platform::PlatformHandle;
use crate::integration::store::GroupStore;

/// Every external collaborator a handler may call, behind trait objects.
///
/// One bundle is built at startup and cloned into each [`DispatchContext`];
/// clones are cheap since every field is shared.
///
/// [`DispatchContext`]: crate::foundation::context::DispatchContext
#[derive(Clone)]
pub struct Capabilities {
    /// Message delivery.
    pub messenger: Arc<dyn Messenger>,
    /// Thread and group mutation.
    pub platform: Arc<dyn PlatformHandle>,
    /// Persisted per-group properties.
    pub groups: Arc<dyn GroupStore>,
    /// Web and comic search.
    pub search: Arc<dyn SearchApi>,
    /// Weather lookups.
    pub weather: Arc<dyn WeatherApi>,
    /// Music catalog lookups.
    pub music: Arc<dyn MusicApi>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("messenger", &"dyn Messenger")
            .field("platform", &"dyn PlatformHandle")
            .field("groups", &"dyn GroupStore")
            .field("search", &"dyn SearchApi")
            .field("weather", &"dyn WeatherApi")
            .field("music", &"dyn MusicApi")
            .finish()
    }
}
