//! Music service commands: track and artist search, random song drops, and
//! the per-member playlists stored on the group.

use async_trait::async_trait;
use futures::future::join_all;
use rand::seq::SliceRandom;
use steward_core::foundation::capitalize;
use steward_core::foundation::group::Playlist;
use steward_core::{
    CommandError, CommandHandler, DispatchContext, ExternalServiceError, OutboundMessage,
    TrackInfo,
};
use tracing::warn;

use crate::{CommandDeps, RosterSettings};

fn explicit_tag(track: &TrackInfo) -> &'static str {
    if track.explicit { " (Explicit)" } else { "" }
}

// ─── spotsearch ──────────────────────────────────────────────────────────────

/// `(song|artist) search {query}`
pub struct SpotSearch {
    settings: RosterSettings,
}

impl SpotSearch {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }
}

#[async_trait]
impl CommandHandler for SpotSearch {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let kind = ctx.captures.group(1).unwrap_or("song").to_lowercase();
        let query = ctx.captures.non_empty(2).unwrap_or_default();
        let limit = self.settings.music_search_limit;

        if kind == "artist" {
            let artist = ctx.services.music.search_artist(query).await?;
            let top = ctx.services.music.top_tracks(&artist.id).await?;
            let lines: Vec<String> = top
                .iter()
                .take(limit)
                .map(|track| format!("{}{} (from {})", track.name, explicit_tag(track), track.album))
                .collect();
            let text = format!(
                "Best match: {}\nPopularity: {}%\n\nTop tracks:\n{}",
                artist.name,
                artist.popularity,
                lines.join("\n")
            );
            match &artist.image_url {
                Some(image) => {
                    ctx.send(OutboundMessage::file_with_caption(
                        image.clone(),
                        "media/artist.png",
                        text,
                    ))
                    .await?;
                }
                None => ctx.send(OutboundMessage::link(text, artist.url.clone())).await?,
            }
            return Ok(());
        }

        let tracks = ctx.services.music.search_tracks(query, limit).await?;
        let Some(best) = tracks.first() else {
            return Err(ExternalServiceError::NoResults {
                service: "music",
                query: query.to_string(),
            }
            .into());
        };
        let line = format!(
            "Best match: {} by {} (from {}){}",
            best.name,
            best.artist_line(),
            best.album,
            explicit_tag(best)
        );
        match &best.preview_url {
            Some(preview) => {
                ctx.send(OutboundMessage::file_with_caption(
                    preview.clone(),
                    "media/preview.mp3",
                    line,
                ))
                .await?;
            }
            None => ctx.send(OutboundMessage::link(line, best.url.clone())).await?,
        }
        Ok(())
    }
}

// ─── song ────────────────────────────────────────────────────────────────────

/// `song ({member})`: drops a random track from a stored playlist.
pub struct Song {
    settings: RosterSettings,
}

impl Song {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }

    /// The member's own playlist when they have one, any stored one
    /// otherwise, the configured default when the group has none at all.
    async fn pick_playlist(&self, ctx: &DispatchContext) -> Result<Playlist, CommandError> {
        let stored: Vec<&Playlist> = ctx.group.playlists.values().collect();
        let Some(random) = stored.choose(&mut rand::thread_rng()).copied() else {
            ctx.reply(format!(
                "No playlists found for this group. To add one, use \"{} playlist\" \
                 (see help for more info).\nFor now, using the default playlist.",
                self.settings.trigger_word
            ))
            .await?;
            return Ok(self.settings.default_playlist.clone());
        };

        if let Some(member) = ctx.captures.user(1) {
            if let Some(id) = ctx.group.member_id(&member) {
                if let Some(owned) = ctx.group.playlists.get(id) {
                    return Ok(owned.clone());
                }
                let name = ctx
                    .group
                    .display_name(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| capitalize(&member));
                ctx.reply(format!(
                    "User {name} does not have a stored playlist; using {}'s instead.",
                    random.name
                ))
                .await?;
            }
        }
        Ok(random.clone())
    }
}

#[async_trait]
impl CommandHandler for Song {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let playlist = self.pick_playlist(&ctx).await?;
        let snapshot = ctx
            .services
            .music
            .playlist_tracks(&playlist.owner, &playlist.id)
            .await?;
        ctx.reply(format!(
            "Grabbing a song from {}'s playlist, \"{}\"...",
            playlist.name, snapshot.name
        ))
        .await?;

        // Tracks without previews are only drawn when nothing else is left.
        let with_previews: Vec<&TrackInfo> = snapshot
            .tracks
            .iter()
            .filter(|track| track.preview_url.is_some())
            .collect();
        let track = if with_previews.is_empty() {
            snapshot.tracks.choose(&mut rand::thread_rng())
        } else {
            with_previews.choose(&mut rand::thread_rng()).copied()
        };
        let Some(track) = track else {
            return Err(CommandError::user(format!(
                "Playlist \"{}\" has no tracks.",
                snapshot.name
            )));
        };

        let line = format!(
            "How about {} (from \"{}\") by {}{}?",
            track.name,
            track.album,
            track.artist_line(),
            explicit_tag(track)
        );
        match &track.preview_url {
            Some(preview) => {
                ctx.send(OutboundMessage::file_with_caption(
                    preview.clone(),
                    "media/preview.mp3",
                    line,
                ))
                .await?;
            }
            None => ctx.send(OutboundMessage::link(line, track.url.clone())).await?,
        }
        Ok(())
    }
}

// ─── playlist ────────────────────────────────────────────────────────────────

/// `playlist ({member} ({spotify username} {playlist URI}))`
///
/// The bare form lists every stored playlist with a bounded wait per fetch;
/// the add form verifies the playlist is reachable before writing it.
pub struct Playlists {
    settings: RosterSettings,
}

impl Playlists {
    pub fn new(deps: &CommandDeps) -> Self {
        Self {
            settings: deps.settings.clone(),
        }
    }

    async fn add(&self, ctx: &DispatchContext, member: &str) -> Result<(), CommandError> {
        let (owner, uri) = match (ctx.captures.non_empty(2), ctx.captures.non_empty(3)) {
            (Some(owner), Some(uri)) => (owner, uri),
            _ => {
                return Err(CommandError::user(
                    "Please include a Spotify URI to add a playlist (see help for more info)",
                ));
            }
        };
        let Some(id) = ctx.group.member_id(member) else {
            return Err(CommandError::user(format!(
                "User {} not found",
                capitalize(member)
            )));
        };

        let playlist_id = uri.rsplit(':').next().unwrap_or(uri);
        let snapshot = match ctx.services.music.playlist_tracks(owner, playlist_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(owner, uri, error = %err, "playlist verification failed");
                return Err(CommandError::user(
                    "Playlist couldn't be added; check the URI and make sure that you've \
                     set the playlist to public.",
                ));
            }
        };

        let playlist = Playlist {
            name: ctx
                .group
                .display_name(id)
                .map(str::to_string)
                .unwrap_or_else(|| capitalize(member)),
            id: playlist_id.to_string(),
            owner: owner.to_string(),
            uri: uri.to_string(),
        };
        let mut playlists = ctx.group.playlists.clone();
        playlists.insert(id.clone(), playlist);
        let value = serde_json::to_value(&playlists).unwrap_or_default();
        ctx.services
            .groups
            .set_property("playlists", value, &ctx.group)
            .await?;

        let lines: Vec<String> = snapshot
            .tracks
            .iter()
            .take(self.settings.music_search_limit)
            .map(|track| format!("– {}{} (from {})", track.name, explicit_tag(track), track.album))
            .collect();
        ctx.reply(format!(
            "Playlist \"{}\" added to the group. Here are some sample tracks:\n{}",
            snapshot.name,
            lines.join("\n")
        ))
        .await?;
        Ok(())
    }

    async fn listing(&self, ctx: &DispatchContext) -> Result<(), CommandError> {
        let stored: Vec<&Playlist> = ctx.group.playlists.values().collect();
        if stored.is_empty() {
            ctx.reply(format!(
                "No playlists for this group. To add one, use \"{} playlist\" (see help).",
                self.settings.trigger_word
            ))
            .await?;
            return Ok(());
        }

        let fetches = stored.iter().map(|playlist| {
            tokio::time::timeout(
                self.settings.query_timeout,
                ctx.services.music.playlist_tracks(&playlist.owner, &playlist.id),
            )
        });
        let mut lines = Vec::new();
        for (playlist, fetched) in stored.iter().zip(join_all(fetches).await) {
            match fetched {
                Ok(Ok(snapshot)) => lines.push(format!(
                    "\"{}\" by {} ({} songs)",
                    snapshot.name,
                    playlist.name,
                    snapshot.tracks.len()
                )),
                Ok(Err(err)) => {
                    warn!(playlist = %playlist.uri, error = %err, "playlist fetch failed");
                }
                Err(_) => warn!(playlist = %playlist.uri, "playlist fetch timed out"),
            }
        }
        ctx.reply(format!("Playlists for this group:\n{}", lines.join("\n— "))).await?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for Playlists {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        match ctx.captures.user(1) {
            Some(member) => self.add(&ctx, &member).await,
            None => self.listing(&ctx).await,
        }
    }
}
