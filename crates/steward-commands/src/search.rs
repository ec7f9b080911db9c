//! Content lookups: wiki articles, xkcd comics, and weather reports.

use async_trait::async_trait;
use rand::Rng as _;
use steward_core::{
    CommandError, CommandHandler, DispatchContext, ExternalServiceError, OutboundMessage,
};

// ─── wiki ────────────────────────────────────────────────────────────────────

/// `wiki {query}`: links the closest article.
pub struct Wiki;

#[async_trait]
impl CommandHandler for Wiki {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let query = ctx.captures.non_empty(1).unwrap_or_default();
        let hit = ctx.services.search.search_wiki(query).await?;
        ctx.send(OutboundMessage::link(hit.url.clone(), hit.url)).await?;
        Ok(())
    }
}

// ─── xkcd ────────────────────────────────────────────────────────────────────

/// `xkcd (new|search|{number}) ({query})`
///
/// Bare invocations pick a random comic from the run so far.
pub struct Xkcd;

#[async_trait]
impl CommandHandler for Xkcd {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let url = match ctx.captures.non_empty(1) {
            None => {
                let latest = ctx.services.search.latest_comic().await?;
                let number = rand::thread_rng().gen_range(1..=latest.number.max(1));
                format!("http://xkcd.com/{number}")
            }
            Some(word) if word.eq_ignore_ascii_case("new") => {
                ctx.services.search.latest_comic().await?.url
            }
            Some(word) if word.eq_ignore_ascii_case("search") => {
                let query = ctx.captures.non_empty(2).unwrap_or_default();
                ctx.services.search.search_comic(query).await?.url
            }
            Some(number) => format!("http://xkcd.com/{number}"),
        };
        ctx.send(OutboundMessage::link(url.clone(), url)).await?;
        Ok(())
    }
}

// ─── weather ─────────────────────────────────────────────────────────────────

/// `weather {city}`: current conditions with the provider's icon attached.
pub struct Weather;

#[async_trait]
impl CommandHandler for Weather {
    async fn handle(&self, ctx: DispatchContext) -> Result<(), CommandError> {
        let city = ctx.captures.non_empty(1).unwrap_or_default();
        let report = ctx
            .services
            .weather
            .current(city)
            .await
            .map_err(|err| match err {
                ExternalServiceError::NoResults { .. } => {
                    CommandError::user("Couldn't retrieve weather for that location.")
                }
                other => CommandError::from(other),
            })?;

        let caption = format!(
            "Weather for {} ({}):\nConditions: {}\nTemp: {} ºF (L-{} H-{})\nCloud cover: {}%",
            report.city,
            report.country,
            report.description,
            report.temp,
            report.temp_min,
            report.temp_max,
            report.clouds_pct,
        );
        let icon = report.icon_url.rsplit('/').next().unwrap_or("icon.png");
        ctx.send(OutboundMessage::file_with_caption(
            report.icon_url.clone(),
            format!("media/{icon}"),
            caption,
        ))
        .await?;
        Ok(())
    }
}
