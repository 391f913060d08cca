//! Background fetching of character profiles and weekly affixes.
//!
//! Both loaders run on a tokio task and report back through a single message
//! on the app's event channel. Profile requests are issued one after another
//! in roster order; a failure is recorded on that entry and the batch carries on.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::RaiderIo;
use crate::response::profile::CharacterProfile;
use crate::roster::CharacterRef;
use crate::thumbnail::Thumbnail;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Profile(Box<CharacterProfile>),
    Error(String),
}

impl Payload {
    pub fn is_error(&self) -> bool {
        matches!(self, Payload::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub character: CharacterRef,
    pub payload: Payload,
    pub portrait: Thumbnail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Affix {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub thumbnail: Thumbnail,
}

#[derive(Debug)]
pub enum AppEvent {
    Profiles {
        generation: u64,
        results: Vec<FetchResult>,
    },
    Affixes(Result<Vec<Affix>, String>),
}

pub async fn fetch_character<S>(source: &S, character: &CharacterRef) -> FetchResult
where
    S: RaiderIo + ?Sized,
{
    let payload = match source.profile(character).await {
        Ok(profile) => Payload::Profile(Box::new(profile)),
        Err(err) => {
            warn!(%character, error = %err, "profile fetch failed");
            Payload::Error(err.to_string())
        }
    };

    let portrait = match &payload {
        Payload::Profile(profile) if !profile.thumbnail_url.is_empty() => {
            match source.image(&profile.thumbnail_url).await {
                Ok(bytes) => Thumbnail::decode_or_blank(&bytes),
                Err(err) => {
                    warn!(%character, error = %err, "portrait fetch failed");
                    Thumbnail::blank()
                }
            }
        }
        _ => Thumbnail::blank(),
    };

    FetchResult {
        character: character.clone(),
        payload,
        portrait,
    }
}

/// Fetches every roster entry in order. Never fails as a whole.
pub async fn fetch_batch<S>(source: &S, roster: &[CharacterRef]) -> Vec<FetchResult>
where
    S: RaiderIo + ?Sized,
{
    let mut results = Vec::with_capacity(roster.len());
    for character in roster {
        results.push(fetch_character(source, character).await);
    }
    results
}

pub fn spawn_refresh(
    source: Arc<dyn RaiderIo>,
    roster: Vec<CharacterRef>,
    generation: u64,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(generation, characters = roster.len(), "refresh started");
        let results = fetch_batch(source.as_ref(), &roster).await;
        let failed = results.iter().filter(|r| r.payload.is_error()).count();
        info!(generation, failed, "refresh finished");
        if tx.send(AppEvent::Profiles { generation, results }).is_err() {
            warn!(generation, "event channel closed before refresh was delivered");
        }
    })
}

pub async fn load_affixes<S>(source: &S) -> Result<Vec<Affix>, String>
where
    S: RaiderIo + ?Sized,
{
    let response = source.affixes().await.map_err(|err| {
        warn!(error = %err, "affix fetch failed");
        err.to_string()
    })?;

    let mut affixes = Vec::with_capacity(response.affix_details.len());
    for detail in response.affix_details {
        let icon = detail.icon.unwrap_or_default();
        let thumbnail = if icon.is_empty() {
            Thumbnail::blank()
        } else {
            match source.image(&source.icon_url(&icon)).await {
                Ok(bytes) => Thumbnail::decode_or_blank(&bytes),
                Err(err) => {
                    warn!(icon = %icon, error = %err, "affix icon fetch failed");
                    Thumbnail::blank()
                }
            }
        };
        affixes.push(Affix {
            name: detail.name.unwrap_or_else(|| "未知詞綴".to_string()),
            description: detail.description.unwrap_or_else(|| "無描述".to_string()),
            icon,
            thumbnail,
        });
    }
    Ok(affixes)
}

pub fn spawn_affixes(source: Arc<dyn RaiderIo>, tx: UnboundedSender<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let affixes = load_affixes(source.as_ref()).await;
        if tx.send(AppEvent::Affixes(affixes)).is_err() {
            warn!("event channel closed before affixes were delivered");
        }
    })
}
