use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::response::affixes::AffixesResponse;
use crate::response::profile::{CharacterProfile, PROFILE_FIELDS};
use crate::roster::CharacterRef;

/// Everything the fetchers need from the outside world.
#[async_trait]
pub trait RaiderIo: Send + Sync {
    async fn profile(&self, character: &CharacterRef) -> Result<CharacterProfile>;
    async fn affixes(&self) -> Result<AffixesResponse>;
    async fn image(&self, url: &str) -> Result<Vec<u8>>;
    fn icon_url(&self, icon: &str) -> String;
}

pub struct RaiderIoClient {
    http: reqwest::Client,
    settings: Settings,
}

impl RaiderIoClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mplus-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, settings })
    }

    async fn get_rio<T>(&self, url: Url, timeout: Duration) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!(%url, "GET");
        let res = self.http.get(url).timeout(timeout).send().await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(Error::status(status, &text));
        }
        let res: T = serde_json::from_str(&text)?;
        Ok(res)
    }
}

pub fn profile_url(base: &str, character: &CharacterRef) -> Result<Url> {
    let url = Url::parse_with_params(
        &format!("{base}/characters/profile"),
        &[
            ("region", character.region.as_str()),
            ("realm", character.realm.as_str()),
            ("name", character.name.as_str()),
            ("fields", PROFILE_FIELDS),
        ],
    )
    .map_err(|err| Error::InvalidUrl(err.to_string()))?;
    Ok(url)
}

pub fn affixes_url(base: &str, region: &str, locale: &str) -> Result<Url> {
    let url = Url::parse_with_params(
        &format!("{base}/mythic-plus/affixes"),
        &[("region", region), ("locale", locale)],
    )
    .map_err(|err| Error::InvalidUrl(err.to_string()))?;
    Ok(url)
}

#[async_trait]
impl RaiderIo for RaiderIoClient {
    async fn profile(&self, character: &CharacterRef) -> Result<CharacterProfile> {
        let url = profile_url(&self.settings.api_base, character)?;
        self.get_rio(url, self.settings.profile_timeout).await
    }

    async fn affixes(&self) -> Result<AffixesResponse> {
        let url = affixes_url(
            &self.settings.api_base,
            &self.settings.affix_region,
            &self.settings.affix_locale,
        )?;
        self.get_rio(url, self.settings.affix_timeout).await
    }

    async fn image(&self, url: &str) -> Result<Vec<u8>> {
        let res = self
            .http
            .get(url)
            .timeout(self.settings.affix_timeout)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::status(status, ""));
        }
        Ok(res.bytes().await?.to_vec())
    }

    fn icon_url(&self, icon: &str) -> String {
        format!("{}/{icon}.jpg", self.settings.icon_base)
    }
}
