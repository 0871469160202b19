use crate::adapters::http::get_json;
use crate::domain::model::{Character, FetchOptions};
use crate::domain::ports::CharacterProvider;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

pub const RICK_AND_MORTY_BASE_URL: &str = "https://rickandmortyapi.com/api";
const ORIGIN: &str = "Rick and Morty";

#[derive(Debug, Deserialize)]
struct CharacterPage {
    info: PageInfo,
    results: Vec<RickAndMortyCharacter>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RickAndMortyCharacter {
    name: String,
    species: String,
    status: String,
}

pub struct RickAndMortyProvider {
    client: Client,
    base_url: String,
}

impl RickAndMortyProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, RICK_AND_MORTY_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CharacterProvider for RickAndMortyProvider {
    fn name(&self) -> &str {
        "rickandmorty"
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        options: FetchOptions,
    ) -> Result<Vec<Character>> {
        let mut characters = Vec::new();
        let mut page_number = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let url = format!("{}/character?page={}", self.base_url, page_number);
            let page: CharacterPage = get_json(&self.client, &url, cancel).await?;
            tracing::debug!(
                "rickandmorty: page {} returned {} characters",
                page_number,
                page.results.len()
            );

            for c in page.results {
                characters.push(Character {
                    name: c.name,
                    origin: ORIGIN.to_string(),
                    species: c.species,
                    additional_attribute: c.status,
                });

                if options.limit_reached(characters.len()) {
                    return Ok(characters);
                }
            }

            if page.info.next.is_none() {
                break;
            }
            page_number += 1;
        }

        Ok(characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::{build_client, DEFAULT_HTTP_TIMEOUT};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn provider(server: &MockServer) -> RickAndMortyProvider {
        RickAndMortyProvider::with_base_url(
            build_client(DEFAULT_HTTP_TIMEOUT).unwrap(),
            server.base_url(),
        )
    }

    fn page(next: Option<&str>, names: &[&str]) -> serde_json::Value {
        json!({
            "info": {"next": next},
            "results": names
                .iter()
                .map(|n| json!({"name": n, "species": "Human", "status": "Alive"}))
                .collect::<Vec<_>>()
        })
    }

    #[tokio::test]
    async fn test_fetch_all_pages() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET).path("/character").query_param("page", "1");
                then.status(200)
                    .json_body(page(Some("page-2"), &["Rick Sanchez", "Morty Smith"]));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET).path("/character").query_param("page", "2");
                then.status(200).json_body(page(None, &["Summer Smith"]));
            })
            .await;

        let characters = provider(&server)
            .fetch(&CancellationToken::new(), FetchOptions::default())
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(characters.len(), 3);
        assert_eq!(
            characters[0],
            Character::new("Rick Sanchez", "Rick and Morty", "Human", "Alive")
        );
    }

    #[tokio::test]
    async fn test_fetch_respects_cap_mid_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/character").query_param("page", "1");
                then.status(200)
                    .json_body(page(Some("page-2"), &["Rick", "Morty", "Beth"]));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET).path("/character").query_param("page", "2");
                then.status(200).json_body(page(None, &["Jerry"]));
            })
            .await;

        let characters = provider(&server)
            .fetch(&CancellationToken::new(), FetchOptions::new(2))
            .await
            .unwrap();

        assert_eq!(characters.len(), 2);
        assert_eq!(second.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_cancelled_between_pages() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/character").query_param("page", "1");
                then.status(200)
                    .delay(Duration::from_millis(100))
                    .json_body(page(Some("page-2"), &["Rick"]));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET).path("/character").query_param("page", "2");
                then.status(200).json_body(page(None, &["Morty"]));
            })
            .await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = provider(&server).fetch(&cancel, FetchOptions::default()).await;

        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(second.hits_async().await, 0);
    }
}
