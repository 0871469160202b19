use crate::adapters::http::get_json;
use crate::domain::model::{Character, FetchOptions};
use crate::domain::ports::CharacterProvider;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_PAGE_SIZE: usize = 100;
const ORIGIN: &str = "Pokemon";

#[derive(Debug, Deserialize)]
struct PokemonListPage {
    next: Option<String>,
    results: Vec<PokemonListEntry>,
}

#[derive(Debug, Deserialize)]
struct PokemonListEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PokemonDetail {
    name: String,
    base_experience: Option<i64>,
    species: NamedResource,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

/// PokeAPI: offset paging over `/pokemon`, one detail lookup per entry.
pub struct PokemonProvider {
    client: Client,
    base_url: String,
    page_size: usize,
}

impl PokemonProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, POKEAPI_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn page_size_for(&self, options: &FetchOptions) -> usize {
        if options.is_unbounded() {
            self.page_size
        } else {
            options.limit_per_provider
        }
    }
}

#[async_trait]
impl CharacterProvider for PokemonProvider {
    fn name(&self) -> &str {
        "pokemon"
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        options: FetchOptions,
    ) -> Result<Vec<Character>> {
        let page_size = self.page_size_for(&options);
        let mut characters = Vec::new();
        let mut offset = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let url = format!(
                "{}/pokemon?limit={}&offset={}",
                self.base_url, page_size, offset
            );
            let page: PokemonListPage = get_json(&self.client, &url, cancel).await?;
            let returned = page.results.len();
            tracing::debug!("pokemon: offset {} returned {} entries", offset, returned);

            for entry in page.results {
                let detail_url = format!("{}/pokemon/{}", self.base_url, entry.name);
                let detail: PokemonDetail =
                    match get_json(&self.client, &detail_url, cancel).await {
                        Ok(detail) => detail,
                        Err(SyncError::Cancelled) => return Err(SyncError::Cancelled),
                        Err(e) => {
                            // 單筆明細失敗只略過該筆
                            tracing::debug!("pokemon: skipping {}: {}", entry.name, e);
                            continue;
                        }
                    };

                characters.push(Character {
                    name: detail.name,
                    origin: ORIGIN.to_string(),
                    species: detail.species.name,
                    additional_attribute: detail
                        .base_experience
                        .map(|xp| xp.to_string())
                        .unwrap_or_else(|| "Unknown".to_string()),
                });

                if options.limit_reached(characters.len()) {
                    return Ok(characters);
                }
            }

            // 回傳筆數少於頁面大小代表已到最後一頁
            if returned < page_size || page.next.is_none() {
                break;
            }
            offset += page_size;
        }

        Ok(characters)
    }
}
