use crate::adapters::http::get_json;
use crate::domain::model::{Character, FetchOptions};
use crate::domain::ports::CharacterProvider;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

pub const SWAPI_BASE_URL: &str = "https://swapi.py4e.com/api";
const ORIGIN: &str = "Star Wars";
const UNKNOWN_SPECIES: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct PeoplePage {
    next: Option<String>,
    results: Vec<Person>,
}

#[derive(Debug, Deserialize)]
struct Person {
    name: String,
    birth_year: String,
    #[serde(default)]
    species: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Species {
    name: String,
}

/// SWAPI: follows the `next` link of `/people/` and resolves the first
/// species URL of each person.
pub struct StarWarsProvider {
    client: Client,
    base_url: String,
}

impl StarWarsProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, SWAPI_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn species_name(&self, person: &Person, cancel: &CancellationToken) -> Result<String> {
        let Some(species_url) = person.species.first() else {
            return Ok(UNKNOWN_SPECIES.to_string());
        };

        match get_json::<Species>(&self.client, species_url, cancel).await {
            Ok(species) => Ok(species.name),
            Err(SyncError::Cancelled) => Err(SyncError::Cancelled),
            Err(e) => {
                tracing::debug!("starwars: species lookup for {} failed: {}", person.name, e);
                Ok(UNKNOWN_SPECIES.to_string())
            }
        }
    }
}

#[async_trait]
impl CharacterProvider for StarWarsProvider {
    fn name(&self) -> &str {
        "starwars"
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        options: FetchOptions,
    ) -> Result<Vec<Character>> {
        let mut characters = Vec::new();
        let mut next_url = Some(format!("{}/people/", self.base_url));

        while let Some(url) = next_url.take() {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let page: PeoplePage = get_json(&self.client, &url, cancel).await?;
            tracing::debug!("starwars: {} returned {} people", url, page.results.len());

            for person in &page.results {
                let species = self.species_name(person, cancel).await?;
                characters.push(Character {
                    name: person.name.clone(),
                    origin: ORIGIN.to_string(),
                    species,
                    additional_attribute: person.birth_year.clone(),
                });

                if options.limit_reached(characters.len()) {
                    return Ok(characters);
                }
            }

            next_url = page.next;
        }

        Ok(characters)
    }
}
