pub mod pokemon;
pub mod rickandmorty;
pub mod starwars;

use crate::domain::ports::CharacterProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use pokemon::PokemonProvider;
pub use rickandmorty::RickAndMortyProvider;
pub use starwars::StarWarsProvider;

/// The catalogs a provider entry in the configuration can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Pokemon,
    Starwars,
    Rickandmorty,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Pokemon => pokemon::POKEAPI_BASE_URL,
            ProviderKind::Starwars => starwars::SWAPI_BASE_URL,
            ProviderKind::Rickandmorty => rickandmorty::RICK_AND_MORTY_BASE_URL,
        }
    }

    pub fn build(
        &self,
        client: Client,
        base_url: Option<&str>,
        page_size: Option<usize>,
    ) -> Arc<dyn CharacterProvider> {
        let base_url = base_url.unwrap_or(self.default_base_url());
        match self {
            ProviderKind::Pokemon => Arc::new(
                PokemonProvider::with_base_url(client, base_url)
                    .with_page_size(page_size.unwrap_or(pokemon::DEFAULT_PAGE_SIZE)),
            ),
            ProviderKind::Starwars => Arc::new(StarWarsProvider::with_base_url(client, base_url)),
            ProviderKind::Rickandmorty => {
                Arc::new(RickAndMortyProvider::with_base_url(client, base_url))
            }
        }
    }
}
