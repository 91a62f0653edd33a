use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Sprite location used when no other base is configured
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://img.pokemondb.net/sprites/silver/normal/";

/// Page sizes offered by the pagination control
pub const PAGE_SIZE_OPTIONS: [u32; 3] = [5, 10, 20];

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_SORT_FIELD: &str = "number";

/// One catalog entry as served by the remote service.
///
/// `selected` is server-authoritative. `pending` is client-only state for an
/// in-flight selection change and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub number: u32,
    pub name: String,
    pub type_one: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub type_two: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub description: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub hit_points: u32,
    #[serde(default)]
    pub attack: u32,
    #[serde(default)]
    pub defense: u32,
    #[serde(default)]
    pub special_attack: u32,
    #[serde(default)]
    pub special_defense: u32,
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub generation: u32,
    #[serde(default)]
    pub legendary: bool,

    /// Derived sprite locator, filled in by the list fetcher
    #[serde(skip)]
    pub image_url: String,

    #[serde(skip)]
    pub pending: bool,
}

impl Pokemon {
    /// Minimal record, mostly useful for seeding mock data and tests
    pub fn new(number: u32, name: impl Into<String>, type_one: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            type_one: type_one.into(),
            type_two: String::new(),
            description: String::new(),
            selected: false,
            total: 0,
            hit_points: 0,
            attack: 0,
            defense: 0,
            special_attack: 0,
            special_defense: 0,
            speed: 0,
            generation: 1,
            legendary: false,
            image_url: String::new(),
            pending: false,
        }
    }

    pub fn with_type_two(mut self, type_two: impl Into<String>) -> Self {
        self.type_two = type_two.into();
        self
    }

    /// Secondary type, if the record has one
    pub fn secondary_type(&self) -> Option<&str> {
        let trimmed = self.type_two.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Case-insensitive match against either type
    pub fn has_type(&self, wanted: &str) -> bool {
        self.type_one.eq_ignore_ascii_case(wanted)
            || self
                .secondary_type()
                .is_some_and(|t| t.eq_ignore_ascii_case(wanted))
    }
}

/// The service sends `null` for a missing secondary type
fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sprite locator for a Pokémon name: lower-cased name appended to `base`
pub fn image_url_for(base: &str, name: &str) -> String {
    format!("{}{}.png", base, name.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pagination, sort and filter parameters driving one list fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: String,
    pub sort_order: SortOrder,
    /// Empty string means "all types"
    pub type_filter: String,
}

impl Query {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    /// Query-string pairs for the list endpoint. `type` is omitted when no
    /// filter is active.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
            ("sort_by", self.sort_field.clone()),
            ("order", self.sort_order.as_str().to_string()),
        ];
        if !self.type_filter.is_empty() {
            params.push(("type", self.type_filter.clone()));
        }
        params
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_order: SortOrder::Asc,
            type_filter: String::new(),
        }
    }
}

/// One page of the catalog as last published to the client
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResult {
    pub items: Vec<Pokemon>,
    pub total_pages: u32,
    pub total_items: u32,
}

impl PageResult {
    pub fn find(&self, number: u32) -> Option<&Pokemon> {
        self.items.iter().find(|p| p.number == number)
    }

    pub fn find_mut(&mut self, number: u32) -> Option<&mut Pokemon> {
        self.items.iter_mut().find(|p| p.number == number)
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Success body of `GET /api/pokemons`. Echoed query fields and navigation
/// links sent by the service are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonListResponse {
    pub pokemons: Vec<Pokemon>,
    pub total_pages: u32,
    pub total_items: u32,
}

impl PokemonListResponse {
    /// Convert to a page, deriving each record's sprite locator
    pub fn into_page(self, image_base_url: &str) -> PageResult {
        let items = self
            .pokemons
            .into_iter()
            .map(|mut pokemon| {
                pokemon.image_url = image_url_for(image_base_url, &pokemon.name);
                pokemon.pending = false;
                pokemon
            })
            .collect();

        PageResult {
            items,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

/// Success body of `GET /api/pokemons/types`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesResponse {
    pub types: Vec<String>,
}

/// The toggle endpoint returns the whole updated record; only `selected`
/// is read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub selected: bool,
}

/// Error body shared by all endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}
