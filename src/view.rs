//! Presentation model derived from the session state.
//!
//! Nothing here talks to the service or mutates state; renderers (the
//! command surface in this crate) read these values.

use crate::models::{PageResult, Pokemon, Query, PAGE_SIZE_OPTIONS};
use crate::store::CatalogSnapshot;

pub const EMPTY_LIST_MESSAGE: &str = "No Pokémons found.";
pub const LOADING_MESSAGE: &str = "Loading...";
pub const MISSING_TYPE_PLACEHOLDER: &str = "-";
pub const ALL_TYPES_LABEL: &str = "All";

/// State of the previous/next controls and the labels around them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub page_size_options: Vec<u32>,
}

impl PaginationView {
    pub fn new(query: &Query, page: &PageResult) -> Self {
        Self {
            page: query.page,
            page_size: query.page_size,
            total_pages: page.total_pages,
            total_items: page.total_items,
            prev_enabled: query.page > 1,
            next_enabled: query.page < page.total_pages,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
        }
    }

    /// Both controls off while a fetch is outstanding; `total_pages` still
    /// describes the previous query until it lands.
    pub fn while_loading(mut self) -> Self {
        self.prev_enabled = false;
        self.next_enabled = false;
        self
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }

    pub fn total_label(&self) -> String {
        format!("Total Pokémons: {}", self.total_items)
    }

    /// Target of the "next" control, if enabled
    pub fn next_page(&self) -> Option<u32> {
        self.next_enabled.then_some(self.page + 1)
    }

    /// Target of the "previous" control, if enabled
    pub fn previous_page(&self) -> Option<u32> {
        self.prev_enabled.then_some(self.page - 1)
    }
}

/// One table row, display-ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonRow {
    pub number: u32,
    pub name: String,
    pub type_one: String,
    pub type_two: String,
    pub total: u32,
    pub hit_points: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
    pub generation: u32,
    pub legendary: bool,
    pub selected: bool,
    pub pending: bool,
    pub image_url: String,
}

impl From<&Pokemon> for PokemonRow {
    fn from(pokemon: &Pokemon) -> Self {
        Self {
            number: pokemon.number,
            name: pokemon.name.clone(),
            type_one: pokemon.type_one.clone(),
            type_two: secondary_type_label(pokemon).to_string(),
            total: pokemon.total,
            hit_points: pokemon.hit_points,
            attack: pokemon.attack,
            defense: pokemon.defense,
            special_attack: pokemon.special_attack,
            special_defense: pokemon.special_defense,
            speed: pokemon.speed,
            generation: pokemon.generation,
            legendary: pokemon.legendary,
            selected: pokemon.selected,
            pending: pokemon.pending,
            image_url: pokemon.image_url.clone(),
        }
    }
}

/// What the list area shows. Precedence: loading, error, empty, rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Error(String),
    Empty,
    Rows(Vec<PokemonRow>),
}

impl ListStatus {
    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Self {
        if snapshot.loading {
            ListStatus::Loading
        } else if let Some(error) = &snapshot.error {
            ListStatus::Error(error.clone())
        } else if snapshot.page.items.is_empty() {
            ListStatus::Empty
        } else {
            ListStatus::Rows(snapshot.page.items.iter().map(PokemonRow::from).collect())
        }
    }

    /// Text shown in place of the table, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            ListStatus::Loading => Some(LOADING_MESSAGE),
            ListStatus::Error(error) => Some(error),
            ListStatus::Empty => Some(EMPTY_LIST_MESSAGE),
            ListStatus::Rows(_) => None,
        }
    }
}

pub fn secondary_type_label(pokemon: &Pokemon) -> &str {
    pokemon.secondary_type().unwrap_or(MISSING_TYPE_PLACEHOLDER)
}

/// Entry in the type filter picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOption {
    /// Value passed to the filter; empty for "All"
    pub value: String,
    pub label: String,
}

/// Filter options with a leading "All" entry
pub fn type_options(types: &[String]) -> Vec<TypeOption> {
    std::iter::once(TypeOption {
        value: String::new(),
        label: ALL_TYPES_LABEL.to_string(),
    })
    .chain(types.iter().map(|t| TypeOption {
        value: t.clone(),
        label: capitalize(t),
    }))
    .collect()
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total_pages: u32, items: Vec<Pokemon>) -> PageResult {
        PageResult {
            total_items: items.len() as u32,
            items,
            total_pages,
        }
    }

    #[test]
    fn test_first_and_last_page_controls() {
        let result = page(4, vec![]);

        let first = PaginationView::new(&Query::new(1, 5), &result);
        assert!(!first.prev_enabled);
        assert!(first.next_enabled);
        assert_eq!(first.next_page(), Some(2));
        assert_eq!(first.previous_page(), None);

        let last = PaginationView::new(&Query::new(4, 5), &result);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);
        assert_eq!(last.page_label(), "Page 4 of 4");
    }

    #[test]
    fn test_loading_disables_both_controls() {
        let view = PaginationView::new(&Query::new(2, 5), &page(4, vec![])).while_loading();
        assert_eq!(view.next_page(), None);
        assert_eq!(view.previous_page(), None);
        assert_eq!(view.page_label(), "Page 2 of 4");
    }

    #[test]
    fn test_no_pages_disables_next() {
        let view = PaginationView::new(&Query::default(), &PageResult::default());
        assert!(!view.next_enabled);
        assert!(!view.prev_enabled);
        assert_eq!(view.total_label(), "Total Pokémons: 0");
        assert_eq!(view.page_size_options, vec![5, 10, 20]);
    }

    #[test]
    fn test_status_precedence() {
        let mut snapshot = CatalogSnapshot {
            page: page(1, vec![Pokemon::new(1, "Bulbasaur", "Grass")]),
            loading: true,
            error: Some("rate limited".to_string()),
            version: 3,
        };
        assert_eq!(ListStatus::from_snapshot(&snapshot), ListStatus::Loading);

        snapshot.loading = false;
        assert_eq!(
            ListStatus::from_snapshot(&snapshot).message(),
            Some("rate limited")
        );

        snapshot.error = None;
        assert!(matches!(ListStatus::from_snapshot(&snapshot), ListStatus::Rows(rows) if rows.len() == 1));

        snapshot.page = PageResult::default();
        assert_eq!(
            ListStatus::from_snapshot(&snapshot).message(),
            Some(EMPTY_LIST_MESSAGE)
        );
    }

    #[test]
    fn test_row_placeholder_for_missing_type() {
        let single = PokemonRow::from(&Pokemon::new(4, "Charmander", "Fire"));
        assert_eq!(single.type_two, "-");

        let dual = PokemonRow::from(&Pokemon::new(6, "Charizard", "Fire").with_type_two("Flying"));
        assert_eq!(dual.type_two, "Flying");
    }

    #[test]
    fn test_type_options() {
        let options = type_options(&["fire".to_string(), "water".to_string()]);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["All", "Fire", "Water"]);
        assert_eq!(options[0].value, "");
        assert_eq!(options[1].value, "fire");
    }
}
