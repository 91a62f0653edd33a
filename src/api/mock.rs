use super::PokedexApi;
use crate::error::{PokedexError, PokedexResult};
use crate::models::{Pokemon, PokemonListResponse, Query, SortOrder};
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration};

/// In-process emulation of the remote catalog service
///
/// Filters, sorts, paginates and toggles exactly like the real service,
/// without any network. It's useful for:
/// - Offline runs of the client
/// - Unit and integration tests
/// - Reproducing races deterministically (see [`MockPokedexApi::hold_next_list`])
pub struct MockPokedexApi {
    /// Server-side dataset
    pokemons: Mutex<Vec<Pokemon>>,

    /// Simulated network delay applied to every call, in milliseconds
    delay_ms: u64,

    script: Mutex<Script>,
    requests: Mutex<Requests>,
}

/// How a scripted call should fail
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Non-success HTTP status, optionally with an `{"error": ...}` payload
    Status { status: u16, error: Option<String> },

    /// Transport failure; no response at all
    Network(String),
}

impl MockFailure {
    pub fn status(status: u16, error: impl Into<String>) -> Self {
        MockFailure::Status {
            status,
            error: Some(error.into()),
        }
    }

    pub fn bare_status(status: u16) -> Self {
        MockFailure::Status {
            status,
            error: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        MockFailure::Network(message.into())
    }

    fn into_error(self) -> PokedexError {
        match self {
            MockFailure::Status { status, error } => PokedexError::Remote {
                status,
                message: error,
            },
            MockFailure::Network(message) => PokedexError::NetworkError(message),
        }
    }
}

/// Handle that lets a held call answer. Dropping it also lets the call go.
pub struct MockGate {
    sender: Option<oneshot::Sender<()>>,
}

impl MockGate {
    pub fn release(mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(());
        }
    }
}

/// Scripted behaviour for one upcoming call
#[derive(Default)]
pub struct MockStep {
    gate: Option<oneshot::Receiver<()>>,
    delay_ms: u64,
    failure: Option<MockFailure>,
    selected_override: Option<bool>,
}

impl MockStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step that waits until the returned gate is released
    pub fn held() -> (Self, MockGate) {
        let (sender, receiver) = oneshot::channel();
        let step = Self {
            gate: Some(receiver),
            ..Self::default()
        };
        (step, MockGate { sender: Some(sender) })
    }

    pub fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Toggle only: answer with this selection value instead of the flip
    pub fn answering(mut self, selected: bool) -> Self {
        self.selected_override = Some(selected);
        self
    }
}

#[derive(Default)]
struct Script {
    list: VecDeque<MockStep>,
    types: VecDeque<MockStep>,
    toggle: VecDeque<MockStep>,
}

#[derive(Default)]
struct Requests {
    list: Vec<Query>,
    types: usize,
    toggle: Vec<u32>,
}

impl MockPokedexApi {
    /// Create a mock service over `pokemons` with instant responses
    pub fn new(pokemons: Vec<Pokemon>) -> Self {
        Self::with_delay(pokemons, 0)
    }

    /// Create a mock service with a simulated delay on every call
    pub fn with_delay(pokemons: Vec<Pokemon>, delay_ms: u64) -> Self {
        Self {
            pokemons: Mutex::new(pokemons),
            delay_ms,
            script: Mutex::new(Script::default()),
            requests: Mutex::new(Requests::default()),
        }
    }

    /// Mock service seeded with the first eighteen Pokédex entries
    pub fn with_seed_data() -> Self {
        Self::new(seed_pokemons())
    }

    // ------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------

    pub fn push_list_step(&self, step: MockStep) {
        if let Ok(mut script) = self.script.lock() {
            script.list.push_back(step);
        }
    }

    pub fn push_types_step(&self, step: MockStep) {
        if let Ok(mut script) = self.script.lock() {
            script.types.push_back(step);
        }
    }

    pub fn push_toggle_step(&self, step: MockStep) {
        if let Ok(mut script) = self.script.lock() {
            script.toggle.push_back(step);
        }
    }

    /// The next list call waits for the returned gate
    pub fn hold_next_list(&self) -> MockGate {
        let (step, gate) = MockStep::held();
        self.push_list_step(step);
        gate
    }

    pub fn fail_next_list(&self, failure: MockFailure) {
        self.push_list_step(MockStep::new().failing(failure));
    }

    pub fn fail_next_types(&self, failure: MockFailure) {
        self.push_types_step(MockStep::new().failing(failure));
    }

    /// The next toggle call waits for the returned gate
    pub fn hold_next_toggle(&self) -> MockGate {
        let (step, gate) = MockStep::held();
        self.push_toggle_step(step);
        gate
    }

    pub fn fail_next_toggle(&self, failure: MockFailure) {
        self.push_toggle_step(MockStep::new().failing(failure));
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Queries received by the list endpoint, in arrival order
    pub fn list_requests(&self) -> Vec<Query> {
        self.requests
            .lock()
            .map(|r| r.list.clone())
            .unwrap_or_default()
    }

    pub fn types_request_count(&self) -> usize {
        self.requests.lock().map(|r| r.types).unwrap_or_default()
    }

    /// Identifiers received by the toggle endpoint, in arrival order
    pub fn toggle_requests(&self) -> Vec<u32> {
        self.requests
            .lock()
            .map(|r| r.toggle.clone())
            .unwrap_or_default()
    }

    /// Server-side selection flag for `number`
    pub fn server_selected(&self, number: u32) -> Option<bool> {
        self.pokemons
            .lock()
            .ok()?
            .iter()
            .find(|p| p.number == number)
            .map(|p| p.selected)
    }

    /// Replace the server-side dataset
    pub fn set_pokemons(&self, pokemons: Vec<Pokemon>) -> PokedexResult<()> {
        *self.pokemons.lock()? = pokemons;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Emulation
    // ------------------------------------------------------------------

    /// Wait out the scripted gate and delays for one call
    async fn run_step(&self, step: Option<MockStep>) -> MockStep {
        let mut step = step.unwrap_or_default();

        if let Some(gate) = step.gate.take() {
            // A dropped gate counts as a release
            let _ = gate.await;
        }

        let delay_ms = self.delay_ms + step.delay_ms;
        if delay_ms > 0 {
            sleep(Duration::from_millis(delay_ms)).await;
        }

        step
    }

    fn build_page(&self, query: &Query) -> PokedexResult<PokemonListResponse> {
        if query.page < 1 || query.page_size < 1 {
            return Err(bad_request("Page and page_size must be positive integers."));
        }

        if query.sort_field != "number" {
            return Err(bad_request("Can only sort by 'number'."));
        }

        let wanted: Vec<String> = query
            .type_filter
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let pokemons = self.pokemons.lock()?;

        if !wanted.is_empty() {
            let available = available_types(&pokemons);
            let invalid: Vec<&str> = wanted
                .iter()
                .filter(|t| !available.contains(t.as_str()))
                .map(String::as_str)
                .collect();
            if !invalid.is_empty() {
                return Err(bad_request(&format!("Invalid type(s): {}.", invalid.join(", "))));
            }
        }

        let mut filtered: Vec<Pokemon> = pokemons
            .iter()
            .filter(|p| wanted.is_empty() || wanted.iter().any(|t| p.has_type(t)))
            .cloned()
            .collect();
        drop(pokemons);

        filtered.sort_by_key(|p| p.number);
        if query.sort_order == SortOrder::Desc {
            filtered.reverse();
        }

        let total_items = filtered.len() as u32;
        let total_pages = total_items.div_ceil(query.page_size);
        let start = (query.page as usize - 1).saturating_mul(query.page_size as usize);
        let page: Vec<Pokemon> = filtered
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .collect();

        if page.is_empty() && query.page != 1 {
            return Err(PokedexError::Remote {
                status: 404,
                message: Some("Page number out of range.".to_string()),
            });
        }

        Ok(PokemonListResponse {
            pokemons: page,
            total_pages,
            total_items,
        })
    }
}

impl Default for MockPokedexApi {
    fn default() -> Self {
        Self::with_seed_data()
    }
}

fn bad_request(message: &str) -> PokedexError {
    PokedexError::Remote {
        status: 400,
        message: Some(message.to_string()),
    }
}

fn available_types(pokemons: &[Pokemon]) -> BTreeSet<String> {
    pokemons
        .iter()
        .flat_map(|p| std::iter::once(p.type_one.as_str()).chain(p.secondary_type()))
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[async_trait]
impl PokedexApi for MockPokedexApi {
    async fn list_pokemons(&self, query: &Query) -> PokedexResult<PokemonListResponse> {
        self.requests.lock()?.list.push(query.clone());
        let step = self.script.lock()?.list.pop_front();

        let step = self.run_step(step).await;
        if let Some(failure) = step.failure {
            return Err(failure.into_error());
        }

        self.build_page(query)
    }

    async fn list_types(&self) -> PokedexResult<Vec<String>> {
        self.requests.lock()?.types += 1;
        let step = self.script.lock()?.types.pop_front();

        let step = self.run_step(step).await;
        if let Some(failure) = step.failure {
            return Err(failure.into_error());
        }

        let pokemons = self.pokemons.lock()?;
        Ok(available_types(&pokemons).into_iter().collect())
    }

    async fn toggle_selection(&self, number: u32) -> PokedexResult<bool> {
        self.requests.lock()?.toggle.push(number);
        let step = self.script.lock()?.toggle.pop_front();

        let step = self.run_step(step).await;
        if let Some(failure) = step.failure {
            return Err(failure.into_error());
        }

        let mut pokemons = self.pokemons.lock()?;
        let pokemon = pokemons
            .iter_mut()
            .find(|p| p.number == number)
            .ok_or(PokedexError::Remote {
                status: 404,
                message: None,
            })?;

        pokemon.selected = step.selected_override.unwrap_or(!pokemon.selected);
        Ok(pokemon.selected)
    }
}

/// First eighteen Pokédex entries with their base stats
pub fn seed_pokemons() -> Vec<Pokemon> {
    // number, name, type one, type two, [hp, atk, def, sp.atk, sp.def, speed]
    const SEED: [(u32, &str, &str, &str, [u32; 6]); 18] = [
        (1, "Bulbasaur", "Grass", "Poison", [45, 49, 49, 65, 65, 45]),
        (2, "Ivysaur", "Grass", "Poison", [60, 62, 63, 80, 80, 60]),
        (3, "Venusaur", "Grass", "Poison", [80, 82, 83, 100, 100, 80]),
        (4, "Charmander", "Fire", "", [39, 52, 43, 60, 50, 65]),
        (5, "Charmeleon", "Fire", "", [58, 64, 58, 80, 65, 80]),
        (6, "Charizard", "Fire", "Flying", [78, 84, 78, 109, 85, 100]),
        (7, "Squirtle", "Water", "", [44, 48, 65, 50, 64, 43]),
        (8, "Wartortle", "Water", "", [59, 63, 80, 65, 80, 58]),
        (9, "Blastoise", "Water", "", [79, 83, 100, 85, 105, 78]),
        (10, "Caterpie", "Bug", "", [45, 30, 35, 20, 20, 45]),
        (11, "Metapod", "Bug", "", [50, 20, 55, 25, 25, 30]),
        (12, "Butterfree", "Bug", "Flying", [60, 45, 50, 90, 80, 70]),
        (13, "Weedle", "Bug", "Poison", [40, 35, 30, 20, 20, 50]),
        (14, "Kakuna", "Bug", "Poison", [45, 25, 50, 25, 25, 35]),
        (15, "Beedrill", "Bug", "Poison", [65, 90, 40, 45, 80, 75]),
        (16, "Pidgey", "Normal", "Flying", [40, 45, 40, 35, 35, 56]),
        (17, "Pidgeotto", "Normal", "Flying", [63, 60, 55, 50, 50, 71]),
        (18, "Pidgeot", "Normal", "Flying", [83, 80, 75, 70, 70, 101]),
    ];

    SEED.iter()
        .map(|&(number, name, type_one, type_two, stats)| {
            let mut pokemon = Pokemon::new(number, name, type_one).with_type_two(type_two);
            let [hp, atk, def, spa, spd, spe] = stats;
            pokemon.hit_points = hp;
            pokemon.attack = atk;
            pokemon.defense = def;
            pokemon.special_attack = spa;
            pokemon.special_defense = spd;
            pokemon.speed = spe;
            pokemon.total = stats.iter().sum();
            pokemon
        })
        .collect()
}
