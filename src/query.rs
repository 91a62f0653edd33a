use crate::models::{Query, SortOrder, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::preferences::{PreferenceStore, PAGE_KEY, PAGE_SIZE_KEY};

/// Current pagination, sort and filter tuple for a session.
///
/// Hydrated once from the preference store; every setter writes `page` and
/// `page_size` back. Changing the page size or the type filter sends the
/// user back to page 1.
///
/// Page sizes are not checked against [`crate::models::PAGE_SIZE_OPTIONS`];
/// the presentation layer only offers legal values.
pub struct QueryState {
    query: Query,
    preferences: PreferenceStore,
}

impl QueryState {
    pub fn new(preferences: PreferenceStore) -> Self {
        let query = Query::new(
            preferences.read_or(PAGE_KEY, DEFAULT_PAGE),
            preferences.read_or(PAGE_SIZE_KEY, DEFAULT_PAGE_SIZE),
        );
        Self { query, preferences }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Owned copy for handing to a fetch
    pub fn snapshot(&self) -> Query {
        self.query.clone()
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
        self.persist();
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.query.page_size = page_size;
        self.query.page = 1;
        self.persist();
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.query.sort_order = order;
        self.persist();
    }

    /// Flip between ascending and descending
    pub fn toggle_sort_order(&mut self) -> SortOrder {
        let order = self.query.sort_order.toggled();
        self.set_sort_order(order);
        order
    }

    /// Empty string clears the filter
    pub fn set_type_filter(&mut self, type_filter: impl Into<String>) {
        self.query.type_filter = type_filter.into().trim().to_string();
        self.query.page = 1;
        self.persist();
    }

    fn persist(&self) {
        self.preferences.write(PAGE_KEY, self.query.page);
        self.preferences.write(PAGE_SIZE_KEY, self.query.page_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryPreferencesRepository, PreferencesRepository};
    use std::sync::Arc;

    fn fresh_store() -> (Arc<MemoryPreferencesRepository>, PreferenceStore) {
        let repo = Arc::new(MemoryPreferencesRepository::new());
        let store = PreferenceStore::new(repo.clone());
        (repo, store)
    }

    #[test]
    fn test_defaults_without_preferences() {
        let (_, store) = fresh_store();
        let state = QueryState::new(store);

        assert_eq!(state.query().page, 1);
        assert_eq!(state.query().page_size, 5);
        assert_eq!(state.query().sort_field, "number");
        assert_eq!(state.query().sort_order, SortOrder::Asc);
        assert!(state.query().type_filter.is_empty());
    }

    #[test]
    fn test_hydrates_from_preferences() {
        let repo = Arc::new(MemoryPreferencesRepository::with_values([
            (PAGE_KEY, "3"),
            (PAGE_SIZE_KEY, "20"),
        ]));
        let state = QueryState::new(PreferenceStore::new(repo));

        assert_eq!(state.query().page, 3);
        assert_eq!(state.query().page_size, 20);
    }

    #[test]
    fn test_invalid_preferences_fall_back() {
        let repo = Arc::new(MemoryPreferencesRepository::with_values([
            (PAGE_KEY, "-2"),
            (PAGE_SIZE_KEY, "lots"),
        ]));
        let state = QueryState::new(PreferenceStore::new(repo));

        assert_eq!(state.query().page, 1);
        assert_eq!(state.query().page_size, 5);
    }

    #[test]
    fn test_set_page_size_always_resets_page() {
        let (_, store) = fresh_store();
        let mut state = QueryState::new(store);

        for (page, size) in [(4, 10), (2, 20), (7, 5), (3, 5), (9, 10)] {
            state.set_page(page);
            assert_eq!(state.query().page, page);
            state.set_page_size(size);
            assert_eq!(state.query().page, 1);
            assert_eq!(state.query().page_size, size);
        }
    }

    #[test]
    fn test_set_type_filter_always_resets_page() {
        let (_, store) = fresh_store();
        let mut state = QueryState::new(store);

        for (page, filter) in [(3, "fire"), (5, ""), (2, "water"), (8, "water")] {
            state.set_page(page);
            state.set_type_filter(filter);
            assert_eq!(state.query().page, 1);
            assert_eq!(state.query().type_filter, filter);
        }
    }

    #[test]
    fn test_every_change_is_persisted() {
        let (repo, store) = fresh_store();
        let mut state = QueryState::new(store);

        state.set_page(4);
        assert_eq!(repo.load_value(PAGE_KEY).unwrap(), Some("4".to_string()));
        assert_eq!(repo.load_value(PAGE_SIZE_KEY).unwrap(), Some("5".to_string()));

        state.set_page_size(10);
        assert_eq!(repo.load_value(PAGE_KEY).unwrap(), Some("1".to_string()));
        assert_eq!(repo.load_value(PAGE_SIZE_KEY).unwrap(), Some("10".to_string()));

        state.set_page(2);
        state.set_type_filter("grass");
        assert_eq!(repo.load_value(PAGE_KEY).unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_sort_toggle_keeps_page() {
        let (_, store) = fresh_store();
        let mut state = QueryState::new(store);

        state.set_page(3);
        assert_eq!(state.toggle_sort_order(), SortOrder::Desc);
        assert_eq!(state.query().page, 3);
        assert_eq!(state.toggle_sort_order(), SortOrder::Asc);
    }

    #[test]
    fn test_round_trip_through_fresh_instance() {
        let (repo, store) = fresh_store();
        {
            let mut state = QueryState::new(store);
            state.set_page_size(20);
            state.set_page(3);
        }

        let rehydrated = QueryState::new(PreferenceStore::new(repo));
        assert_eq!(rehydrated.query().page, 3);
        assert_eq!(rehydrated.query().page_size, 20);
    }
}
