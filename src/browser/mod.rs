//! Session state tying the store to the current filter and page.

use tracing::debug;

use crate::filter::{self, Category, FilterPredicates};
use crate::pagination::{self, PageControl, PageError, PageWindow, PAGE_SIZE};
use crate::profile::Profile;
use crate::store::ProfileStore;

#[derive(Clone, Copy, Debug)]
pub struct PageEntry<'a> {
    /// Load-order position in the store.
    pub position: usize,
    pub profile: &'a Profile,
}

#[derive(Clone, Debug)]
pub struct BrowserPage<'a> {
    pub window: PageWindow,
    pub entries: Vec<PageEntry<'a>>,
    pub controls: Vec<PageControl>,
}

#[derive(Debug)]
pub struct Browser {
    store: ProfileStore,
    predicates: FilterPredicates,
    current_page: usize,
    view: Vec<usize>,
}

impl Browser {
    pub fn new(store: ProfileStore) -> Self {
        let mut browser = Self {
            store,
            predicates: FilterPredicates::default(),
            current_page: 1,
            view: Vec::new(),
        };
        browser.refilter();
        browser
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn predicates(&self) -> &FilterPredicates {
        &self.predicates
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Load positions of the filtered view, in load order.
    pub fn view(&self) -> &[usize] {
        &self.view
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.view.len(), PAGE_SIZE)
    }

    fn refilter(&mut self) {
        self.view = filter::filter_profiles(self.store.profiles(), &self.predicates);
    }

    /// Replaces the predicate set and returns to page 1.
    pub fn apply_predicates(&mut self, predicates: FilterPredicates) {
        self.predicates = predicates;
        self.refilter();
        self.current_page = 1;
        debug!(matches = self.view.len(), "filters applied");
    }

    pub fn set_search(&mut self, text: &str) {
        let mut next = self.predicates.clone();
        next.search = text.to_string();
        self.apply_predicates(next);
    }

    pub fn set_category(&mut self, category: Category, value: Option<String>) {
        let mut next = self.predicates.clone();
        next.set_category(category, value);
        self.apply_predicates(next);
    }

    pub fn toggle_favorites_only(&mut self) -> bool {
        let mut next = self.predicates.clone();
        next.favorites_only = !next.favorites_only;
        let enabled = next.favorites_only;
        self.apply_predicates(next);
        enabled
    }

    pub fn reset_filters(&mut self) {
        self.apply_predicates(FilterPredicates::default());
    }

    /// Moves to `page`; out-of-range requests leave the current page as is.
    pub fn go_to_page(&mut self, page: usize) -> Result<(), PageError> {
        match pagination::paginate(&self.view, page, PAGE_SIZE) {
            Ok(target) => {
                self.current_page = target.window.page;
                Ok(())
            }
            Err(e) => {
                debug!(page, current = self.current_page, "page request rejected");
                Err(e)
            }
        }
    }

    pub fn next_page(&mut self) -> Result<(), PageError> {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Result<(), PageError> {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Flips one favorite, persists it, and re-filters with the same
    /// predicates. The page is kept unless the view shrank below it.
    pub fn toggle_favorite(&mut self, position: usize) -> Option<bool> {
        let value = self.store.toggle_favorite(position)?;
        self.refilter();
        self.current_page = pagination::clamp_page(self.current_page, self.total_pages());
        Some(value)
    }

    pub fn profile(&self, position: usize) -> Option<&Profile> {
        self.store.get(position)
    }

    pub fn options(&self, category: Category) -> Vec<String> {
        filter::category_options(self.store.profiles(), category)
    }

    pub fn page(&self) -> BrowserPage<'_> {
        let window = PageWindow::clamped(self.view.len(), self.current_page, PAGE_SIZE);
        let entries = self.view[window.bounds()]
            .iter()
            .filter_map(|&position| {
                self.store
                    .get(position)
                    .map(|profile| PageEntry { position, profile })
            })
            .collect();
        BrowserPage {
            window,
            entries,
            controls: pagination::page_controls(window.page, window.total_pages),
        }
    }
}
