//! Zipcode search over the resource catalog.
//!
//! [`SearchController`] is stateless: it partitions one catalog lookup into
//! per-category buckets. [`SearchSession`] is the per-visitor state that
//! remembers whether a search happened, so callers can tell "nothing entered
//! yet" apart from "entered, nothing found".

use std::sync::Arc;

use rc_catalog::{Category, Resource, ResourceCatalog};
use serde::Serialize;
use utoipa::ToSchema;

/// One catalog lookup split by category. Each bucket keeps catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SearchResults {
    pub housing: Vec<Resource>,
    pub food: Vec<Resource>,
    pub utility: Vec<Resource>,
}

impl SearchResults {
    /// The bucket holding `category`.
    #[must_use]
    pub fn bucket(&self, category: Category) -> &[Resource] {
        match category {
            Category::Housing => &self.housing,
            Category::FoodAssistance => &self.food,
            Category::UtilityAssistance => &self.utility,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<Resource> {
        match category {
            Category::Housing => &mut self.housing,
            Category::FoodAssistance => &mut self.food,
            Category::UtilityAssistance => &mut self.utility,
        }
    }

    /// Total records across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.housing.len() + self.food.len() + self.utility.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record, housing first, then food, then utility.
    ///
    /// This is the list plotted on the map.
    #[must_use]
    pub fn located(&self) -> Vec<Resource> {
        self.housing
            .iter()
            .chain(&self.food)
            .chain(&self.utility)
            .cloned()
            .collect()
    }
}

/// Partitions catalog lookups by category.
#[derive(Debug, Clone)]
pub struct SearchController {
    catalog: Arc<ResourceCatalog>,
}

impl SearchController {
    #[must_use]
    pub const fn new(catalog: Arc<ResourceCatalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// Look up `zipcode` and split the matches into buckets.
    ///
    /// Unknown zipcodes produce three empty buckets. The input is used as-is.
    #[must_use]
    pub fn search(&self, zipcode: &str) -> SearchResults {
        let mut results = SearchResults::default();
        for resource in self.catalog.lookup(zipcode) {
            results.bucket_mut(resource.category).push(resource.clone());
        }
        tracing::debug!(
            zipcode,
            housing = results.housing.len(),
            food = results.food.len(),
            utility = results.utility.len(),
            "catalog search"
        );
        results
    }

    /// Only the resources of one category, as the single-topic pages show them.
    #[must_use]
    pub fn search_category(&self, zipcode: &str, category: Category) -> Vec<Resource> {
        self.catalog
            .lookup(zipcode)
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect()
    }
}

/// What to show in place of result cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EmptyState {
    /// No zipcode has been submitted in this session.
    NotSearched,
    /// The last submitted zipcode matched nothing.
    NoResults { zipcode: String },
}

impl EmptyState {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NotSearched => "Enter a zipcode to find resources near you.".to_string(),
            Self::NoResults { zipcode } => format!("No resources found for \"{zipcode}\"."),
        }
    }
}

/// Per-visitor search state. Every submission replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    has_searched: bool,
    zipcode: Option<String>,
    results: SearchResults,
}

impl SearchSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a search and replace the previous zipcode and results in one step.
    pub fn submit(&mut self, controller: &SearchController, zipcode: &str) -> &SearchResults {
        *self = Self {
            has_searched: true,
            zipcode: Some(zipcode.to_string()),
            results: controller.search(zipcode),
        };
        &self.results
    }

    #[must_use]
    pub const fn has_searched(&self) -> bool {
        self.has_searched
    }

    #[must_use]
    pub fn zipcode(&self) -> Option<&str> {
        self.zipcode.as_deref()
    }

    #[must_use]
    pub const fn results(&self) -> &SearchResults {
        &self.results
    }

    /// `None` when there are results to show.
    #[must_use]
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.has_searched {
            return Some(EmptyState::NotSearched);
        }
        if self.results.is_empty() {
            return Some(EmptyState::NoResults {
                zipcode: self.zipcode.clone().unwrap_or_default(),
            });
        }
        None
    }

    /// Owned copy of the state for rendering.
    #[must_use]
    pub fn view(&self) -> SearchView {
        let empty_state = self.empty_state();
        SearchView {
            has_searched: self.has_searched,
            zipcode: self.zipcode.clone(),
            results: self.results.clone(),
            message: empty_state.as_ref().map(EmptyState::message),
            empty_state,
        }
    }
}

/// Search state as shown to the visitor.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub has_searched: bool,
    pub zipcode: Option<String>,
    pub results: SearchResults,
    pub empty_state: Option<EmptyState>,
    /// Text for the empty state, absent when there are results.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SearchController {
        SearchController::new(Arc::new(ResourceCatalog::placeholder()))
    }

    #[test]
    fn atlanta_scenario() {
        let results = controller().search("30303");
        assert_eq!(results.housing.len(), 2);
        assert_eq!(results.food.len() + results.utility.len(), 2);
    }

    #[test]
    fn unknown_zipcode_yields_three_empty_buckets() {
        let results = controller().search("99999");
        assert!(results.housing.is_empty());
        assert!(results.food.is_empty());
        assert!(results.utility.is_empty());
    }

    #[test]
    fn located_orders_housing_first() {
        let results = controller().search("10001");
        let categories: Vec<Category> = results.located().iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Housing,
                Category::FoodAssistance,
                Category::UtilityAssistance
            ]
        );
    }

    #[test]
    fn search_category_filters_one_bucket() {
        let food = controller().search_category("30303", Category::FoodAssistance);
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].name, "Fulton County SNAP Office");
        assert!(controller()
            .search_category("99999", Category::Housing)
            .is_empty());
    }

    #[test]
    fn session_distinguishes_not_searched_from_no_results() {
        let controller = controller();
        let mut session = SearchSession::new();
        assert_eq!(session.empty_state(), Some(EmptyState::NotSearched));
        assert!(!session.has_searched());

        session.submit(&controller, "99999");
        assert!(session.has_searched());
        assert_eq!(
            session.empty_state(),
            Some(EmptyState::NoResults {
                zipcode: "99999".to_string()
            })
        );
        assert_eq!(
            session.empty_state().map(|s| s.message()),
            Some("No resources found for \"99999\".".to_string())
        );
    }

    #[test]
    fn new_search_replaces_previous_results() {
        let controller = controller();
        let mut session = SearchSession::new();

        session.submit(&controller, "30303");
        assert_eq!(session.results().len(), 4);
        assert!(session.empty_state().is_none());

        session.submit(&controller, "10001");
        assert_eq!(session.zipcode(), Some("10001"));
        assert_eq!(session.results(), &controller.search("10001"));
        assert!(session
            .results()
            .located()
            .iter()
            .all(|r| r.address.contains("NY")));

        session.submit(&controller, "99999");
        assert!(session.results().is_empty());
    }

    #[test]
    fn view_carries_empty_state_message() {
        let controller = controller();
        let mut session = SearchSession::new();

        let view = session.view();
        assert!(!view.has_searched);
        assert_eq!(
            view.message.as_deref(),
            Some("Enter a zipcode to find resources near you.")
        );

        session.submit(&controller, "30303");
        let view = session.view();
        assert!(view.empty_state.is_none());
        assert!(view.message.is_none());
        assert_eq!(view.zipcode.as_deref(), Some("30303"));

        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["hasSearched"], true);
        assert_eq!(json["results"]["housing"].as_array().map(Vec::len), Some(2));
    }
}
