//! Listing browse page: filter/sort selection, query assembly and the
//! last-request-wins fetch cycle.

use crate::error::ApiError;
use crate::models::{ListingSummary, Page};
use crate::request::{Generation, LoadState, RequestCounter};
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListingOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
    PriceLowToHigh,
    PriceHighToLow,
}

impl ListingOrdering {
    pub const ALL: [ListingOrdering; 4] = [
        Self::NewestFirst,
        Self::OldestFirst,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
    ];

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::NewestFirst => "-created_at",
            Self::OldestFirst => "created_at",
            Self::PriceLowToHigh => "price",
            Self::PriceHighToLow => "-price",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NewestFirst => "Newest First",
            Self::OldestFirst => "Oldest First",
            Self::PriceLowToHigh => "Price: Low to High",
            Self::PriceHighToLow => "Price: High to Low",
        }
    }

    pub fn from_param(param: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_param() == param)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub search: String,
    pub category: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: Option<u32>,
}

impl ListingFilters {
    /// Coerces form input; anything non-numeric clears the bound.
    pub fn set_min_price(&mut self, raw: &str) {
        self.min_price = coerce_number(raw);
    }

    pub fn set_max_price(&mut self, raw: &str) {
        self.max_price = coerce_number(raw);
    }

    /// `""` (the "All Categories" option) clears the category.
    pub fn set_category(&mut self, raw: &str) {
        self.category = raw.trim().parse::<i64>().ok();
    }

    /// Whether the sidebar should offer "Clear Filters". Search is not a
    /// sidebar field, so it does not count.
    pub fn has_active_filters(&self) -> bool {
        self.category.is_some() || self.min_price.is_some() || self.max_price.is_some()
    }
}

fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub filters: ListingFilters,
    pub ordering: ListingOrdering,
}

impl ListingQuery {
    /// Query parameters for `GET /api/listings/`. Empty fields are left out;
    /// `ordering` is always sent.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let filters = &self.filters;

        let search = filters.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if let Some(category) = filters.category {
            params.push(("category", category.to_string()));
        }
        if let Some(min) = filters.min_price {
            params.push(("min_price", min.to_string()));
        }
        if let Some(max) = filters.max_price {
            params.push(("max_price", max.to_string()));
        }
        if let Some(page) = filters.page.filter(|p| *p > 1) {
            params.push(("page", page.to_string()));
        }
        params.push(("ordering", self.ordering.as_param().to_string()));

        params
    }

    /// URL-encoded form of [`to_params`](Self::to_params), for the address bar.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_params())
            .finish()
    }

    /// Restores the selection mirrored in the address bar. Unknown keys and
    /// unparsable values are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let mut parsed = Self::default();
        let query = query.trim_start_matches('?');

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" => parsed.filters.search = value.into_owned(),
                "category" => parsed.filters.set_category(&value),
                "min_price" => parsed.filters.set_min_price(&value),
                "max_price" => parsed.filters.set_max_price(&value),
                "page" => parsed.filters.page = value.parse::<u32>().ok().filter(|p| *p > 0),
                "ordering" => {
                    parsed.ordering = ListingOrdering::from_param(&value).unwrap_or_default()
                }
                _ => {}
            }
        }

        parsed
    }
}

/// A fetch to issue, tagged with the selection that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    generation: Generation,
    query: ListingQuery,
}

impl FetchTicket {
    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// What the page should render right now.
#[derive(Debug, PartialEq)]
pub enum BrowseDisplay<'a> {
    Loading,
    Results(&'a Page<ListingSummary>),
    Empty,
    Error(&'a ApiError),
}

#[derive(Debug, Default)]
pub struct BrowseView {
    query: ListingQuery,
    requests: RequestCounter,
    listings: LoadState<Page<ListingSummary>>,
}

impl BrowseView {
    pub fn new(query: ListingQuery) -> Self {
        Self {
            query,
            requests: RequestCounter::new(),
            listings: LoadState::Idle,
        }
    }

    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    pub fn filters(&self) -> &ListingFilters {
        &self.query.filters
    }

    pub fn ordering(&self) -> ListingOrdering {
        self.query.ordering
    }

    pub fn state(&self) -> &LoadState<Page<ListingSummary>> {
        &self.listings
    }

    /// Initial load, or a user-triggered retry for the current selection.
    pub fn refresh(&mut self) -> FetchTicket {
        self.listings = LoadState::Loading;
        FetchTicket {
            generation: self.requests.next(),
            query: self.query.clone(),
        }
    }

    /// Adopts a selection restored from the address bar, page included.
    pub fn set_query(&mut self, query: ListingQuery) -> FetchTicket {
        self.query = query;
        self.refresh()
    }

    /// New filters start again from the first page.
    pub fn apply_filters(&mut self, mut filters: ListingFilters) -> FetchTicket {
        filters.page = None;
        self.query.filters = filters;
        self.refresh()
    }

    pub fn clear_filters(&mut self) -> FetchTicket {
        self.apply_filters(ListingFilters::default())
    }

    pub fn set_ordering(&mut self, ordering: ListingOrdering) -> FetchTicket {
        self.query.ordering = ordering;
        self.query.filters.page = None;
        self.refresh()
    }

    pub fn set_page(&mut self, page: u32) -> FetchTicket {
        self.query.filters.page = Some(page.max(1));
        self.refresh()
    }

    pub fn current_page(&self) -> u32 {
        self.query.filters.page.unwrap_or(1)
    }

    /// Lands a response. Returns `false` when it belongs to a superseded
    /// selection and was discarded.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<ListingSummary>, ApiError>,
    ) -> bool {
        if !self.requests.is_current(ticket.generation) || ticket.query != self.query {
            tracing::debug!("Discarding stale listings response");
            return false;
        }

        if let Err(e) = &result {
            tracing::warn!("Failed to load listings: {}", e);
        }
        self.listings = LoadState::from_result(result);
        true
    }

    pub fn display(&self) -> BrowseDisplay<'_> {
        match &self.listings {
            LoadState::Idle | LoadState::Loading => BrowseDisplay::Loading,
            LoadState::Failed(err) => BrowseDisplay::Error(err),
            LoadState::Loaded(page) if page.items.is_empty() => BrowseDisplay::Empty,
            LoadState::Loaded(page) => BrowseDisplay::Results(page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::ListingStatus;

    fn summary(id: i64, title: &str) -> ListingSummary {
        ListingSummary {
            id,
            title: title.to_string(),
            description: String::new(),
            price: 10.0,
            author: 1,
            author_username: "anna".into(),
            category: None,
            category_name: None,
            status: ListingStatus::Active,
            created_at: Utc::now(),
            first_image: None,
        }
    }

    #[test]
    fn default_query_only_carries_ordering() {
        let query = ListingQuery::default();
        assert_eq!(
            query.to_params(),
            vec![("ordering", "-created_at".to_string())]
        );
    }

    #[test]
    fn empty_fields_never_reach_the_query() {
        let searches = ["", "   ", "bike"];
        let categories = ["", "3", "x"];
        let prices = ["", "abc", "0", "12.5"];

        for search in searches {
            for category in categories {
                for min in prices {
                    for max in prices {
                        for ordering in ListingOrdering::ALL {
                            let mut filters = ListingFilters {
                                search: search.to_string(),
                                ..Default::default()
                            };
                            filters.set_category(category);
                            filters.set_min_price(min);
                            filters.set_max_price(max);
                            let query = ListingQuery { filters, ordering };

                            let params = query.to_params();
                            assert!(params.iter().all(|(_, v)| !v.trim().is_empty()));
                            assert_eq!(
                                params.iter().filter(|(k, _)| *k == "ordering").count(),
                                1
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn query_string_mirrors_selection() {
        let mut filters = ListingFilters {
            search: "red bike".into(),
            ..Default::default()
        };
        filters.set_category("4");
        filters.set_min_price("10");
        filters.set_max_price("99.5");
        let query = ListingQuery {
            filters,
            ordering: ListingOrdering::PriceHighToLow,
        };

        let encoded = query.to_query_string();
        assert_eq!(
            encoded,
            "search=red+bike&category=4&min_price=10&max_price=99.5&ordering=-price"
        );
        assert_eq!(ListingQuery::from_query_string(&format!("?{}", encoded)), query);
    }

    #[test]
    fn unknown_ordering_falls_back_to_newest() {
        let query = ListingQuery::from_query_string("ordering=title&page=0");
        assert_eq!(query.ordering, ListingOrdering::NewestFirst);
        assert_eq!(query.filters.page, None);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut view = BrowseView::default();
        let first = view.apply_filters(ListingFilters {
            search: "bike".into(),
            ..Default::default()
        });
        let second = view.apply_filters(ListingFilters {
            search: "car".into(),
            ..Default::default()
        });

        // Latest lands first, the older one arrives late.
        assert!(view.complete(second, Ok(Page::from_items(vec![summary(2, "Car")]))));
        assert!(!view.complete(first, Ok(Page::from_items(vec![summary(1, "Bike")]))));

        match view.display() {
            BrowseDisplay::Results(page) => assert_eq!(page.items[0].title, "Car"),
            other => panic!("unexpected display {:?}", other),
        }
    }

    #[test]
    fn late_response_for_same_tuple_but_older_request_is_discarded() {
        let mut view = BrowseView::default();
        let first = view.refresh();
        let retry = view.refresh();
        assert!(!view.complete(first, Err(ApiError::Network("timeout".into()))));
        assert!(view.display() == BrowseDisplay::Loading);
        assert!(view.complete(retry, Ok(Page::default())));
        assert_eq!(view.display(), BrowseDisplay::Empty);
    }

    #[test]
    fn ordering_change_resets_page() {
        let mut view = BrowseView::default();
        view.set_page(3);
        assert_eq!(view.current_page(), 3);
        let ticket = view.set_ordering(ListingOrdering::PriceLowToHigh);
        assert_eq!(view.current_page(), 1);
        assert!(ticket
            .query()
            .to_params()
            .contains(&("ordering", "price".to_string())));
    }

    #[test]
    fn failure_is_rendered_as_error() {
        let mut view = BrowseView::default();
        let ticket = view.refresh();
        view.complete(ticket, Err(ApiError::Network("down".into())));
        assert!(matches!(view.display(), BrowseDisplay::Error(e) if e.is_network()));
    }

    #[test]
    fn clearing_filters_keeps_ordering() {
        let mut view = BrowseView::default();
        view.set_ordering(ListingOrdering::OldestFirst);
        let mut filters = ListingFilters::default();
        filters.set_category("2");
        view.apply_filters(filters);
        assert!(view.filters().has_active_filters());

        view.clear_filters();
        assert!(!view.filters().has_active_filters());
        assert_eq!(view.ordering(), ListingOrdering::OldestFirst);
    }

    #[test]
    fn restored_query_keeps_its_page() {
        let mut view = BrowseView::default();
        let restored = ListingQuery::from_query_string("?search=bike&page=2&ordering=-price");
        let ticket = view.set_query(restored.clone());
        assert_eq!(ticket.query(), &restored);
        assert_eq!(view.current_page(), 2);
        assert_eq!(view.ordering(), ListingOrdering::PriceHighToLow);
    }
}
