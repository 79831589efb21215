use super::PageProps;
use crate::components::{ErrorMessage, FilterSidebar, ListingCard, LoadingSpinner, SortingDropdown};
use crate::router::AppRoute;
use market_core::browse::{BrowseDisplay, BrowseView, FetchTicket, ListingFilters, ListingOrdering, ListingQuery};
use market_core::error::ApiError;
use market_core::models::{Category, ListingSummary, Page};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    CategoriesLoaded(Result<Vec<Category>, ApiError>),
    ApplyFilters(ListingFilters),
    ClearFilters,
    SetOrdering(ListingOrdering),
    SetPage(u32),
    Retry,
    LocationChanged(Location),
    Loaded(FetchTicket, Result<Page<ListingSummary>, ApiError>),
}

pub struct HomePage {
    view: BrowseView,
    categories: Vec<Category>,
    _location_handle: Option<LocationHandle>,
}

impl HomePage {
    fn fetch(ctx: &Context<Self>, ticket: FetchTicket) {
        let http = ctx.props().session.http();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = http
                .list_listings(ticket.query())
                .await
                .map_err(|e| e.into_api_error());
            link.send_message(Msg::Loaded(ticket, result));
        });
    }

    /// Mirrors the selection into the address bar, then fetches.
    fn fetch_and_mirror(ctx: &Context<Self>, ticket: FetchTicket) {
        if let Some(navigator) = ctx.link().navigator() {
            if let Err(e) = navigator.replace_with_query(&AppRoute::Home, &ticket.query().to_params()) {
                log::warn!("Failed to update the address bar: {}", e);
            }
        }
        Self::fetch(ctx, ticket);
    }

    fn query_from_location(ctx: &Context<Self>) -> ListingQuery {
        ctx.link()
            .location()
            .map(|location| ListingQuery::from_query_string(location.query_str()))
            .unwrap_or_default()
    }

    fn view_results(&self, ctx: &Context<Self>) -> Html {
        match self.view.display() {
            BrowseDisplay::Loading => html! { <LoadingSpinner /> },
            BrowseDisplay::Error(error) => html! {
                <ErrorMessage
                    message={format!("Failed to load listings. {}", error.user_message())}
                    on_retry={ctx.link().callback(|_: ()| Msg::Retry)}
                />
            },
            BrowseDisplay::Empty => html! {
                <div class="empty-state">
                    <h3>{ "No listings found" }</h3>
                    <p>{ "Try adjusting your search or filters." }</p>
                </div>
            },
            BrowseDisplay::Results(page) => html! {
                <>
                    <div class="listings-grid">
                        { for page.items.iter().map(|listing| html! {
                            <ListingCard key={listing.id} listing={listing.clone()} />
                        }) }
                    </div>
                    { self.view_pagination(ctx, page) }
                </>
            },
        }
    }

    fn view_pagination(&self, ctx: &Context<Self>, page: &Page<ListingSummary>) -> Html {
        if !page.has_next() && !page.has_previous() {
            return html! {};
        }
        let current = self.view.current_page();

        html! {
            <div class="pagination">
                <button
                    class="pagination-button"
                    disabled={!page.has_previous()}
                    onclick={ctx.link().callback(move |_| Msg::SetPage(current.saturating_sub(1)))}
                >
                    { "Previous" }
                </button>
                <span class="pagination-info">{ format!("Page {}", current) }</span>
                <button
                    class="pagination-button"
                    disabled={!page.has_next()}
                    onclick={ctx.link().callback(move |_| Msg::SetPage(current + 1))}
                >
                    { "Next" }
                </button>
            </div>
        }
    }
}

impl Component for HomePage {
    type Message = Msg;
    type Properties = PageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut view = BrowseView::new(Self::query_from_location(ctx));
        let location_handle = ctx
            .link()
            .add_location_listener(ctx.link().callback(Msg::LocationChanged));

        let http = ctx.props().session.http();
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = http.categories().await.map_err(|e| e.into_api_error());
            link.send_message(Msg::CategoriesLoaded(result));
        });

        let ticket = view.refresh();
        Self::fetch(ctx, ticket);

        Self {
            view,
            categories: Vec::new(),
            _location_handle: location_handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::CategoriesLoaded(Ok(categories)) => {
                self.categories = categories;
                true
            }
            Msg::CategoriesLoaded(Err(e)) => {
                log::warn!("Failed to load categories: {}", e);
                false
            }

            Msg::ApplyFilters(mut filters) => {
                filters.search = self.view.filters().search.clone();
                let ticket = self.view.apply_filters(filters);
                Self::fetch_and_mirror(ctx, ticket);
                true
            }
            Msg::ClearFilters => {
                let search = self.view.filters().search.clone();
                let ticket = self.view.apply_filters(ListingFilters {
                    search,
                    ..Default::default()
                });
                Self::fetch_and_mirror(ctx, ticket);
                true
            }
            Msg::SetOrdering(ordering) => {
                let ticket = self.view.set_ordering(ordering);
                Self::fetch_and_mirror(ctx, ticket);
                true
            }
            Msg::SetPage(page) => {
                let ticket = self.view.set_page(page);
                Self::fetch_and_mirror(ctx, ticket);
                true
            }
            Msg::Retry => {
                let ticket = self.view.refresh();
                Self::fetch(ctx, ticket);
                true
            }

            // Navbar search and back/forward land here.
            Msg::LocationChanged(location) => {
                if location.path() != AppRoute::Home.to_path() {
                    return false;
                }
                let query = ListingQuery::from_query_string(location.query_str());
                if &query == self.view.query() {
                    return false;
                }
                let ticket = self.view.set_query(query);
                Self::fetch(ctx, ticket);
                true
            }

            Msg::Loaded(ticket, result) => self.view.complete(ticket, result),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let search = self.view.filters().search.trim().to_string();

        html! {
            <div class="home-page">
                <FilterSidebar
                    categories={self.categories.clone()}
                    filters={self.view.filters().clone()}
                    on_apply={ctx.link().callback(Msg::ApplyFilters)}
                    on_clear={ctx.link().callback(|_| Msg::ClearFilters)}
                />
                <section class="listings-section">
                    <div class="listings-header">
                        <h1>
                            { if search.is_empty() {
                                "All Listings".to_string()
                            } else {
                                format!("Results for \"{}\"", search)
                            } }
                        </h1>
                        <SortingDropdown
                            ordering={self.view.ordering()}
                            on_change={ctx.link().callback(Msg::SetOrdering)}
                        />
                    </div>
                    { self.view_results(ctx) }
                </section>
            </div>
        }
    }
}
