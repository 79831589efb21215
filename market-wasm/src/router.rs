use market_core::routes::Route;
use yew_router::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Routable)]
pub enum AppRoute {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/profile")]
    Profile,
    #[at("/listings/create")]
    CreateListing,
    #[at("/listings/:id")]
    ListingDetail { id: i64 },
    #[at("/listings/:id/edit")]
    EditListing { id: i64 },
    #[at("/admin")]
    AdminDashboard,
    #[at("/admin/listings")]
    AdminListings,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl From<AppRoute> for Route {
    fn from(route: AppRoute) -> Self {
        match route {
            AppRoute::Home => Route::Home,
            AppRoute::Login => Route::Login,
            AppRoute::Register => Route::Register,
            AppRoute::Profile => Route::Profile,
            AppRoute::CreateListing => Route::CreateListing,
            AppRoute::ListingDetail { id } => Route::ListingDetail(id),
            AppRoute::EditListing { id } => Route::EditListing(id),
            AppRoute::AdminDashboard => Route::AdminDashboard,
            AppRoute::AdminListings => Route::AdminListings,
            AppRoute::NotFound => Route::NotFound,
        }
    }
}

impl From<Route> for AppRoute {
    fn from(route: Route) -> Self {
        match route {
            Route::Home => AppRoute::Home,
            Route::Login => AppRoute::Login,
            Route::Register => AppRoute::Register,
            Route::Profile => AppRoute::Profile,
            Route::CreateListing => AppRoute::CreateListing,
            Route::ListingDetail(id) => AppRoute::ListingDetail { id },
            Route::EditListing(id) => AppRoute::EditListing { id },
            Route::AdminDashboard => AppRoute::AdminDashboard,
            Route::AdminListings => AppRoute::AdminListings,
            Route::NotFound => AppRoute::NotFound,
        }
    }
}
