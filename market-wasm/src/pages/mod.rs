mod admin_dashboard;
mod admin_listings;
mod auth;
mod home;
mod listing_detail;
mod listing_form;
mod not_found;
mod profile;

pub use admin_dashboard::AdminDashboardPage;
pub use admin_listings::AdminListingsPage;
pub use auth::{LoginPage, RegisterPage};
pub use home::HomePage;
pub use listing_detail::ListingDetailPage;
pub use listing_form::ListingFormPage;
pub use not_found::NotFoundPage;
pub use profile::ProfilePage;

use crate::app::SessionContext;
use yew::prelude::*;

/// Every routed page receives the session from the router.
#[derive(Properties, Clone, PartialEq)]
pub struct PageProps {
    pub session: SessionContext,
}

/// Inline message under a form field.
pub(crate) fn field_error(message: Option<&str>) -> Html {
    match message {
        Some(message) => html! { <span class="form-error">{ message }</span> },
        None => html! {},
    }
}
