use crate::error::ApiError;
use crate::models::{Listing, User};
use crate::request::{Generation, LoadState, RequestCounter};
use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    generation: Generation,
    listing_id: i64,
}

impl DetailTicket {
    pub fn listing_id(&self) -> i64 {
        self.listing_id
    }
}

#[derive(Debug, PartialEq)]
pub enum DetailDisplay<'a> {
    Loading,
    NotFound,
    Error(String),
    Loaded(&'a Listing),
}

/// One listing page, with its confirm-before-delete step.
#[derive(Debug)]
pub struct ListingDetailView {
    listing_id: i64,
    requests: RequestCounter,
    listing: LoadState<Listing>,
    confirming_delete: bool,
    deleting: bool,
    alert: Option<String>,
}

impl ListingDetailView {
    pub fn new(listing_id: i64) -> Self {
        Self {
            listing_id,
            requests: RequestCounter::new(),
            listing: LoadState::Idle,
            confirming_delete: false,
            deleting: false,
            alert: None,
        }
    }

    pub fn listing_id(&self) -> i64 {
        self.listing_id
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.value()
    }

    pub fn load(&mut self) -> DetailTicket {
        self.listing = LoadState::Loading;
        DetailTicket {
            generation: self.requests.next(),
            listing_id: self.listing_id,
        }
    }

    pub fn complete(&mut self, ticket: DetailTicket, result: Result<Listing, ApiError>) -> bool {
        if !self.requests.is_current(ticket.generation) || ticket.listing_id != self.listing_id {
            return false;
        }
        self.listing = LoadState::from_result(result);
        true
    }

    pub fn display(&self) -> DetailDisplay<'_> {
        match &self.listing {
            LoadState::Idle | LoadState::Loading => DetailDisplay::Loading,
            LoadState::Loaded(listing) => DetailDisplay::Loaded(listing),
            LoadState::Failed(ApiError::NotFound) => DetailDisplay::NotFound,
            LoadState::Failed(_) => {
                DetailDisplay::Error("Failed to load listing. Please try again.".to_string())
            }
        }
    }

    /// Edit and delete controls are shown to the author only.
    pub fn is_owner(&self, user: Option<&User>) -> bool {
        match (self.listing.value(), user) {
            (Some(listing), Some(user)) => listing.author.id == user.id,
            _ => false,
        }
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Opens the confirmation dialog. Nothing is sent yet.
    pub fn request_delete(&mut self) -> bool {
        if self.listing.value().is_none() || self.deleting {
            return false;
        }
        self.confirming_delete = true;
        true
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Confirms; returns the id to delete.
    pub fn confirm_delete(&mut self) -> Option<i64> {
        if !self.confirming_delete || self.deleting {
            return None;
        }
        self.deleting = true;
        Some(self.listing_id)
    }

    /// Where to go after a successful delete; `None` keeps the page with an alert.
    pub fn finish_delete(&mut self, result: Result<(), ApiError>) -> Option<Route> {
        self.deleting = false;
        self.confirming_delete = false;
        match result {
            Ok(()) => Some(Route::Profile),
            Err(e) => {
                tracing::warn!(listing_id = self.listing_id, "Failed to delete listing: {}", e);
                self.alert = Some("Failed to delete listing. Please try again.".to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingStatus;
    use chrono::Utc;

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: String::new(),
            phone: None,
            profile_photo: None,
            is_staff: false,
            is_blocked: false,
            active_listings_count: None,
        }
    }

    fn listing(id: i64, author: i64) -> Listing {
        Listing {
            id,
            title: "Lamp".into(),
            description: "Desk lamp".into(),
            price: 15.0,
            category: None,
            author: user(author),
            phone: "555".into(),
            images: Vec::new(),
            status: ListingStatus::Active,
            is_moderated: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn missing_listing_has_its_own_state() {
        let mut view = ListingDetailView::new(5);
        let ticket = view.load();
        assert_eq!(view.display(), DetailDisplay::Loading);
        view.complete(ticket, Err(ApiError::NotFound));
        assert_eq!(view.display(), DetailDisplay::NotFound);
    }

    #[test]
    fn delete_waits_for_confirmation() {
        let mut view = ListingDetailView::new(5);
        assert!(!view.request_delete(), "nothing to delete before load");
        let ticket = view.load();
        view.complete(ticket, Ok(listing(5, 1)));
        assert!(view.is_owner(Some(&user(1))));
        assert!(!view.is_owner(Some(&user(2))));

        assert_eq!(view.confirm_delete(), None);
        assert!(view.request_delete());
        view.cancel_delete();
        assert_eq!(view.confirm_delete(), None);

        view.request_delete();
        assert_eq!(view.confirm_delete(), Some(5));
        assert_eq!(view.finish_delete(Ok(())), Some(Route::Profile));
    }

    #[test]
    fn failed_delete_keeps_listing_and_alerts() {
        let mut view = ListingDetailView::new(5);
        let ticket = view.load();
        view.complete(ticket, Ok(listing(5, 1)));
        view.request_delete();
        view.confirm_delete();
        assert_eq!(view.finish_delete(Err(ApiError::Network("x".into()))), None);
        assert!(view.alert().is_some());
        assert!(view.listing().is_some());
    }
}
