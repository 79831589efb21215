//! Moderation console: the listings and users tabs, their confirm dialogs,
//! and the in-place list updates after a confirmed action.

use crate::error::ApiError;
use crate::models::{AdminStats, Listing, Page, User};
use crate::request::{Generation, LoadState, RequestCounter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Listings,
    Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminListingOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
    PriceLowToHigh,
    PriceHighToLow,
    Status,
}

impl AdminListingOrdering {
    pub const ALL: [AdminListingOrdering; 5] = [
        Self::NewestFirst,
        Self::OldestFirst,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::Status,
    ];

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::NewestFirst => "-created_at",
            Self::OldestFirst => "created_at",
            Self::PriceLowToHigh => "price",
            Self::PriceHighToLow => "-price",
            Self::Status => "status",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NewestFirst => "Newest First",
            Self::OldestFirst => "Oldest First",
            Self::PriceLowToHigh => "Price: Low to High",
            Self::PriceHighToLow => "Price: High to Low",
            Self::Status => "Status",
        }
    }

    pub fn from_param(param: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_param() == param)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminListingsQuery {
    pub search: String,
    pub ordering: AdminListingOrdering,
}

impl AdminListingsQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        params.push(("ordering", self.ordering.as_param().to_string()));
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUsersQuery {
    pub search: String,
}

impl AdminUsersQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let search = self.search.trim();
        if search.is_empty() {
            Vec::new()
        } else {
            vec![("search", search.to_string())]
        }
    }
}

/// A tab fetch to issue, tagged so late answers can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminFetch<Q> {
    generation: Generation,
    query: Q,
}

impl<Q> AdminFetch<Q> {
    pub fn query(&self) -> &Q {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminFetchRequest {
    Listings(AdminFetch<AdminListingsQuery>),
    Users(AdminFetch<AdminUsersQuery>),
}

/// Fetch cycle shared by both tabs.
#[derive(Debug)]
pub struct AdminTable<Q, T> {
    /// Selection of the last fetch.
    query: Q,
    /// Selection being edited; applied by the next fetch.
    draft: Q,
    requests: RequestCounter,
    rows: LoadState<Vec<T>>,
    /// Link to the page after the loaded rows.
    next: Option<String>,
}

impl<Q: Clone + PartialEq + Default, T> Default for AdminTable<Q, T> {
    fn default() -> Self {
        Self {
            query: Q::default(),
            draft: Q::default(),
            requests: RequestCounter::new(),
            rows: LoadState::Idle,
            next: None,
        }
    }
}

impl<Q: Clone + PartialEq + Default, T> AdminTable<Q, T> {
    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn draft(&self) -> &Q {
        &self.draft
    }

    pub fn state(&self) -> &LoadState<Vec<T>> {
        &self.rows
    }

    pub fn rows(&self) -> &[T] {
        self.rows.value().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fetch(&mut self) -> AdminFetch<Q> {
        self.query = self.draft.clone();
        self.rows = LoadState::Loading;
        self.next = None;
        AdminFetch {
            generation: self.requests.next(),
            query: self.query.clone(),
        }
    }

    pub fn complete(&mut self, ticket: AdminFetch<Q>, result: Result<Page<T>, ApiError>) -> bool {
        if !self.requests.is_current(ticket.generation) || ticket.query != self.query {
            return false;
        }
        if let Err(e) = &result {
            tracing::warn!("Failed to load admin table: {}", e);
        }
        let result = result.map(|page| {
            self.next = page.next;
            page.items
        });
        self.rows = LoadState::from_result(result);
        true
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Appends the page behind [`AdminTable::next_page`] to the loaded rows.
    pub fn extend(&mut self, page: Page<T>) -> bool {
        let Some(rows) = self.rows.value_mut() else {
            return false;
        };
        rows.extend(page.items);
        self.next = page.next;
        true
    }

    fn rows_mut(&mut self) -> Option<&mut Vec<T>> {
        self.rows.value_mut()
    }
}

pub type AdminListingsTab = AdminTable<AdminListingsQuery, Listing>;
pub type AdminUsersTab = AdminTable<AdminUsersQuery, User>;

impl AdminListingsTab {
    /// Typing only edits the draft; [`AdminListingsTab::fetch`] runs the search.
    pub fn set_search(&mut self, search: &str) {
        self.draft.search = search.to_string();
    }

    /// A new sort order refetches right away.
    pub fn set_ordering(&mut self, ordering: AdminListingOrdering) -> AdminFetch<AdminListingsQuery> {
        self.draft.ordering = ordering;
        self.fetch()
    }
}

impl AdminUsersTab {
    pub fn set_search(&mut self, search: &str) {
        self.draft.search = search.to_string();
    }
}

/// A destructive action waiting for the admin's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    DeleteListing { id: i64, title: String },
    SetBlocked { user_id: i64, username: String, block: bool },
}

impl AdminAction {
    pub fn heading(&self) -> &'static str {
        match self {
            Self::DeleteListing { .. } => "Delete Listing",
            Self::SetBlocked { block: true, .. } => "Block User",
            Self::SetBlocked { block: false, .. } => "Unblock User",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::DeleteListing { title, .. } => format!(
                "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                title
            ),
            Self::SetBlocked {
                username,
                block: true,
                ..
            } => format!(
                "Are you sure you want to block {}? Blocked users will not be able to create or edit listings.",
                username
            ),
            Self::SetBlocked {
                username,
                block: false,
                ..
            } => format!("Are you sure you want to unblock {}?", username),
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match self {
            Self::DeleteListing { .. } => "Delete",
            Self::SetBlocked { block: true, .. } => "Block",
            Self::SetBlocked { block: false, .. } => "Unblock",
        }
    }
}

/// The block/unblock button of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockControl {
    pub user_id: i64,
    pub block: bool,
}

impl BlockControl {
    pub fn label(&self) -> &'static str {
        if self.block {
            "Block"
        } else {
            "Unblock"
        }
    }
}

/// Staff rows get no control at all.
pub fn block_control(user: &User) -> Option<BlockControl> {
    if user.is_staff {
        None
    } else {
        Some(BlockControl {
            user_id: user.id,
            block: !user.is_blocked,
        })
    }
}

#[derive(Debug, Default)]
pub struct AdminConsole {
    tab: AdminTab,
    listings: AdminListingsTab,
    users: AdminUsersTab,
    pending: Option<AdminAction>,
    alert: Option<String>,
}

impl AdminConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> AdminTab {
        self.tab
    }

    pub fn listings(&self) -> &AdminListingsTab {
        &self.listings
    }

    pub fn listings_mut(&mut self) -> &mut AdminListingsTab {
        &mut self.listings
    }

    pub fn users(&self) -> &AdminUsersTab {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut AdminUsersTab {
        &mut self.users
    }

    /// Switches tab and fetches its rows.
    pub fn switch_tab(&mut self, tab: AdminTab) -> AdminFetchRequest {
        self.tab = tab;
        self.refresh()
    }

    /// Fetch (or search) for the active tab.
    pub fn refresh(&mut self) -> AdminFetchRequest {
        match self.tab {
            AdminTab::Listings => AdminFetchRequest::Listings(self.listings.fetch()),
            AdminTab::Users => AdminFetchRequest::Users(self.users.fetch()),
        }
    }

    pub fn pending(&self) -> Option<&AdminAction> {
        self.pending.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Opens the delete confirmation for a loaded listing.
    pub fn request_delete(&mut self, listing_id: i64) -> bool {
        let Some(listing) = self.listings.rows().iter().find(|l| l.id == listing_id) else {
            return false;
        };
        self.pending = Some(AdminAction::DeleteListing {
            id: listing.id,
            title: listing.title.clone(),
        });
        true
    }

    /// Opens the block/unblock confirmation. Staff users are never blockable.
    pub fn request_block_toggle(&mut self, user_id: i64) -> bool {
        let Some(user) = self.users.rows().iter().find(|u| u.id == user_id) else {
            return false;
        };
        let Some(control) = block_control(user) else {
            return false;
        };
        self.pending = Some(AdminAction::SetBlocked {
            user_id: control.user_id,
            username: user.username.clone(),
            block: control.block,
        });
        true
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Closes the dialog and hands back the call to make.
    pub fn confirm(&mut self) -> Option<AdminAction> {
        self.pending.take()
    }

    /// Reflects a finished action. Success edits the loaded rows in place;
    /// failure leaves them alone and raises an alert.
    pub fn apply(&mut self, action: &AdminAction, result: Result<(), ApiError>) -> bool {
        if let Err(e) = result {
            tracing::warn!(?action, "Admin action failed: {}", e);
            self.alert = Some(match action {
                AdminAction::DeleteListing { .. } => {
                    "Failed to delete listing. Please try again.".to_string()
                }
                AdminAction::SetBlocked { .. } => {
                    "Failed to update user status. Please try again.".to_string()
                }
            });
            return false;
        }

        match action {
            AdminAction::DeleteListing { id, .. } => {
                if let Some(rows) = self.listings.rows_mut() {
                    rows.retain(|l| l.id != *id);
                }
            }
            AdminAction::SetBlocked { user_id, block, .. } => {
                if let Some(rows) = self.users.rows_mut() {
                    if let Some(user) = rows.iter_mut().find(|u| u.id == *user_id) {
                        user.is_blocked = *block;
                    }
                }
            }
        }
        true
    }

    /// Approve/reject answer: replaces the listing row with the server copy.
    pub fn apply_moderation(&mut self, result: Result<Listing, ApiError>) -> bool {
        match result {
            Ok(updated) => {
                if let Some(rows) = self.listings.rows_mut() {
                    if let Some(row) = rows.iter_mut().find(|l| l.id == updated.id) {
                        *row = updated;
                    }
                }
                true
            }
            Err(e) => {
                tracing::warn!("Moderation failed: {}", e);
                self.alert = Some("Failed to moderate listing. Please try again.".to_string());
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsTicket(Generation);

/// Dashboard counters.
#[derive(Debug, Default)]
pub struct AdminDashboard {
    requests: RequestCounter,
    stats: LoadState<AdminStats>,
}

impl AdminDashboard {
    pub fn state(&self) -> &LoadState<AdminStats> {
        &self.stats
    }

    pub fn load(&mut self) -> StatsTicket {
        self.stats = LoadState::Loading;
        StatsTicket(self.requests.next())
    }

    pub fn complete(&mut self, ticket: StatsTicket, result: Result<AdminStats, ApiError>) -> bool {
        if !self.requests.is_current(ticket.0) {
            return false;
        }
        self.stats = LoadState::from_result(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingStatus;
    use chrono::Utc;

    fn user(id: i64, is_staff: bool, is_blocked: bool) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            phone: None,
            profile_photo: None,
            is_staff,
            is_blocked,
            active_listings_count: None,
        }
    }

    fn listing(id: i64, title: &str) -> Listing {
        Listing {
            id,
            title: title.into(),
            description: String::new(),
            price: 1.0,
            category: None,
            author: user(1, false, false),
            phone: String::new(),
            images: Vec::new(),
            status: ListingStatus::Pending,
            is_moderated: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn console_with_rows() -> AdminConsole {
        let mut console = AdminConsole::new();
        let AdminFetchRequest::Listings(ticket) = console.switch_tab(AdminTab::Listings) else {
            panic!("expected listings fetch");
        };
        assert!(console.listings_mut().complete(
            ticket,
            Ok(Page::from_items(vec![listing(1, "Bike"), listing(2, "Lamp")]))
        ));

        let AdminFetchRequest::Users(ticket) = console.switch_tab(AdminTab::Users) else {
            panic!("expected users fetch");
        };
        assert!(console.users_mut().complete(
            ticket,
            Ok(Page::from_items(vec![
                user(10, false, false),
                user(11, false, true),
                user(12, true, false),
            ]))
        ));
        console
    }

    #[test]
    fn delete_is_not_issued_until_confirmed() {
        let mut console = console_with_rows();
        assert!(console.request_delete(1));
        let pending = console.pending().unwrap();
        assert!(pending.message().contains("\"Bike\""));

        console.cancel();
        assert_eq!(console.confirm(), None, "cancel leaves nothing to issue");

        console.request_delete(1);
        let action = console.confirm().unwrap();
        assert_eq!(
            action,
            AdminAction::DeleteListing {
                id: 1,
                title: "Bike".into()
            }
        );
        assert!(console.apply(&action, Ok(())));
        let ids: Vec<i64> = console.listings().rows().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn failed_delete_leaves_rows_and_alerts() {
        let mut console = console_with_rows();
        console.request_delete(2);
        let action = console.confirm().unwrap();
        assert!(!console.apply(&action, Err(ApiError::Network("down".into()))));
        assert_eq!(console.listings().rows().len(), 2);
        assert_eq!(
            console.alert(),
            Some("Failed to delete listing. Please try again.")
        );
    }

    #[test]
    fn staff_rows_have_no_block_control() {
        let mut console = console_with_rows();
        assert_eq!(block_control(&user(12, true, false)), None);
        assert!(!console.request_block_toggle(12));
        assert!(console.pending().is_none());
    }

    #[test]
    fn block_and_unblock_messages_differ() {
        let mut console = console_with_rows();
        console.request_block_toggle(10);
        let block = console.confirm().unwrap();
        console.request_block_toggle(11);
        let unblock = console.confirm().unwrap();

        assert_eq!(block.confirm_label(), "Block");
        assert_eq!(unblock.confirm_label(), "Unblock");
        assert_ne!(block.message(), unblock.message());

        console.apply(&block, Ok(()));
        console.apply(&unblock, Ok(()));
        let blocked: Vec<(i64, bool)> = console
            .users()
            .rows()
            .iter()
            .map(|u| (u.id, u.is_blocked))
            .collect();
        assert_eq!(blocked, vec![(10, true), (11, false), (12, false)]);
    }

    #[test]
    fn tabs_fetch_independently() {
        let mut console = AdminConsole::new();
        let AdminFetchRequest::Listings(stale) = console.refresh() else {
            panic!("listings tab is the default");
        };
        let fresh = console
            .listings_mut()
            .set_ordering(AdminListingOrdering::PriceHighToLow);
        assert!(!console
            .listings_mut()
            .complete(stale, Ok(Page::from_items(vec![listing(1, "Old")]))));
        assert!(console.listings().state().is_loading());
        assert!(console
            .listings_mut()
            .complete(fresh, Ok(Page::from_items(vec![listing(3, "New")]))));

        console.users_mut().set_search("  anna ");
        let AdminFetchRequest::Users(users) = console.switch_tab(AdminTab::Users) else {
            panic!("expected users fetch");
        };
        assert_eq!(users.query().to_params(), vec![("search", "anna".to_string())]);
        assert_eq!(console.listings().rows()[0].title, "New");
    }

    #[test]
    fn typing_while_loading_keeps_pending_answer() {
        let mut console = AdminConsole::new();
        let AdminFetchRequest::Listings(pending) = console.refresh() else {
            panic!("listings tab is the default");
        };
        console.listings_mut().set_search("b");
        assert_eq!(console.listings().draft().search, "b");
        assert_eq!(console.listings().query().search, "");

        assert!(console
            .listings_mut()
            .complete(pending, Ok(Page::from_items(vec![listing(1, "Bike")]))));
        assert!(!console.listings().state().is_loading());
        assert_eq!(console.listings().rows().len(), 1);

        let AdminFetchRequest::Listings(search) = console.refresh() else {
            panic!("expected listings fetch");
        };
        assert_eq!(search.query().search, "b");
    }

    #[test]
    fn later_pages_extend_loaded_rows() {
        let mut console = AdminConsole::new();
        let AdminFetchRequest::Users(ticket) = console.switch_tab(AdminTab::Users) else {
            panic!("expected users fetch");
        };
        let first = Page {
            items: vec![user(1, false, false)],
            count: Some(2),
            next: Some("http://api.test/api/admin/users/?page=2".to_string()),
            previous: None,
        };
        assert!(console.users_mut().complete(ticket, Ok(first)));
        assert!(!console.request_block_toggle(2));
        assert_eq!(
            console.users().next_page(),
            Some("http://api.test/api/admin/users/?page=2")
        );

        assert!(console
            .users_mut()
            .extend(Page::from_items(vec![user(2, false, false)])));
        assert_eq!(console.users().rows().len(), 2);
        assert_eq!(console.users().next_page(), None);
        assert!(console.request_block_toggle(2));

        console.cancel();
        console.refresh();
        assert!(!console
            .users_mut()
            .extend(Page::from_items(vec![user(3, false, false)])));
    }

    #[test]
    fn moderation_patches_row_in_place() {
        let mut console = console_with_rows();
        let mut approved = listing(2, "Lamp");
        approved.status = ListingStatus::Active;
        assert!(console.apply_moderation(Ok(approved)));
        assert_eq!(console.listings().rows()[1].status, ListingStatus::Active);
    }

    #[test]
    fn dashboard_keeps_latest_stats() {
        let mut dashboard = AdminDashboard::default();
        let old = dashboard.load();
        let new = dashboard.load();
        assert!(!dashboard.complete(old, Ok(AdminStats::default())));
        assert!(dashboard.complete(
            new,
            Ok(AdminStats {
                total_users: 4,
                ..Default::default()
            })
        ));
        assert_eq!(dashboard.state().value().unwrap().total_users, 4);
    }
}
