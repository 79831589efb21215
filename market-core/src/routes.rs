use crate::models::User;
use crate::session::SessionState;
use std::fmt;

/// Client-visible pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Profile,
    CreateListing,
    ListingDetail(i64),
    EditListing(i64),
    AdminDashboard,
    AdminListings,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["profile"] => Self::Profile,
            ["listings", "create"] => Self::CreateListing,
            ["listings", id] => parse_id(id).map_or(Self::NotFound, Self::ListingDetail),
            ["listings", id, "edit"] => parse_id(id).map_or(Self::NotFound, Self::EditListing),
            ["admin"] => Self::AdminDashboard,
            ["admin", "listings"] => Self::AdminListings,
            _ => Self::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::CreateListing => "/listings/create".to_string(),
            Self::ListingDetail(id) => format!("/listings/{}", id),
            Self::EditListing(id) => format!("/listings/{}/edit", id),
            Self::AdminDashboard => "/admin".to_string(),
            Self::AdminListings => "/admin/listings".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Self::Profile | Self::CreateListing | Self::EditListing(_) => {
                Some(Capability::Authenticated)
            }
            Self::AdminDashboard | Self::AdminListings => Some(Capability::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse::<i64>().ok().filter(|id| *id > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still hydrating: render nothing, decide later.
    Pending,
    Allow,
    Redirect(Route),
}

pub fn guard(required: Option<Capability>, session: &SessionState) -> GuardDecision {
    let Some(required) = required else {
        return GuardDecision::Allow;
    };

    match (required, session) {
        (_, SessionState::Loading) => GuardDecision::Pending,
        (_, SessionState::Anonymous) => GuardDecision::Redirect(Route::Login),
        (Capability::Authenticated, SessionState::SignedIn(_)) => GuardDecision::Allow,
        (Capability::Admin, SessionState::SignedIn(user)) if user.is_staff => GuardDecision::Allow,
        (Capability::Admin, SessionState::SignedIn(_)) => GuardDecision::Redirect(Route::Home),
    }
}

pub fn guard_route(route: &Route, session: &SessionState) -> GuardDecision {
    guard(route.required_capability(), session)
}

/// Authors and staff may change a listing; nobody else.
pub fn can_edit_listing(author_id: i64, user: Option<&User>) -> bool {
    user.is_some_and(|u| u.id == author_id || u.is_staff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(id: i64, is_staff: bool) -> SessionState {
        SessionState::SignedIn(User {
            id,
            username: "u".into(),
            email: String::new(),
            phone: None,
            profile_photo: None,
            is_staff,
            is_blocked: false,
            active_listings_count: None,
        })
    }

    #[test]
    fn routes_round_trip_through_paths() {
        for route in [
            Route::Home,
            Route::Login,
            Route::Register,
            Route::Profile,
            Route::CreateListing,
            Route::ListingDetail(12),
            Route::EditListing(12),
            Route::AdminDashboard,
            Route::AdminListings,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn parse_tolerates_trailing_slash_and_query() {
        assert_eq!(Route::parse("/listings/4/"), Route::ListingDetail(4));
        assert_eq!(Route::parse("/?search=bike"), Route::Home);
        assert_eq!(Route::parse("/listings/abc"), Route::NotFound);
        assert_eq!(Route::parse("/nowhere"), Route::NotFound);
    }

    #[test]
    fn guard_waits_while_session_loads() {
        assert_eq!(
            guard(Some(Capability::Admin), &SessionState::Loading),
            GuardDecision::Pending
        );
        assert_eq!(guard(None, &SessionState::Loading), GuardDecision::Allow);
    }

    #[test]
    fn guard_redirects_by_capability() {
        assert_eq!(
            guard_route(&Route::Profile, &SessionState::Anonymous),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(
            guard_route(&Route::AdminListings, &signed_in(1, false)),
            GuardDecision::Redirect(Route::Home)
        );
        assert_eq!(
            guard_route(&Route::AdminListings, &signed_in(1, true)),
            GuardDecision::Allow
        );
        assert_eq!(
            guard_route(&Route::CreateListing, &signed_in(1, false)),
            GuardDecision::Allow
        );
    }

    #[test]
    fn only_author_or_staff_can_edit() {
        let author = signed_in(3, false);
        let stranger = signed_in(4, false);
        let staff = signed_in(5, true);
        assert!(can_edit_listing(3, author.user()));
        assert!(!can_edit_listing(3, stranger.user()));
        assert!(can_edit_listing(3, staff.user()));
        assert!(!can_edit_listing(3, None));
    }
}
