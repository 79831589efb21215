use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ==================== Пользователи ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_listings_count: Option<u32>,
}

/// Users are the same user when their ids match, whatever the payload shape.
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

/// Access token plus the optional refresh token, as persisted in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Normalized auth payload.
///
/// The backend has been seen answering both `{token, user}` and
/// `{tokens: {access, refresh}, user}`; both decode into this one type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "AuthResponseWire")]
pub struct AuthResponse {
    pub tokens: AuthTokens,
    pub user: User,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthResponseWire {
    Pair { tokens: TokenPairWire, user: User },
    Single { token: String, user: User },
}

#[derive(Deserialize)]
struct TokenPairWire {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

impl From<AuthResponseWire> for AuthResponse {
    fn from(wire: AuthResponseWire) -> Self {
        match wire {
            AuthResponseWire::Pair { tokens, user } => Self {
                tokens: AuthTokens {
                    access: tokens.access,
                    refresh: tokens.refresh,
                },
                user,
            },
            AuthResponseWire::Single { token, user } => Self {
                tokens: AuthTokens {
                    access: token,
                    refresh: None,
                },
                user,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
}

// ==================== Категории и объявления ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Active,
    Rejected,
    Inactive,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    pub id: i64,
    /// Absolute or server-relative URL of the stored image.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// Full listing as returned by the detail and admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(default)]
    pub category: Option<Category>,
    pub author: User,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub images: Vec<ListingImage>,
    pub status: ListingStatus,
    #[serde(default)]
    pub is_moderated: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Compact listing row as returned by `GET /api/listings/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    pub author: i64,
    #[serde(default)]
    pub author_username: String,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub first_image: Option<String>,
}

/// What the create/update endpoints hand back; only the id is relied upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedListing {
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

// ==================== Администрирование ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: i64,
    pub username: String,
    pub listings_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_listings: u64,
    #[serde(default)]
    pub active_listings: u64,
    #[serde(default)]
    pub inactive_listings: u64,
    #[serde(default)]
    pub listings_last_7_days: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub user_activity: Vec<UserActivity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerateRequest {
    pub action: ModerationAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRequest {
    pub is_blocked: bool,
}

// ==================== Пагинация ====================

/// One page of results, whether the server paginated or answered a flat array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PageWire<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl<T> Page<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items,
            count: None,
            next: None,
            previous: None,
        }
    }

    /// Total number of matches, falling back to the page length for flat answers.
    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.items.len() as u64)
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::from_items(Vec::new())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageWire<T> {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Flat(Vec<T>),
}

impl<T> From<PageWire<T>> for Page<T> {
    fn from(wire: PageWire<T>) -> Self {
        match wire {
            PageWire::Paginated {
                count,
                next,
                previous,
                results,
            } => Self {
                items: results,
                count,
                next,
                previous,
            },
            PageWire::Flat(items) => Self::from_items(items),
        }
    }
}

/// Decimal fields arrive as strings (`"19.99"`) from the backend serializer.
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid price {:?}: {}", text, e))),
    }
}
