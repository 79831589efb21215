use crate::error::ClientError;
use market_core::admin::{AdminListingsQuery, AdminUsersQuery};
use market_core::browse::ListingQuery;
use market_core::error::ApiError;
use market_core::images::ImageFile;
use market_core::listing_form::{FormMode, ListingSubmission, IMAGES_PART};
use market_core::models::{
    AdminStats, AuthResponse, BlockRequest, Category, Listing, ListingSummary, LoginRequest,
    ModerateRequest, ModerationAction, Page, ProfileUpdate, RegisterRequest, SavedListing, User,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// One method per backend endpoint. Answers are normalized here so callers
/// never see the wire shapes.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn add_auth_header(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.add_auth_header(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.add_auth_header(self.client.post(self.url(path)))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.add_auth_header(self.client.put(self.url(path)))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.add_auth_header(self.client.delete(self.url(path)))
    }

    // ==================== Аутентификация ====================

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        tracing::debug!(username = %req.username, "POST login");
        let response = self.client.post(self.url("/api/auth/login/")).json(req).send().await?;
        handle_json(response).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        tracing::debug!(username = %req.username, "POST register");
        let response = self
            .client
            .post(self.url("/api/auth/register/"))
            .json(req)
            .send()
            .await?;
        handle_json(response).await
    }

    pub async fn profile(&self) -> Result<User, ClientError> {
        let response = self.get("/api/auth/profile/").send().await?;
        handle_json(response).await
    }

    /// The endpoint echoes only the editable fields back.
    pub async fn update_profile(&self, req: &ProfileUpdate) -> Result<ProfileUpdate, ClientError> {
        let response = self.put("/api/auth/profile/").json(req).send().await?;
        handle_json(response).await
    }

    // ==================== Объявления ====================

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let response = self.get("/api/categories/").send().await?;
        let page: Page<Category> = handle_json(response).await?;
        Ok(page.items)
    }

    pub async fn list_listings(
        &self,
        query: &ListingQuery,
    ) -> Result<Page<ListingSummary>, ClientError> {
        let params = query.to_params();
        tracing::debug!(?params, "GET listings");
        let response = self.get("/api/listings/").query(&params).send().await?;
        handle_json(response).await
    }

    pub async fn my_listings(&self) -> Result<Page<ListingSummary>, ClientError> {
        let response = self.get("/api/listings/my_listings/").send().await?;
        handle_json(response).await
    }

    pub async fn get_listing(&self, id: i64) -> Result<Listing, ClientError> {
        let response = self.get(&format!("/api/listings/{}/", id)).send().await?;
        handle_json(response).await
    }

    pub async fn create_listing<F: ImageFile>(
        &self,
        submission: &ListingSubmission<F>,
    ) -> Result<SavedListing, ClientError> {
        let form = multipart_form(submission)?;
        let response = self.post("/api/listings/").multipart(form).send().await?;
        handle_json(response).await
    }

    pub async fn update_listing<F: ImageFile>(
        &self,
        id: i64,
        submission: &ListingSubmission<F>,
    ) -> Result<SavedListing, ClientError> {
        let form = multipart_form(submission)?;
        let response = self
            .put(&format!("/api/listings/{}/", id))
            .multipart(form)
            .send()
            .await?;
        handle_json(response).await
    }

    /// Creates or updates depending on the form the submission came from.
    pub async fn save_listing<F: ImageFile>(
        &self,
        submission: &ListingSubmission<F>,
    ) -> Result<SavedListing, ClientError> {
        match submission.mode {
            FormMode::Create => self.create_listing(submission).await,
            FormMode::Edit { listing_id } => self.update_listing(listing_id, submission).await,
        }
    }

    pub async fn delete_listing(&self, id: i64) -> Result<(), ClientError> {
        let response = self.delete(&format!("/api/listings/{}/", id)).send().await?;
        handle_empty(response).await
    }

    // ==================== Администрирование ====================

    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        let response = self.get("/api/admin/stats/").send().await?;
        handle_json(response).await
    }

    pub async fn admin_listings(
        &self,
        query: &AdminListingsQuery,
    ) -> Result<Page<Listing>, ClientError> {
        let response = self
            .get("/api/admin/listings/")
            .query(&query.to_params())
            .send()
            .await?;
        handle_json(response).await
    }

    pub async fn admin_delete_listing(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .delete(&format!("/api/admin/listings/{}/", id))
            .send()
            .await?;
        handle_empty(response).await
    }

    pub async fn admin_moderate_listing(
        &self,
        id: i64,
        action: ModerationAction,
    ) -> Result<Listing, ClientError> {
        let response = self
            .post(&format!("/api/admin/listings/{}/moderate/", id))
            .json(&ModerateRequest { action })
            .send()
            .await?;
        handle_json(response).await
    }

    pub async fn admin_users(&self, query: &AdminUsersQuery) -> Result<Page<User>, ClientError> {
        let response = self
            .get("/api/admin/users/")
            .query(&query.to_params())
            .send()
            .await?;
        handle_json(response).await
    }

    /// Fetches the page a previous answer linked to as `next`.
    pub async fn follow_page<T: DeserializeOwned>(&self, next: &str) -> Result<Page<T>, ClientError> {
        tracing::debug!(next, "GET next page");
        let url = if next.starts_with("http://") || next.starts_with("https://") {
            next.to_string()
        } else {
            self.url(next)
        };
        let response = self.add_auth_header(self.client.get(url)).send().await?;
        handle_json(response).await
    }

    pub async fn admin_set_blocked(&self, id: i64, is_blocked: bool) -> Result<User, ClientError> {
        let response = self
            .post(&format!("/api/admin/users/{}/block/", id))
            .json(&BlockRequest { is_blocked })
            .send()
            .await?;
        handle_json(response).await
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client() -> Client {
    use std::time::Duration;

    Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[cfg(target_arch = "wasm32")]
fn build_client() -> Client {
    Client::new()
}

fn multipart_form<F: ImageFile>(submission: &ListingSubmission<F>) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (name, value) in &submission.fields {
        form = form.text(*name, value.clone());
    }
    for image in &submission.images {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string())
            .mime_str(image.mime())?;
        form = form.part(IMAGES_PART, part);
    }
    Ok(form)
}

async fn handle_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%status, "Unexpected response shape: {}", e);
            ClientError::Api(ApiError::Decode(e.to_string()))
        })
    } else {
        tracing::warn!(%status, "Request failed");
        Err(ApiError::from_status(status.as_u16(), &body).into())
    }
}

async fn handle_empty(response: Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    tracing::warn!(%status, "Request failed");
    Err(ApiError::from_status(status.as_u16(), &body).into())
}
