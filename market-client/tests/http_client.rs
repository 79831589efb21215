use market_client::{ClientError, HttpClient};
use market_core::admin::{AdminListingOrdering, AdminListingsQuery, AdminUsersQuery};
use market_core::browse::{ListingOrdering, ListingQuery};
use market_core::error::ApiError;
use market_core::images::LocalImage;
use market_core::listing_form::{FormMode, ListingSubmission};
use market_core::models::{ListingStatus, ModerationAction, Page, User};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_json(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Road bike",
        "description": "Lightly used",
        "price": "450.00",
        "category": {"id": 2, "name": "Sports", "slug": "sports"},
        "author": {"id": 7, "username": "anna", "email": "anna@example.com",
                   "phone": "5551234567", "is_staff": false, "is_blocked": false},
        "phone": "5551234567",
        "images": [{"id": 1, "image": "http://cdn/1.jpg", "order": 0}],
        "status": status,
        "is_moderated": true,
        "created_at": "2024-01-05T12:00:00Z",
        "updated_at": "2024-01-06T12:00:00Z"
    })
}

#[tokio::test]
async fn list_listings_sends_only_filled_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/listings/"))
        .and(query_param("search", "bike"))
        .and(query_param("min_price", "100"))
        .and(query_param("ordering", "price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 1, "title": "Road bike", "description": "", "price": "450.00",
                "author": 7, "author_username": "anna", "category": 2,
                "category_name": "Sports", "status": "active",
                "created_at": "2024-01-05T12:00:00Z", "first_image": null
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut query = ListingQuery::default();
    query.filters.search = "bike".into();
    query.filters.set_min_price("100");
    query.filters.set_max_price("");
    query.ordering = ListingOrdering::PriceLowToHigh;

    let client = HttpClient::new(server.uri());
    let page = client.list_listings(&query).await.unwrap();
    assert_eq!(page.total(), 1);
    assert_eq!(page.items[0].price, 450.0);

    let requests = server.received_requests().await.unwrap();
    let sent = requests[0].url.query().unwrap_or_default().to_string();
    assert!(!sent.contains("max_price"), "empty filter leaked: {}", sent);
    assert!(!sent.contains("category"), "empty filter leaked: {}", sent);
}

#[tokio::test]
async fn flat_array_answers_become_a_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Electronics", "slug": "electronics"},
            {"id": 2, "name": "Sports"}
        ])))
        .mount(&server)
        .await;

    let categories = HttpClient::new(server.uri()).categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].slug, None);
}

#[tokio::test]
async fn bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "username": "anna", "email": "anna@example.com",
            "phone": null, "is_staff": false, "is_blocked": false,
            "active_listings_count": 3
        })))
        .mount(&server)
        .await;

    let mut client = HttpClient::new(server.uri());
    client.set_token(Some("abc".into()));
    let user = client.profile().await.unwrap();
    assert_eq!(user.active_listings_count, Some(3));
}

#[tokio::test]
async fn status_codes_map_to_error_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/listings/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/listings/5/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You do not have permission to perform this action."
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/stats/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri());

    let err = client.get_listing(404).await.unwrap_err();
    assert!(err.is_not_found());

    let err = client.delete_listing(5).await.unwrap_err().into_api_error();
    assert_eq!(
        err,
        ApiError::Forbidden("You do not have permission to perform this action.".into())
    );

    let err = client.admin_stats().await.unwrap_err().into_api_error();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(err.user_message(), "Something went wrong. Please try again.");
}

#[tokio::test]
async fn validation_errors_keep_field_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/listings/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": ["Ensure this field has no more than 200 characters."],
            "images_data": ["At least one image is required."]
        })))
        .mount(&server)
        .await;

    let submission = ListingSubmission {
        mode: FormMode::Create,
        fields: vec![("title", "x".repeat(300))],
        images: Vec::<LocalImage>::new(),
    };
    let err = HttpClient::new(server.uri())
        .save_listing(&submission)
        .await
        .unwrap_err();
    let fields = match err {
        ClientError::Api(ApiError::Validation(fields)) => fields,
        other => panic!("expected validation error, got {:?}", other),
    };
    assert_eq!(
        fields.get("title"),
        Some("Ensure this field has no more than 200 characters.")
    );
    assert!(fields.contains("images_data"));
}

#[tokio::test]
async fn update_uploads_files_as_images_data_parts() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/listings/42/"))
        .and(body_string_contains("name=\"images_data\"; filename=\"front.png\""))
        .and(body_string_contains("name=\"title\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "title": "Bike"})))
        .expect(1)
        .mount(&server)
        .await;

    let submission = ListingSubmission {
        mode: FormMode::Edit { listing_id: 42 },
        fields: vec![("title", "Bike".to_string()), ("price", "10".to_string())],
        images: vec![LocalImage::new("front.png", "image/png", b"PNG-bytes".to_vec())],
    };
    let saved = HttpClient::new(server.uri())
        .save_listing(&submission)
        .await
        .unwrap();
    assert_eq!(saved.id, 42);
}

#[tokio::test]
async fn admin_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/listings/"))
        .and(query_param("ordering", "status"))
        .and(query_param("search", "bike"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(3, "pending")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/listings/3/moderate/"))
        .and(body_json(json!({"action": "approve"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_json(3, "active")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/users/9/block/"))
        .and(body_json(json!({"is_blocked": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "username": "spam", "email": "", "is_staff": false, "is_blocked": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/listings/3/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri());
    let query = AdminListingsQuery {
        search: "bike".into(),
        ordering: AdminListingOrdering::Status,
    };
    let page = client.admin_listings(&query).await.unwrap();
    assert_eq!(page.items[0].status, ListingStatus::Pending);
    assert_eq!(page.items[0].price, 450.0);

    let approved = client
        .admin_moderate_listing(3, ModerationAction::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, ListingStatus::Active);

    let blocked = client.admin_set_blocked(9, true).await.unwrap();
    assert!(blocked.is_blocked);

    client.admin_delete_listing(3).await.unwrap();
}

#[tokio::test]
async fn next_links_are_followed_with_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users/"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer root"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2, "next": null, "previous": null,
            "results": [{"id": 12, "username": "late", "email": "", "is_staff": false, "is_blocked": false}]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": format!("{}/api/admin/users/?page=2", server.uri()),
            "previous": null,
            "results": [{"id": 11, "username": "early", "email": "", "is_staff": false, "is_blocked": false}]
        })))
        .mount(&server)
        .await;

    let mut client = HttpClient::new(server.uri());
    client.set_token(Some("root".into()));
    let first = client.admin_users(&AdminUsersQuery::default()).await.unwrap();
    assert_eq!(first.items[0].id, 11);
    let next = first.next.expect("first page links to the second");

    let second: Page<User> = client.follow_page(&next).await.unwrap();
    assert_eq!(second.items[0].username, "late");
    assert_eq!(second.next, None);

    let relative: Page<User> = client.follow_page("/api/admin/users/?page=2").await.unwrap();
    assert_eq!(relative.items.len(), 1);
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/listings/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "archived"})))
        .mount(&server)
        .await;

    let err = HttpClient::new(server.uri())
        .get_listing(1)
        .await
        .unwrap_err()
        .into_api_error();
    assert!(matches!(err, ApiError::Decode(_)));
}
