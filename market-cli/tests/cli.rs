use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens here, so any request that slips through fails loudly.
const DEAD_SERVER: &str = "http://127.0.0.1:9";

fn market(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("market-cli").unwrap();
    cmd.env("MARKET_SERVER", DEAD_SERVER)
        .env("MARKET_TOKEN_FILE", dir.path().join("token"))
        .env_remove("RUST_LOG")
        .current_dir(dir.path());
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    market(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("admin"));
}

#[test]
fn long_title_is_rejected_before_any_request() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("photo.png");
    fs::write(&image, b"\x89PNG\r\n\x1a\n0000").unwrap();

    market(&dir)
        .args(["create", "--title", &"x".repeat(201)])
        .args(["--description", "Nice", "--price", "10", "--category", "1"])
        .args(["--phone", "5551234567"])
        .arg("--image")
        .arg(&image)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Title must be at most 200 characters"))
        .stdout(predicate::str::contains("session").not());
}

#[test]
fn non_image_file_is_refused() {
    let dir = TempDir::new().unwrap();
    let text = dir.path().join("notes.txt");
    fs::write(&text, "just text").unwrap();

    market(&dir)
        .args(["create", "--title", "Lamp", "--description", "Desk lamp"])
        .args(["--price", "15", "--category", "2", "--phone", "555"])
        .arg("--image")
        .arg(&text)
        .assert()
        .failure()
        .stdout(predicate::str::contains("notes.txt is not an image file"))
        .stdout(predicate::str::contains("At least one image is required"));
}

#[test]
fn declined_delete_sends_nothing() {
    let dir = TempDir::new().unwrap();
    market(&dir)
        .args(["delete", "--id", "5"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));
}

#[test]
fn mismatched_passwords_fail_locally() {
    let dir = TempDir::new().unwrap();
    market(&dir)
        .args(["register", "--username", "anna", "--email", "anna@example.com"])
        .args(["--password", "one", "--password-confirm", "two"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Password fields didn't match."));
}

#[test]
fn whoami_requires_login() {
    let dir = TempDir::new().unwrap();
    market(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn logout_removes_token_file() {
    let dir = TempDir::new().unwrap();
    let token = dir.path().join("token");
    fs::write(&token, r#"{"access":"abc","refresh":null}"#).unwrap();

    market(&dir).arg("logout").assert().success();
    assert!(!token.exists());
}

/// Stores an admin token and serves both admin tables split over two pages.
async fn admin_server(dir: &TempDir) -> MockServer {
    fs::write(
        dir.path().join("token"),
        r#"{"access":"root","refresh":null}"#,
    )
    .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "root", "email": "", "is_staff": true, "is_blocked": false
        })))
        .mount(&server)
        .await;

    let user = |id: i64, name: &str| {
        json!({"id": id, "username": name, "email": "", "is_staff": false, "is_blocked": false})
    };
    Mock::given(method("GET"))
        .and(path("/api/admin/users/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2, "next": null, "previous": null, "results": [user(12, "late")]
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
            "results": [user(11, "early")]
        })))
        .mount(&server)
        .await;

    let listing = |id: i64| {
        json!({
            "id": id, "title": "Road bike", "description": "Lightly used", "price": "450.00",
            "category": {"id": 2, "name": "Sports"},
            "author": {"id": 7, "username": "anna", "email": "", "is_staff": false, "is_blocked": false},
            "phone": "5551234567", "images": [], "status": "active", "is_moderated": true,
            "created_at": "2024-01-05T12:00:00Z", "updated_at": "2024-01-06T12:00:00Z"
        })
    };
    Mock::given(method("GET"))
        .and(path("/api/admin/listings/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2, "next": null, "previous": null, "results": [listing(22)]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/listings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": format!("{}/api/admin/listings/?page=2", server.uri()),
            "previous": null,
            "results": [listing(21)]
        })))
        .mount(&server)
        .await;

    server
}

fn market_at(dir: &TempDir, server: &MockServer) -> Command {
    let mut cmd = market(dir);
    cmd.env("MARKET_SERVER", server.uri());
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn block_finds_user_on_a_later_page() {
    let dir = TempDir::new().unwrap();
    let server = admin_server(&dir).await;
    Mock::given(method("POST"))
        .and(path("/api/admin/users/12/block/"))
        .and(body_json(json!({"is_blocked": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12, "username": "late", "email": "", "is_staff": false, "is_blocked": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    market_at(&dir, &server)
        .args(["admin", "block", "--id", "12", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_listing_finds_row_on_a_later_page() {
    let dir = TempDir::new().unwrap();
    let server = admin_server(&dir).await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/listings/22/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    market_at(&dir, &server)
        .args(["admin", "delete-listing", "--id", "22", "--yes"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_user_fails_after_last_page() {
    let dir = TempDir::new().unwrap();
    let server = admin_server(&dir).await;

    market_at(&dir, &server)
        .args(["admin", "unblock", "--id", "99", "--yes"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("User #99 not found"));
}
