use market_client::HttpClient;

/// Backend address, fixed at build time.
pub const API_BASE: &str = match option_env!("MARKET_API_BASE") {
    Some(base) => base,
    None => "http://localhost:8000",
};

pub fn client(token: Option<String>) -> HttpClient {
    let mut client = HttpClient::new(API_BASE);
    client.set_token(token);
    client
}

/// Image paths may come back server-relative.
pub fn media_url(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("blob:") {
        path.to_string()
    } else {
        format!("{}/{}", API_BASE.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
