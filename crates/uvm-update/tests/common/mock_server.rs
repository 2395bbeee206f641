//! Mock server helpers for HTTP transport tests

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve `body` at `route` with status 200
pub async fn mock_bytes(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Serve an HTML page at `route`, the way file hosts answer with error or
/// interstitial pages
pub async fn mock_html(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Answer `route` with a bare status code
pub async fn mock_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Full URL of `route` on the mock server
pub fn server_url(server: &MockServer, route: &str) -> String {
    format!("{}{}", server.uri(), route)
}
