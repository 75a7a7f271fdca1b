use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock archive backend for testing the HTTP client
pub struct ArchiveMockServer {
    server: MockServer,
}

impl ArchiveMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// A project as the backend serialises it: numeric id, nullable fields
    pub fn project_json(id: u64, title: &str) -> Value {
        json!({
            "id": id,
            "link": format!("https://vimeo.com/{}", id),
            "title": title,
            "author": "A Música Portuguesa a Gostar Dela Própria",
            "category": "Cante",
            "date": "2018-03-14",
            "direction": "Tiago Pereira",
            "sound": null,
            "production": null,
            "support": null,
            "assistance": null,
            "research": null,
            "location": "Serpa",
            "instruments": "voz",
            "keywords": "cante, alentejo",
            "infoPool": null,
            "created_at": "2024-02-01T10:00:00"
        })
    }

    pub async fn mock_get(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, http_method: &str, route: &str, status: u16, body: &str) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mock `POST /query`, only answering when the body matches exactly
    pub async fn mock_query(&self, expected_body: Value, response: Value) {
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_ip(&self, ip: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": ip })))
            .mount(&self.server)
            .await;
    }
}
