mod fixtures;

use fixtures::ArchiveMockServer;
use lastro_api::{ApiError, ArchiveClient, ArchiveService, ClientConfig, PublicIpResolver};
use lastro_types::QueryRequest;
use pretty_assertions::assert_eq;
use serde_json::json;

fn client_for(server: &ArchiveMockServer) -> ArchiveClient {
    ArchiveClient::new(&ClientConfig::new(&server.uri())).unwrap()
}

#[tokio::test]
async fn test_projects_normalises_backend_fields() {
    let server = ArchiveMockServer::new().await;
    server
        .mock_get(
            "/projects",
            json!([
                ArchiveMockServer::project_json(1434903174, "Moda da Ceifa"),
                ArchiveMockServer::project_json(7, "Baile Mandado")
            ]),
        )
        .await;

    let projects = client_for(&server).projects().await.unwrap();

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].id, "1434903174");
    assert_eq!(projects[0].title, "Moda da Ceifa");
    assert_eq!(projects[0].sound, "");
    assert_eq!(projects[1].keyword_list(), vec!["cante", "alentejo"]);
}

#[tokio::test]
async fn test_project_and_suggestions_use_id_in_path() {
    let server = ArchiveMockServer::new().await;
    server
        .mock_get("/projects/42", ArchiveMockServer::project_json(42, "Romaria"))
        .await;
    server
        .mock_get(
            "/suggestions/42",
            json!([{
                "description": "Do mesmo realizador",
                "projects": [ArchiveMockServer::project_json(43, "Chula")]
            }]),
        )
        .await;

    let client = client_for(&server);
    let project = client.project("42").await.unwrap();
    let suggestions = client.suggestions("42").await.unwrap();

    assert_eq!(project.title, "Romaria");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].description, "Do mesmo realizador");
    assert_eq!(suggestions[0].projects[0].id, "43");
}

#[tokio::test]
async fn test_random_projects_count_in_path() {
    let server = ArchiveMockServer::new().await;
    server
        .mock_get("/random-projects/3", json!([ArchiveMockServer::project_json(1, "A")]))
        .await;

    let projects = client_for(&server).random_projects(3).await.unwrap();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_query_sends_camel_case_body() {
    let server = ArchiveMockServer::new().await;
    server
        .mock_query(
            json!({
                "cookieConsent": true,
                "userIp": "10.0.0.1",
                "previousQueries": ["SELECT * FROM projects WHERE category = 'Cante';"],
                "currentPrompt": "e de viola?",
                "currentProjectId": "42"
            }),
            json!({
                "queries": ["SELECT 1;"],
                "descriptions": ["Viola campaniça"],
                "results": [[ArchiveMockServer::project_json(5, "Viola")]],
                "contextProject": { "id": 42, "title": "Romaria", "author": "X" }
            }),
        )
        .await;

    let request = QueryRequest {
        cookie_consent: true,
        user_ip: "10.0.0.1".to_string(),
        previous_queries: vec!["SELECT * FROM projects WHERE category = 'Cante';".to_string()],
        current_prompt: "e de viola?".to_string(),
        current_project_id: Some("42".to_string()),
    };
    let response = client_for(&server).query(&request).await.unwrap();

    assert_eq!(response.queries, vec!["SELECT 1;".to_string()]);
    assert_eq!(response.descriptions, vec!["Viola campaniça".to_string()]);
    assert_eq!(response.results[0][0].title, "Viola");
    assert_eq!(response.context_project.as_ref().unwrap().id, "42");
    assert!(response.is_aligned());
}

#[tokio::test]
async fn test_rate_limit_maps_to_dedicated_error() {
    let server = ArchiveMockServer::new().await;
    server.mock_status("POST", "/query", 429, "20 per 1 minute").await;

    let request = QueryRequest {
        cookie_consent: false,
        user_ip: "10.0.0.1".to_string(),
        previous_queries: vec![],
        current_prompt: "fado".to_string(),
        current_project_id: None,
    };
    let err = client_for(&server).query(&request).await.unwrap_err();

    assert!(matches!(err, ApiError::RateLimited));
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn test_missing_project_is_status_error() {
    let server = ArchiveMockServer::new().await;
    server.mock_status("GET", "/projects/999", 404, "Not Found").await;

    let err = client_for(&server).project("999").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = ArchiveMockServer::new().await;
    server.mock_status("GET", "/projects", 200, "<html>oops</html>").await;

    let err = client_for(&server).projects().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    let config = ClientConfig::new("http://127.0.0.1:9");
    let err = ArchiveClient::new(&config).unwrap().projects().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
}

#[test]
fn test_invalid_base_url_rejected() {
    let config = ClientConfig {
        api_url: "http://".to_string(),
        ..ClientConfig::default()
    };
    let err = ArchiveClient::new(&config).unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl { .. }));
}

#[tokio::test]
async fn test_public_ip_lookup() {
    let server = ArchiveMockServer::new().await;
    server.mock_ip("203.0.113.9").await;

    let config = ClientConfig::default().with_ip_lookup_url(&format!("{}/?format=json", server.uri()));
    let ip = PublicIpResolver::new(&config).unwrap().resolve().await.unwrap();

    assert_eq!(ip, "203.0.113.9");
}
