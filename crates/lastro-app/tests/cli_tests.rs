use async_trait::async_trait;
use clap::Parser;
use pretty_assertions::assert_eq;

use lastro::{Cli, Commands, ConsentChoice};
use lastro_api::{ApiError, ArchiveService};
use lastro_types::{Project, QueryRequest, QueryResponse, Suggestion};

struct FixedArchive;

fn project(id: &str, title: &str) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        author: "Tiago Pereira".to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl ArchiveService for FixedArchive {
    async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        Ok(vec![project("1", "Moda"), project("2", "Baile")])
    }

    async fn project(&self, id: &str) -> Result<Project, ApiError> {
        match id {
            "42" => Ok(project("42", "Romaria")),
            _ => Err(ApiError::Status {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }

    async fn suggestions(&self, id: &str) -> Result<Vec<Suggestion>, ApiError> {
        Ok(vec![Suggestion {
            description: format!("Perto de {}", id),
            projects: vec![project("3", "Chula")],
        }])
    }

    async fn random_projects(&self, count: usize) -> Result<Vec<Project>, ApiError> {
        Ok((0..count).map(|i| project(&i.to_string(), "Aleatório")).collect())
    }

    async fn query(&self, _request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        Ok(QueryResponse::default())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_query_mode() {
        let cli = Cli::try_parse_from(["lastro", "--query", "fado de coimbra", "--pretty", "-v"]).unwrap();
        assert_eq!(cli.query.as_deref(), Some("fado de coimbra"));
        assert!(cli.pretty);
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["lastro", "random"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Random { count: 10 }));

        let cli = Cli::try_parse_from(["lastro", "project", "/projetos/42"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Project { id: "/projetos/42".to_string() }));
    }

    #[test]
    fn test_parse_consent_choice() {
        let cli = Cli::try_parse_from(["lastro", "--consent", "reject"]).unwrap();
        assert_eq!(cli.consent, Some(ConsentChoice::Reject));
        assert!(!ConsentChoice::Reject.accepted());
        assert!(Cli::try_parse_from(["lastro", "--consent", "maybe"]).is_err());
    }

    #[tokio::test]
    async fn test_project_command_accepts_links() {
        colored::control::set_override(false);
        let output = Commands::Project { id: "https://lastro.pt/projetos/42".to_string() }
            .execute(&FixedArchive, false)
            .await
            .unwrap();
        assert!(output.starts_with("Romaria\nTiago Pereira\n"));
    }

    #[tokio::test]
    async fn test_projects_command_plain_and_json() {
        let plain = Commands::Projects.execute(&FixedArchive, false).await.unwrap();
        assert_eq!(plain, "[1] Moda - Tiago Pereira\n[2] Baile - Tiago Pereira");

        let json = Commands::Random { count: 2 }.execute(&FixedArchive, true).await.unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["title"], "Aleatório");
    }

    #[tokio::test]
    async fn test_missing_project_is_an_error() {
        let err = Commands::Project { id: "7".to_string() }
            .execute(&FixedArchive, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
