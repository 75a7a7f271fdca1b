use colored::Colorize;
use regex::Regex;

use lastro_chat::ProjectView;
use lastro_types::{ChatMessage, Project, Suggestion};

/// Shown in place of results when a request failed
pub const FAILURE_TEXT: &str = "Não foi possível comunicar com o servidor. Tente novamente mais tarde.";

/// How many of the random projects are listed next to a project
const RANDOM_PREVIEW: usize = 10;

// ============================================================================
// Project references
// ============================================================================

/// Extract a project id from a bare id or from anything containing a
/// `/projetos/<id>` path, such as a link copied from the website
pub fn parse_project_ref(input: &str) -> Option<String> {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Some(input.to_string());
    }

    let re = Regex::new(r"/projetos/(\d+)/?(?:[?#].*)?$").ok()?;
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The id a reference points at, or the input itself when it is not a
/// recognisable reference
pub fn project_id_or_raw(input: &str) -> String {
    parse_project_ref(input).unwrap_or_else(|| input.trim().to_string())
}

// ============================================================================
// Messages
// ============================================================================

pub fn results_label(count: usize) -> String {
    if count == 1 {
        format!("{} potencial resultado", count)
    } else {
        format!("{} potenciais resultados", count)
    }
}

pub fn message_header(message: &ChatMessage) -> String {
    format!(
        "pesquisa #{} — {}",
        message.search_number(),
        results_label(message.total_results())
    )
}

/// Full text block for one message, results or error placeholder
pub fn message(message: &ChatMessage) -> String {
    let mut out = String::new();

    if message.is_error_placeholder() {
        out.push_str(&format!("{}\n", message.prompt.bright_white()));
        out.push_str(&format!("{}\n", FAILURE_TEXT.red()));
        return out;
    }

    out.push_str(&format!("{}\n", message_header(message).to_uppercase().bright_black()));
    out.push_str(&format!("{}\n", message.prompt.bold()));
    if let Some(project) = &message.context_project {
        out.push_str(&format!(
            "{}\n",
            format!("sobre {} de {}", project.title, project.author).bright_black()
        ));
    }
    out.push_str(&format!("{}\n", "─".repeat(60).bright_black()));

    for (title, projects) in message.groups() {
        out.push_str(&format!("\n  {}\n", title.bright_cyan().bold()));
        for project in projects {
            out.push_str(&format!("    {}\n", project_line(project)));
        }
    }

    out
}

// ============================================================================
// Projects
// ============================================================================

/// `[id] title - author (year, location)` with empty parts left out
pub fn project_line(project: &Project) -> String {
    let mut line = format!("[{}] {}", project.id, project.title);
    if !project.author.trim().is_empty() {
        line.push_str(&format!(" - {}", project.author));
    }

    let details: Vec<&str> = [project.year().unwrap_or(""), project.location.as_str()]
        .into_iter()
        .filter(|d| !d.trim().is_empty())
        .collect();
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }

    line
}

pub fn project_list(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "Nenhum projeto encontrado.".to_string();
    }

    projects
        .iter()
        .map(project_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn project_details(project: &Project) -> String {
    let mut out = format!("{}\n", project.title.bright_cyan().bold());
    if !project.author.is_empty() {
        out.push_str(&format!("{}\n", project.author));
    }

    let fields = [
        ("Categoria", project.category.as_str()),
        ("Data", project.date.as_str()),
        ("Local", project.location.as_str()),
        ("Instrumentos", project.instruments.as_str()),
    ];
    for (label, value) in fields.into_iter().chain(project.credits()) {
        if !value.trim().is_empty() {
            out.push_str(&format!("{}: {}\n", label.bright_yellow(), value));
        }
    }

    let keywords = project.keyword_list();
    if !keywords.is_empty() {
        out.push_str(&format!("{}: {}\n", "Palavras-chave".bright_yellow(), keywords.join(", ")));
    }
    if !project.info_pool.trim().is_empty() {
        out.push_str(&format!("\n{}\n", project.info_pool));
    }
    if !project.link.is_empty() {
        out.push_str(&format!("{}\n", project.link.bright_blue().underline()));
    }

    out
}

pub fn suggestions(suggestions: &[Suggestion]) -> String {
    let mut out = String::new();
    for suggestion in suggestions.iter().filter(|s| !s.projects.is_empty()) {
        out.push_str(&format!("\n  {}\n", suggestion.description.bright_cyan().bold()));
        for project in &suggestion.projects {
            out.push_str(&format!("    {}\n", project_line(project)));
        }
    }
    out
}

pub fn project_view(view: &ProjectView) -> String {
    let mut out = project_details(&view.project);
    out.push_str(&suggestions(&view.suggestions));

    if !view.random.is_empty() {
        out.push_str(&format!("\n  {}\n", "Outros projetos".bright_cyan().bold()));
        for project in view.random.iter().take(RANDOM_PREVIEW) {
            out.push_str(&format!("    {}\n", project_line(project)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastro_types::MessageInput;
    use pretty_assertions::assert_eq;

    fn project(id: &str, title: &str) -> Project {
        Project {
            id: id.to_string(),
            title: title.to_string(),
            author: "Autor".to_string(),
            date: "2020-06-01".to_string(),
            location: "Mértola".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_project_ref() {
        assert_eq!(parse_project_ref("1434903174"), Some("1434903174".to_string()));
        assert_eq!(parse_project_ref(" /projetos/42 "), Some("42".to_string()));
        assert_eq!(
            parse_project_ref("https://lastro.pt/projetos/77/?ref=x"),
            Some("77".to_string())
        );
        assert_eq!(parse_project_ref("/projetos/abc"), None);
        assert_eq!(parse_project_ref("/explorar"), None);
        assert_eq!(parse_project_ref(""), None);
        assert_eq!(project_id_or_raw(" xyz "), "xyz");
    }

    #[test]
    fn test_results_label_singular_and_plural() {
        assert_eq!(results_label(1), "1 potencial resultado");
        assert_eq!(results_label(0), "0 potenciais resultados");
        assert_eq!(results_label(12), "12 potenciais resultados");
    }

    #[test]
    fn test_message_header_counts_all_groups() {
        let message = MessageInput::new("cante")
            .with_results(vec![vec![project("1", "A"), project("2", "B")], vec![project("3", "C")]])
            .into_message(4);
        assert_eq!(message_header(&message), "pesquisa #5 — 3 potenciais resultados");
    }

    #[test]
    fn test_placeholder_renders_failure_text() {
        colored::control::set_override(false);
        let text = message(&MessageInput::failed("viola braguesa").into_message(0));
        assert_eq!(text, format!("viola braguesa\n{}\n", FAILURE_TEXT));
    }

    #[test]
    fn test_message_lists_non_empty_groups_with_titles() {
        colored::control::set_override(false);
        let mut input = MessageInput::new("cante").with_results(vec![
            vec![project("1", "Moda")],
            vec![],
            vec![project("3", "Baile")],
        ]);
        input.queries = Some(vec!["q0".into(), "q1".into(), "q2".into()]);
        input.descriptions = Some(vec!["Cante alentejano".into(), "".into(), "".into()]);

        let text = message(&input.into_message(0));

        assert!(text.starts_with("PESQUISA #1 — 2 POTENCIAIS RESULTADOS\ncante\n"));
        assert!(text.contains("\n  Cante alentejano\n    [1] Moda - Autor (2020, Mértola)\n"));
        assert!(text.contains("\n  q2\n    [3] Baile - Autor (2020, Mértola)\n"));
        assert!(!text.contains("q1"));
    }

    #[test]
    fn test_project_line_skips_empty_parts() {
        let bare = Project {
            id: "9".to_string(),
            title: "Sem dados".to_string(),
            ..Default::default()
        };
        assert_eq!(project_line(&bare), "[9] Sem dados");
        assert_eq!(project_list(&[]), "Nenhum projeto encontrado.");
    }
}
