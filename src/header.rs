//! TEI file description built from the project configuration.

use crate::config::{Config, License};
use crate::ids::IdGenerator;

const UNTITLED: &str = "untitled letters project";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Editor {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Editor {
    /// Read `Jane Doe <jane@example.org>`, a bare address, or a plain name.
    pub fn parse(entry: &str) -> Self {
        let entry = entry.trim();
        if entry.contains('@') {
            if let Some((name, rest)) = entry.split_once('<')
                && let Some(email) = rest.trim_end().strip_suffix('>')
            {
                return Editor {
                    name: non_empty(name.trim().trim_matches('"')),
                    email: non_empty(email.trim()),
                };
            }
            if !entry.contains(char::is_whitespace) {
                return Editor {
                    name: None,
                    email: Some(entry.to_string()),
                };
            }
        }
        Editor {
            name: non_empty(entry),
            email: None,
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescription {
    pub title: String,
    pub title_id: String,
    /// Always at least one, possibly empty, editor
    pub editors: Vec<Editor>,
    pub publishers: Vec<String>,
    pub file_url: String,
    /// Generation timestamp
    pub date: String,
    pub license: License,
}

impl FileDescription {
    pub fn from_config(config: &Config, default_url: &str) -> Self {
        let title = config
            .project
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(UNTITLED)
            .to_string();
        let title_id = IdGenerator::seeded(&title).prefixed_id("title");

        let mut editors: Vec<Editor> = config
            .project
            .editor
            .iter()
            .flat_map(|entry| entry.lines())
            .filter(|line| !line.trim().is_empty())
            .map(Editor::parse)
            .collect();
        if editors.is_empty() {
            tracing::warn!("Editor missing");
            editors.push(Editor::default());
        }

        let mut publishers: Vec<String> = config
            .project
            .publisher
            .iter()
            .flat_map(|entry| entry.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if publishers.is_empty() {
            publishers = editors.iter().filter_map(|e| e.name.clone()).collect();
        }

        Self {
            title,
            title_id,
            editors,
            publishers,
            file_url: config
                .project
                .file_url
                .clone()
                .unwrap_or_else(|| default_url.to_string()),
            date: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            license: config.license(),
        }
    }
}
