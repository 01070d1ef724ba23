use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Language tag used when nothing better is known
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// The code under audit
///
/// Immutable once constructed. The pipeline only ever borrows it (or clones it
/// into a shared handle for worker tasks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    content: String,
    language: String,
}

impl Artifact {
    pub fn new(content: impl Into<String>, language: impl Into<String>) -> Self {
        let language = language.into();
        let language = language.trim().to_lowercase();
        Self {
            content: content.into(),
            language: if language.is_empty() {
                DEFAULT_LANGUAGE.to_string()
            } else {
                language
            },
        }
    }

    /// Read an artifact from disk, inferring the language from the extension
    /// unless one is given explicitly.
    pub fn from_path(path: &Path, language: Option<&str>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact: {}", path.display()))?;

        let language = match language {
            Some(lang) => lang.to_string(),
            None => path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(language_for_extension)
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
        };

        Ok(Self::new(content, language))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// File extension the static-analysis engine should see for this language
    pub fn file_extension(&self) -> &'static str {
        match self.language.as_str() {
            "javascript" | "js" | "node" => "js",
            "typescript" | "ts" => "ts",
            "jsx" => "jsx",
            "tsx" => "tsx",
            "python" | "py" => "py",
            "php" => "php",
            "java" => "java",
            "kotlin" | "kt" => "kt",
            "go" | "golang" => "go",
            "ruby" | "rb" => "rb",
            "c" => "c",
            "cpp" | "c++" | "cxx" => "cpp",
            "csharp" | "c#" | "cs" => "cs",
            "rust" | "rs" => "rs",
            "html" => "html",
            "sql" => "sql",
            "bash" | "sh" | "shell" => "sh",
            _ => "txt",
        }
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Map a file extension back to a language tag
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "js" | "mjs" | "cjs" => Some("javascript"),
        "jsx" => Some("jsx"),
        "ts" | "mts" => Some("typescript"),
        "tsx" => Some("tsx"),
        "py" => Some("python"),
        "php" => Some("php"),
        "java" => Some("java"),
        "kt" => Some("kotlin"),
        "go" => Some("go"),
        "rb" => Some("ruby"),
        "c" | "h" => Some("c"),
        "cpp" | "cc" | "cxx" | "hpp" => Some("cpp"),
        "cs" => Some("csharp"),
        "rs" => Some("rust"),
        "html" | "htm" => Some("html"),
        "sql" => Some("sql"),
        "sh" | "bash" => Some("bash"),
        _ => None,
    }
}
