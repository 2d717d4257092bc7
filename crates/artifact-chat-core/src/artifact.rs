//! Simulated artifacts
//!
//! Classification decides which kind of artifact a request produces; the
//! [`ArtifactLibrary`] supplies the canned payload for each kind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

const BUTTON_COMPONENT: &str = include_str!("../fixtures/button.jsx");
const AI_OVERVIEW: &str = include_str!("../fixtures/ai-overview.md");
const LANDSCAPE_IMAGE: &str = "/mountain-lake-vista.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Code,
    Image,
    Text,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Code => "code",
            ArtifactKind::Image => "image",
            ArtifactKind::Text => "text",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactKind::Code => "Code",
            ArtifactKind::Image => "Image",
            ArtifactKind::Text => "Text",
        }
    }
}

/// Payload of an artifact, shaped by its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArtifactContent {
    Code { language: String, source: String },
    Image { reference: String, alt: String },
    Text { document: String },
}

impl ArtifactContent {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactContent::Code { .. } => ArtifactKind::Code,
            ArtifactContent::Image { .. } => ArtifactKind::Image,
            ArtifactContent::Text { .. } => ArtifactKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub title: String,
    pub content: ArtifactContent,
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        self.content.kind()
    }

    /// File name used when downloading, or `None` for image references
    pub fn file_name(&self) -> Option<String> {
        self.download().map(|(name, _)| name)
    }

    /// Write the artifact into `dir` and return the written path
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        let (file_name, body) = self
            .download()
            .ok_or_else(|| anyhow!("{} artifacts cannot be downloaded", self.kind().display_name()))?;

        let path = dir.join(file_name);
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    fn download(&self) -> Option<(String, &str)> {
        let (extension, body) = match &self.content {
            ArtifactContent::Code { language, source } => (language.as_str(), source.as_str()),
            ArtifactContent::Text { document } => ("md", document.as_str()),
            ArtifactContent::Image { .. } => return None,
        };
        Some((format!("{}.{}", slugify(&self.title), extension), body))
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "artifact".to_string()
    } else {
        trimmed.to_string()
    }
}

/// One classification rule: any keyword present selects `kind`
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub keywords: &'static [&'static str],
    pub kind: ArtifactKind,
}

/// Checked in order, first match wins. Append new kinds at the end.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        keywords: &["code", "component"],
        kind: ArtifactKind::Code,
    },
    ClassificationRule {
        keywords: &["image"],
        kind: ArtifactKind::Image,
    },
    ClassificationRule {
        keywords: &["document"],
        kind: ArtifactKind::Text,
    },
];

/// Words that mark a user message as asking for an artifact
pub const ARTIFACT_TRIGGERS: &[&str] = &["code", "image", "document", "generate", "create"];

pub fn classify(content: &str) -> Option<ArtifactKind> {
    let lower = content.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| rule.kind)
}

pub fn requests_artifact(content: &str) -> bool {
    let lower = content.to_lowercase();
    ARTIFACT_TRIGGERS.iter().any(|t| lower.contains(t))
}

#[derive(Debug, Clone, PartialEq)]
struct ArtifactTemplate {
    title: String,
    content: ArtifactContent,
}

/// Title and payload for each artifact kind
#[derive(Debug, Clone)]
pub struct ArtifactLibrary {
    templates: HashMap<ArtifactKind, ArtifactTemplate>,
}

impl ArtifactLibrary {
    /// Library with no templates; every kind must be added with [`Self::with`]
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with(mut self, title: impl Into<String>, content: ArtifactContent) -> Self {
        self.templates.insert(
            content.kind(),
            ArtifactTemplate {
                title: title.into(),
                content,
            },
        );
        self
    }

    pub fn build(&self, kind: ArtifactKind, request: u64) -> Option<Artifact> {
        self.templates.get(&kind).map(|t| Artifact {
            id: format!("artifact-{}", request),
            title: t.title.clone(),
            content: t.content.clone(),
        })
    }
}

impl Default for ArtifactLibrary {
    fn default() -> Self {
        Self::empty()
            .with(
                "React Button Component",
                ArtifactContent::Code {
                    language: "jsx".to_string(),
                    source: BUTTON_COMPONENT.to_string(),
                },
            )
            .with(
                "Generated Landscape Image",
                ArtifactContent::Image {
                    reference: LANDSCAPE_IMAGE.to_string(),
                    alt: "Generated landscape".to_string(),
                },
            )
            .with(
                "AI Document",
                ArtifactContent::Text {
                    document: AI_OVERVIEW.to_string(),
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_priority_order() {
        assert_eq!(classify("Generate a React component"), Some(ArtifactKind::Code));
        assert_eq!(classify("Generate an image of a landscape"), Some(ArtifactKind::Image));
        assert_eq!(classify("Create a document about AI"), Some(ArtifactKind::Text));
        assert_eq!(classify("xyz"), None);
        // code beats image beats document
        assert_eq!(classify("an image of some code"), Some(ArtifactKind::Code));
        assert_eq!(classify("a document with an image"), Some(ArtifactKind::Image));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("SHOW ME THE CODE"), Some(ArtifactKind::Code));
        assert_eq!(classify("New Component"), Some(ArtifactKind::Code));
        assert_eq!(classify("An IMAGE"), Some(ArtifactKind::Image));
    }

    #[test]
    fn test_requests_artifact() {
        assert!(requests_artifact("Generate a React component"));
        assert!(requests_artifact("please CREATE something"));
        assert!(!requests_artifact("Show me all available commands"));
        // triggers without a matching rule still count
        assert!(requests_artifact("generate xyz"));
        assert_eq!(classify("generate xyz"), None);
    }

    #[test]
    fn test_default_library_titles() {
        let library = ArtifactLibrary::default();
        let code = library.build(ArtifactKind::Code, 1).unwrap();
        assert_eq!(code.title, "React Button Component");
        assert_eq!(code.kind(), ArtifactKind::Code);
        assert_eq!(code.id, "artifact-1");

        let image = library.build(ArtifactKind::Image, 2).unwrap();
        assert_eq!(image.title, "Generated Landscape Image");

        let text = library.build(ArtifactKind::Text, 3).unwrap();
        assert_eq!(text.title, "AI Document");
        match text.content {
            ArtifactContent::Text { document } => {
                assert!(document.starts_with("# Introduction to Artificial Intelligence"))
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_empty_library_builds_nothing() {
        assert!(ArtifactLibrary::empty().build(ArtifactKind::Code, 1).is_none());
    }

    #[test]
    fn test_file_names() {
        let library = ArtifactLibrary::default();
        let code = library.build(ArtifactKind::Code, 1).unwrap();
        assert_eq!(code.file_name().as_deref(), Some("react-button-component.jsx"));
        let text = library.build(ArtifactKind::Text, 1).unwrap();
        assert_eq!(text.file_name().as_deref(), Some("ai-document.md"));
        let image = library.build(ArtifactKind::Image, 1).unwrap();
        assert_eq!(image.file_name(), None);
    }

    #[test]
    fn test_slugify_edge_cases() {
        assert_eq!(slugify("  Hello,  World!  "), "hello-world");
        assert_eq!(slugify("???"), "artifact");
    }

    #[test]
    fn test_export_writes_source() {
        let dir = tempfile::tempdir().unwrap();
        let code = ArtifactLibrary::default().build(ArtifactKind::Code, 1).unwrap();
        let path = code.export(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("react-button-component.jsx"));
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("export default Button;"));
    }

    #[test]
    fn test_export_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let image = ArtifactLibrary::default().build(ArtifactKind::Image, 1).unwrap();
        let err = image.export(dir.path()).unwrap_err();
        assert!(err.to_string().contains("cannot be downloaded"));
    }
}
