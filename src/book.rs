//! In-memory accumulation of generated essays
//!
//! The book mirrors the rendered document: categories in insertion order,
//! each holding theme entries keyed by theme name. All mutation goes through
//! [`EssayBook::upsert`] so a theme name stays unique within its category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matrix::Genre;

/// A single generated essay with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Essay {
    pub content: String,
    pub generated_at: DateTime<Utc>,
    pub genre: Genre,
    pub keywords: Vec<String>,
}

/// One theme with its keyword list and per-genre slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeEntry {
    pub theme: String,
    pub keywords: Vec<String>,
    pub narrative: Option<Essay>,
    pub argumentative: Option<Essay>,
}

impl ThemeEntry {
    pub fn new(theme: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            theme: theme.into(),
            keywords,
            narrative: None,
            argumentative: None,
        }
    }

    pub fn essay(&self, genre: Genre) -> Option<&Essay> {
        match genre {
            Genre::Narrative => self.narrative.as_ref(),
            Genre::Argumentative => self.argumentative.as_ref(),
        }
    }

    pub fn set_essay(&mut self, genre: Genre, essay: Essay) {
        match genre {
            Genre::Narrative => self.narrative = Some(essay),
            Genre::Argumentative => self.argumentative = Some(essay),
        }
    }
}

/// A category heading with its accumulated themes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub themes: Vec<ThemeEntry>,
}

/// The whole document model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EssayBook {
    categories: Vec<CategoryEntry>,
}

impl EssayBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Insert a theme under a category, or overwrite the stored entry when
    /// the theme already exists. A genre slot that is `None` on the incoming
    /// entry leaves the stored essay in place, so a narrative generated
    /// earlier survives the argumentative update.
    pub fn upsert(&mut self, category: &str, entry: ThemeEntry) {
        if let Some(pos) = self.categories.iter().position(|c| c.name == category) {
            merge_theme(&mut self.categories[pos], entry);
        } else {
            self.categories.push(CategoryEntry {
                name: category.to_string(),
                themes: vec![entry],
            });
        }
    }
}

fn merge_theme(category: &mut CategoryEntry, entry: ThemeEntry) {
    match category.themes.iter_mut().find(|t| t.theme == entry.theme) {
        Some(existing) => {
            existing.keywords = entry.keywords;
            if let Some(narrative) = entry.narrative {
                existing.narrative = Some(narrative);
            }
            if let Some(argumentative) = entry.argumentative {
                existing.argumentative = Some(argumentative);
            }
        }
        None => category.themes.push(entry),
    }
}
