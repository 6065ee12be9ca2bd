//! Theme matrix driving generation
//!
//! The matrix is the fixed list of categories, themes, and keywords that the
//! sweep walks. A built-in matrix ships with the binary; an alternative one
//! can be loaded from a TOML file with the same shape.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EssaygenError, Result};

/// Essay genres produced for every theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Narrative,
    Argumentative,
}

impl Genre {
    /// Generation order within a theme
    pub const ALL: [Genre; 2] = [Genre::Narrative, Genre::Argumentative];

    /// Label used in metadata and rendered headings
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Narrative => "记叙文",
            Genre::Argumentative => "议论文",
        }
    }
}

/// One category with its themes and shared keywords
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeCategory {
    pub name: String,
    pub themes: Vec<String>,
    pub keywords: Vec<String>,
}

/// The full category/theme/keyword matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matrix {
    pub categories: Vec<ThemeCategory>,
}

impl Matrix {
    /// Built-in matrix, used when no file is supplied
    pub fn builtin() -> Self {
        let category = |name: &str, themes: &[&str], keywords: &[&str]| ThemeCategory {
            name: name.to_string(),
            themes: themes.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        };

        Matrix {
            categories: vec![
                category("成长类", &["坚持", "挫折", "自我突破"], &["成长", "勇气"]),
                category("情感类", &["亲情", "师生情", "陌生人温暖"], &["温暖", "感动"]),
                category("社会类", &["传统文化", "科技伦理", "环境保护"], &["传承", "责任"]),
            ],
        }
    }

    /// Load and validate a matrix from a TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EssaygenError::Matrix {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let matrix: Matrix = toml::from_str(&content)?;
        matrix.validate()?;
        Ok(matrix)
    }

    /// Keep only the named category, erroring when it does not exist
    pub fn retain_category(&mut self, name: &str) -> Result<()> {
        self.categories.retain(|c| c.name == name);
        if self.categories.is_empty() {
            return Err(EssaygenError::Matrix {
                message: format!("unknown category '{}'", name),
            });
        }
        Ok(())
    }

    /// Structural checks: non-empty names, themes, and keywords; no
    /// duplicate category or theme names (themes are keyed by name).
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(EssaygenError::Matrix {
                message: "matrix has no categories".to_string(),
            });
        }
        let mut seen_categories = Vec::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(EssaygenError::Matrix {
                    message: "category with empty name".to_string(),
                });
            }
            if seen_categories.contains(&category.name.as_str()) {
                return Err(EssaygenError::Matrix {
                    message: format!("duplicate category '{}'", category.name),
                });
            }
            seen_categories.push(category.name.as_str());

            if category.themes.is_empty() {
                return Err(EssaygenError::Matrix {
                    message: format!("category '{}' has no themes", category.name),
                });
            }
            if category.keywords.is_empty() {
                return Err(EssaygenError::Matrix {
                    message: format!("category '{}' has no keywords", category.name),
                });
            }
            let mut seen_themes = Vec::new();
            for theme in &category.themes {
                if theme.trim().is_empty() {
                    return Err(EssaygenError::Matrix {
                        message: format!("category '{}' has an empty theme", category.name),
                    });
                }
                if seen_themes.contains(&theme.as_str()) {
                    return Err(EssaygenError::Matrix {
                        message: format!(
                            "duplicate theme '{}' in category '{}'",
                            theme, category.name
                        ),
                    });
                }
                seen_themes.push(theme.as_str());
            }
        }
        Ok(())
    }

    /// Number of theme/genre pairs a full sweep will attempt
    pub fn pair_count(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.themes.len() * Genre::ALL.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matrix_is_valid() {
        let matrix = Matrix::builtin();
        matrix.validate().unwrap();
        assert_eq!(matrix.categories.len(), 3);
        assert_eq!(matrix.pair_count(), 18);
    }

    #[test]
    fn rejects_category_without_keywords() {
        let matrix = Matrix {
            categories: vec![ThemeCategory {
                name: "成长类".to_string(),
                themes: vec!["坚持".to_string()],
                keywords: vec![],
            }],
        };
        assert!(matrix.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_theme_within_category() {
        let matrix = Matrix {
            categories: vec![ThemeCategory {
                name: "成长类".to_string(),
                themes: vec!["坚持".to_string(), "坚持".to_string()],
                keywords: vec!["成长".to_string()],
            }],
        };
        assert!(matrix.validate().is_err());
    }

    #[test]
    fn retain_category_filters_and_errors_on_unknown() {
        let mut matrix = Matrix::builtin();
        matrix.retain_category("情感类").unwrap();
        assert_eq!(matrix.categories.len(), 1);
        assert_eq!(matrix.categories[0].name, "情感类");

        let mut matrix = Matrix::builtin();
        assert!(matrix.retain_category("不存在").is_err());
    }

    #[test]
    fn parses_matrix_from_toml() {
        let toml_src = r#"
            [[categories]]
            name = "成长类"
            themes = ["坚持"]
            keywords = ["成长", "勇气"]
        "#;
        let matrix: Matrix = toml::from_str(toml_src).unwrap();
        matrix.validate().unwrap();
        assert_eq!(matrix.categories[0].keywords.len(), 2);
    }
}
