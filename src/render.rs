//! Markdown rendering of the essay book

use std::path::Path;

use crate::book::{EssayBook, ThemeEntry};
use crate::error::{EssaygenError, Result};
use crate::matrix::Genre;
use crate::prompts::KEYWORD_SEPARATOR;

const TITLE: &str = "中考双文体范文库";

/// Render the whole book into one Markdown document.
///
/// Layout: a document title, one `##` heading per category, one `###`
/// subheading per theme with its keyword line, then a `####` section per
/// generated genre wrapped in horizontal rules.
pub fn render_markdown(book: &EssayBook) -> String {
    let mut md = format!("# {}\n\n", TITLE);
    for category in book.categories() {
        md.push_str(&format!("## {}\n\n", category.name));
        for theme in &category.themes {
            md.push_str(&format!("### 主题：{}\n", theme.theme));
            md.push_str(&format!(
                "**关键词**：`{}`\n\n",
                theme.keywords.join(KEYWORD_SEPARATOR)
            ));
            for genre in Genre::ALL {
                push_genre_section(&mut md, theme, genre);
            }
        }
    }
    md
}

fn push_genre_section(md: &mut String, theme: &ThemeEntry, genre: Genre) {
    if let Some(essay) = theme.essay(genre) {
        md.push_str(&format!(
            "#### {}\n---\n{}\n\n---\n\n",
            genre.label(),
            essay.content
        ));
    }
}

/// Write the rendered document to disk (UTF-8)
pub fn save_book(path: &Path, book: &EssayBook) -> Result<()> {
    std::fs::write(path, render_markdown(book)).map_err(|e| EssaygenError::Io {
        message: format!("failed to write {}: {}", path.display(), e),
    })
}
