//! Sequential generation sweep over the theme matrix
//!
//! One theme at a time, narrative then argumentative. Every successful essay
//! is upserted into the book and the whole document is re-rendered and saved,
//! so an interrupted run leaves a usable file behind. A failed pair is
//! skipped, not fatal.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::book::{Essay, EssayBook, ThemeEntry};
use crate::completion::CompletionProvider;
use crate::config::Config;
use crate::error::Result;
use crate::matrix::{Genre, Matrix};
use crate::prompts::build_prompt;
use crate::render::save_book;

/// Counts for one full sweep
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RunSummary {
    pub generated: usize,
    pub skipped: usize,
}

pub struct Generator {
    provider: Arc<dyn CompletionProvider>,
    config: Config,
    matrix: Matrix,
}

impl Generator {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: Config, matrix: Matrix) -> Self {
        Self {
            provider,
            config,
            matrix,
        }
    }

    /// Run the full sweep, saving the document after every successful essay
    pub async fn run(&self, book: &mut EssayBook) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for category in &self.matrix.categories {
            info!("Category {}", category.name);
            for theme in &category.themes {
                let mut entry = ThemeEntry::new(theme.clone(), category.keywords.clone());
                for genre in Genre::ALL {
                    match self
                        .generate_one(&category.name, theme, &category.keywords, genre)
                        .await?
                    {
                        Some(essay) => {
                            entry.set_essay(genre, essay);
                            book.upsert(&category.name, entry.clone());
                            save_book(&self.config.output.path, book)?;
                            summary.generated += 1;
                            self.pace().await;
                        }
                        None => summary.skipped += 1,
                    }
                }
            }
        }

        // Final save so the file exists even when every pair was skipped
        save_book(&self.config.output.path, book)?;
        info!(
            "Sweep finished: {} generated, {} skipped, saved to {}",
            summary.generated,
            summary.skipped,
            self.config.output.path.display()
        );
        Ok(summary)
    }

    /// Generate one theme/genre pair. Exhausted retries yield `None`; the
    /// caller skips the pair and the document stays incomplete for it.
    async fn generate_one(
        &self,
        category: &str,
        theme: &str,
        keywords: &[String],
        genre: Genre,
    ) -> Result<Option<Essay>> {
        let prompt = build_prompt(genre, theme, keywords)?;

        match self.provider.complete(&prompt).await {
            Ok(content) => {
                let content = content.trim().to_string();
                info!(
                    "Generated {} for {}/{}: {}",
                    genre.label(),
                    category,
                    theme,
                    preview(&content)
                );
                Ok(Some(Essay {
                    content,
                    generated_at: Utc::now(),
                    genre,
                    keywords: keywords.to_vec(),
                }))
            }
            Err(e) => {
                warn!(
                    "Skipping {} for {}/{}: {:#}",
                    genre.label(),
                    category,
                    theme,
                    e
                );
                Ok(None)
            }
        }
    }

    async fn pace(&self) {
        let ms = self.config.generation.pacing_delay_ms;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

// Short log preview, char-safe for CJK content
fn preview(content: &str) -> String {
    const MAX_CHARS: usize = 60;
    let mut s: String = content.chars().take(MAX_CHARS).collect();
    if content.chars().count() > MAX_CHARS {
        s.push_str("...");
    }
    s.replace('\n', " ")
}
