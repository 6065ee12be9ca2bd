//! Prompt templates for the two genres
//!
//! Placeholders are substituted verbatim: `{theme}` with the theme name,
//! `{object}` with the first keyword of the category, `{keywords}` with the
//! full keyword list joined by `、`.

use crate::error::{EssaygenError, Result};
use crate::matrix::Genre;

const NARRATIVE_TEMPLATE: &str = r#"你是一位中考作文专家，请根据以下要求创作记叙文：
主题：{theme}
要求：
1. 使用【{object}】作为核心意象
2. 包含3个感官细节（视觉/听觉/触觉各1个）
3. 采用双线结构（明线：{object}变化，暗线：情感变化）
4. 结尾用"原来..."句式升华"#;

const ARGUMENTATIVE_TEMPLATE: &str = r#"你是一位中考作文专家，请根据以下要求创作议论文：
主题：{theme}
要求：
1. 使用"现象-论点-正反论证-结论"结构
2. 包含1句古诗文引用和1个现代案例
3. 结尾使用排比句式
4. 关键词：{keywords}"#;

/// Separator for keyword lists in prompts and rendered output
pub const KEYWORD_SEPARATOR: &str = "、";

/// Build the prompt for one theme/genre pair
pub fn build_prompt(genre: Genre, theme: &str, keywords: &[String]) -> Result<String> {
    let object = keywords.first().ok_or_else(|| EssaygenError::Template {
        message: format!("theme '{}' has no keywords to use as the core object", theme),
    })?;
    let joined = keywords.join(KEYWORD_SEPARATOR);

    let template = match genre {
        Genre::Narrative => NARRATIVE_TEMPLATE,
        Genre::Argumentative => ARGUMENTATIVE_TEMPLATE,
    };

    Ok(template
        .replace("{theme}", theme)
        .replace("{object}", object)
        .replace("{keywords}", &joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn narrative_substitutes_theme_and_object_verbatim() {
        let prompt = build_prompt(Genre::Narrative, "坚持", &keywords(&["成长", "勇气"])).unwrap();
        assert!(prompt.contains("主题：坚持"));
        assert!(prompt.contains("使用【成长】作为核心意象"));
        assert!(prompt.contains("明线：成长变化"));
        assert!(!prompt.contains("{theme}"));
        assert!(!prompt.contains("{object}"));
    }

    #[test]
    fn argumentative_joins_keywords_verbatim() {
        let prompt =
            build_prompt(Genre::Argumentative, "传统文化", &keywords(&["传承", "责任"])).unwrap();
        assert!(prompt.contains("主题：传统文化"));
        assert!(prompt.contains("关键词：传承、责任"));
        assert!(!prompt.contains("{keywords}"));
    }

    #[test]
    fn values_are_not_trimmed_or_escaped() {
        let prompt = build_prompt(Genre::Narrative, " 坚持 ", &keywords(&["`成长`"])).unwrap();
        assert!(prompt.contains("主题： 坚持 "));
        assert!(prompt.contains("【`成长`】"));
    }

    #[test]
    fn empty_keyword_list_is_an_error() {
        let err = build_prompt(Genre::Narrative, "坚持", &[]).unwrap_err();
        assert!(err.to_string().contains("坚持"));
    }
}
