//! News article documents.

use crate::tokenize::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One news article as stored in the dataset.
///
/// Only the fields the indexer reads are modeled; anything else in the
/// JSON is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline.
    #[serde(default)]
    pub title: Option<String>,
    /// Source URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Byline.
    #[serde(default)]
    pub author: Option<String>,
    /// Body text, already tokenized by the dataset producer.
    #[serde(default)]
    pub preprocessed_text: Vec<String>,
}

impl Article {
    /// Parses an article from JSON.
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }

    /// Every distinct token to index for this article.
    ///
    /// Body tokens come first, then title tokens, then author tokens,
    /// each kept at its first occurrence.
    pub fn tokens(&self) -> Vec<String> {
        let title = self.title.as_deref().map(tokenize).unwrap_or_default();
        let author = self.author.as_deref().map(tokenize).unwrap_or_default();

        let mut seen = HashSet::new();
        self.preprocessed_text
            .iter()
            .cloned()
            .chain(title)
            .chain(author)
            .filter(|token| !token.is_empty())
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }

    /// Host part of the article URL, if any.
    pub fn domain(&self) -> Option<&str> {
        let url = self.url.as_deref()?;
        let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        (!host.is_empty()).then_some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "Northeastern wins the Beanpot",
        "url": "https://www.example.com/sports/beanpot?ref=rss",
        "author": "Jane Husky",
        "published": "2025-02-10",
        "preprocessed_text": ["hockey", "northeastern", "boston", "hockey"]
    }"#;

    #[test]
    fn parses_known_fields_and_ignores_others() {
        let article = Article::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(article.title.as_deref(), Some("Northeastern wins the Beanpot"));
        assert_eq!(article.preprocessed_text.len(), 4);
    }

    #[test]
    fn tokens_merge_body_title_author() {
        let article = Article::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            article.tokens(),
            vec!["hockey", "northeastern", "boston", "wins", "the", "beanpot", "jane", "husky"]
        );
    }

    #[test]
    fn missing_fields_default() {
        let article = Article::from_json(b"{}").unwrap();
        assert_eq!(article, Article::default());
        assert!(article.tokens().is_empty());
        assert_eq!(article.domain(), None);
    }

    #[test]
    fn domain_is_url_host() {
        let article = Article::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(article.domain(), Some("www.example.com"));

        let bare = Article {
            url: Some("news.example.org/a/b".into()),
            ..Article::default()
        };
        assert_eq!(bare.domain(), Some("news.example.org"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Article::from_json(b"{\"title\": ").is_err());
        assert!(Article::from_json(b"{\"preprocessed_text\": 7}").is_err());
    }
}
