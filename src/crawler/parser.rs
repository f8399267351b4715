//! HTML document parser
//!
//! This module turns a fetched HTML page into:
//! - The page title
//! - The visible text, one text node per line
//! - Every `<a href>` with its anchor text, unresolved
//!
//! Link resolution and filtering belong to the classifier.

use scraper::{Html, Node, Selector};
use thiserror::Error;
use url::Url;

/// Elements whose text content is never part of the page text
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Errors produced by a document parser
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("failed to parse {url}: {message}")]
    Document { url: String, message: String },
}

/// A raw link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub anchor_text: String,
    pub href: String,
}

impl PageLink {
    pub fn new(anchor_text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            anchor_text: anchor_text.into(),
            href: href.into(),
        }
    }
}

/// Parsed content of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub title: Option<String>,
    pub text: String,
    pub links: Vec<PageLink>,
}

/// Extracts text and links from a fetched document
pub trait DocumentParser: Send + Sync {
    /// Parses `html`, fetched from `url`
    fn parse(&self, url: &Url, html: &str) -> Result<ParsedDocument, ParseError>;
}

/// `scraper`-based HTML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDocumentParser;

impl HtmlDocumentParser {
    pub fn new() -> Self {
        Self
    }
}

fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

impl DocumentParser for HtmlDocumentParser {
    fn parse(&self, _url: &Url, html: &str) -> Result<ParsedDocument, ParseError> {
        let anchors = compile("a[href]")?;
        let title = compile("title")?;
        let document = Html::parse_document(html);

        Ok(ParsedDocument {
            title: extract_title(&document, &title),
            text: extract_text(&document),
            links: extract_links(&document, &anchors),
        })
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects visible text nodes, trimmed, one per line
fn extract_text(document: &Html) -> String {
    let mut lines = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            matches!(
                ancestor.value(),
                Node::Element(element) if HIDDEN_TEXT_ELEMENTS.contains(&element.name())
            )
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.replace('\u{a0}', " "));
        }
    }

    lines.join("\n")
}

/// Collects every anchor's href and text
fn extract_links(document: &Html, selector: &Selector) -> Vec<PageLink> {
    document
        .select(selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let anchor_text = element.text().collect::<String>().trim().to_string();
            Some(PageLink::new(anchor_text, href))
        })
        .collect()
}
