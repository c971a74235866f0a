//! Queryable wrapper over the parsed song page markup.
//!
//! Wraps `scraper::Html` behind the small capability surface the extractor
//! needs, so extraction logic stays testable against fixture documents and
//! decoupled from the parsing library. A selector matching zero elements is
//! never an error; only constructing the document from bad bytes can fail.

use scraper::{ElementRef, Html, Selector};

use crate::error::DocumentError;

pub struct SongDocument {
    html: Html,
}

impl SongDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self {
            html: Html::parse_document(text),
        })
    }

    /// Inner markup of every element matching `css`, in document order.
    pub fn inner_html_all(&self, css: &str) -> Vec<String> {
        self.html
            .select(&compile(css))
            .map(|element| element.inner_html())
            .collect()
    }

    /// Visible text of the first element matching `css`, descendant markup
    /// stripped.
    pub fn first_text(&self, css: &str) -> Option<String> {
        self.html.select(&compile(css)).next().map(element_text)
    }

    /// Value of a named attribute on the first element matching `css`;
    /// `None` when the element or the attribute is absent.
    pub fn first_attr(&self, css: &str, name: &str) -> Option<String> {
        self.html
            .select(&compile(css))
            .next()
            .and_then(|element| element.value().attr(name))
            .map(str::to_string)
    }

    /// For each element matching `css`, the texts of its first and last
    /// element children. With a single child both sides resolve to that
    /// child; with none, both sides are empty.
    pub fn child_edge_texts(&self, css: &str) -> Vec<(String, String)> {
        self.html
            .select(&compile(css))
            .map(|element| {
                let children: Vec<ElementRef> =
                    element.children().filter_map(ElementRef::wrap).collect();
                let first = children.first().map(|c| element_text(*c)).unwrap_or_default();
                let last = children.last().map(|c| element_text(*c)).unwrap_or_default();
                (first, last)
            })
            .collect()
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect()
}

fn compile(css: &str) -> Selector {
    // All selectors in this crate are static and known-valid
    Selector::parse(css).expect("valid selector")
}
