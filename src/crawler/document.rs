//! HTML document wrapper
//!
//! [`Document`] owns a parsed `scraper::Html` tree plus the URL that
//! relative links resolve against. `scraper::Html` is not `Send`, so a
//! document must be built and consumed without crossing an `.await`.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use thiserror::Error;
use url::Url;

/// Reasons a fetched body cannot be turned into a document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Response body is empty")]
    EmptyBody,
}

/// A parsed HTML page
pub struct Document {
    html: Html,
    url: Url,
    base_url: Url,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url.as_str())
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl Document {
    /// Parses a response body fetched from `url`
    ///
    /// The body is decoded as UTF-8 when valid, otherwise as Windows-1252.
    /// HTML parsing itself never fails; only an empty body is rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use sitecrawl::crawler::Document;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://cc.gatech.edu/").unwrap();
    /// let doc = Document::parse(b"<title> Home </title><a href=\"/a\">a</a>", &url).unwrap();
    /// assert_eq!(doc.title(), "Home");
    /// assert_eq!(doc.hrefs(), vec!["/a".to_string()]);
    /// ```
    pub fn parse(body: &[u8], url: &Url) -> Result<Self, ParseError> {
        Self::parse_with_charset(body, url, None)
    }

    /// Parses a response body using the charset the server declared
    ///
    /// An unknown or missing label falls back to the detection in
    /// [`Document::parse`]. Malformed sequences decode to U+FFFD.
    pub fn parse_with_charset(
        body: &[u8],
        url: &Url,
        charset: Option<&str>,
    ) -> Result<Self, ParseError> {
        let text = decode_body(body, charset);
        if text.trim().is_empty() {
            return Err(ParseError::EmptyBody);
        }

        let html = Html::parse_document(&text);
        let base_url = find_base_href(&html)
            .and_then(|href| url.join(href.trim()).ok())
            .unwrap_or_else(|| url.clone());

        Ok(Self {
            html,
            url: url.clone(),
            base_url,
        })
    }

    /// The URL the page was fetched from, after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL relative links resolve against
    ///
    /// This is the `<base href>` when the page declares one, otherwise the
    /// fetched URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Text of the first `<title>`, trimmed; empty when there is none
    pub fn title(&self) -> String {
        let Ok(selector) = Selector::parse("title") else {
            return String::new();
        };

        self.html
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Direct text children of every element matching `kind`, in document
    /// order
    ///
    /// Text inside nested elements is not included; it belongs to the nested
    /// element. Blank fragments are skipped.
    pub fn texts_of(&self, kind: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(kind) else {
            return Vec::new();
        };

        self.html
            .select(&selector)
            .flat_map(direct_text)
            .filter(|text| !text.trim().is_empty())
            .collect()
    }

    /// Raw `href` values of every `<a href>` on the page, unresolved
    pub fn hrefs(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        self.html
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    /// Resolves an href against the base URL
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base_url.join(href).ok()
    }
}

fn decode_body<'a>(body: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or_else(|| {
            if std::str::from_utf8(body).is_ok() {
                UTF_8
            } else {
                WINDOWS_1252
            }
        });

    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!("Body contains bytes invalid for {}", encoding.name());
    }
    text
}

fn direct_text(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.text.to_string())
        .collect()
}

fn find_base_href(html: &Html) -> Option<String> {
    let selector = Selector::parse("base[href]").ok()?;
    html.select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(str::to_string)
}
