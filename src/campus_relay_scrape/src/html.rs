//! HTML helpers built on `scraper`.
//!
//! `scraper::Html` is not `Send`, so everything here is synchronous and hands
//! back owned data. Async callers parse, extract and drop the document before
//! their next await.

use scraper::{Html, Selector};

use crate::error::DecodeError;

const CAPTCHA_SELECTOR: &str = "#captchaResponse";

pub fn parse_html(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

pub fn parse_selector(selector: &str) -> Result<Selector, DecodeError> {
    Selector::parse(selector).map_err(|e| DecodeError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

pub fn element_exists(document: &Html, selector: &str) -> Result<bool, DecodeError> {
    let selector = parse_selector(selector)?;
    Ok(document.select(&selector).next().is_some())
}

/// Every named `<input type="hidden">` in document order, values verbatim.
pub fn hidden_form_fields(document: &Html) -> Vec<(String, String)> {
    let Ok(inputs) = Selector::parse("input") else {
        return Vec::new();
    };

    document
        .select(&inputs)
        .filter(|input| {
            input
                .value()
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        })
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_owned(), value.to_owned()))
        })
        .collect()
}

/// Text of every `<script>` element.
pub fn script_blocks(document: &Html) -> Vec<String> {
    let Ok(scripts) = Selector::parse("script") else {
        return Vec::new();
    };

    document
        .select(&scripts)
        .map(|script| script.text().collect::<String>())
        .collect()
}

/// What the identity provider's login page asks for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginForm {
    pub hidden_fields: Vec<(String, String)>,
    pub captcha_required: bool,
}

impl LoginForm {
    pub fn inspect(bytes: &[u8]) -> Self {
        let document = parse_html(bytes);
        Self {
            hidden_fields: hidden_form_fields(&document),
            captcha_required: element_exists(&document, CAPTCHA_SELECTOR).unwrap_or(false),
        }
    }
}
