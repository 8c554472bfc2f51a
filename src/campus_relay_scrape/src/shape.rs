use scraper::Html;
use serde_json::Value;

use crate::{
    error::DecodeError,
    html::{parse_html, script_blocks},
    jsonish::decode_jsonish,
};

/// The kind of body an endpoint answers with. Chosen per endpoint, never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseShape {
    /// HTML page or fragment, decoded with selectors.
    Html,
    /// JSON or near-JSON text.
    JsonIsh,
    /// HTML whose data lives in inline `<script>` blocks.
    Script,
}

pub enum DecodedBody {
    Html(Html),
    Json(Value),
    Script(Vec<String>),
}

impl std::fmt::Debug for DecodedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html(_) => f.write_str("Html(..)"),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Script(blocks) => f.debug_tuple("Script").field(&blocks.len()).finish(),
        }
    }
}

pub fn decode_body(shape: ResponseShape, bytes: &[u8]) -> Result<DecodedBody, DecodeError> {
    match shape {
        ResponseShape::Html => Ok(DecodedBody::Html(parse_html(bytes))),
        ResponseShape::JsonIsh => decode_jsonish(bytes).map(DecodedBody::Json),
        ResponseShape::Script => Ok(DecodedBody::Script(script_blocks(&parse_html(bytes)))),
    }
}
