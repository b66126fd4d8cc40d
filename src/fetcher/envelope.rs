//! Page envelopes and the per-resource adapters that unwrap them.
//!
//! Most endpoints return the page envelope as the response body. Some wrap it
//! again together with an application-level status code:
//! - votes: `{ "responseCode": 200, "message": "...", "data": <envelope> }`
//! - favorites: `{ "code": "OK", "message": "...", "body": <envelope> }`

use serde::Deserialize;
use serde_json::Value;

use super::error::FetchError;

/// One page of a paginated collection.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(rename = "number", default)]
    pub page_number: u32,
    #[serde(rename = "size", default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(rename = "first", default)]
    pub is_first: bool,
    #[serde(rename = "last", default)]
    pub is_last: bool,
}

impl<T> PageEnvelope<T> {
    /// An envelope with no content and no pages.
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            page_number: 0,
            page_size: 0,
            total_pages: 0,
            total_elements: 0,
            is_first: true,
            is_last: true,
        }
    }

    pub fn map_content<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> PageEnvelope<U> {
        PageEnvelope {
            content: f(self.content),
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            is_first: self.is_first,
            is_last: self.is_last,
        }
    }
}

/// How a resource's endpoint wraps its page envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// The body is the page envelope.
    Plain,
    /// `{responseCode, message, data}`
    Data,
    /// `{code, message, body}`
    Body,
}

impl EnvelopeShape {
    fn fields(&self) -> Option<(&'static str, &'static str)> {
        match self {
            EnvelopeShape::Plain => None,
            EnvelopeShape::Data => Some(("responseCode", "data")),
            EnvelopeShape::Body => Some(("code", "body")),
        }
    }

    /// Extracts the page envelope from a raw JSON response, checking the
    /// embedded status code for wrapped shapes.
    pub fn unwrap(&self, raw: Value) -> Result<PageEnvelope<Value>, FetchError> {
        if *self == EnvelopeShape::Plain {
            return Ok(serde_json::from_value(raw)?);
        }
        match self.payload(raw)? {
            Some(Value::Null) => Ok(PageEnvelope::empty()),
            Some(payload) => Ok(serde_json::from_value(payload)?),
            None => Err(FetchError::Decode(serde::de::Error::custom(format!(
                "wrapped envelope has no `{}` field",
                self.fields().map_or("", |(_, payload)| payload)
            )))),
        }
    }

    /// Guesses the wrapper of a write response. A wrapper carries its status
    /// code together with its payload key or a `message`, so an entity with a
    /// `code` field of its own (a country) stays `Plain`.
    pub fn detect(raw: &Value) -> EnvelopeShape {
        let Value::Object(map) = raw else {
            return EnvelopeShape::Plain;
        };
        [EnvelopeShape::Data, EnvelopeShape::Body]
            .into_iter()
            .find(|shape| {
                shape.fields().is_some_and(|(code, payload)| {
                    map.contains_key(code)
                        && (map.contains_key(payload) || map.contains_key("message"))
                })
            })
            .unwrap_or(EnvelopeShape::Plain)
    }

    /// Checks the embedded status code and takes out the payload.
    ///
    /// `Plain` returns `raw` as is. `None` means the wrapper had no payload key.
    pub fn payload(&self, raw: Value) -> Result<Option<Value>, FetchError> {
        let Some((code_field, payload_field)) = self.fields() else {
            return Ok(Some(raw));
        };

        let Value::Object(mut wrapper) = raw else {
            return Err(FetchError::Decode(serde::de::Error::custom(format!(
                "expected a wrapped envelope object with a `{}` field",
                payload_field
            ))));
        };

        if let Some(code) = wrapper.get(code_field) {
            if !is_success_code(code) {
                let message = wrapper
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(FetchError::ApiLogic {
                    code: code_to_string(code),
                    message,
                });
            }
        }

        Ok(wrapper.remove(payload_field))
    }
}

/// Numeric 2xx codes and "OK"/"SUCCESS" count as success.
fn is_success_code(code: &Value) -> bool {
    match code {
        Value::Number(n) => n.as_u64().is_some_and(|n| (200..300).contains(&n)),
        Value::String(s) => {
            if let Ok(n) = s.trim().parse::<u64>() {
                return (200..300).contains(&n);
            }
            s.eq_ignore_ascii_case("ok") || s.eq_ignore_ascii_case("success")
        }
        Value::Null => true,
        _ => false,
    }
}

fn code_to_string(code: &Value) -> String {
    match code {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
