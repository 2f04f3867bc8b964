//! Form field normalization and the validation bitmask
//!
//! Each failed rule sets one bit; zero means the form is valid. Views use
//! the bits to highlight the offending fields.

use ctx_common::models::UNIVERSAL_SCOPE;
use std::collections::HashMap;
use url::Url;

/// Flash text shown when a submitted form fails validation
pub const FORM_WARNING: &str =
    "An error occurred when submitting the form. Please review the warnings and fix accordingly.";

/// Accumulated validation failures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormErrors(u32);

impl FormErrors {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn flag(&mut self, bit: u32) {
        self.0 |= bit;
    }

    pub fn flag_if(&mut self, failed: bool, bit: u32) {
        if failed {
            self.flag(bit);
        }
    }

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn is_valid(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Raw url-encoded form fields
pub type FormFields = HashMap<String, String>;

/// Trimmed value of a form field; missing fields read as empty
pub fn field(form: &FormFields, name: &str) -> String {
    form.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// `value`, or `default` when empty
pub fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Empty scope means the universal scope
pub fn scope_or_universal(value: String) -> String {
    or_default(value, UNIVERSAL_SCOPE)
}

/// Topic identifier from user input
///
/// Lower-case; whitespace runs become `-`; anything other than letters,
/// digits, `-` and `_` is dropped so the result is safe in a URL path.
pub fn slugify(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Absolute `http` or `https` URL; anything else is not rendered as a link
pub fn is_web_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
