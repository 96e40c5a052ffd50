//! Parsing of submitted measurements.
//!
//! Two input modes are supported: one comma-separated string of values
//! ([`parse_bulk`]) and one form field per feature ([`parse_fields`]).
//! Every token is converted before the count is checked, so a malformed
//! token is reported even when the count is also wrong.

use crate::error::{ScreeningError, ScreeningResult};
use crate::features::{FeatureVector, FEATURE_COUNT};
use std::borrow::Cow;
use std::collections::HashMap;

/// Form field name of the `index`-th detailed input.
pub fn field_name(index: usize) -> String {
    format!("feature_{index}")
}

/// Drop `_` digit separators (`1_000.5`); an `_` not between two digits
/// leaves the token untouched so that it fails conversion.
fn strip_digit_separators(token: &str) -> Cow<'_, str> {
    if !token.contains('_') {
        return Cow::Borrowed(token);
    }
    let bytes = token.as_bytes();
    let mut out = String::with_capacity(token.len());
    for (i, c) in token.char_indices() {
        if c == '_' {
            let after_digit = i > 0 && bytes[i - 1].is_ascii_digit();
            let before_digit = bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit());
            if !(after_digit && before_digit) {
                return Cow::Borrowed(token);
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Convert one trimmed token; `position` is 1-based and only used for errors.
pub fn parse_value(position: usize, raw: &str) -> ScreeningResult<f64> {
    let token = raw.trim();
    let value: f64 = strip_digit_separators(token)
        .parse()
        .map_err(|e: std::num::ParseFloatError| ScreeningError::NonNumericToken {
            position,
            token: token.to_string(),
            reason: e.to_string(),
        })?;
    if !value.is_finite() {
        return Err(ScreeningError::NonNumericToken {
            position,
            token: token.to_string(),
            reason: "value must be finite".to_string(),
        });
    }
    Ok(value)
}

/// Parse a comma-separated list of exactly [`FEATURE_COUNT`] numbers.
///
/// An empty string is a single empty token and fails conversion.
pub fn parse_bulk(text: &str) -> ScreeningResult<FeatureVector> {
    let values = text
        .split(',')
        .enumerate()
        .map(|(i, token)| parse_value(i + 1, token))
        .collect::<ScreeningResult<Vec<f64>>>()?;
    FeatureVector::new(values)
}

/// Parse the detailed per-feature fields `feature_0` .. `feature_29`.
pub fn parse_fields(fields: &HashMap<String, String>) -> ScreeningResult<FeatureVector> {
    let mut values = Vec::with_capacity(FEATURE_COUNT);
    for index in 0..FEATURE_COUNT {
        if let Some(raw) = fields.get(&field_name(index)) {
            values.push(parse_value(index + 1, raw)?);
        }
    }
    FeatureVector::new(values)
}
