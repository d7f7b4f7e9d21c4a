//! JSON body extraction with per-field validation.
//!
//! [`ValidatedJson`] rejects a body with one [`FieldViolation`] per failed field
//! instead of stopping at the first serde error, so callers see every problem in
//! a single 400 response.

use crate::error::{AppError, FieldViolation, violations_from};
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};
use validator::Validate;

/// Types that can be read field by field out of a JSON object.
pub trait FromJsonBody: Validate + Sized {
    /// Reads the fields it needs. Failed reads are recorded on `fields`; return
    /// `None` when a required value could not be produced.
    fn from_fields(fields: &mut JsonFields) -> Option<Self>;
}

/// A JSON object being read into a typed request, collecting violations as it goes.
#[derive(Debug)]
pub struct JsonFields {
    map: Map<String, Value>,
    violations: Vec<FieldViolation>,
}

impl JsonFields {
    pub fn new(map: Map<String, Value>) -> Self {
        Self {
            map,
            violations: Vec::new(),
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    fn reject(&mut self, field: &str, message: &str, kind: &str) {
        self.violations
            .push(FieldViolation::body_field(field, message, kind));
    }

    pub fn required_str(&mut self, field: &str) -> Option<String> {
        match self.map.remove(field) {
            None => {
                self.reject(field, "Field required", "missing");
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.reject(field, "Input should be a valid string", "string_type");
                None
            }
        }
    }

    /// Integer field; absent or `null` reads as `None`. Whole floats such as `5.0`
    /// and numeric strings such as `"500"` are accepted.
    pub fn optional_i64(&mut self, field: &str) -> Option<i64> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Some(i);
                }
                match n.as_f64() {
                    Some(f) if f.fract() != 0.0 => {
                        self.reject(
                            field,
                            "Input should be a valid integer, got a number with a fractional part",
                            "int_from_float",
                        );
                        None
                    }
                    Some(f) => self.whole_float(field, f),
                    None => {
                        self.reject(field, "Input should be a valid integer", "int_type");
                        None
                    }
                }
            }
            Some(Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Some(i),
                Err(_) => {
                    self.reject(
                        field,
                        "Input should be a valid integer, unable to parse string as an integer",
                        "int_type",
                    );
                    None
                }
            },
            Some(_) => {
                self.reject(field, "Input should be a valid integer", "int_type");
                None
            }
        }
    }

    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    fn whole_float(&mut self, field: &str, f: f64) -> Option<i64> {
        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Some(f as i64)
        } else {
            self.reject(field, "Input should be a valid integer", "int_type");
            None
        }
    }

    /// Number field; absent or `null` reads as `None`. Numeric strings are accepted;
    /// non-finite values are not.
    pub fn optional_f64(&mut self, field: &str) -> Option<f64> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Some(f),
                _ => {
                    self.reject(
                        field,
                        "Input should be a valid number, unable to parse string as a number",
                        "float_type",
                    );
                    None
                }
            },
            Some(_) => {
                self.reject(field, "Input should be a valid number", "float_type");
                None
            }
        }
    }
}

/// Parses raw bytes into `T`, reporting every failed field.
pub fn parse_body<T: FromJsonBody>(bytes: &[u8]) -> Result<T, AppError> {
    if bytes.is_empty() {
        return Err(AppError::ValidationError(vec![FieldViolation::body(
            "Field required",
            "missing",
        )]));
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        AppError::ValidationError(vec![FieldViolation::body(
            format!("JSON decode error: {}", e),
            "json_invalid",
        )])
    })?;

    let Value::Object(map) = value else {
        return Err(AppError::ValidationError(vec![FieldViolation::body(
            "Input should be a valid dictionary or object to extract fields from",
            "model_attributes_type",
        )]));
    };

    let mut fields = JsonFields::new(map);
    let parsed = T::from_fields(&mut fields);
    let mut violations = fields.violations;

    if let Some(value) = &parsed {
        if let Err(errors) = value.validate() {
            violations.extend(violations_from(&errors));
        }
    }

    match parsed {
        Some(value) if violations.is_empty() => Ok(value),
        _ => Err(AppError::ValidationError(violations)),
    }
}

/// JSON body extractor whose rejection is a 400 validation envelope.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: FromJsonBody,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::api(e.status(), "Invalid request body", e.body_text()))?;

        parse_body(&bytes).map(ValidatedJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Validate)]
    struct Probe {
        #[validate(length(
            min = 1,
            code = "string_too_short",
            message = "String should have at least 1 character"
        ))]
        name: String,
        count: i64,
        ratio: f64,
    }

    impl FromJsonBody for Probe {
        fn from_fields(fields: &mut JsonFields) -> Option<Self> {
            let name = fields.required_str("name");
            let count = fields.optional_i64("count").unwrap_or(3);
            let ratio = fields.optional_f64("ratio").unwrap_or(0.5);
            Some(Probe {
                name: name?,
                count,
                ratio,
            })
        }
    }

    fn violations(body: serde_json::Value) -> Vec<FieldViolation> {
        match parse_body::<Probe>(body.to_string().as_bytes()) {
            Err(AppError::ValidationError(v)) => v,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_fill_absent_and_null_fields() {
        let probe: Probe = parse_body(json!({"name": "x", "ratio": null}).to_string().as_bytes())
            .expect("body is valid");

        assert_eq!(probe.name, "x");
        assert_eq!(probe.count, 3);
        assert_eq!(probe.ratio, 0.5);
    }

    #[test]
    fn whole_floats_read_as_integers_and_integers_as_floats() {
        let probe: Probe =
            parse_body(json!({"name": "x", "count": 7.0, "ratio": 2}).to_string().as_bytes())
                .expect("body is valid");

        assert_eq!(probe.count, 7);
        assert_eq!(probe.ratio, 2.0);
    }

    #[test]
    fn every_failed_field_is_reported() {
        let v = violations(json!({"count": "many", "ratio": [1]}));

        let kinds: Vec<_> = v.iter().map(|v| v.kind.as_str()).collect();
        assert_eq!(kinds, vec!["missing", "int_type", "float_type"]);
        assert_eq!(v[0].location, vec!["body", "name"]);
    }

    #[test]
    fn fractional_integer_is_rejected() {
        let v = violations(json!({"name": "x", "count": 1.5}));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, "int_from_float");
    }

    #[test]
    fn type_errors_and_rule_failures_are_combined() {
        let v = violations(json!({"name": "", "ratio": "high"}));

        assert_eq!(v.len(), 2);
        assert_eq!(v[0].kind, "float_type");
        assert_eq!(v[1].kind, "string_too_short");
        assert_eq!(v[1].location, vec!["body", "name"]);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let probe: Probe = parse_body(
            json!({"name": "x", "count": " 500 ", "ratio": "0.2"})
                .to_string()
                .as_bytes(),
        )
        .expect("numeric strings are accepted");

        assert_eq!(probe.count, 500);
        assert_eq!(probe.ratio, 0.2);

        let v = violations(json!({"name": "x", "count": "5.5", "ratio": "NaN"}));
        let kinds: Vec<_> = v.iter().map(|v| v.kind.as_str()).collect();
        assert_eq!(kinds, vec!["int_type", "float_type"]);
    }

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let body = br#"{"name": "x", "count": 9223372036854775808}"#;
        match parse_body::<Probe>(body) {
            Err(AppError::ValidationError(v)) => assert_eq!(v[0].kind, "int_type"),
            other => panic!("unexpected: {other:?}"),
        }

        let probe: Probe = parse_body(br#"{"name": "x", "count": -9223372036854775808}"#)
            .expect("i64::MIN is representable");
        assert_eq!(probe.count, i64::MIN);
    }

    #[test]
    fn wrong_string_type_is_reported() {
        let v = violations(json!({"name": 42}));
        assert_eq!(v[0].kind, "string_type");
    }

    #[test]
    fn malformed_and_non_object_bodies_are_rejected() {
        match parse_body::<Probe>(b"{not json") {
            Err(AppError::ValidationError(v)) => {
                assert_eq!(v[0].kind, "json_invalid");
                assert_eq!(v[0].location, vec!["body"]);
            }
            other => panic!("unexpected: {other:?}"),
        }

        assert_eq!(violations(json!(["name"]))[0].kind, "model_attributes_type");

        match parse_body::<Probe>(b"") {
            Err(AppError::ValidationError(v)) => assert_eq!(v[0].kind, "missing"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
