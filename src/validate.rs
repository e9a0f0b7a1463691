//! Request body validation.
//!
//! Each operation declares a [`Schema`]: a list of field names and the rules
//! that apply to them. Bodies are checked as raw JSON before being
//! deserialized into their typed request, so constraint failures and type
//! failures both surface as a 400.

use axum::{Json, extract::rejection::JsonRejection};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::HandlerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and not the zero value of its type (`null`, `""`, `0`, `false`, `[]`, `{}`).
    Required,
    /// Integer within `min..=max`. Absent values are skipped.
    Between(i64, i64),
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

pub type Schema = &'static [Field];

pub const NEW_BOOK: Schema = &[
    Field {
        name: "title",
        rules: &[Rule::Required],
    },
    Field {
        name: "author",
        rules: &[Rule::Required],
    },
];

pub const NEW_USER_BOOK: Schema = &[
    Field {
        name: "user_id",
        rules: &[Rule::Required],
    },
    Field {
        name: "book_id",
        rules: &[Rule::Required],
    },
    Field {
        name: "status",
        rules: &[Rule::Required],
    },
];

pub const RATING_UPDATE: Schema = &[Field {
    name: "rating",
    rules: &[Rule::Required, Rule::Between(1, 5)],
}];

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn check_rule(name: &str, value: Option<&Value>, rule: Rule) -> Result<(), String> {
    match rule {
        Rule::Required => match value {
            Some(v) if !is_zero(v) => Ok(()),
            _ => Err(format!("{name} is required")),
        },
        Rule::Between(min, max) => {
            let Some(v) = value.filter(|v| !v.is_null()) else {
                return Ok(());
            };
            match v.as_i64() {
                Some(n) if (min..=max).contains(&n) => Ok(()),
                Some(_) => Err(format!("{name} must be between {min} and {max}")),
                None => Err(format!("{name} must be an integer")),
            }
        }
    }
}

/// Checks `body` against `schema`, reporting the first violation.
pub fn validate(body: &Value, schema: &[Field]) -> Result<(), String> {
    let Some(object) = body.as_object() else {
        return Err("request body must be a JSON object".to_string());
    };

    for field in schema {
        let value = object.get(field.name);
        for rule in field.rules {
            check_rule(field.name, value, *rule)?;
        }
    }

    Ok(())
}

/// Parses, validates and deserializes a JSON request body.
pub fn bind<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
    schema: &[Field],
) -> Result<T, HandlerError> {
    let Json(body) = payload.map_err(|rejection| HandlerError::Validation(rejection.body_text()))?;
    validate(&body, schema).map_err(HandlerError::Validation)?;
    serde_json::from_value(body).map_err(|e| HandlerError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{NewBook, NewUserBook, RatingUpdate};
    use serde_json::json;

    #[test]
    fn book_requires_title_and_author() {
        assert!(validate(&json!({"title": "Dune", "author": "Herbert"}), NEW_BOOK).is_ok());
        assert_eq!(
            validate(&json!({"author": "Herbert"}), NEW_BOOK),
            Err("title is required".to_string())
        );
        assert_eq!(
            validate(&json!({"title": "Dune", "author": ""}), NEW_BOOK),
            Err("author is required".to_string())
        );
        assert_eq!(
            validate(&json!({"title": null, "author": "Herbert"}), NEW_BOOK),
            Err("title is required".to_string())
        );
    }

    #[test]
    fn user_book_required_ids_reject_zero() {
        let body = json!({"user_id": 0, "book_id": 1, "status": "reading"});
        assert_eq!(validate(&body, NEW_USER_BOOK), Err("user_id is required".to_string()));

        let body = json!({"user_id": 7, "book_id": 1, "status": "reading"});
        assert!(validate(&body, NEW_USER_BOOK).is_ok());
    }

    #[test]
    fn rating_must_be_in_range() {
        for rating in 1..=5 {
            assert!(validate(&json!({ "rating": rating }), RATING_UPDATE).is_ok());
        }
        assert_eq!(
            validate(&json!({"rating": 0}), RATING_UPDATE),
            Err("rating is required".to_string())
        );
        assert_eq!(
            validate(&json!({"rating": 6}), RATING_UPDATE),
            Err("rating must be between 1 and 5".to_string())
        );
        assert_eq!(
            validate(&json!({"rating": -2}), RATING_UPDATE),
            Err("rating must be between 1 and 5".to_string())
        );
        assert_eq!(
            validate(&json!({"rating": 4.5}), RATING_UPDATE),
            Err("rating must be an integer".to_string())
        );
    }

    #[test]
    fn between_skips_absent_values() {
        const OPTIONAL: Schema = &[Field {
            name: "rating",
            rules: &[Rule::Between(1, 5)],
        }];
        assert!(validate(&json!({}), OPTIONAL).is_ok());
        assert!(validate(&json!({"rating": null}), OPTIONAL).is_ok());
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(validate(&json!([1, 2, 3]), NEW_BOOK).is_err());
        assert!(validate(&json!("Dune"), NEW_BOOK).is_err());
    }

    #[test]
    fn bind_reports_type_mismatch_as_validation() {
        let payload = Ok(Json(json!({"user_id": "seven", "book_id": 1, "status": "reading"})));
        let err = bind::<NewUserBook>(payload, NEW_USER_BOOK).unwrap_err();
        assert!(matches!(err, HandlerError::Validation(_)));
    }

    #[test]
    fn bind_fills_optional_defaults() {
        let payload = Ok(Json(json!({"title": "Dune", "author": "Herbert"})));
        let book: NewBook = bind(payload, NEW_BOOK).unwrap();
        assert_eq!(book.description, "");
        assert_eq!(book.isbn, "");

        let payload = Ok(Json(json!({"rating": 3})));
        let update: RatingUpdate = bind(payload, RATING_UPDATE).unwrap();
        assert_eq!(update.rating, 3);
        assert_eq!(update.review, "");
    }
}
