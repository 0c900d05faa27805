use crate::error::FieldError;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;
pub const GRADE_MIN: Decimal = Decimal::ZERO;
pub const GRADE_MAX: Decimal = Decimal::TEN;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-ZÀ-ÿ\s]+$").expect("name pattern is a valid regex")
});

/// Checks a student name and returns it trimmed.
///
/// `None` and JSON `null` are both treated as missing.
pub fn check_name(value: Option<&Value>) -> Result<String, Vec<FieldError>> {
    let raw = match value {
        None | Some(Value::Null) => return Err(vec![FieldError::new("name", "name is required")]),
        Some(Value::String(s)) => s,
        Some(_) => return Err(vec![FieldError::new("name", "name must be a string")]),
    };

    let name = raw.trim();
    if name.is_empty() {
        return Err(vec![FieldError::new("name", "name is required")]);
    }

    let mut errors = Vec::new();
    let chars = name.chars().count();
    if chars < NAME_MIN_CHARS {
        errors.push(FieldError::new(
            "name",
            format!("name must be at least {NAME_MIN_CHARS} characters"),
        ));
    }
    if chars > NAME_MAX_CHARS {
        errors.push(FieldError::new(
            "name",
            format!("name must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
    if !NAME_PATTERN.is_match(name) {
        errors.push(FieldError::new("name", "name must contain only letters and spaces"));
    }

    if errors.is_empty() { Ok(name.to_string()) } else { Err(errors) }
}

/// Checks a grade that must be present.
pub fn check_required_grade(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Decimal, Vec<FieldError>> {
    match value {
        None | Some(Value::Null) => Err(vec![FieldError::new(field, format!("{field} is required"))]),
        Some(v) => check_grade(field, v),
    }
}

/// Checks a grade that may be left out.
pub fn check_optional_grade(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<Decimal>, Vec<FieldError>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => check_grade(field, v).map(Some),
    }
}

fn check_grade(field: &'static str, value: &Value) -> Result<Decimal, Vec<FieldError>> {
    let Some(grade) = parse_number(value) else {
        return Err(vec![FieldError::new(field, format!("{field} must be a number"))]);
    };

    let mut errors = match check_grade_bounds(field, grade) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    };
    if grade.normalize().scale() > 1 {
        errors.push(FieldError::new(
            field,
            format!("{field} must have at most one decimal place"),
        ));
    }

    if errors.is_empty() { Ok(grade) } else { Err(errors) }
}

/// Checks that `value` lies on the grade scale.
pub fn check_grade_bounds(field: &'static str, value: Decimal) -> Result<Decimal, Vec<FieldError>> {
    let mut errors = Vec::new();
    if value < GRADE_MIN {
        errors.push(FieldError::new(field, format!("{field} must be at least {GRADE_MIN}")));
    }
    if value > GRADE_MAX {
        errors.push(FieldError::new(field, format!("{field} must be at most {GRADE_MAX}")));
    }
    if errors.is_empty() { Ok(value) } else { Err(errors) }
}

/// Accepts JSON numbers and numeric strings.
fn parse_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            parse_decimal(&n.to_string())
        }
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn grade(value: Value) -> Result<Decimal, Vec<String>> {
        check_required_grade("grade1", Some(&value))
            .map_err(|errors| errors.into_iter().map(|e| e.message).collect())
    }

    fn name_errors(value: Value) -> Vec<String> {
        check_name(Some(&value))
            .unwrap_err()
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    #[test]
    fn accepts_integers_one_decimal_and_numeric_strings() {
        assert_eq!(grade(json!(7)), Ok(dec!(7)));
        assert_eq!(grade(json!(7.5)), Ok(dec!(7.5)));
        assert_eq!(grade(json!(8.0)), Ok(dec!(8.0)));
        assert_eq!(grade(json!("9.5")), Ok(dec!(9.5)));
        assert_eq!(grade(json!(0)), Ok(dec!(0)));
        assert_eq!(grade(json!(10)), Ok(dec!(10)));
    }

    #[test]
    fn rejects_two_decimal_digits() {
        assert_eq!(grade(json!(7.25)), Err(vec!["grade1 must have at most one decimal place".to_string()]));
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(grade(json!(-1)), Err(vec!["grade1 must be at least 0".to_string()]));
        assert_eq!(grade(json!(10.1)), Err(vec!["grade1 must be at most 10".to_string()]));
    }

    #[test]
    fn reports_every_rule_a_grade_breaks() {
        assert_eq!(
            grade(json!(11.25)).unwrap_err(),
            vec!["grade1 must be at most 10", "grade1 must have at most one decimal place"]
        );
    }

    #[test]
    fn rejects_non_numbers() {
        for input in [json!("abc"), json!(true), json!(""), json!([1])] {
            assert_eq!(grade(input), Err(vec!["grade1 must be a number".to_string()]));
        }
    }

    #[test]
    fn missing_required_grade() {
        let errors = check_required_grade("grade3", None).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("grade3", "grade3 is required")]);
    }

    #[test]
    fn optional_grade_distinguishes_absent_from_invalid() {
        assert_eq!(check_optional_grade("grade2", None), Ok(None));
        assert_eq!(check_optional_grade("grade2", Some(&Value::Null)), Ok(None));
        assert_eq!(check_optional_grade("grade2", Some(&json!(4.5))), Ok(Some(dec!(4.5))));
        assert_eq!(check_optional_grade("grade2", Some(&json!("x"))).unwrap_err().len(), 1);
    }

    #[test]
    fn name_is_trimmed_and_accepts_accents() {
        assert_eq!(
            check_name(Some(&json!("  José da Conceição  "))),
            Ok("José da Conceição".to_string())
        );
    }

    #[test]
    fn name_rules() {
        let cases = [
            (json!("Ana2"), "name must contain only letters and spaces"),
            (json!("Al"), "name must be at least 3 characters"),
            (json!("   "), "name is required"),
            (json!(42), "name must be a string"),
            (json!("a".repeat(101)), "name must be at most 100 characters"),
        ];
        for (input, expected) in cases {
            assert_eq!(name_errors(input.clone())[0], expected, "{input}");
        }
        assert_eq!(check_name(None).unwrap_err()[0].message, "name is required");
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert_eq!(check_name(Some(&json!("Éva"))), Ok("Éva".to_string()));
        assert!(check_name(Some(&json!("é".repeat(100)))).is_ok());
    }
}
