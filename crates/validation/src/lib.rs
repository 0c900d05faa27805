//! # Validation
//!
//! Pure input checks that run before anything reaches the store. Each entry
//! point takes a loosely-typed request payload and returns either a validated
//! value from `core-types` or every rule violation found, never just the first.

pub mod error;
mod rules;

pub use error::{FieldError, ValidationErrors};
pub use rules::{GRADE_MAX, GRADE_MIN, NAME_MAX_CHARS, NAME_MIN_CHARS};

use core_types::{AverageRange, GradeUpdate, Grades, NewGradeRecord};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// Body of a create request. Fields are kept as raw JSON so type errors can be
/// reported per field. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGradeRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub grade1: Option<Value>,
    #[serde(default)]
    pub grade2: Option<Value>,
    #[serde(default)]
    pub grade3: Option<Value>,
}

/// Body of a partial update request. Any `name` sent along is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGradeRequest {
    #[serde(default)]
    pub grade1: Option<Value>,
    #[serde(default)]
    pub grade2: Option<Value>,
    #[serde(default)]
    pub grade3: Option<Value>,
}

/// Validates a create payload: a name and all three grades are required.
pub fn validate_create(request: &CreateGradeRequest) -> Result<NewGradeRecord, ValidationErrors> {
    let name = rules::check_name(request.name.as_ref());
    let grade1 = rules::check_required_grade("grade1", request.grade1.as_ref());
    let grade2 = rules::check_required_grade("grade2", request.grade2.as_ref());
    let grade3 = rules::check_required_grade("grade3", request.grade3.as_ref());

    match (name, grade1, grade2, grade3) {
        (Ok(name), Ok(grade1), Ok(grade2), Ok(grade3)) => {
            Ok(NewGradeRecord { name, grades: Grades::new(grade1, grade2, grade3) })
        }
        (name, grade1, grade2, grade3) => Err(ValidationErrors::merge([
            name.err(),
            grade1.err(),
            grade2.err(),
            grade3.err(),
        ])),
    }
}

/// Validates a partial update: each grade is optional, but at least one must
/// be present.
pub fn validate_update(request: &UpdateGradeRequest) -> Result<GradeUpdate, ValidationErrors> {
    let grade1 = rules::check_optional_grade("grade1", request.grade1.as_ref());
    let grade2 = rules::check_optional_grade("grade2", request.grade2.as_ref());
    let grade3 = rules::check_optional_grade("grade3", request.grade3.as_ref());

    let update = match (grade1, grade2, grade3) {
        (Ok(grade1), Ok(grade2), Ok(grade3)) => GradeUpdate { grade1, grade2, grade3 },
        (grade1, grade2, grade3) => {
            return Err(ValidationErrors::merge([grade1.err(), grade2.err(), grade3.err()]));
        }
    };

    if update.is_empty() {
        return Err(ValidationErrors::single("grades", "at least one grade is required"));
    }
    Ok(update)
}

/// Validates bounds for an average-range query. Missing bounds default to the
/// full grade scale.
pub fn validate_average_range(
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Result<AverageRange, ValidationErrors> {
    let min = rules::check_grade_bounds("min", min.unwrap_or(GRADE_MIN));
    let max = rules::check_grade_bounds("max", max.unwrap_or(GRADE_MAX));

    let (min, max) = match (min, max) {
        (Ok(min), Ok(max)) => (min, max),
        (min, max) => return Err(ValidationErrors::merge([min.err(), max.err()])),
    };

    AverageRange::new(min, max).map_err(|_| {
        ValidationErrors::single("max", "max must be greater than or equal to min")
    })
}
