use crate::average::{compute_average, is_passing};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A student's three grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grades {
    pub grade1: Decimal,
    pub grade2: Decimal,
    pub grade3: Decimal,
}

impl Grades {
    pub fn new(grade1: Decimal, grade2: Decimal, grade3: Decimal) -> Self {
        Self { grade1, grade2, grade3 }
    }

    /// The average of the three grades, rounded to one decimal place.
    pub fn average(&self) -> Decimal {
        compute_average(self.grade1, self.grade2, self.grade3)
    }
}

/// A validated request to create a record. The average is not part of it:
/// it is always derived from the grades at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGradeRecord {
    pub name: String,
    pub grades: Grades,
}

/// A validated partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeUpdate {
    pub grade1: Option<Decimal>,
    pub grade2: Option<Decimal>,
    pub grade3: Option<Decimal>,
}

impl GradeUpdate {
    pub fn is_empty(&self) -> bool {
        self.grade1.is_none() && self.grade2.is_none() && self.grade3.is_none()
    }

    /// Overlays the provided grades on top of `current`.
    pub fn apply(&self, current: Grades) -> Grades {
        Grades {
            grade1: self.grade1.unwrap_or(current.grade1),
            grade2: self.grade2.unwrap_or(current.grade2),
            grade3: self.grade3.unwrap_or(current.grade3),
        }
    }
}

/// Inclusive bounds for an average-range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AverageRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl AverageRange {
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, CoreError> {
        if max < min {
            return Err(CoreError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, average: Decimal) -> bool {
        self.min <= average && average <= self.max
    }
}

/// A persisted student record. This is a row of the `grade_records` table.
///
/// Timestamps are maintained by the store and left out of the JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct GradeRecord {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub grade1: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub grade2: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub grade3: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average: Decimal,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

impl GradeRecord {
    /// Builds a fresh record with its average computed from `new.grades`.
    pub fn from_new(new: NewGradeRecord, now: DateTime<Utc>) -> Self {
        let average = new.grades.average();
        Self {
            name: new.name,
            grade1: new.grades.grade1,
            grade2: new.grades.grade2,
            grade3: new.grades.grade3,
            average,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn grades(&self) -> Grades {
        Grades::new(self.grade1, self.grade2, self.grade3)
    }

    /// Applies `update`, recomputes the average and bumps `updated_at`.
    pub fn apply_update(&mut self, update: &GradeUpdate, now: DateTime<Utc>) {
        let grades = update.apply(self.grades());
        self.grade1 = grades.grade1;
        self.grade2 = grades.grade2;
        self.grade3 = grades.grade3;
        self.average = grades.average();
        self.updated_at = now;
    }

    pub fn is_passing(&self, threshold: Decimal) -> bool {
        is_passing(self.average, threshold)
    }
}
