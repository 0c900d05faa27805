pub mod average;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use average::{compute_average, is_passing, PASSING_THRESHOLD};
pub use enums::ErrorKind;
pub use error::CoreError;
pub use structs::{AverageRange, GradeRecord, GradeUpdate, Grades, NewGradeRecord};
