//! Rule-based interpretation of medical test results.
//!
//! Each test name is matched against the reference ranges, its value is
//! classified, and the out-of-range findings are folded into a single
//! condition with a confidence score and narrative text.

pub mod analyzer;
pub mod reference;

pub use analyzer::{Analyzer, CONFIDENCE_FLOOR, CONFIDENCE_NORMAL};
pub use reference::{
    AdviceRule, ConditionRule, ReferenceRange, ReferenceTableError, ReferenceTables,
    ABNORMAL_CONDITION, NORMAL_CONDITION, UNMAPPED_CONDITION,
};
