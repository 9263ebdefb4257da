//! Reference tables used by the analyzer.
//!
//! The tables are plain data: built once, then shared read-only behind an
//! `Arc`. Range matching is by substring, so declaration order decides which
//! key wins when a test name contains several keys.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::entities::analysis::{Direction, TestStatus};

/// Overall condition when nothing is out of range
pub const NORMAL_CONDITION: &str = "Normal";

/// Condition for a known metric whose direction has no specific label.
/// Also the recommendation fallback key.
pub const ABNORMAL_CONDITION: &str = "Abnormal";

/// Condition for an out-of-range metric with no condition rule at all
pub const UNMAPPED_CONDITION: &str = "Requires medical attention";

/// (key, low, high), in matching order
const STANDARD_RANGES: &[(&str, f64, f64)] = &[
    ("glucose", 70.0, 100.0),
    ("blood_pressure", 90.0, 120.0),
    ("systolic", 90.0, 120.0),
    ("diastolic", 60.0, 80.0),
    ("cholesterol", 0.0, 200.0),
    ("heart_rate", 60.0, 100.0),
    ("bmi", 18.5, 24.9),
    ("hemoglobin", 12.0, 16.0),
    ("wbc", 4.5, 11.0),
    ("rbc", 4.5, 6.0),
];

/// (key, high label, low label)
const STANDARD_CONDITIONS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("glucose", Some("Pre-diabetes"), Some("Hypoglycemia")),
    ("blood_pressure", Some("Hypertension"), Some("Hypotension")),
    ("systolic", Some("Hypertension"), Some("Hypotension")),
    ("diastolic", Some("Hypertension"), Some("Hypotension")),
    ("cholesterol", Some("High Cholesterol"), None),
    ("bmi", Some("Overweight"), Some("Underweight")),
];

const STANDARD_RECOMMENDATIONS: &[(&str, &str)] = &[
    (NORMAL_CONDITION, "Maintain your current healthy lifestyle with regular checkups."),
    ("Hypertension", "Reduce sodium intake, exercise regularly, monitor blood pressure daily, and consult a cardiologist."),
    ("Pre-diabetes", "Monitor carbohydrate intake, increase physical activity, and get regular blood sugar checks."),
    ("High Cholesterol", "Reduce saturated fats, increase fiber intake, exercise regularly, and consider statins if recommended."),
    ("Overweight", "Focus on balanced diet with portion control, regular exercise, and lifestyle changes."),
    ("Underweight", "Increase calorie intake with nutrient-dense foods, strength training, and medical consultation."),
    ("Hypoglycemia", "Eat regular meals, monitor blood sugar, and carry emergency glucose."),
    (ABNORMAL_CONDITION, "Consult with a healthcare professional for comprehensive evaluation."),
    (UNMAPPED_CONDITION, "Seek immediate medical consultation for proper diagnosis."),
];

/// (pattern, advice), checked in order against findings that mention "high"
const STANDARD_ADVICE: &[(&str, &str)] = &[
    ("glucose", "Limit sugar and refined carbohydrates."),
    ("blood_pressure", "Practice stress management techniques."),
    ("cholesterol", "Increase omega-3 fatty acids intake."),
    ("bmi", "Aim for gradual weight loss through diet and exercise."),
];

static STANDARD_TABLES: Lazy<Arc<ReferenceTables>> = Lazy::new(|| Arc::new(ReferenceTables::standard()));

/// Errors raised when assembling custom reference tables
#[derive(Debug, Error, PartialEq)]
pub enum ReferenceTableError {
    /// Keys must be non-empty and lower-case to match lower-cased names
    #[error("Invalid metric key '{0}': keys must be non-empty and lower-case")]
    InvalidKey(String),

    /// Low bound above high bound, or a non-finite bound
    #[error("Invalid range for '{key}': [{low}, {high}]")]
    InvalidRange { key: String, low: f64, high: f64 },

    /// The recommendation table must have an entry to fall back on
    #[error("Recommendation table is missing the '{0}' entry")]
    MissingRecommendation(String),
}

/// Normal interval for one metric key
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRange {
    pub key: String,
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    /// Classify a parsed value. Both bounds are inclusive.
    pub fn classify(&self, value: f64) -> TestStatus {
        if value < self.low {
            TestStatus::Low
        } else if value > self.high {
            TestStatus::High
        } else {
            TestStatus::Normal
        }
    }
}

/// Condition labels for one metric key
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRule {
    pub key: String,
    pub high: Option<String>,
    pub low: Option<String>,
}

impl ConditionRule {
    pub fn label(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::High => self.high.as_deref(),
            Direction::Low => self.low.as_deref(),
        }
    }
}

/// Extra advice for findings that contain `pattern` and mention "high"
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRule {
    pub pattern: String,
    pub advice: String,
}

/// Immutable lookup data for the analyzer
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    ranges: Vec<ReferenceRange>,
    conditions: Vec<ConditionRule>,
    recommendations: HashMap<String, String>,
    advice: Vec<AdviceRule>,
}

impl ReferenceTables {
    /// Assemble and validate a custom set of tables
    pub fn new(
        ranges: Vec<ReferenceRange>,
        conditions: Vec<ConditionRule>,
        recommendations: HashMap<String, String>,
        advice: Vec<AdviceRule>,
    ) -> Result<Self, ReferenceTableError> {
        for range in &ranges {
            check_key(&range.key)?;
            if !range.low.is_finite() || !range.high.is_finite() || range.low > range.high {
                return Err(ReferenceTableError::InvalidRange {
                    key: range.key.clone(),
                    low: range.low,
                    high: range.high,
                });
            }
        }
        for rule in &conditions {
            check_key(&rule.key)?;
        }
        for rule in &advice {
            check_key(&rule.pattern)?;
        }
        if !recommendations.contains_key(ABNORMAL_CONDITION) {
            return Err(ReferenceTableError::MissingRecommendation(ABNORMAL_CONDITION.to_string()));
        }

        Ok(Self {
            ranges,
            conditions,
            recommendations,
            advice,
        })
    }

    /// The built-in tables
    pub fn standard() -> Self {
        Self {
            ranges: STANDARD_RANGES
                .iter()
                .map(|&(key, low, high)| ReferenceRange { key: key.to_string(), low, high })
                .collect(),
            conditions: STANDARD_CONDITIONS
                .iter()
                .map(|&(key, high, low)| ConditionRule {
                    key: key.to_string(),
                    high: high.map(str::to_string),
                    low: low.map(str::to_string),
                })
                .collect(),
            recommendations: STANDARD_RECOMMENDATIONS
                .iter()
                .map(|&(condition, text)| (condition.to_string(), text.to_string()))
                .collect(),
            advice: STANDARD_ADVICE
                .iter()
                .map(|&(pattern, advice)| AdviceRule {
                    pattern: pattern.to_string(),
                    advice: advice.to_string(),
                })
                .collect(),
        }
    }

    /// Process-wide handle to the built-in tables
    pub fn shared() -> Arc<ReferenceTables> {
        Arc::clone(&STANDARD_TABLES)
    }

    /// Ranges in matching order
    pub fn ranges(&self) -> &[ReferenceRange] {
        &self.ranges
    }

    /// First range whose key is a substring of the lower-cased name
    pub fn match_range(&self, test_name: &str) -> Option<&ReferenceRange> {
        let name = test_name.to_lowercase();
        self.ranges.iter().find(|range| name.contains(range.key.as_str()))
    }

    pub fn condition_rule(&self, metric_key: &str) -> Option<&ConditionRule> {
        self.conditions.iter().find(|rule| rule.key == metric_key)
    }

    /// Recommendation for an overall condition, falling back to the
    /// "Abnormal" entry for anything not listed
    pub fn recommendation(&self, condition: &str) -> &str {
        self.recommendations
            .get(condition)
            .or_else(|| self.recommendations.get(ABNORMAL_CONDITION))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Advice for the first pattern contained in an already lower-cased finding
    pub fn advice_for(&self, finding_lower: &str) -> Option<&str> {
        self.advice
            .iter()
            .find(|rule| finding_lower.contains(rule.pattern.as_str()))
            .map(|rule| rule.advice.as_str())
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_key(key: &str) -> Result<(), ReferenceTableError> {
    if key.is_empty() || key.to_lowercase() != key {
        return Err(ReferenceTableError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_match_order() {
        let tables = ReferenceTables::standard();

        assert_eq!(tables.match_range("Fasting Glucose").unwrap().key, "glucose");
        assert_eq!(tables.match_range("SYSTOLIC").unwrap().key, "systolic");
        // Declaration order decides between several contained keys.
        assert_eq!(tables.match_range("blood_pressure_systolic").unwrap().key, "blood_pressure");
        assert_eq!(tables.match_range("glucose_bmi_ratio").unwrap().key, "glucose");
        assert!(tables.match_range("Blood Pressure").is_none());
        assert!(tables.match_range("random_test").is_none());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let range = ReferenceRange { key: "bmi".to_string(), low: 18.5, high: 24.9 };
        assert_eq!(range.classify(18.5), TestStatus::Normal);
        assert_eq!(range.classify(24.9), TestStatus::Normal);
        assert_eq!(range.classify(18.4), TestStatus::Low);
        assert_eq!(range.classify(25.0), TestStatus::High);
    }

    #[test]
    fn test_recommendation_fallback() {
        let tables = ReferenceTables::standard();
        assert!(tables.recommendation("Pre-diabetes").starts_with("Monitor carbohydrate intake"));
        assert_eq!(
            tables.recommendation("Pre-diabetes, Hypertension"),
            "Consult with a healthcare professional for comprehensive evaluation."
        );
    }

    #[test]
    fn test_advice_first_pattern_wins() {
        let tables = ReferenceTables::standard();
        assert_eq!(
            tables.advice_for("glucose_bmi is high (40)"),
            Some("Limit sugar and refined carbohydrates.")
        );
        assert_eq!(tables.advice_for("heart_rate is high (120)"), None);
    }

    #[test]
    fn test_custom_tables_are_validated() {
        let mut recommendations = HashMap::new();
        recommendations.insert(ABNORMAL_CONDITION.to_string(), "See a doctor.".to_string());

        let bad_range = ReferenceTables::new(
            vec![ReferenceRange { key: "ldl".to_string(), low: 100.0, high: 50.0 }],
            vec![],
            recommendations.clone(),
            vec![],
        );
        assert!(matches!(bad_range, Err(ReferenceTableError::InvalidRange { .. })));

        let bad_key = ReferenceTables::new(
            vec![ReferenceRange { key: "LDL".to_string(), low: 0.0, high: 100.0 }],
            vec![],
            recommendations.clone(),
            vec![],
        );
        assert_eq!(bad_key.unwrap_err(), ReferenceTableError::InvalidKey("LDL".to_string()));

        let no_fallback = ReferenceTables::new(vec![], vec![], HashMap::new(), vec![]);
        assert!(matches!(no_fallback, Err(ReferenceTableError::MissingRecommendation(_))));

        let ok = ReferenceTables::new(
            vec![ReferenceRange { key: "ldl".to_string(), low: 0.0, high: 100.0 }],
            vec![],
            recommendations,
            vec![],
        );
        assert!(ok.is_ok());
    }
}
