use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Ordered mapping of caller-supplied test names to measured values
pub type TestResults = IndexMap<String, TestValue>;

/// A measured value as supplied by the caller.
///
/// Numbers keep their JSON representation so findings echo the value exactly
/// as it was sent (`130` stays `130`, `130.0` stays `130.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestValue {
    /// A JSON number
    Number(serde_json::Number),
    /// Free text that may or may not hold a number
    Text(String),
}

impl TestValue {
    /// Numeric interpretation of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TestValue::Number(n) => n.as_f64(),
            TestValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for TestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestValue::Number(n) => write!(f, "{}", n),
            TestValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TestValue {
    fn from(value: i64) -> Self {
        TestValue::Number(value.into())
    }
}

impl From<f64> for TestValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(TestValue::Number)
            .unwrap_or_else(|| TestValue::Text(value.to_string()))
    }
}

impl From<&str> for TestValue {
    fn from(value: &str) -> Self {
        TestValue::Text(value.to_string())
    }
}

impl From<String> for TestValue {
    fn from(value: String) -> Self {
        TestValue::Text(value)
    }
}

/// Direction of an out-of-range value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Low,
    High,
}

/// Classification of a single observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Below the reference range
    Low,
    /// Inside the reference range, bounds included
    Normal,
    /// Above the reference range
    High,
    /// The value could not be read as a number
    Unparseable,
}

impl TestStatus {
    /// Out-of-range direction, if any
    pub fn direction(self) -> Option<Direction> {
        match self {
            TestStatus::Low => Some(Direction::Low),
            TestStatus::High => Some(Direction::High),
            TestStatus::Normal | TestStatus::Unparseable => None,
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TestStatus::Low => "LOW",
            TestStatus::Normal => "NORMAL",
            TestStatus::High => "HIGH",
            TestStatus::Unparseable => "UNPARSEABLE",
        };
        f.write_str(label)
    }
}

/// One test as seen by the analyzer
#[derive(Debug, Clone, PartialEq)]
pub struct TestObservation {
    /// Test name exactly as supplied
    pub test_name: String,
    /// Raw value exactly as supplied
    pub value: TestValue,
    /// Matched reference key; `None` when no key is a substring of the name
    pub metric_key: Option<String>,
    /// Classification; `None` exactly when `metric_key` is `None`
    pub status: Option<TestStatus>,
}

impl TestObservation {
    /// Human-readable finding line, or `None` for unmatched tests
    pub fn finding(&self) -> Option<String> {
        let status = self.status?;
        Some(match status {
            TestStatus::Unparseable => format!("{}: {} (could not analyze)", self.test_name, self.value),
            _ => format!("{} is {} ({})", self.test_name, status, self.value),
        })
    }

    /// True for classified observations that are not NORMAL
    pub fn is_abnormal(&self) -> bool {
        matches!(self.status, Some(status) if status != TestStatus::Normal)
    }
}

/// Verdict produced for one set of test results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AnalysisResult {
    /// Overall condition, possibly several labels joined by ", "
    pub condition: String,

    /// Heuristic certainty between 50 and 95
    pub confidence: u8,

    /// One finding per recognised test, in input order
    pub abnormalities: Vec<String>,

    /// Narrative summary of the findings
    pub analysis: String,

    /// Narrative recommendation
    pub recommendations: String,
}
