use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;

use crate::analysis::reference::{
    ReferenceTables, ABNORMAL_CONDITION, NORMAL_CONDITION, UNMAPPED_CONDITION,
};
use crate::entities::analysis::{
    AnalysisResult, Direction, TestObservation, TestStatus, TestValue,
};

/// Confidence when every recognised test is in range
pub const CONFIDENCE_NORMAL: u8 = 95;
const CONFIDENCE_BASE: usize = 85;
const CONFIDENCE_STEP: usize = 5;
/// Confidence never drops below this
pub const CONFIDENCE_FLOOR: u8 = 50;

const ADVICE_TRIGGER: &str = "high";
const ADVICE_SEPARATOR: &str = ". ";

const ALL_NORMAL_ANALYSIS: &str =
    "All test results are within normal ranges. Excellent health indicators!";

/// Rule-based test result interpreter.
///
/// Stateless apart from the shared reference tables, so one instance can
/// serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct Analyzer {
    tables: Arc<ReferenceTables>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(ReferenceTables::shared())
    }
}

impl Analyzer {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Match and classify a single test
    pub fn observe(&self, test_name: &str, value: &TestValue) -> TestObservation {
        let matched = self.tables.match_range(test_name);

        let status = matched.map(|range| match value.as_f64() {
            Some(number) => range.classify(number),
            None => TestStatus::Unparseable,
        });

        TestObservation {
            test_name: test_name.to_string(),
            value: value.clone(),
            metric_key: matched.map(|range| range.key.clone()),
            status,
        }
    }

    /// Condition label for an out-of-range metric
    pub fn get_condition(&self, metric_key: &str, direction: Direction) -> &str {
        match self.tables.condition_rule(metric_key) {
            Some(rule) => rule.label(direction).unwrap_or(ABNORMAL_CONDITION),
            None => UNMAPPED_CONDITION,
        }
    }

    /// Analyze a set of test results.
    ///
    /// Tests whose name matches no reference key are left out of the result
    /// entirely. Values that do not parse are reported inline and never fail
    /// the call.
    pub fn analyze<'a, I, K>(&self, test_results: I) -> AnalysisResult
    where
        I: IntoIterator<Item = (&'a K, &'a TestValue)>,
        K: AsRef<str> + ?Sized + 'a,
    {
        let observations: Vec<TestObservation> = test_results
            .into_iter()
            .map(|(name, value)| self.observe(name.as_ref(), value))
            .inspect(|observation| {
                if observation.metric_key.is_none() {
                    debug!(test = %observation.test_name, "No reference range matches test, omitting");
                }
            })
            .collect();

        self.summarize(&observations)
    }

    /// Aggregate classified observations into a verdict
    pub fn summarize(&self, observations: &[TestObservation]) -> AnalysisResult {
        // Distinct labels in first-seen order.
        let conditions: IndexSet<&str> = observations
            .iter()
            .filter_map(|o| Some((o.metric_key.as_deref()?, o.status?.direction()?)))
            .map(|(key, direction)| self.get_condition(key, direction))
            .collect();

        let (condition, confidence) = if conditions.is_empty() {
            (NORMAL_CONDITION.to_string(), CONFIDENCE_NORMAL)
        } else {
            let penalty = CONFIDENCE_STEP.saturating_mul(conditions.len());
            let confidence = CONFIDENCE_BASE
                .saturating_sub(penalty)
                .max(CONFIDENCE_FLOOR as usize) as u8;
            (conditions.iter().copied().collect::<Vec<_>>().join(", "), confidence)
        };

        let abnormalities: Vec<String> = observations.iter().filter_map(TestObservation::finding).collect();
        let analysis = self.generate_analysis(observations, &condition);
        let recommendations = self.generate_recommendations(observations, &condition);

        debug!(
            condition = %condition,
            confidence,
            findings = abnormalities.len(),
            "Analysis complete"
        );

        AnalysisResult {
            condition,
            confidence,
            abnormalities,
            analysis,
            recommendations,
        }
    }

    fn generate_analysis(&self, observations: &[TestObservation], condition: &str) -> String {
        let abnormal: Vec<String> = observations
            .iter()
            .filter(|o| o.is_abnormal())
            .filter_map(TestObservation::finding)
            .collect();

        if abnormal.is_empty() {
            return ALL_NORMAL_ANALYSIS.to_string();
        }

        format!(
            "Analysis shows {} abnormal finding(s): {}. Suggested condition: {}.",
            abnormal.len(),
            abnormal.join(", "),
            condition
        )
    }

    fn generate_recommendations(&self, observations: &[TestObservation], condition: &str) -> String {
        let base = self.tables.recommendation(condition);

        // Any finding whose text mentions "high" qualifies, whatever its status.
        let advice: Vec<&str> = observations
            .iter()
            .filter_map(TestObservation::finding)
            .map(|finding| finding.to_lowercase())
            .filter(|finding| finding.contains(ADVICE_TRIGGER))
            .filter_map(|finding| self.tables.advice_for(&finding))
            .collect();

        if advice.is_empty() {
            base.to_string()
        } else {
            format!("{} Additional advice: {}", base, advice.join(ADVICE_SEPARATOR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::analysis::TestResults;

    fn results(pairs: &[(&str, TestValue)]) -> TestResults {
        pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_all_normal() {
        let analyzer = Analyzer::default();
        let input = results(&[
            ("glucose", 85.into()),
            ("Cholesterol Total", 180.into()),
            ("heart_rate", "72".into()),
        ]);

        let result = analyzer.analyze(&input);

        assert_eq!(result.condition, "Normal");
        assert_eq!(result.confidence, 95);
        assert_eq!(
            result.abnormalities,
            vec![
                "glucose is NORMAL (85)",
                "Cholesterol Total is NORMAL (180)",
                "heart_rate is NORMAL (72)",
            ]
        );
        assert_eq!(result.analysis, ALL_NORMAL_ANALYSIS);
        assert_eq!(result.recommendations, "Maintain your current healthy lifestyle with regular checkups.");
    }

    #[test]
    fn test_high_glucose() {
        let result = Analyzer::default().analyze(&results(&[("glucose", 130.into())]));

        assert_eq!(result.abnormalities, vec!["glucose is HIGH (130)"]);
        assert_eq!(result.condition, "Pre-diabetes");
        assert_eq!(result.confidence, 80);
        assert!(result.recommendations.starts_with("Monitor carbohydrate intake"));
        assert!(result
            .recommendations
            .ends_with("Additional advice: Limit sugar and refined carbohydrates."));
        assert_eq!(
            result.analysis,
            "Analysis shows 1 abnormal finding(s): glucose is HIGH (130). Suggested condition: Pre-diabetes."
        );
    }

    #[test]
    fn test_low_systolic_collapses_with_normal_diastolic() {
        let result = Analyzer::default().analyze(&results(&[
            ("Systolic", 85.into()),
            ("Diastolic", 70.into()),
        ]));

        assert_eq!(result.abnormalities, vec!["Systolic is LOW (85)", "Diastolic is NORMAL (70)"]);
        assert_eq!(result.condition, "Hypotension");
        assert_eq!(result.confidence, 80);
    }

    #[test]
    fn test_duplicate_labels_count_once() {
        let result = Analyzer::default().analyze(&results(&[
            ("Systolic", 85.into()),
            ("Diastolic", 50.into()),
        ]));

        assert_eq!(result.condition, "Hypotension");
        assert_eq!(result.confidence, 80);
        assert!(result.analysis.starts_with("Analysis shows 2 abnormal finding(s)"));
    }

    #[test]
    fn test_two_labels_in_first_seen_order() {
        let result = Analyzer::default().analyze(&results(&[
            ("bmi", 31.2.into()),
            ("glucose", 140.into()),
        ]));

        assert_eq!(result.condition, "Overweight, Pre-diabetes");
        assert_eq!(result.confidence, 75);
        // Multi-label conditions use the generic recommendation.
        assert!(result
            .recommendations
            .starts_with("Consult with a healthcare professional for comprehensive evaluation."));
        assert!(result.recommendations.contains(
            "Additional advice: Aim for gradual weight loss through diet and exercise.. Limit sugar and refined carbohydrates."
        ));
    }

    #[test]
    fn test_confidence_floor() {
        let result = Analyzer::default().analyze(&results(&[
            ("glucose", 40.into()),
            ("systolic", 150.into()),
            ("cholesterol", 260.into()),
            ("bmi", 15.into()),
            ("hemoglobin", 8.into()),
            ("glucose_2h", 190.into()),
            ("wbc", 1.into()),
        ]));

        // Hypoglycemia, Hypertension, High Cholesterol, Underweight,
        // Requires medical attention, Pre-diabetes
        assert_eq!(
            result.condition,
            "Hypoglycemia, Hypertension, High Cholesterol, Underweight, Requires medical attention, Pre-diabetes"
        );
        assert_eq!(result.confidence, 55);

        let mut input = TestResults::new();
        for i in 0..20 {
            input.insert(format!("glucose_{}", i), 200.into());
            input.insert(format!("bmi_{}", i), 40.into());
            input.insert(format!("systolic_{}", i), 200.into());
            input.insert(format!("cholesterol_{}", i), 300.into());
            input.insert(format!("rbc_{}", i), 1.into());
            input.insert(format!("bmi_low_{}", i), 10.into());
            input.insert(format!("glucose_low_{}", i), 10.into());
            input.insert(format!("systolic_low_{}", i), 10.into());
        }
        let result = Analyzer::default().analyze(&input);
        assert_eq!(result.confidence, CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_boundaries_are_normal() {
        let result = Analyzer::default().analyze(&results(&[
            ("glucose", 70.into()),
            ("glucose_max", 100.into()),
            ("bmi", 24.9.into()),
            ("wbc", "4.5".into()),
        ]));

        assert_eq!(result.condition, "Normal");
        assert_eq!(result.confidence, 95);
        assert!(result.abnormalities.iter().all(|a| a.contains("NORMAL")));
    }

    #[test]
    fn test_unmatched_tests_are_dropped() {
        let result = Analyzer::default().analyze(&results(&[("random_test", "abc".into())]));

        assert!(result.abnormalities.is_empty());
        assert_eq!(result.condition, "Normal");
        assert_eq!(result.confidence, 95);
    }

    #[test]
    fn test_unparseable_value_is_reported_inline() {
        let result = Analyzer::default().analyze(&results(&[("cholesterol", "high".into())]));

        assert_eq!(result.abnormalities, vec!["cholesterol: high (could not analyze)"]);
        assert_eq!(result.condition, "Normal");
        assert_eq!(result.confidence, 95);
        assert_eq!(
            result.analysis,
            "Analysis shows 1 abnormal finding(s): cholesterol: high (could not analyze). Suggested condition: Normal."
        );
        // The finding text mentions "high", so cholesterol advice still applies.
        assert_eq!(
            result.recommendations,
            "Maintain your current healthy lifestyle with regular checkups. Additional advice: Increase omega-3 fatty acids intake."
        );
    }

    #[test]
    fn test_fallback_condition_labels() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.get_condition("cholesterol", Direction::Low), "Abnormal");
        assert_eq!(analyzer.get_condition("heart_rate", Direction::High), "Requires medical attention");
        assert_eq!(analyzer.get_condition("glucose", Direction::Low), "Hypoglycemia");

        let result = analyzer.analyze(&results(&[("heart_rate", 130.into())]));
        assert_eq!(result.condition, "Requires medical attention");
        assert_eq!(result.recommendations, "Seek immediate medical consultation for proper diagnosis.");

        let result = analyzer.analyze(&results(&[("hemoglobin", 9.5.into())]));
        assert_eq!(result.abnormalities, vec!["hemoglobin is LOW (9.5)"]);
        assert_eq!(result.condition, "Requires medical attention");
    }

    #[test]
    fn test_advice_follows_each_high_finding() {
        let result = Analyzer::default().analyze(&results(&[
            ("blood_pressure", 150.into()),
            ("cholesterol", 250.into()),
            ("heart_rate", 110.into()),
        ]));

        assert_eq!(result.condition, "Hypertension, High Cholesterol, Requires medical attention");
        assert_eq!(result.confidence, 70);
        assert!(result.recommendations.ends_with(
            "Additional advice: Practice stress management techniques.. Increase omega-3 fatty acids intake."
        ));
    }

    #[test]
    fn test_advice_scans_every_finding_mentioning_high() {
        let analyzer = Analyzer::default();

        let result = analyzer.analyze(&results(&[("cholesterol", "high".into())]));
        assert_eq!(
            result.recommendations,
            "Maintain your current healthy lifestyle with regular checkups. Additional advice: Increase omega-3 fatty acids intake."
        );

        // NORMAL status, but the test name carries "high".
        let result = analyzer.analyze(&results(&[("cholesterol_high_density", 55.into())]));
        assert_eq!(result.condition, "Normal");
        assert!(result.recommendations.ends_with("Additional advice: Increase omega-3 fatty acids intake."));

        // LOW findings without "high" in their text get no advice.
        let result = analyzer.analyze(&results(&[("glucose", 50.into())]));
        assert!(!result.recommendations.contains("Additional advice"));

        let result = analyzer.analyze(&results(&[
            ("glucose", 130.into()),
            ("blood_pressure", 150.into()),
        ]));
        assert!(result.recommendations.ends_with(
            "Additional advice: Limit sugar and refined carbohydrates.. Practice stress management techniques."
        ));
    }

    #[test]
    fn test_idempotent() {
        let analyzer = Analyzer::default();
        let input = results(&[
            ("Systolic", 150.into()),
            ("random", "x".into()),
            ("BMI", "17".into()),
        ]);

        assert_eq!(analyzer.analyze(&input), analyzer.analyze(&input));
    }

    #[test]
    fn test_works_with_plain_maps() {
        let mut input = std::collections::BTreeMap::new();
        input.insert("glucose".to_string(), TestValue::from(60));
        let result = Analyzer::default().analyze(&input);
        assert_eq!(result.condition, "Hypoglycemia");
    }
}
