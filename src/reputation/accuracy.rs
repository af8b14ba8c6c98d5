use serde::Serialize;

use super::snapshot::AssessmentRecord;

/// Deviation at which accuracy bottoms out at 0%
const MAX_DEVIATION: f64 = 10.0;

/// Accuracy estimate for one assessor, with diagnostics for the breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyDetails {
    /// Assessments that had a population average to compare against
    pub total_assessments: usize,
    /// Mean absolute deviation, rounded to 2 decimals
    pub average_deviation: f64,
    /// Accuracy percentage, rounded to 1 decimal
    pub accuracy_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyEstimate {
    /// Unrounded accuracy in [0, 100], used for scoring
    pub accuracy: f64,
    pub details: AccuracyDetails,
}

/// Estimate how closely an assessor tracks the crowd.
///
/// Formula:
///   avg_deviation = mean(|assessor_score - population_average|)
///   accuracy = clamp((10 - avg_deviation) * 10, 0, 100)
///
/// Records without a population average are ignored. Returns None when
/// nothing is left, meaning accuracy is unknown (not zero).
pub fn estimate(assessments: &[AssessmentRecord]) -> Option<AccuracyEstimate> {
    let deviations: Vec<f64> = assessments
        .iter()
        .filter_map(|a| {
            a.population_average_score
                .map(|avg| (a.assessor_score - avg).abs())
        })
        .collect();

    if deviations.is_empty() {
        return None;
    }

    let avg_deviation = deviations.iter().sum::<f64>() / deviations.len() as f64;
    let accuracy = ((MAX_DEVIATION - avg_deviation) * 10.0).clamp(0.0, 100.0);

    Some(AccuracyEstimate {
        accuracy,
        details: AccuracyDetails {
            total_assessments: deviations.len(),
            average_deviation: round_to(avg_deviation, 2),
            accuracy_score: round_to(accuracy, 1),
        },
    })
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(estimate(&[]), None);
    }

    #[test]
    fn test_all_null_averages_is_unknown() {
        let records = vec![
            AssessmentRecord::new(7.0, None),
            AssessmentRecord::new(3.0, None),
        ];
        assert_eq!(estimate(&records), None);
    }

    #[test]
    fn test_exact_match_is_full_accuracy() {
        let est = estimate(&[AssessmentRecord::new(5.0, Some(5.0))]).unwrap();
        assert_eq!(est.accuracy, 100.0);
        assert_eq!(est.details.average_deviation, 0.0);
    }

    #[test]
    fn test_max_deviation_clamps_to_zero() {
        let est = estimate(&[AssessmentRecord::new(10.0, Some(0.0))]).unwrap();
        assert_eq!(est.accuracy, 0.0);

        // Scores outside the usual range can't push accuracy negative
        let est = estimate(&[AssessmentRecord::new(25.0, Some(0.0))]).unwrap();
        assert_eq!(est.accuracy, 0.0);
    }

    #[test]
    fn test_nulls_are_skipped_not_counted() {
        let records = vec![
            AssessmentRecord::new(8.0, Some(6.0)),
            AssessmentRecord::new(1.0, None),
            AssessmentRecord::new(7.0, Some(7.0)),
        ];
        let est = estimate(&records).unwrap();
        assert_eq!(est.details.total_assessments, 2);
        assert_eq!(est.details.average_deviation, 1.0);
        assert_eq!(est.accuracy, 90.0);
    }

    #[test]
    fn test_diagnostics_are_rounded() {
        // deviations 1, 0, 0 => 0.333...
        let records = vec![
            AssessmentRecord::new(6.0, Some(5.0)),
            AssessmentRecord::new(5.0, Some(5.0)),
            AssessmentRecord::new(5.0, Some(5.0)),
        ];
        let est = estimate(&records).unwrap();
        assert_eq!(est.details.average_deviation, 0.33);
        assert_eq!(est.details.accuracy_score, 96.7);
        assert!(est.accuracy > 96.66 && est.accuracy < 96.67);
    }
}
