use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiClass {
    #[default]
    Multinomial,
    Ovr,
}

/// Fitted linear classifier with a probabilistic output.
///
/// `coef` has one row per class, or a single row for a binary problem
/// (the row then scores the second class).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / total).collect()
}

impl LogisticRegression {
    pub(crate) fn validate(&self, n_features: usize) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(AdapterError::invalid_model(format!(
                "classifier needs at least 2 classes, found {n_classes}"
            )));
        }
        let expected_rows = if n_classes == 2 { 1 } else { n_classes };
        if self.coef.len() != expected_rows {
            return Err(AdapterError::invalid_model(format!(
                "{n_classes} classes need {expected_rows} coefficient rows, found {}",
                self.coef.len()
            )));
        }
        if self.intercept.len() != expected_rows {
            return Err(AdapterError::invalid_model(format!(
                "expected {expected_rows} intercepts, found {}",
                self.intercept.len()
            )));
        }
        if let Some(row) = self.coef.iter().find(|r| r.len() != n_features) {
            return Err(AdapterError::invalid_model(format!(
                "preprocessor produces {n_features} features but classifier expects {}",
                row.len()
            )));
        }
        Ok(())
    }

    fn decision(&self, x: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| w.iter().zip(x).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }

    /// Class probabilities for one feature row, in `classes` order.
    pub fn predict_proba_row(&self, x: &[f64]) -> Vec<f64> {
        let scores = self.decision(x);
        if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            return vec![1.0 - p, p];
        }
        match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.into_iter().map(sigmoid).collect();
                let total: f64 = raw.iter().sum();
                raw.into_iter().map(|p| p / total).collect()
            }
        }
    }

    pub fn predict_proba(&self, features: &[Vec<f64>]) -> Vec<Vec<f64>> {
        features.iter().map(|x| self.predict_proba_row(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(coef: Vec<f64>, intercept: f64) -> LogisticRegression {
        LogisticRegression {
            classes: vec!["no".into(), "yes".into()],
            coef: vec![coef],
            intercept: vec![intercept],
            multi_class: MultiClass::default(),
        }
    }

    #[test]
    fn zero_weights_are_undecided() {
        let clf = binary(vec![0.0, 0.0], 0.0);
        assert_eq!(clf.predict_proba_row(&[3.0, -1.0]), vec![0.5, 0.5]);
    }

    #[test]
    fn binary_scores_second_class() {
        let clf = binary(vec![2.0], -1.0);
        let p = clf.predict_proba_row(&[1.0]);
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((p[1] - expected).abs() < 1e-12);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn multinomial_rows_sum_to_one() {
        let clf = LogisticRegression {
            classes: vec!["a".into(), "b".into(), "c".into()],
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            intercept: vec![0.0, 0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        };
        let probs = clf.predict_proba(&[vec![1.0, 2.0], vec![1000.0, -1000.0]]);
        for row in &probs {
            assert_eq!(row.len(), 3);
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        assert!(probs[0][1] > probs[0][0]);
        assert!(probs[1][0] > 0.99);
    }

    #[test]
    fn ovr_is_normalised() {
        let clf = LogisticRegression {
            classes: vec!["a".into(), "b".into(), "c".into()],
            coef: vec![vec![0.0], vec![0.0], vec![0.0]],
            intercept: vec![0.0, 0.0, 0.0],
            multi_class: MultiClass::Ovr,
        };
        let p = clf.predict_proba_row(&[5.0]);
        for v in p {
            assert!((v - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn coefficient_width_is_validated() {
        let clf = binary(vec![1.0, 2.0], 0.0);
        assert!(clf.validate(2).is_ok());
        assert!(matches!(clf.validate(3), Err(AdapterError::InvalidModel(_))));
    }

    #[test]
    fn three_classes_need_three_rows() {
        let clf = LogisticRegression {
            classes: vec!["a".into(), "b".into(), "c".into()],
            coef: vec![vec![1.0]],
            intercept: vec![0.0],
            multi_class: MultiClass::Multinomial,
        };
        assert!(matches!(clf.validate(1), Err(AdapterError::InvalidModel(_))));
    }
}
