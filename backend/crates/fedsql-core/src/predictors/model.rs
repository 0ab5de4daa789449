//! The built-in baseline learner.
//!
//! Numeric targets: univariate least squares on the numeric feature most
//! correlated with the target, falling back to the mean. Categorical targets:
//! majority class per value of the most predictive categorical feature,
//! falling back to the global majority.

use std::collections::HashMap;

use fedsql_commons::Value;
use serde_json::json;

use crate::result::TableData;

/// Seam for swapping the learning algorithm.
pub trait Trainer: Send + Sync {
    /// Fit a model predicting `target` from the other columns of `data`.
    fn train(&self, data: &TableData, target: &str) -> Result<TrainedModel, String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BaselineTrainer;

#[derive(Debug, Clone, PartialEq)]
enum Fit {
    Linear {
        feature: Option<String>,
        slope: f64,
        intercept: f64,
        mean: f64,
        residual_std: f64,
        r2: f64,
        integral: bool,
    },
    Majority {
        feature: Option<String>,
        by_value: HashMap<String, (Value, f64)>,
        fallback: Value,
        fallback_share: f64,
        accuracy: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    target: String,
    features: Vec<String>,
    numeric_features: Vec<String>,
    fit: Fit,
}

impl Trainer for BaselineTrainer {
    fn train(&self, data: &TableData, target: &str) -> Result<TrainedModel, String> {
        let target_idx = data
            .column_index(target)
            .ok_or_else(|| format!("Target column '{}' not found in training data", target))?;
        let target = data.columns[target_idx].clone();

        let rows: Vec<&Vec<Value>> = data
            .rows
            .iter()
            .filter(|r| r.get(target_idx).map(|v| !v.is_null()).unwrap_or(false))
            .collect();
        if rows.is_empty() {
            return Err(format!("No training rows with a value for '{}'", target));
        }

        let features: Vec<String> = data
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_idx)
            .map(|(_, c)| c.clone())
            .collect();
        let numeric_features: Vec<String> = features
            .iter()
            .filter(|f| {
                data.column_index(f)
                    .map(|i| column_is_numeric(&rows, i))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let target_numeric = rows.iter().all(|r| r[target_idx].is_numeric());
        let fit = if target_numeric {
            fit_linear(data, &rows, target_idx, &numeric_features)
        } else {
            let categorical: Vec<&String> = features
                .iter()
                .filter(|f| !numeric_features.contains(f))
                .collect();
            fit_majority(data, &rows, target_idx, &categorical)
        };

        Ok(TrainedModel {
            target,
            features,
            numeric_features,
            fit,
        })
    }
}

fn column_is_numeric(rows: &[&Vec<Value>], idx: usize) -> bool {
    let mut seen = false;
    for row in rows {
        match row.get(idx) {
            Some(Value::Null) | None => {}
            Some(v) if v.is_numeric() => seen = true,
            Some(_) => return false,
        }
    }
    seen
}

fn fit_linear(data: &TableData, rows: &[&Vec<Value>], target_idx: usize, numeric: &[String]) -> Fit {
    let ys: Vec<f64> = rows.iter().filter_map(|r| r[target_idx].as_f64()).collect();
    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
    let integral = rows.iter().all(|r| matches!(r[target_idx], Value::Int(_)));

    // (feature, slope, intercept, r2, residual_std)
    let mut best: Option<(String, f64, f64, f64, f64)> = None;
    for feature in numeric {
        let Some(idx) = data.column_index(feature) else {
            continue;
        };
        let pairs: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|r| Some((r.get(idx)?.as_f64()?, r[target_idx].as_f64()?)))
            .collect();
        if pairs.len() < 2 {
            continue;
        }
        let n = pairs.len() as f64;
        let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx: f64 = pairs.iter().map(|p| (p.0 - mx).powi(2)).sum();
        let syy: f64 = pairs.iter().map(|p| (p.1 - my).powi(2)).sum();
        let sxy: f64 = pairs.iter().map(|p| (p.0 - mx) * (p.1 - my)).sum();
        if sxx == 0.0 {
            continue;
        }
        let slope = sxy / sxx;
        let intercept = my - slope * mx;
        let r2 = if syy == 0.0 { 1.0 } else { (sxy * sxy) / (sxx * syy) };
        let sse: f64 = pairs
            .iter()
            .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
            .sum();
        let residual_std = (sse / n).sqrt();
        if best.as_ref().map(|b| r2 > b.3).unwrap_or(true) {
            best = Some((feature.clone(), slope, intercept, r2, residual_std));
        }
    }

    match best {
        Some((feature, slope, intercept, r2, residual_std)) => Fit::Linear {
            feature: Some(feature),
            slope,
            intercept,
            mean,
            residual_std,
            r2,
            integral,
        },
        None => {
            let var = ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / ys.len() as f64;
            Fit::Linear {
                feature: None,
                slope: 0.0,
                intercept: mean,
                mean,
                residual_std: var.sqrt(),
                r2: 0.0,
                integral,
            }
        }
    }
}

fn class_counts<'a>(rows: impl Iterator<Item = &'a Value>) -> HashMap<String, (Value, usize)> {
    let mut counts: HashMap<String, (Value, usize)> = HashMap::new();
    for value in rows {
        counts
            .entry(value.render())
            .or_insert_with(|| (value.clone(), 0))
            .1 += 1;
    }
    counts
}

/// Most frequent class; ties go to the smallest rendering so training is
/// deterministic.
fn majority(counts: &HashMap<String, (Value, usize)>) -> Option<(Value, usize)> {
    counts
        .iter()
        .max_by(|a, b| a.1 .1.cmp(&b.1 .1).then_with(|| b.0.cmp(a.0)))
        .map(|(_, (v, c))| (v.clone(), *c))
}

fn fit_majority(data: &TableData, rows: &[&Vec<Value>], target_idx: usize, categorical: &[&String]) -> Fit {
    let total = rows.len();
    let global = class_counts(rows.iter().map(|r| &r[target_idx]));
    let (fallback, fallback_count) = majority(&global).unwrap_or((Value::Null, 0));
    let fallback_share = fallback_count as f64 / total as f64;

    let mut best: Option<(String, HashMap<String, (Value, f64)>, f64)> = None;
    for feature in categorical {
        let Some(idx) = data.column_index(feature) else {
            continue;
        };
        let mut groups: HashMap<String, Vec<&Value>> = HashMap::new();
        for row in rows {
            if let Some(v) = row.get(idx).filter(|v| !v.is_null()) {
                groups.entry(v.render()).or_default().push(&row[target_idx]);
            }
        }
        if groups.is_empty() {
            continue;
        }
        let mut correct = 0usize;
        let mut by_value = HashMap::new();
        for (key, targets) in groups {
            let counts = class_counts(targets.into_iter());
            let group_size: usize = counts.values().map(|c| c.1).sum();
            if let Some((class, count)) = majority(&counts) {
                correct += count;
                by_value.insert(key, (class, count as f64 / group_size as f64));
            }
        }
        let accuracy = correct as f64 / total as f64;
        if best.as_ref().map(|b| accuracy > b.2).unwrap_or(true) {
            best = Some(((*feature).clone(), by_value, accuracy));
        }
    }

    match best {
        Some((feature, by_value, accuracy)) if accuracy > fallback_share => Fit::Majority {
            feature: Some(feature),
            by_value,
            fallback,
            fallback_share,
            accuracy,
        },
        _ => Fit::Majority {
            feature: None,
            by_value: HashMap::new(),
            fallback,
            fallback_share,
            accuracy: fallback_share,
        },
    }
}

/// One predicted cell plus its ancillary values.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub value: Value,
    pub confidence: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl TrainedModel {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// R² for regression, training accuracy for classification.
    pub fn accuracy(&self) -> f64 {
        match &self.fit {
            Fit::Linear { r2, .. } => r2.clamp(0.0, 1.0),
            Fit::Majority { accuracy, .. } => *accuracy,
        }
    }

    /// Names of the columns appended by prediction, target first.
    pub fn output_columns(&self) -> Vec<String> {
        vec![
            self.target.clone(),
            format!("{}_confidence", self.target),
            format!("{}_explain", self.target),
            format!("{}_min", self.target),
            format!("{}_max", self.target),
        ]
    }

    /// Predict one row given a case-insensitive column lookup.
    pub fn predict_one(&self, lookup: impl Fn(&str) -> Option<Value>) -> Prediction {
        match &self.fit {
            Fit::Linear {
                feature,
                slope,
                intercept,
                mean,
                residual_std,
                r2,
                integral,
            } => {
                let x = feature.as_deref().and_then(|f| lookup(f)).and_then(|v| v.as_f64());
                let (estimate, confidence) = match x {
                    Some(x) => (intercept + slope * x, r2.clamp(0.0, 1.0)),
                    None => (*mean, 0.0),
                };
                let band = 1.96 * residual_std;
                let value = if *integral {
                    Value::Int(estimate.round() as i64)
                } else {
                    Value::Float(estimate)
                };
                Prediction {
                    value,
                    confidence,
                    min: Some(estimate - band),
                    max: Some(estimate + band),
                }
            }
            Fit::Majority {
                feature,
                by_value,
                fallback,
                fallback_share,
                ..
            } => {
                let hit = feature
                    .as_deref()
                    .and_then(|f| lookup(f))
                    .filter(|v| !v.is_null())
                    .and_then(|v| by_value.get(&v.render()));
                let (value, confidence) = match hit {
                    Some((class, share)) => (class.clone(), *share),
                    None => (fallback.clone(), *fallback_share),
                };
                Prediction {
                    value,
                    confidence,
                    min: None,
                    max: None,
                }
            }
        }
    }

    fn output_row(&self, prediction: Prediction) -> Vec<Value> {
        let explain = json!({
            "predicted_value": prediction.value.to_json(),
            "confidence": prediction.confidence,
            "anomaly": null,
            "truth": null,
        });
        vec![
            prediction.value,
            Value::Float(prediction.confidence),
            Value::Text(explain.to_string()),
            Value::from(prediction.min),
            Value::from(prediction.max),
        ]
    }

    /// Prediction columns only, one row per input row.
    pub fn predict_table(&self, input: &TableData) -> TableData {
        let rows = input
            .rows
            .iter()
            .map(|row| {
                let prediction = self.predict_one(|col| {
                    input.column_index(col).and_then(|i| row.get(i).cloned())
                });
                self.output_row(prediction)
            })
            .collect();
        TableData::new(self.output_columns(), rows)
    }

    /// Feature columns echoed from the input (missing ones null, numeric
    /// strings coerced), followed by the prediction columns.
    pub fn predict_with_features(&self, input: &TableData) -> TableData {
        let mut columns = self.features.clone();
        columns.extend(self.output_columns());

        let predictions = self.predict_table(input);
        let rows = input
            .rows
            .iter()
            .zip(predictions.rows)
            .map(|(row, predicted)| {
                let mut out: Vec<Value> = self
                    .features
                    .iter()
                    .map(|f| {
                        let value = input
                            .column_index(f)
                            .and_then(|i| row.get(i).cloned())
                            .unwrap_or(Value::Null);
                        if self.numeric_features.contains(f) {
                            coerce_numeric(value)
                        } else {
                            value
                        }
                    })
                    .collect();
                out.extend(predicted);
                out
            })
            .collect();
        TableData::new(columns, rows)
    }
}

fn coerce_numeric(value: Value) -> Value {
    match &value {
        Value::Text(s) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                Value::Int(i)
            } else if let Some(f) = value.as_f64() {
                Value::Float(f)
            } else {
                value
            }
        }
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rentals() -> TableData {
        let rows = (1..=20)
            .map(|i| {
                let sqft = 300 + i * 50;
                let location = if i % 2 == 0 { "great" } else { "poor" };
                vec![
                    Value::Int(sqft),
                    Value::from(location),
                    Value::Int(sqft * 3 + 100),
                ]
            })
            .collect();
        TableData::new(
            vec!["sqft".into(), "location".into(), "rental_price".into()],
            rows,
        )
    }

    #[test]
    fn test_regression_follows_best_feature() {
        let model = BaselineTrainer.train(&rentals(), "rental_price").unwrap();
        assert!((model.accuracy() - 1.0).abs() < 1e-9);

        let prediction = model.predict_one(|c| (c == "sqft").then(|| Value::from("1000")));
        assert_eq!(prediction.value, Value::Int(3100));
        assert!(prediction.confidence > 0.99);
    }

    #[test]
    fn test_regression_without_feature_uses_mean() {
        let model = BaselineTrainer.train(&rentals(), "rental_price").unwrap();
        let prediction = model.predict_one(|_| None);
        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.min.unwrap() <= prediction.max.unwrap());
    }

    #[test]
    fn test_classification_majority_per_value() {
        let data = TableData::new(
            vec!["location".into(), "sqft".into()],
            rentals()
                .rows
                .into_iter()
                .map(|r| vec![r[1].clone(), r[0].clone()])
                .collect(),
        );
        // Predict location from sqft is numeric-only, so the global majority wins
        let model = BaselineTrainer.train(&data, "location").unwrap();
        let p = model.predict_one(|_| Some(Value::Int(400)));
        assert!(matches!(p.value, Value::Text(_)));
        assert_eq!(p.min, None);

        let labelled = TableData::new(
            vec!["kind".into(), "label".into()],
            vec![
                vec![Value::from("a"), Value::from("x")],
                vec![Value::from("a"), Value::from("x")],
                vec![Value::from("b"), Value::from("y")],
            ],
        );
        let model = BaselineTrainer.train(&labelled, "label").unwrap();
        assert_eq!(model.predict_one(|_| Some(Value::from("b"))).value, Value::from("y"));
        assert_eq!(model.accuracy(), 1.0);
    }

    #[test]
    fn test_predict_with_features_shapes_output() {
        let model = BaselineTrainer.train(&rentals(), "rental_price").unwrap();
        let input = TableData::new(
            vec!["SQFT".into()],
            vec![vec![Value::from("1000")], vec![Value::from("500")]],
        );
        let out = model.predict_with_features(&input);
        assert_eq!(
            out.columns,
            vec![
                "sqft",
                "location",
                "rental_price",
                "rental_price_confidence",
                "rental_price_explain",
                "rental_price_min",
                "rental_price_max"
            ]
        );
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[0][0], Value::Int(1000));
        assert_eq!(out.rows[0][1], Value::Null);
    }

    #[test]
    fn test_no_target_values_is_error() {
        let data = TableData::new(vec!["x".into(), "y".into()], vec![vec![Value::Int(1), Value::Null]]);
        assert!(BaselineTrainer.train(&data, "y").is_err());
        assert!(BaselineTrainer.train(&data, "missing").is_err());
    }
}
