use crate::domain::model::StatScale;
use serde_json::Value;
use std::collections::HashMap;

/// Converts raw feed values into bounded canonical ratings.
///
/// Each configured field has a linear mapping from its domain bounds onto
/// 0..=100, clamped at both ends. Unknown fields fall back to a plain
/// integer cast; a value that cannot be coerced to a number yields 0. The
/// function never fails: it runs inside the hot loop over every feed row.
#[derive(Debug, Clone)]
pub struct StatNormalizer {
    scales: HashMap<String, StatScale>,
}

impl StatNormalizer {
    pub fn new(scales: HashMap<String, StatScale>) -> Self {
        Self { scales }
    }

    pub fn has_scale(&self, field: &str) -> bool {
        self.scales.contains_key(field)
    }

    pub fn normalize(&self, field: &str, raw: &Value) -> i64 {
        let Some(value) = coerce_number(raw) else {
            return 0;
        };

        match self.scales.get(field) {
            Some(scale) => {
                let span = scale.upper - scale.lower;
                if span <= 0.0 {
                    return 0;
                }
                // Fractional ratings truncate toward zero, matching the
                // feed's published conversion table.
                let rating = ((value - scale.lower) / span * 100.0) as i64;
                rating.clamp(0, 100)
            }
            None => value as i64,
        }
    }
}

/// The scales the feed is known to carry: xG per 90 saturates at 0.8,
/// pass completion spans 60%..95%.
pub fn default_stat_scales() -> HashMap<String, StatScale> {
    let mut scales = HashMap::new();
    scales.insert(
        "xG".to_string(),
        StatScale {
            lower: 0.0,
            upper: 0.8,
        },
    );
    scales.insert(
        "PassCompletion".to_string(),
        StatScale {
            lower: 60.0,
            upper: 95.0,
        },
    );
    scales
}

fn coerce_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
