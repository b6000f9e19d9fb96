use error_stack::{Report, bail};

use crate::error::DataError;
use crate::model::{RawHistory, Series};

/// Minimum closes for the basic indicator set (RSI, Bollinger).
pub const MIN_HISTORY: usize = 20;
/// Minimum closes when a forecast is requested alongside the indicators.
pub const PREFERRED_HISTORY: usize = 30;

/// Validate and clean a raw provider payload into numeric series.
///
/// Non-finite closes are dropped together with their paired volumes;
/// non-finite volumes become 0. The cleaned volumes never outnumber the
/// cleaned closes. Pure transform, no side effects.
pub fn normalize(raw: &RawHistory, min_required: usize) -> Result<Series, Report<DataError>> {
    if !raw.is_ok() {
        bail!(DataError::InvalidSource {
            reason: format!("provider status \"{}\"", raw.status),
        });
    }
    if raw.closes.is_empty() {
        bail!(DataError::InvalidSource {
            reason: "empty close array".into(),
        });
    }

    let mut closes = Vec::with_capacity(raw.closes.len());
    let mut volumes = Vec::with_capacity(raw.volumes.len());
    for (index, &close) in raw.closes.iter().enumerate() {
        if !close.is_finite() {
            continue;
        }
        closes.push(close);
        if let Some(&volume) = raw.volumes.get(index) {
            volumes.push(if volume.is_finite() { volume } else { 0.0 });
        }
    }

    if closes.len() < min_required {
        bail!(DataError::InsufficientHistory {
            required: min_required,
            available: closes.len(),
        });
    }

    Ok(Series { closes, volumes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_closes(closes: Vec<f64>) -> RawHistory {
        RawHistory {
            status: "ok".into(),
            closes,
            ..RawHistory::default()
        }
    }

    #[test]
    fn rejects_error_status() {
        let raw = RawHistory {
            status: "no_data".into(),
            closes: vec![1.0; 40],
            ..RawHistory::default()
        };
        let err = normalize(&raw, MIN_HISTORY).unwrap_err();
        assert!(matches!(
            err.current_context(),
            DataError::InvalidSource { .. }
        ));
    }

    #[test]
    fn rejects_empty_closes() {
        let raw = raw_with_closes(vec![]);
        let err = normalize(&raw, MIN_HISTORY).unwrap_err();
        assert!(matches!(
            err.current_context(),
            DataError::InvalidSource { .. }
        ));
    }

    #[test]
    fn rejects_short_history() {
        let raw = raw_with_closes(vec![10.0; 19]);
        let err = normalize(&raw, MIN_HISTORY).unwrap_err();
        assert!(matches!(
            err.current_context(),
            DataError::InsufficientHistory {
                required: 20,
                available: 19
            }
        ));
    }

    #[test]
    fn filters_non_finite_closes() {
        let mut closes = vec![10.0; 25];
        closes[3] = f64::NAN;
        closes[7] = f64::INFINITY;
        let raw = raw_with_closes(closes);
        let series = normalize(&raw, MIN_HISTORY).unwrap();
        assert_eq!(series.len(), 23);
        assert!(series.closes.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn non_finite_history_can_fall_below_minimum() {
        let mut closes = vec![10.0; 20];
        closes[0] = f64::NAN;
        let raw = raw_with_closes(closes);
        assert!(normalize(&raw, MIN_HISTORY).is_err());
    }

    #[test]
    fn volumes_stay_parallel_when_closes_drop() {
        let mut raw = raw_with_closes(vec![10.0; 25]);
        raw.closes[3] = f64::NAN;
        raw.volumes = (0..25).map(|i| i as f64).collect();
        let series = normalize(&raw, MIN_HISTORY).unwrap();
        assert_eq!(series.len(), 24);
        assert_eq!(series.volumes.len(), 24);
        // The volume paired with the dropped close goes with it
        assert!(!series.volumes.contains(&3.0));
        assert!(series.volumes.len() <= series.closes.len());
    }

    #[test]
    fn non_finite_volumes_become_zero() {
        let mut raw = raw_with_closes(vec![10.0; 25]);
        raw.volumes = vec![1.0, f64::NAN, 3.0];
        let series = normalize(&raw, MIN_HISTORY).unwrap();
        assert_eq!(series.volumes, vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn missing_volumes_default_to_empty() {
        let raw = raw_with_closes(vec![10.0; 25]);
        let series = normalize(&raw, MIN_HISTORY).unwrap();
        assert!(series.volumes.is_empty());
        assert_eq!(series.len(), 25);
    }
}
