pub struct Statistics;

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    /// Mean of the present values; `None` if every value is absent.
    pub fn mean_present<I>(values: I) -> Option<f64>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let present: Vec<f64> = values.into_iter().flatten().collect();
        Self::mean(&present)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in values.iter().skip(1) {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn mean_works() {
        let m = Statistics::mean(&[1.0, 2.0, 3.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-9);
        assert_eq!(Statistics::mean(&[]), None);
    }

    #[test]
    fn mean_skips_absent_values() {
        let m = Statistics::mean_present([Some(1.0), None, Some(-3.0)]).unwrap();
        assert!((m + 1.0).abs() < 1e-9);
        assert_eq!(Statistics::mean_present([None, None]), None);
    }

    #[test]
    fn min_max_spans_values() {
        assert_eq!(Statistics::min_max(&[0.5, -2.0, 4.0]), Some((-2.0, 4.0)));
        assert_eq!(Statistics::min_max(&[]), None);
    }
}
