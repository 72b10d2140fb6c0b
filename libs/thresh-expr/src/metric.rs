//! Metric definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metric name plus the dimensions that identify one series.
///
/// Dimensions are kept sorted by key so rendering is deterministic and
/// equality is plain map equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricDefinition {
    name: String,
    #[serde(default)]
    dimensions: BTreeMap<String, String>,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, dimensions: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            dimensions,
        }
    }

    /// Metric without dimensions
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, BTreeMap::new())
    }

    /// Builder-style dimension insert; a repeated key keeps the last value
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &BTreeMap<String, String> {
        &self.dimensions
    }

    pub fn dimension(&self, key: &str) -> Option<&str> {
        self.dimensions.get(key).map(String::as_str)
    }

    /// Whether `sample` belongs to the series this definition selects.
    ///
    /// Names must be equal and every dimension of `self` must be present in
    /// `sample` with the same value. Extra sample dimensions are ignored.
    pub fn matches(&self, sample: &MetricDefinition) -> bool {
        self.name == sample.name
            && self
                .dimensions
                .iter()
                .all(|(key, value)| sample.dimensions.get(key) == Some(value))
    }

    /// Expression text form: `name{k1=v1, k2=v2}`
    pub fn to_expression(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetricDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.dimensions.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (key, value)) in self.dimensions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_display_sorts_dimensions() {
        let metric = MetricDefinition::named("hpcs.compute")
            .with_dimension("metric_name", "cpu")
            .with_dimension("device", "1");
        assert_eq!(metric.to_string(), "hpcs.compute{device=1, metric_name=cpu}");
        assert_eq!(MetricDefinition::named("cpu").to_expression(), "cpu");
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = MetricDefinition::named("m")
            .with_dimension("a", "1")
            .with_dimension("b", "2");
        let b = MetricDefinition::named("m")
            .with_dimension("b", "2")
            .with_dimension("a", "1");
        assert_eq!(a, b);
        assert_ne!(a, MetricDefinition::named("m").with_dimension("a", "1"));
    }

    #[test]
    fn test_matches_subset_of_dimensions() {
        let filter = MetricDefinition::named("cpu").with_dimension("instance_id", "5");
        let sample = MetricDefinition::named("cpu")
            .with_dimension("instance_id", "5")
            .with_dimension("hostname", "web-1");

        assert!(filter.matches(&sample));
        assert!(!sample.matches(&filter));
        assert!(MetricDefinition::named("cpu").matches(&sample));
        assert!(!filter.matches(&MetricDefinition::named("mem").with_dimension("instance_id", "5")));
        assert!(!filter.matches(&MetricDefinition::named("cpu").with_dimension("instance_id", "6")));
    }

    #[test]
    fn test_serde_defaults_dimensions() {
        let metric: MetricDefinition = serde_json::from_str(r#"{"name":"cpu"}"#).unwrap();
        assert_eq!(metric, MetricDefinition::named("cpu"));

        let json = serde_json::to_string(&metric.with_dimension("k", "v")).unwrap();
        assert_eq!(json, r#"{"name":"cpu","dimensions":{"k":"v"}}"#);
    }
}
