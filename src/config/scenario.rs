//! RCP scenario targets: warming above the continuation baseline at 2100 and 2200.

use crate::config::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A named warming trajectory, e.g. `RCP4.5`.
///
/// Both targets are degrees of warming relative to the baseline the projection
/// continues from, not absolute anomalies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTarget {
    pub name: String,
    pub target_2100: f64,
    pub target_2200: f64,
    /// Free text drawn over the scenario's row, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScenarioTarget {
    pub fn new(name: impl Into<String>, target_2100: f64, target_2200: f64) -> Self {
        Self {
            name: name.into(),
            target_2100,
            target_2200,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An ordered set of scenarios. Order is the bottom-to-top row order of the chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioTargets(Vec<ScenarioTarget>);

impl ScenarioTargets {
    pub fn new(targets: Vec<ScenarioTarget>) -> Self {
        Self(targets)
    }

    /// Builds the set from separate name-keyed 2100 and 2200 maps.
    ///
    /// Both maps must have exactly the same keys. The resulting order is the
    /// sorted key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use warming_stripes::ScenarioTargets;
    ///
    /// let at_2100 = BTreeMap::from([("RCP2.6".to_string(), 1.9), ("RCP8.5".to_string(), 4.8)]);
    /// let at_2200 = BTreeMap::from([("RCP2.6".to_string(), 1.4)]);
    /// assert!(ScenarioTargets::from_maps(&at_2100, &at_2200).is_err());
    /// ```
    pub fn from_maps(
        targets_2100: &BTreeMap<String, f64>,
        targets_2200: &BTreeMap<String, f64>,
    ) -> Result<Self, ConfigError> {
        let only_2100: Vec<String> = targets_2100
            .keys()
            .filter(|k| !targets_2200.contains_key(*k))
            .cloned()
            .collect();
        let only_2200: Vec<String> = targets_2200
            .keys()
            .filter(|k| !targets_2100.contains_key(*k))
            .cloned()
            .collect();
        if !only_2100.is_empty() || !only_2200.is_empty() {
            return Err(ConfigError::MismatchedScenarios {
                only_2100,
                only_2200,
            });
        }

        Ok(Self(
            targets_2100
                .iter()
                .map(|(name, t2100)| ScenarioTarget::new(name.clone(), *t2100, targets_2200[name]))
                .collect(),
        ))
    }

    /// The four reference RCP pathways, RCP8.5 first (bottom row).
    pub fn rcp_defaults() -> Self {
        Self(vec![
            ScenarioTarget::new("RCP8.5", 4.8, 7.8).with_description(
                "Emissions peak between 2100-2150\n+4.8°C in 2100, +7.8°C by 2200",
            ),
            ScenarioTarget::new("RCP6.0", 3.1, 3.7)
                .with_description("Emissions peak by 2090\n+3.1°C in 2100, +3.7°C by 2200"),
            ScenarioTarget::new("RCP4.5", 2.87, 2.8)
                .with_description("Emissions peak by 2050\n+2.7°C in 2100, +2.8°C by 2200"),
            ScenarioTarget::new("RCP2.6", 1.9, 1.4).with_description(
                "Emissions peak by 2030\nnegative emissions by 2080\n+1.9°C in 2100, +1.4°C by 2200",
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioTarget> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioTarget> {
        self.0.iter().find(|t| t.name == name)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for target in &self.0 {
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::DuplicateScenario(target.name.clone()));
            }
            if !target.target_2100.is_finite() || !target.target_2200.is_finite() {
                return Err(ConfigError::NonFiniteTarget {
                    scenario: target.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ScenarioTargets {
    type Item = &'a ScenarioTarget;
    type IntoIter = std::slice::Iter<'a, ScenarioTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_from_maps_matching_keys() {
        let targets = ScenarioTargets::from_maps(
            &map(&[("RCP4.5", 2.87), ("RCP2.6", 1.9)]),
            &map(&[("RCP2.6", 1.4), ("RCP4.5", 2.8)]),
        )
        .unwrap();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["RCP2.6", "RCP4.5"]);
        let rcp45 = targets.get("RCP4.5").unwrap();
        assert_eq!((rcp45.target_2100, rcp45.target_2200), (2.87, 2.8));
    }

    #[test]
    fn test_from_maps_mismatched_keys() {
        let err = ScenarioTargets::from_maps(
            &map(&[("RCP2.6", 1.9), ("RCP6.0", 3.1)]),
            &map(&[("RCP2.6", 1.4), ("RCP8.5", 7.8)]),
        )
        .unwrap_err();
        match err {
            ConfigError::MismatchedScenarios {
                only_2100,
                only_2200,
            } => {
                assert_eq!(only_2100, ["RCP6.0"]);
                assert_eq!(only_2200, ["RCP8.5"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_duplicates_and_nan() {
        let dup = ScenarioTargets::new(vec![
            ScenarioTarget::new("A", 1.0, 2.0),
            ScenarioTarget::new("A", 1.5, 2.5),
        ]);
        assert!(matches!(dup.validate(), Err(ConfigError::DuplicateScenario(n)) if n == "A"));

        let nan = ScenarioTargets::new(vec![ScenarioTarget::new("B", f64::NAN, 2.0)]);
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::NonFiniteTarget { .. })
        ));
        assert!(ScenarioTargets::rcp_defaults().validate().is_ok());
    }
}
