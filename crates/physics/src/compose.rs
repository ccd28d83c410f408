//! Run-time composition of feature sets.
//!
//! [`feature_list!`](crate::feature_list) rejects bad lists at compile time.
//! [`FeatureSet`] performs the same check on descriptors gathered at run
//! time, e.g. when matching a requested list against what a plugin provides.

use std::collections::BTreeMap;

use crate::{Feature, FeatureDescriptor, FeatureList};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("feature `{feature}` requires `{requirement}`, which is not in the set")]
    MissingRequirement {
        feature: &'static str,
        requirement: &'static str,
    },
    #[error("two different features are named `{name}`")]
    DuplicateName { name: &'static str },
    #[error("plugin `{plugin}` does not implement feature `{feature}`")]
    Unimplemented {
        plugin: String,
        feature: &'static str,
    },
    #[error("no plugin named `{name}` is registered")]
    UnknownPlugin { name: String },
}

/// A validated set of features, ordered by name.
///
/// Every member's requirements are members too. Insertion order and repeated
/// entries do not affect the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    features: BTreeMap<&'static str, FeatureDescriptor>,
}

impl FeatureSet {
    pub fn compose(
        features: impl IntoIterator<Item = FeatureDescriptor>,
    ) -> Result<Self, CompositionError> {
        let mut map: BTreeMap<&'static str, FeatureDescriptor> = BTreeMap::new();
        for feature in features {
            if let Some(existing) = map.get(feature.name()) {
                if *existing != feature {
                    return Err(CompositionError::DuplicateName {
                        name: feature.name(),
                    });
                }
                continue;
            }
            map.insert(feature.name(), feature);
        }

        let set = Self { features: map };
        for feature in set.features.values() {
            for requirement in feature.requirements() {
                if !set.contains(&requirement) {
                    return Err(CompositionError::MissingRequirement {
                        feature: feature.name(),
                        requirement: requirement.name(),
                    });
                }
            }
        }
        Ok(set)
    }

    /// Compose the features of a declared list.
    pub fn of<FL: FeatureList>() -> Result<Self, CompositionError> {
        Self::compose(FL::features())
    }

    pub fn contains(&self, feature: &FeatureDescriptor) -> bool {
        self.features
            .get(feature.name())
            .is_some_and(|member| member == feature)
    }

    pub fn contains_feature<F: Feature>(&self) -> bool {
        self.contains(&F::descriptor())
    }

    pub fn is_superset_of(&self, other: &FeatureSet) -> bool {
        other.iter().all(|f| self.contains(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features.values()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
