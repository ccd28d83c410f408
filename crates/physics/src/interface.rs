use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use featherstone_common::Policy;

use crate::{CompositionError, Feature, FeatureDescriptor, FeatureSet};

struct Entry {
    descriptor: FeatureDescriptor,
    interface: Box<dyn Any>,
}

/// Dispatch table from features to the backend objects implementing them.
///
/// Each entry holds an `Rc<RefCell<F::Interface<P>>>`. A backend usually
/// registers the same `Rc<RefCell<Self>>` under every feature it supports,
/// so every entry aliases one backend object through a different vtable.
pub struct InterfaceTable<P: Policy> {
    entries: BTreeMap<TypeId, Entry>,
    _policy: PhantomData<P>,
}

impl<P: Policy> InterfaceTable<P> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            _policy: PhantomData,
        }
    }

    /// Register the implementation of `F`. Re-registering replaces the entry.
    pub fn implement<F: Feature>(&mut self, interface: Rc<RefCell<F::Interface<P>>>) -> &mut Self {
        self.entries.insert(
            TypeId::of::<F>(),
            Entry {
                descriptor: F::descriptor(),
                interface: Box::new(interface),
            },
        );
        self
    }

    pub fn get<F: Feature>(&self) -> Option<Rc<RefCell<F::Interface<P>>>> {
        self.entries
            .get(&TypeId::of::<F>())?
            .interface
            .downcast_ref::<Rc<RefCell<F::Interface<P>>>>()
            .cloned()
    }

    /// Whether `feature` can be used with this table: either it was
    /// registered, or it needs no interface of its own.
    pub fn provides(&self, feature: &FeatureDescriptor) -> bool {
        !feature.needs_interface() || self.entries.contains_key(&feature.type_id())
    }

    /// `provides`, applied to the feature and all of its requirements.
    pub fn supports(&self, feature: &FeatureDescriptor) -> bool {
        self.provides(feature) && feature.requirements().iter().all(|r| self.supports(r))
    }

    /// Features with a registered interface.
    pub fn registered(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }

    /// The registered features, plus the interface-less features they
    /// require, as a validated set.
    pub fn implemented(&self) -> Result<FeatureSet, CompositionError> {
        let mut features: Vec<FeatureDescriptor> = self.registered().copied().collect();
        let mut next = 0;
        while next < features.len() {
            for requirement in features[next].requirements() {
                if !features.contains(&requirement) {
                    features.push(requirement);
                }
            }
            next += 1;
        }
        FeatureSet::compose(features)
    }

    /// Check that every registered feature's requirements are available.
    pub fn validate(&self, plugin: &str) -> Result<(), CompositionError> {
        for feature in self.registered() {
            if let Some(missing) = feature.requirements().into_iter().find(|r| !self.supports(r)) {
                return Err(CompositionError::Unimplemented {
                    plugin: plugin.to_string(),
                    feature: missing.name(),
                });
            }
        }
        Ok(())
    }

    /// Check that every member of `features` is usable with this table.
    pub fn check(&self, plugin: &str, features: &FeatureSet) -> Result<(), CompositionError> {
        match features.iter().find(|f| !self.provides(f)) {
            Some(missing) => Err(CompositionError::Unimplemented {
                plugin: plugin.to_string(),
                feature: missing.name(),
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Policy> Default for InterfaceTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Policy> fmt::Debug for InterfaceTable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.registered()).finish()
    }
}
