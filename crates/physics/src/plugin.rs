//! Plugins: backend objects that register feature interfaces.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use featherstone_common::{Identity, Policy};
use tracing::{debug, warn};

use crate::entity::{Dispatch, Engine, Entity};
use crate::{CompositionError, FeatureList, FeatureSet, InterfaceTable};

/// A backend that can be composed into engines.
///
/// The plugin owns every object it hands identities out for. It registers
/// itself under each feature it implements; implementing a feature's
/// interface trait is what makes the registration type-check.
pub trait Plugin: Sized + 'static {
    type Policy: Policy;

    const NAME: &'static str;

    /// Mint the engine (root) identity. Called once per instance.
    fn initiate_engine(&mut self, engine_index: usize) -> Identity;

    fn register(this: &Rc<RefCell<Self>>, table: &mut InterfaceTable<Self::Policy>);
}

/// One live backend with its dispatch table and engine identity.
///
/// Engines requested from the same instance share backend state, whatever
/// feature lists they were requested with.
pub struct PluginInstance<P: Policy> {
    dispatch: Rc<Dispatch<P>>,
    engine: Identity,
}

impl<P: Policy> PluginInstance<P> {
    pub fn new<B: Plugin<Policy = P>>(plugin: B) -> Result<Self, CompositionError> {
        let backend = Rc::new(RefCell::new(plugin));
        let engine = backend.borrow_mut().initiate_engine(0);

        let mut interfaces = InterfaceTable::new();
        B::register(&backend, &mut interfaces);
        if let Err(err) = interfaces.validate(B::NAME) {
            warn!(plugin = B::NAME, %err, "plugin registration is incomplete");
            return Err(err);
        }
        debug!(
            plugin = B::NAME,
            policy = P::NAME,
            interfaces = interfaces.len(),
            "instantiated plugin"
        );

        Ok(Self {
            dispatch: Rc::new(Dispatch::new(B::NAME, interfaces)),
            engine,
        })
    }

    pub fn plugin_name(&self) -> &str {
        self.dispatch.plugin_name()
    }

    pub fn engine_identity(&self) -> &Identity {
        &self.engine
    }

    /// Features this instance registered interfaces for.
    pub fn implemented(&self) -> Result<FeatureSet, CompositionError> {
        self.dispatch.interfaces().implemented()
    }

    pub fn supports<FL: FeatureList>(&self) -> bool {
        FeatureSet::of::<FL>()
            .and_then(|features| self.dispatch.check(&features))
            .is_ok()
    }

    /// Compose an engine proxy over `FL`.
    pub fn request_engine<FL: FeatureList>(&self) -> Result<Engine<P, FL>, CompositionError> {
        let features = FeatureSet::of::<FL>()?;
        if let Err(err) = self.dispatch.check(&features) {
            warn!(plugin = self.plugin_name(), %err, "engine request rejected");
            return Err(err);
        }
        debug!(
            plugin = self.plugin_name(),
            features = ?features.names(),
            "requested engine"
        );
        Ok(Entity::new(self.dispatch.clone(), self.engine.clone()))
    }
}

impl<P: Policy> fmt::Debug for PluginInstance<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("plugin", &self.plugin_name())
            .field("engine", &self.engine)
            .field("interfaces", self.dispatch.interfaces())
            .finish()
    }
}

type Factory<P> = Box<dyn Fn() -> Result<PluginInstance<P>, CompositionError>>;

/// Named plugin factories for one policy.
pub struct Loader<P: Policy> {
    factories: BTreeMap<String, Factory<P>>,
}

impl<P: Policy> Loader<P> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a plugin under its [`Plugin::NAME`].
    pub fn register<B, F>(&mut self, factory: F) -> &mut Self
    where
        B: Plugin<Policy = P>,
        F: Fn() -> B + 'static,
    {
        self.factories.insert(
            B::NAME.to_string(),
            Box::new(move || PluginInstance::new(factory())),
        );
        self
    }

    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn instantiate(&self, name: &str) -> Result<PluginInstance<P>, CompositionError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CompositionError::UnknownPlugin {
                name: name.to_string(),
            })?;
        factory()
    }

    /// Names of the plugins that can provide every feature of `FL`.
    pub fn find_features<FL: FeatureList>(&self) -> BTreeSet<String> {
        self.factories
            .iter()
            .filter(|(_, factory)| factory().is_ok_and(|instance| instance.supports::<FL>()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Instantiate `name` and compose an engine over `FL`.
    pub fn request_engine<FL: FeatureList>(
        &self,
        name: &str,
    ) -> Result<Engine<P, FL>, CompositionError> {
        self.instantiate(name)?.request_engine::<FL>()
    }
}

impl<P: Policy> Default for Loader<P> {
    fn default() -> Self {
        Self::new()
    }
}
