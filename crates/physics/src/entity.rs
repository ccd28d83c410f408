//! Proxy entities.
//!
//! An [`Entity`] is an identity plus a shared handle on the plugin's dispatch
//! table. It stores nothing else: every operation is resolved through the
//! table to the backend, keyed by the identity.
//!
//! # Invariants
//! - Entities are only created for feature lists the dispatch table was
//!   checked against, so every interface-bearing feature of `FL` resolves.
//! - Dropping an entity never changes backend state.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use featherstone_common::{Identity, Policy, Policy3d, Policy3f};

use crate::{CompositionError, Feature, FeatureList, FeatureSet, Has, InterfaceTable};

/// Marker types for the kinds of proxy entities.
pub mod kind {
    pub trait EntityKind: 'static {
        const NAME: &'static str;
    }

    macro_rules! entity_kinds {
        ($($kind:ident),+) => {
            $(
                #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
                pub struct $kind;

                impl EntityKind for $kind {
                    const NAME: &'static str = stringify!($kind);
                }
            )+
        };
    }

    entity_kinds!(Engine, World, Model, Link, Joint, Shape);
}

use kind::EntityKind;

/// The dispatch context shared by every entity of one plugin instance.
pub struct Dispatch<P: Policy> {
    plugin: &'static str,
    interfaces: InterfaceTable<P>,
}

impl<P: Policy> Dispatch<P> {
    pub(crate) fn new(plugin: &'static str, interfaces: InterfaceTable<P>) -> Self {
        Self { plugin, interfaces }
    }

    pub fn plugin_name(&self) -> &'static str {
        self.plugin
    }

    pub fn interfaces(&self) -> &InterfaceTable<P> {
        &self.interfaces
    }

    pub(crate) fn check(&self, features: &FeatureSet) -> Result<(), CompositionError> {
        self.interfaces.check(self.plugin, features)
    }
}

/// A client-side view of a backend object, typed by its kind `K`, the
/// geometry policy `P` and the feature list `FL`.
///
/// Which methods exist depends on `FL`: each feature adds its operations in
/// an impl bounded on `FL: Has<ThatFeature>`.
pub struct Entity<K: EntityKind, P: Policy, FL: FeatureList> {
    dispatch: Rc<Dispatch<P>>,
    identity: Identity,
    _marker: PhantomData<fn() -> (K, FL)>,
}

impl<K: EntityKind, P: Policy, FL: FeatureList> Entity<K, P, FL> {
    pub(crate) fn new(dispatch: Rc<Dispatch<P>>, identity: Identity) -> Self {
        Self {
            dispatch,
            identity,
            _marker: PhantomData,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn entity_id(&self) -> usize {
        self.identity.id()
    }

    pub fn entity_reference(&self) -> Option<&Rc<dyn Any>> {
        self.identity.reference()
    }

    pub fn plugin_name(&self) -> &'static str {
        self.dispatch.plugin_name()
    }

    /// Proxy of another kind over the same plugin and feature list.
    /// The invalid identity yields `None`.
    pub fn related<K2: EntityKind>(&self, identity: Identity) -> Option<Entity<K2, P, FL>> {
        identity
            .is_valid()
            .then(|| Entity::new(self.dispatch.clone(), identity))
    }

    /// Call a read-only operation of feature `F` on the backend.
    ///
    /// # Panics
    /// If `F` has no interface of its own, or if the callback re-enters the
    /// backend mutably through another entity.
    pub fn query<F, R>(&self, op: impl FnOnce(&F::Interface<P>, &Identity) -> R) -> R
    where
        F: Feature,
        FL: Has<F>,
    {
        let interface = self.resolve::<F>();
        let guard = interface.borrow();
        op(&*guard, &self.identity)
    }

    /// Call a mutating operation of feature `F` on the backend.
    ///
    /// # Panics
    /// Same conditions as [`Entity::query`].
    pub fn modify<F, R>(&self, op: impl FnOnce(&mut F::Interface<P>, &Identity) -> R) -> R
    where
        F: Feature,
        FL: Has<F>,
    {
        let interface = self.resolve::<F>();
        let mut guard = interface.borrow_mut();
        op(&mut *guard, &self.identity)
    }

    /// View the same backend object through a different feature list.
    pub fn request_features<FL2: FeatureList>(
        &self,
    ) -> Result<Entity<K, P, FL2>, CompositionError> {
        let features = FeatureSet::of::<FL2>()?;
        self.dispatch.check(&features)?;
        Ok(Entity::new(self.dispatch.clone(), self.identity.clone()))
    }

    fn resolve<F: Feature>(&self) -> Rc<RefCell<F::Interface<P>>> {
        match self.dispatch.interfaces.get::<F>() {
            Some(interface) => interface,
            None => panic!(
                "feature `{}` has no interface registered by plugin `{}`",
                F::NAME,
                self.dispatch.plugin
            ),
        }
    }
}

impl<K: EntityKind, P: Policy, FL: FeatureList> Clone for Entity<K, P, FL> {
    fn clone(&self) -> Self {
        Self::new(self.dispatch.clone(), self.identity.clone())
    }
}

impl<K: EntityKind, P: Policy, FL: FeatureList> PartialEq for Entity<K, P, FL> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && Rc::ptr_eq(&self.dispatch, &other.dispatch)
    }
}

impl<K: EntityKind, P: Policy, FL: FeatureList> Eq for Entity<K, P, FL> {}

impl<K: EntityKind, P: Policy, FL: FeatureList> fmt::Debug for Entity<K, P, FL> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})@{}", K::NAME, self.identity, self.plugin_name())
    }
}

pub type Engine<P, FL> = Entity<kind::Engine, P, FL>;
pub type World<P, FL> = Entity<kind::World, P, FL>;
pub type Model<P, FL> = Entity<kind::Model, P, FL>;
pub type Link<P, FL> = Entity<kind::Link, P, FL>;
pub type Joint<P, FL> = Entity<kind::Joint, P, FL>;
pub type Shape<P, FL> = Entity<kind::Shape, P, FL>;

pub type Engine3d<FL> = Engine<Policy3d, FL>;
pub type World3d<FL> = World<Policy3d, FL>;
pub type Model3d<FL> = Model<Policy3d, FL>;
pub type Link3d<FL> = Link<Policy3d, FL>;
pub type Joint3d<FL> = Joint<Policy3d, FL>;
pub type Shape3d<FL> = Shape<Policy3d, FL>;

pub type Engine3f<FL> = Engine<Policy3f, FL>;
pub type World3f<FL> = World<Policy3f, FL>;
