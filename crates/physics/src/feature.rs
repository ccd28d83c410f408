use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use featherstone_common::Policy;

/// An independently declared unit of functionality.
///
/// A feature is a zero-sized marker type that ties together:
/// - the client operations it adds to proxy entities (inherent impls or
///   extension traits bounded on `FL: Has<Self>`),
/// - the backend obligation, [`Feature::Interface`], usually a `dyn Trait`
///   parameterized by the geometry policy,
/// - the features it requires, [`Feature::Requires`].
pub trait Feature: 'static {
    const NAME: &'static str;

    /// Features that must be present in any list containing this one.
    type Requires: FeatureTuple;

    /// Backend-facing interface, resolved through the interface table.
    type Interface<P: Policy>: ?Sized + 'static;

    /// `false` for features whose operations are built entirely from the
    /// interfaces of their requirements. Backends never register those.
    const NEEDS_INTERFACE: bool = true;

    fn descriptor() -> FeatureDescriptor
    where
        Self: Sized,
    {
        FeatureDescriptor::of::<Self>()
    }
}

/// Run-time description of a [`Feature`].
#[derive(Clone, Copy)]
pub struct FeatureDescriptor {
    type_id: TypeId,
    name: &'static str,
    needs_interface: bool,
    requires: fn() -> Vec<FeatureDescriptor>,
}

impl FeatureDescriptor {
    pub fn of<F: Feature>() -> Self {
        Self {
            type_id: TypeId::of::<F>(),
            name: F::NAME,
            needs_interface: F::NEEDS_INTERFACE,
            requires: <F::Requires as FeatureTuple>::descriptors,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn needs_interface(&self) -> bool {
        self.needs_interface
    }

    /// Direct requirements only.
    pub fn requirements(&self) -> Vec<FeatureDescriptor> {
        (self.requires)()
    }
}

impl fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for FeatureDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for FeatureDescriptor {}

impl Hash for FeatureDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for FeatureDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FeatureDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.type_id.cmp(&other.type_id))
    }
}

/// A tuple of features, used for [`Feature::Requires`].
pub trait FeatureTuple: 'static {
    fn descriptors() -> Vec<FeatureDescriptor>;
}

impl FeatureTuple for () {
    fn descriptors() -> Vec<FeatureDescriptor> {
        Vec::new()
    }
}

/// A composed set of features. Implemented by [`feature_list!`](crate::feature_list).
pub trait FeatureList: 'static {
    fn features() -> Vec<FeatureDescriptor>;
}

/// Proof that a feature list contains `F`.
pub trait Has<F: Feature>: FeatureList {}

/// Proof that a feature list contains every feature of the tuple `R`.
pub trait HasAll<R: FeatureTuple>: FeatureList {}

impl<L: FeatureList> HasAll<()> for L {}

macro_rules! feature_tuple {
    ($($f:ident),+) => {
        impl<$($f: Feature),+> FeatureTuple for ($($f,)+) {
            fn descriptors() -> Vec<FeatureDescriptor> {
                vec![$($f::descriptor()),+]
            }
        }

        impl<L, $($f: Feature),+> HasAll<($($f,)+)> for L
        where
            L: FeatureList $(+ Has<$f>)+,
        {
        }
    };
}

feature_tuple!(A);
feature_tuple!(A, B);
feature_tuple!(A, B, C);
feature_tuple!(A, B, C, D);
feature_tuple!(A, B, C, D, E);
feature_tuple!(A, B, C, D, E, G);

/// Declare a feature list: a unit struct implementing [`FeatureList`] and
/// [`Has`] for every listed feature.
///
/// Composition is checked when the list is compiled:
/// - every listed feature's requirements must also be listed (in any order),
/// - listing a feature twice is a conflicting-impl error.
///
/// A requirement may be listed after the feature that needs it:
///
/// ```
/// use featherstone_physics::{
///     feature_list, FeatureList, GetModelFromWorld, GetWorldFromEngine, RemoveEntities,
/// };
///
/// feature_list! {
///     /// What the simulator needs.
///     pub struct SimulatorFeatures {
///         RemoveEntities,
///         GetWorldFromEngine,
///         GetModelFromWorld,
///     }
/// }
///
/// assert_eq!(SimulatorFeatures::features().len(), 3);
/// ```
///
/// Leaving a requirement out does not compile. `RemoveEntities` needs
/// `GetModelFromWorld`:
///
/// ```compile_fail
/// use featherstone_physics::{feature_list, RemoveEntities};
///
/// feature_list! {
///     struct Bad { RemoveEntities }
/// }
/// ```
#[macro_export]
macro_rules! feature_list {
    ($(#[$meta:meta])* $vis:vis struct $name:ident { $($feature:ty),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::FeatureList for $name {
            fn features() -> ::std::vec::Vec<$crate::FeatureDescriptor> {
                ::std::vec![$(<$feature as $crate::Feature>::descriptor()),+]
            }
        }

        $(impl $crate::Has<$feature> for $name {})+

        const _: () = {
            #[allow(dead_code)]
            fn requirements_met<L, R>()
            where
                L: $crate::HasAll<R>,
                R: $crate::FeatureTuple,
            {
            }

            #[allow(dead_code)]
            fn check() {
                $(requirements_met::<$name, <$feature as $crate::Feature>::Requires>();)+
            }
        };
    };
}
