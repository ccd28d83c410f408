use featherstone_common::{Identity, Policy};
use featherstone_physics::{Engine, Feature, FeatureList, Has, World};
use tracing::debug;

use crate::WorldDescription;

/// Build a whole world, with its models, links, shapes and joints, from a
/// [`WorldDescription`].
pub struct ConstructWorldFromDescription;

pub trait ConstructWorldFromDescriptionInterface<P: Policy> {
    /// The invalid identity if the backend cannot represent the description.
    fn construct_described_world(
        &mut self,
        engine: &Identity,
        description: &WorldDescription,
    ) -> Identity;
}

impl Feature for ConstructWorldFromDescription {
    const NAME: &'static str = "ConstructWorldFromDescription";
    type Requires = ();
    type Interface<P: Policy> = dyn ConstructWorldFromDescriptionInterface<P>;
}

/// Client operation of [`ConstructWorldFromDescription`] on engines.
pub trait ConstructWorld {
    type World;

    fn construct_world(&self, description: &WorldDescription) -> Option<Self::World>;
}

impl<P, FL> ConstructWorld for Engine<P, FL>
where
    P: Policy,
    FL: FeatureList + Has<ConstructWorldFromDescription>,
{
    type World = World<P, FL>;

    fn construct_world(&self, description: &WorldDescription) -> Option<World<P, FL>> {
        debug!(
            world = %description.name,
            models = description.models.len(),
            plugin = self.plugin_name(),
            "constructing described world"
        );
        let id = self.modify::<ConstructWorldFromDescription, _>(|c, engine| {
            c.construct_described_world(engine, description)
        });
        self.related(id)
    }
}
