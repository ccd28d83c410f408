use featherstone_common::{Identity, Policy};

use crate::{Feature, GetModelFromWorld, Has, Model, World};

/// Remove models from a world.
///
/// A removed model's id is never reused, and every later query for the
/// model, its links, joints or shapes misses.
pub struct RemoveEntities;

pub trait RemoveEntitiesInterface<P: Policy> {
    fn remove_model_by_index(&mut self, world: &Identity, index: usize) -> bool;
    fn remove_model_by_name(&mut self, world: &Identity, name: &str) -> bool;
    fn remove_model(&mut self, model: &Identity) -> bool;
    fn model_removed(&self, model: &Identity) -> bool;
}

impl Feature for RemoveEntities {
    const NAME: &'static str = "RemoveEntities";
    type Requires = (GetModelFromWorld,);
    type Interface<P: Policy> = dyn RemoveEntitiesInterface<P>;
}

impl<P: Policy, FL> World<P, FL>
where
    FL: Has<RemoveEntities> + Has<GetModelFromWorld>,
{
    /// Returns `false` if there is no model at `index`.
    pub fn remove_model(&self, index: usize) -> bool {
        self.modify::<RemoveEntities, _>(|remover, world| {
            remover.remove_model_by_index(world, index)
        })
    }

    pub fn remove_model_by_name(&self, name: &str) -> bool {
        self.modify::<RemoveEntities, _>(|remover, world| remover.remove_model_by_name(world, name))
    }
}

impl<P: Policy, FL> Model<P, FL>
where
    FL: Has<RemoveEntities> + Has<GetModelFromWorld>,
{
    pub fn remove(&self) -> bool {
        self.modify::<RemoveEntities, _>(|remover, model| remover.remove_model(model))
    }

    pub fn removed(&self) -> bool {
        self.query::<RemoveEntities, _>(|remover, model| remover.model_removed(model))
    }
}
