//! Toy features and plugins exercising composition in this crate's tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use featherstone_common::{IdAllocator, Identity, Policy, Policy3d};

use crate::entity::{Engine, Entity, World, kind::EntityKind};
use crate::{Feature, Has, InterfaceTable, Plugin};

pub struct Counter;

pub trait CountInterface<P: Policy> {
    fn add(&mut self, amount: usize);
    fn total(&self) -> usize;
}

impl Feature for Counter {
    const NAME: &'static str = "Counter";
    type Requires = ();
    type Interface<P: Policy> = dyn CountInterface<P>;
}

pub struct Doubler;

pub trait DoubleInterface<P: Policy> {
    fn doubled(&self) -> usize;
}

impl Feature for Doubler {
    const NAME: &'static str = "Doubler";
    type Requires = (Counter,);
    type Interface<P: Policy> = dyn DoubleInterface<P>;
}

/// Built from `Counter` and `Doubler` on the client side only.
pub struct Tripler;

impl Feature for Tripler {
    const NAME: &'static str = "Tripler";
    type Requires = (Doubler,);
    type Interface<P: Policy> = ();
    const NEEDS_INTERFACE: bool = false;
}

pub struct Labels;

pub trait LabelInterface<P: Policy> {
    fn label(&self, id: &Identity) -> String;
    fn child(&self, id: &Identity) -> Identity;
}

impl Feature for Labels {
    const NAME: &'static str = "Labels";
    type Requires = ();
    type Interface<P: Policy> = dyn LabelInterface<P>;
}

crate::feature_list! {
    pub struct CountingFeatures { Counter, Doubler }
}

crate::feature_list! {
    pub struct TriplingFeatures { Tripler, Doubler, Counter }
}

crate::feature_list! {
    pub struct LabelFeatures { Labels }
}

impl<P: Policy, FL: Has<Counter>> Engine<P, FL> {
    pub fn add(&self, amount: usize) {
        self.modify::<Counter, _>(|counter, _| counter.add(amount));
    }

    pub fn total(&self) -> usize {
        self.query::<Counter, _>(|counter, _| counter.total())
    }
}

impl<P: Policy, FL: Has<Doubler>> Engine<P, FL> {
    pub fn doubled(&self) -> usize {
        self.query::<Doubler, _>(|doubler, _| doubler.doubled())
    }
}

impl<P: Policy, FL> Engine<P, FL>
where
    FL: Has<Tripler> + Has<Doubler> + Has<Counter>,
{
    pub fn tripled(&self) -> usize {
        self.doubled() + self.total()
    }
}

impl<K: EntityKind, P: Policy, FL: Has<Labels>> Entity<K, P, FL> {
    pub fn label(&self) -> String {
        self.query::<Labels, _>(|labels, id| labels.label(id))
    }

    pub fn first_child(&self) -> Option<World<P, FL>> {
        let child = self.query::<Labels, _>(|labels, id| labels.child(id));
        self.related(child)
    }
}

#[derive(Default)]
pub struct Abacus {
    ids: IdAllocator,
    total: usize,
}

impl<P: Policy> CountInterface<P> for Abacus {
    fn add(&mut self, amount: usize) {
        self.total += amount;
    }

    fn total(&self) -> usize {
        self.total
    }
}

impl<P: Policy> DoubleInterface<P> for Abacus {
    fn doubled(&self) -> usize {
        self.total * 2
    }
}

impl Plugin for Abacus {
    type Policy = Policy3d;
    const NAME: &'static str = "abacus";

    fn initiate_engine(&mut self, _engine_index: usize) -> Identity {
        self.ids.mint(None)
    }

    fn register(this: &Rc<RefCell<Self>>, table: &mut InterfaceTable<Policy3d>) {
        table
            .implement::<Counter>(this.clone())
            .implement::<Doubler>(this.clone());
    }
}

#[derive(Default)]
pub struct Tally {
    ids: IdAllocator,
    children: BTreeMap<usize, Identity>,
    labels: BTreeMap<usize, String>,
}

impl<P: Policy> LabelInterface<P> for Tally {
    fn label(&self, id: &Identity) -> String {
        self.labels.get(&id.id()).cloned().unwrap_or_default()
    }

    fn child(&self, id: &Identity) -> Identity {
        self.children.get(&id.id()).cloned().unwrap_or_default()
    }
}

impl<P: Policy> CountInterface<P> for Tally {
    fn add(&mut self, _amount: usize) {}

    fn total(&self) -> usize {
        0
    }
}

impl Plugin for Tally {
    type Policy = Policy3d;
    const NAME: &'static str = "tally";

    fn initiate_engine(&mut self, _engine_index: usize) -> Identity {
        let engine = self.ids.mint(None);
        let child = self.ids.mint(None);
        self.labels
            .insert(child.id(), format!("child-of-{engine}"));
        self.children.insert(engine.id(), child);
        engine
    }

    fn register(this: &Rc<RefCell<Self>>, table: &mut InterfaceTable<Policy3d>) {
        table
            .implement::<Labels>(this.clone())
            .implement::<Counter>(this.clone());
    }
}
