use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Id carried by identities that do not refer to any real entity.
pub const INVALID_ENTITY_ID: usize = usize::MAX;

/// Id reserved for the engine (root) object of every backend.
pub const ENGINE_ENTITY_ID: usize = 0;

/// Opaque handle naming an object owned by a backend.
///
/// An identity is an integer id plus an optional reference-counted token for
/// the backend record it names. Holding the token keeps the record's memory
/// alive but does not keep the entity reachable: visibility is decided by the
/// backend registry alone.
///
/// Equality, ordering and hashing only consider the id.
#[derive(Clone)]
pub struct Identity {
    id: usize,
    reference: Option<Rc<dyn Any>>,
}

impl Identity {
    /// Wrap an id and an optional ownership token.
    ///
    /// Backends call this to re-materialize identities of entities they
    /// already store. Fresh ids come from [`IdAllocator::mint`].
    pub fn generate(id: usize, reference: Option<Rc<dyn Any>>) -> Self {
        Self { id, reference }
    }

    /// The "no such entity" value.
    pub fn invalid() -> Self {
        Self {
            id: INVALID_ENTITY_ID,
            reference: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn reference(&self) -> Option<&Rc<dyn Any>> {
        self.reference.as_ref()
    }

    /// Downcast the ownership token to the record type the backend stored.
    pub fn reference_as<T: Any>(&self) -> Option<Rc<T>> {
        self.reference.clone()?.downcast::<T>().ok()
    }

    pub fn is_valid(&self) -> bool {
        self.id != INVALID_ENTITY_ID
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("counted", &self.reference.is_some())
            .finish()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.id)
        } else {
            f.write_str("#invalid")
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl PartialOrd for Identity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Monotonic per-registry id source.
///
/// The first id handed out is [`ENGINE_ENTITY_ID`]. Ids are never returned to
/// the allocator, so a removed entity's id is never given to a new object.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids minted so far.
    pub fn count(&self) -> usize {
        self.next
    }

    /// Allocate the next id and wrap it with the given token.
    pub fn mint(&mut self, reference: Option<Rc<dyn Any>>) -> Identity {
        let id = self.next;
        self.next += 1;
        Identity::generate(id, reference)
    }
}
