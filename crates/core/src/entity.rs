/// Something that keeps its identity while its attributes change.
///
/// A product can be renamed or get a new minimum stock; it is still the same
/// product as long as its code is the same.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
