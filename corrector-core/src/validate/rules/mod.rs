pub(crate) mod mapping;
pub(crate) mod target;
pub(crate) mod transform;
