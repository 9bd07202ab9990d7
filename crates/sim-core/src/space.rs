use crate::tags::TagName;
use thiserror::Error;

/// Node creation or write failure in the backing address space.
///
/// None of these are recovered locally; callers propagate and shut down.
#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("failed to create object node {name:?}")]
    ObjectCreate { name: String },

    #[error("failed to create variable node {tag} under {object:?}")]
    VariableCreate { object: String, tag: TagName },

    #[error("value write to {node:?} was rejected")]
    WriteRejected { node: String },
}

/// A server-managed variable node that accepts value updates.
pub trait WritableHandle {
    fn set_value(&mut self, value: f64) -> Result<(), SpaceError>;
}

/// The slice of the external server this crate needs: a container that can
/// grow child objects, each of which can grow writable variables.
pub trait NodeSpace {
    type Object;
    type Handle: WritableHandle;

    fn add_object(&mut self, name: &str) -> Result<Self::Object, SpaceError>;

    fn add_variable(
        &mut self,
        parent: &Self::Object,
        tag: TagName,
        initial: f64,
    ) -> Result<Self::Handle, SpaceError>;
}
