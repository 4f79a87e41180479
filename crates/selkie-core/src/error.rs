use crate::id::Id;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown element type: {type_name}")]
    UnknownType { type_name: String },

    #[error("No element with id {id}")]
    MissingElement { id: Id },

    #[error("Element {id} is already borrowed")]
    ElementBusy { id: Id },

    #[error("Element {id} is not a {expected}")]
    WrongType { id: Id, expected: &'static str },

    #[error("Element {id} has no attribute {attr:?} of the required kind")]
    WrongAttribute { id: Id, attr: String },

    #[error("Element {id} cannot be deleted")]
    Undeletable { id: Id },
}
