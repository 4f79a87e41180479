use selkie_core::Id;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] selkie_core::Error),
    #[error("element {id} is not a view")]
    NotAView { id: Id },
    #[error("edge {id} has an unresolved endpoint")]
    DanglingEdge { id: Id },
}

pub type Result<T> = std::result::Result<T, Error>;
