#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid input type: {0}")]
    InvalidInputType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
