use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot build a path from an empty point sequence")]
    EmptyPoints,

    #[error("invalid point data: {0}")]
    Points(#[from] serde_json::Error),

    #[error("invalid svg: {0}")]
    Svg(#[from] roxmltree::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
