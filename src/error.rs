use crate::ir::lower::LowerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("parsing failed with {0} error(s)")]
    Parse(usize),
    #[error("{0}")]
    Lower(#[from] LowerError),
}
