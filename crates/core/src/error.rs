use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskheapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Workload error: {0}")]
    Workload(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, TaskheapError>;
