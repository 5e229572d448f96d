use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Edge ({0}, {1}, {2}) references a node missing from the graph")]
    MissingNode(u64, u64, u32),
    #[error("Existing artifact {0} could not be read: {1}")]
    ResumeMismatch(String, String),
    #[error("Artifact {0} not found")]
    ArtifactNotFound(String),
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
