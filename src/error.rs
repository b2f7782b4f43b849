use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config Error: {0}")]
    Config(String),

    #[error("Malformed Observation: {0}")]
    MalformedObservation(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Toml Error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
