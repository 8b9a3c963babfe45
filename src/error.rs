use thiserror::Error;

#[derive(Error, Debug)]
pub enum VitalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid radar cube: {0}")]
    InvalidCube(String),

    #[error("Unsupported FFT size {0}: must be a power of two, at least 4")]
    FftSize(usize),
}

pub type Result<T> = std::result::Result<T, VitalError>;
