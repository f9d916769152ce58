use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("landmark source `{input}` is not available")]
    MissingInputDevice {
        input: String,
        #[source]
        err: std::io::Error,
    },

    #[error("link device {} is not available", .device.display())]
    MissingOutputDevice {
        device: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("invalid landmark source `{0}`")]
    InvalidSource(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode landmark frame: {0}")]
    Decode(#[from] minicbor::decode::Error),
}
