use thiserror::Error;

/// Host-side failures. The simulation itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal i/o failed")]
    Io(#[from] std::io::Error),

    #[error("input event channel closed")]
    InputClosed,
}
