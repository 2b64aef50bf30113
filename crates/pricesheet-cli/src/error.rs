use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] pricesheet_core::ValidationError),

    #[error("input closed before '{prompt}' was answered")]
    InputClosed { prompt: String },

    #[error(transparent)]
    Source(#[from] pricesheet_core::SourceError),

    #[error(transparent)]
    Pipeline(#[from] pricesheet_core::PipelineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::InputClosed { .. } => 2,
            Self::Pipeline(error) if error.is_input_error() => 2,
            Self::Source(_) | Self::Pipeline(_) | Self::Io(_) => 1,
        }
    }
}
