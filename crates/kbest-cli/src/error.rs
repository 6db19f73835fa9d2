// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use kbest_core::KbestError;

/// Errors surfaced by the `kbest` binary, each with a stable machine code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Kbest(#[from] KbestError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Kbest(err) => err.code(),
            Self::InvalidInput(_) => "invalid_input",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Usage(_) => "usage_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use kbest_core::KbestError;

    #[test]
    fn codes_follow_library_taxonomy() {
        assert_eq!(
            CliError::from(KbestError::invalid_budget("k must be >= 0; got -1")).code(),
            "invalid_budget"
        );
        assert_eq!(
            CliError::from(KbestError::resource_limit("too big")).code(),
            "resource_limit"
        );
        assert_eq!(CliError::invalid_input("bad").code(), "invalid_input");
        assert_eq!(CliError::Usage("missing --k".to_string()).code(), "usage_error");
    }

    #[test]
    fn io_errors_keep_context_and_source() {
        let err = CliError::io(
            "failed to read 'x.csv'",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.code(), "io_error");
        assert_eq!(err.to_string(), "failed to read 'x.csv': no such file");
        assert!(std::error::Error::source(&err).is_some());
    }
}
