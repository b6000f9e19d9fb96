use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum SourceError {
    // The field is deliberately not called `source`: the Error derive would
    // treat it as the error's source() and demand an Error impl on String
    #[display("request to {provider} failed")]
    Request { provider: String },
    #[display("failed to parse response from {provider}")]
    ResponseParse { provider: String },
}

/// Failures that abort report generation for an instrument.
#[derive(Debug, Display, Error)]
pub enum DataError {
    #[display("invalid data from provider: {reason}")]
    InvalidSource { reason: String },
    #[display("insufficient history: need {required} closes, got {available}")]
    InsufficientHistory { required: usize, available: usize },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("insufficient data: need {required}, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum DeliveryError {
    #[display("failed to send report via {channel}")]
    Request { channel: String },
    #[display("{channel} rejected the message: {status}")]
    Rejected { channel: String, status: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn source_error_names_the_provider() {
        let err = SourceError::Request {
            provider: "chart".into(),
        };
        assert_eq!(err.to_string(), "request to chart failed");
        // A plain string field never acts as the error chain's source
        assert!(err.source().is_none());

        let err = SourceError::ResponseParse {
            provider: "gold".into(),
        };
        assert_eq!(err.to_string(), "failed to parse response from gold");
        assert!(err.source().is_none());
    }
}
