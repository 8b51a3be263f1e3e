use snafu::Snafu;

/// The public error type returned when a resource document cannot be interpreted.
#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Error deserializing conditions at '{}': {}", path, source))]
    ConditionDeserialization {
        path: String,
        source: serde_json::Error,
    },

    #[snafu(display("Error serializing conditions: {}", source))]
    ConditionSerialization { source: serde_json::Error },

    #[snafu(display("Field '{}' is malformed: expected {} but got {}", path, expected, got))]
    MalformedField {
        path: String,
        expected: &'static str,
        got: &'static str,
    },

    #[snafu(display("Error converting {} into a document: {}", what, source))]
    ObjectConversion {
        what: String,
        source: serde_json::Error,
    },
}
