//! Error types for schema handling, generation, resolution and binary coding

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing or validating textual schemas.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// Invalid schema structure
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Unsupported schema type
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// Schema text could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Errors raised while deriving a schema from a type's shape.
///
/// Generation errors are synchronous and not retryable without changing
/// the described type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// The type reported a shape that has no wire representation.
    #[error("Unsupported shape for type '{type_name}': {reason}")]
    UnsupportedShape { type_name: String, reason: String },

    /// The same type was registered twice.
    #[error("Type '{0}' is already registered")]
    DuplicateRegistration(String),

    /// Enum symbol does not follow the `[A-Za-z_][A-Za-z0-9_]*` grammar.
    #[error("Illegal enum symbol '{symbol}' in type '{type_name}'")]
    IllegalSymbol { symbol: String, type_name: String },

    /// A nested shape could not be resolved from the information at hand.
    #[error("Missing context for type '{type_name}': {reason}")]
    MissingContext { type_name: String, reason: String },

    /// A schema was requested for a type that was never generated.
    #[error("No schema has been generated for type '{0}'")]
    NotGenerated(String),

    /// A schema override annotation did not parse.
    #[error("Invalid schema override on '{owner}': {source}")]
    InvalidOverride {
        owner: String,
        #[source]
        source: SchemaError,
    },
}

/// Errors raised while reconciling a writer schema with a reader schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    /// The writer and reader schemas cannot be reconciled.
    #[error("Incompatible schemas (writer '{writer}', reader '{reader}'): {reason}")]
    Incompatible {
        writer: String,
        reader: String,
        reason: String,
    },

    /// One of the schemas is itself malformed.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors raised while decoding binary data.
///
/// A decode error is terminal for the stream that produced it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Malformed data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Stream ended in the middle of a value
    #[error("Unexpected end of data")]
    UnexpectedEof,
    /// Varint longer than ten bytes
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// String payload is not UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
    /// Union branch index outside the declared members
    #[error("Union branch index {index} out of range (union has {count} members)")]
    UnionBranchOutOfRange { index: i64, count: usize },
    /// Enum index unknown to the reader and no reader default is declared
    #[error("Enum '{enum_name}': symbol {symbol} is not known to the reader schema")]
    UnknownEnumSymbol { enum_name: String, symbol: String },
    /// Selected union branch could not be resolved against the reader schema
    #[error("Union branch {index} is incompatible with the reader schema: {reason}")]
    IncompatibleBranch { index: usize, reason: String },
    /// Incompatibility that unsafe resolution deferred until the value was read
    #[error("Schema incompatibility: {0}")]
    Incompatible(String),
    /// Reader-only field without a default, reached through unsafe resolution
    #[error("Field '{field}' ({field_type}) of record '{record}' is absent from the writer schema and has no default")]
    MissingField {
        record: String,
        field: String,
        field_type: String,
    },
    /// Named type reference with no definition in scope
    #[error("Unresolved named type '{0}'")]
    Unresolved(String),
    /// Input nests deeper than the configured limit
    #[error("Nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),
    /// Reader was used after it finished or failed
    #[error("Reader is closed; obtain a new reader from the blueprint")]
    ReaderClosed,
    /// Error annotated with the byte offset where it surfaced
    #[error("{source} (at byte offset {offset})")]
    At {
        offset: u64,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Attach a byte offset, keeping the innermost offset if one is already set.
    pub fn at(self, offset: u64) -> Self {
        match self {
            DecodeError::At { .. } => self,
            other => DecodeError::At {
                offset,
                source: Box::new(other),
            },
        }
    }

    /// The error without any offset annotation.
    pub fn root(&self) -> &DecodeError {
        match self {
            DecodeError::At { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<std::string::FromUtf8Error> for DecodeError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DecodeError::InvalidUtf8(err.to_string())
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(err: std::str::Utf8Error) -> Self {
        DecodeError::InvalidUtf8(err.to_string())
    }
}

/// Errors raised while encoding a datum against a schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    /// Datum shape does not fit the schema
    #[error("Cannot encode {datum} as {schema}")]
    Mismatch { datum: String, schema: String },
    /// Record datum lacks a field and the schema has no default
    #[error("Record '{record}' is missing field '{field}'")]
    MissingField { record: String, field: String },
    /// Named type reference with no definition in scope
    #[error("Unresolved named type '{0}'")]
    Unresolved(String),
    /// Default literal could not be converted
    #[error("Invalid default: {0}")]
    InvalidDefault(String),
}

/// Which layer an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Generation,
    Resolution,
    Decode,
    Encode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Schema => "schema",
            ErrorKind::Generation => "generation",
            ErrorKind::Resolution => "resolution",
            ErrorKind::Decode => "decode",
            ErrorKind::Encode => "encode",
        };
        f.write_str(name)
    }
}

/// Top-level error type
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}

impl Error {
    /// The layer this error originated in.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Schema(_) => ErrorKind::Schema,
            Error::Generation(_) => ErrorKind::Generation,
            Error::Resolution(_) => ErrorKind::Resolution,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Encode(_) => ErrorKind::Encode,
        }
    }
}
