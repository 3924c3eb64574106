#[derive(Debug, thiserror::Error, thiserror_ext::Construct)]
#[non_exhaustive]
pub enum Error {
	#[error("algorithm configuration is missing the {0}")]
	ConfigurationMissing(&'static str),

	#[error("unsupported symmetric algorithm: {0}")]
	UnsupportedAlgorithm(String),

	#[error("invalid key: {0}")]
	InvalidKey(String),

	#[error("invalid IV length: expected {expected} bytes, got {actual}")]
	InvalidIv { expected: usize, actual: usize },

	#[error("the cipher text is invalid and cannot be decrypted")]
	MalformedToken,

	#[error("cipher text token has an invalid base64 {segment} segment: {cause}")]
	InvalidEncoding {
		segment: &'static str,
		#[source]
		cause: base64::DecodeError,
	},

	#[error("failed to decrypt cipher text")]
	Decryption,

	#[error("expected a text database value, got {0}")]
	UnexpectedDbValue(&'static str),

	#[error("type not supported by this converter: {0}")]
	UnsupportedType(String),

	#[error("no column at index {0}")]
	ColumnOutOfRange(usize),
}
