pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid search form: {message}")]
	InvalidForm { message: String },
	#[error("Invalid document {id}: {message}")]
	InvalidDocument { id: String, message: String },
	#[error("Invalid guide zone: {message}")]
	InvalidZone { message: String },
	#[error("Unknown {kind} code {code:?}.")]
	UnknownCode { kind: &'static str, code: String },
}
