pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Retrieval error: {message}")]
	Retrieval { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn retrieval(err: impl std::fmt::Display) -> Self {
		Self::Retrieval { message: err.to_string() }
	}

	pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<epg_domain::Error> for Error {
	fn from(err: epg_domain::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
