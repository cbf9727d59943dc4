use thiserror::Error;

/// Failures of the load pipeline. Every stage returns one of these and the page
/// renders it in place of the graph.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
	/// The request never produced a response, or its body could not be read.
	#[error("request to {endpoint} failed: {message}")]
	Network { endpoint: String, message: String },

	/// The server answered with a non-success status.
	#[error("{endpoint} responded with {status} {status_text}")]
	Status {
		endpoint: String,
		status: u16,
		status_text: String,
	},

	/// The body is not a graph document.
	#[error("invalid graph document: {0}")]
	Json(String),

	/// A property value is not standard base64.
	#[error("property {key:?} of {element} is not valid base64")]
	Decode {
		element: String,
		key: String,
		source: base64::DecodeError,
	},

	/// Two elements of the same collection share an id.
	#[error("duplicate {kind} id {id:?}")]
	DuplicateId { kind: &'static str, id: String },
}
