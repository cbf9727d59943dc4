use std::fmt::Display;

use gloo_net::http::Request;
use log::{debug, error, info, warn};

use super::convert::{DecodePolicy, convert_document};
use super::error::GraphError;
use super::model::{GraphDocument, RenderGraph};

/// GET `endpoint` once and parse the body as a [`GraphDocument`].
pub async fn fetch_document(endpoint: &str) -> Result<GraphDocument, GraphError> {
	let network = |err: gloo_net::Error| network_error(endpoint, err);

	debug!("fetching graph from {endpoint}");
	let response = Request::get(endpoint).send().await.map_err(network)?;
	check_status(
		endpoint,
		response.ok(),
		response.status(),
		response.status_text(),
	)?;
	let body = response.text().await.map_err(network)?;
	parse_document(&body)
}

fn network_error(endpoint: &str, err: impl Display) -> GraphError {
	GraphError::Network {
		endpoint: endpoint.to_owned(),
		message: err.to_string(),
	}
}

/// Anything but a success status fails before the body is read.
fn check_status(endpoint: &str, ok: bool, status: u16, status_text: String) -> Result<(), GraphError> {
	if ok {
		return Ok(());
	}
	Err(GraphError::Status {
		endpoint: endpoint.to_owned(),
		status,
		status_text,
	})
}

pub fn parse_document(body: &str) -> Result<GraphDocument, GraphError> {
	serde_json::from_str(body).map_err(|err| GraphError::Json(err.to_string()))
}

/// Fetch then convert. Failures are logged here and handed back to the page.
pub async fn load_graph(endpoint: &str, policy: DecodePolicy) -> Result<RenderGraph, GraphError> {
	let result = async { convert_document(&fetch_document(endpoint).await?, policy) }.await;
	match &result {
		Ok(graph) if graph.nodes.is_empty() => warn!("graph from {endpoint} has no nodes"),
		Ok(graph) => info!(
			"loaded {} nodes and {} edges from {endpoint}",
			graph.nodes.len(),
			graph.edges.len()
		),
		Err(err) => error!("failed to load graph: {err}"),
	}
	result
}
