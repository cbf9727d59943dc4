//! Page configuration.
//!
//! Defaults describe the stock viewer: graph served from `/assets/json`, drawn
//! into `#graph`. A page can override any field with a JSON block:
//!
//! ```html
//! <script id="graph-config" type="application/json">
//!   { "endpoint": "/api/graph", "options": { "physics": { "solver": "barnesHut" } } }
//! </script>
//! ```

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::components::force_graph::GraphOptions;
use crate::graph::DecodePolicy;

pub const DEFAULT_ENDPOINT: &str = "/assets/json";
pub const DEFAULT_CONTAINER_ID: &str = "graph";
/// Id of the optional inline JSON config element.
pub const CONFIG_ELEMENT_ID: &str = "graph-config";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
	/// Where the graph document is fetched from.
	pub endpoint: String,
	/// Id given to the element that holds the canvas.
	pub container_id: String,
	pub decode_policy: DecodePolicy,
	pub options: GraphOptions,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.into(),
			container_id: DEFAULT_CONTAINER_ID.into(),
			decode_policy: DecodePolicy::default(),
			options: GraphOptions::default(),
		}
	}
}

impl AppConfig {
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Read the inline config block if the page has one. A malformed block is
	/// logged and ignored.
	pub fn load() -> Self {
		let Some(text) = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|e| e.text_content())
		else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("using page config, endpoint {}", config.endpoint);
				config
			}
			Err(err) => {
				warn!("ignoring malformed #{CONFIG_ELEMENT_ID}: {err}");
				Self::default()
			}
		}
	}
}
