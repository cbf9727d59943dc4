use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::set::{Element, ElementSet};

/// The graph as served by the assets endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphDocument {
	#[serde(default, deserialize_with = "nullable")]
	pub nodes: Vec<RawNode>,
	#[serde(default, deserialize_with = "nullable")]
	pub edges: Vec<RawEdge>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawNode {
	#[serde(default)]
	pub uid: String,
	#[serde(default, deserialize_with = "nullable")]
	pub label: String,
	#[serde(default, deserialize_with = "nullable")]
	pub properties: BTreeMap<String, RawProperty>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawEdge {
	#[serde(default)]
	pub uid: String,
	#[serde(default)]
	pub source_uid: String,
	#[serde(default)]
	pub target_uid: String,
	#[serde(default, deserialize_with = "nullable")]
	pub label: String,
	#[serde(default, deserialize_with = "nullable")]
	pub properties: BTreeMap<String, RawProperty>,
}

/// A base64 property value, either bare or wrapped in the server's typed envelope.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawProperty {
	Encoded(String),
	Typed {
		#[serde(rename = "type", default)]
		kind: String,
		#[serde(default)]
		value: String,
	},
}

impl RawProperty {
	/// The base64 text, whichever shape it arrived in.
	pub fn encoded(&self) -> &str {
		match self {
			Self::Encoded(value) | Self::Typed { value, .. } => value,
		}
	}

	/// Declared value type, when the envelope carries one.
	pub fn kind(&self) -> Option<&str> {
		match self {
			Self::Typed { kind, .. } if !kind.is_empty() => Some(kind),
			_ => None,
		}
	}
}

impl From<&str> for RawProperty {
	fn from(value: &str) -> Self {
		Self::Encoded(value.to_owned())
	}
}

/// Edge direction marker. Every edge the viewer draws points at its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrows {
	#[default]
	To,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderNode {
	pub id: String,
	pub label: String,
	/// Visual grouping key, always the label.
	pub group: String,
	pub properties: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderEdge {
	pub id: String,
	pub from: String,
	pub to: String,
	pub label: String,
	pub group: String,
	pub properties: BTreeMap<String, String>,
	pub arrows: Arrows,
}

impl Element for RenderNode {
	const KIND: &'static str = "node";

	fn id(&self) -> &str {
		&self.id
	}
}

impl Element for RenderEdge {
	const KIND: &'static str = "edge";

	fn id(&self) -> &str {
		&self.id
	}
}

/// The two collections handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderGraph {
	pub nodes: ElementSet<RenderNode>,
	pub edges: ElementSet<RenderEdge>,
}

/// Go marshals nil slices and maps as `null`; treat that like an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
