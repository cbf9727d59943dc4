use std::collections::BTreeMap;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::model::{
	Arrows, GraphDocument, RawEdge, RawNode, RawProperty, RenderEdge, RenderGraph, RenderNode,
};

/// What to do with a property value that is not valid base64.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DecodePolicy {
	/// Abort the whole conversion.
	#[default]
	Strict,
	/// Keep the raw text and carry on.
	PassThrough,
}

/// Standard alphabet, padding optional.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode one standard-alphabet base64 value the way browsers' `atob` does:
/// ASCII whitespace is ignored and padding may be left off. Bytes that are not
/// UTF-8 are replaced rather than rejected.
pub fn decode_value(encoded: &str) -> Result<String, base64::DecodeError> {
	let compact: String = encoded
		.chars()
		.filter(|c| !c.is_ascii_whitespace())
		.collect();
	let bytes = FORGIVING.decode(compact)?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Convert a fetched document into the renderer's node and edge collections.
///
/// Edge endpoints are not checked against the node set; the renderer decides
/// what to do with dangling edges.
pub fn convert_document(
	doc: &GraphDocument,
	policy: DecodePolicy,
) -> Result<RenderGraph, GraphError> {
	let mut graph = RenderGraph::default();

	for raw in &doc.nodes {
		let node = convert_node(raw, policy)?;
		debug!("{raw:?}");
		debug!("{node:?}");
		graph.nodes.add(node)?;
	}

	for raw in &doc.edges {
		let edge = convert_edge(raw, policy)?;
		debug!("{raw:?}");
		debug!("{edge:?}");
		graph.edges.add(edge)?;
	}

	debug!(
		"converted {} nodes and {} edges",
		graph.nodes.len(),
		graph.edges.len()
	);
	Ok(graph)
}

fn convert_node(raw: &RawNode, policy: DecodePolicy) -> Result<RenderNode, GraphError> {
	Ok(RenderNode {
		id: raw.uid.clone(),
		label: raw.label.clone(),
		group: raw.label.clone(),
		properties: decode_properties(&format!("node {}", raw.uid), &raw.properties, policy)?,
	})
}

fn convert_edge(raw: &RawEdge, policy: DecodePolicy) -> Result<RenderEdge, GraphError> {
	Ok(RenderEdge {
		id: raw.uid.clone(),
		from: raw.source_uid.clone(),
		to: raw.target_uid.clone(),
		label: raw.label.clone(),
		group: raw.label.clone(),
		properties: decode_properties(&format!("edge {}", raw.uid), &raw.properties, policy)?,
		arrows: Arrows::To,
	})
}

fn decode_properties(
	element: &str,
	properties: &BTreeMap<String, RawProperty>,
	policy: DecodePolicy,
) -> Result<BTreeMap<String, String>, GraphError> {
	let mut decoded = BTreeMap::new();
	for (key, value) in properties {
		let text = match (decode_value(value.encoded()), policy) {
			(Ok(text), _) => text,
			(Err(err), DecodePolicy::PassThrough) => {
				warn!(
					"keeping raw {} value of {element} property {key:?}: {err}",
					value.kind().unwrap_or("untyped")
				);
				value.encoded().to_owned()
			}
			(Err(source), DecodePolicy::Strict) => {
				return Err(GraphError::Decode {
					element: element.to_owned(),
					key: key.clone(),
					source,
				});
			}
		};
		decoded.insert(key.clone(), text);
	}
	Ok(decoded)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, RawProperty> {
		pairs
			.iter()
			.map(|&(k, v)| (k.to_owned(), RawProperty::from(v)))
			.collect()
	}

	fn node(uid: &str, label: &str, properties: &[(&str, &str)]) -> RawNode {
		RawNode {
			uid: uid.into(),
			label: label.into(),
			properties: props(properties),
		}
	}

	fn edge(uid: &str, source: &str, target: &str, label: &str) -> RawEdge {
		RawEdge {
			uid: uid.into(),
			source_uid: source.into(),
			target_uid: target.into(),
			label: label.into(),
			properties: BTreeMap::new(),
		}
	}

	#[test]
	fn person_node() {
		let doc: GraphDocument = serde_json::from_str(
			r#"{"nodes":[{"uid":"n1","label":"Person","properties":{"name":"Sm9obg=="}}],"edges":[]}"#,
		)
		.unwrap();
		let graph = convert_document(&doc, DecodePolicy::Strict).unwrap();

		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.edges.is_empty());
		assert_eq!(
			graph.nodes.get("n1"),
			Some(&RenderNode {
				id: "n1".into(),
				label: "Person".into(),
				group: "Person".into(),
				properties: [("name".to_owned(), "John".to_owned())].into(),
			})
		);
	}

	#[test]
	fn counts_ids_groups_and_arrows() {
		let doc = GraphDocument {
			nodes: vec![
				node("a", "Person", &[]),
				node("b", "City", &[("name", "T3Nsbw==")]),
				node("c", "Person", &[]),
			],
			edges: vec![edge("e1", "a", "b", "LIVES_IN"), edge("e2", "c", "a", "KNOWS")],
		};
		let graph = convert_document(&doc, DecodePolicy::Strict).unwrap();

		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.edges.len(), 2);
		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["a", "b", "c"]);

		for n in &graph.nodes {
			assert_eq!(n.group, n.label);
		}
		for e in &graph.edges {
			assert_eq!(e.group, e.label);
			assert_eq!(e.arrows, Arrows::To);
		}

		let e1 = graph.edges.get("e1").unwrap();
		assert_eq!((e1.from.as_str(), e1.to.as_str()), ("a", "b"));
		assert_eq!(graph.nodes.get("b").unwrap().properties["name"], "Oslo");
	}

	#[test]
	fn empty_document() {
		let graph = convert_document(&GraphDocument::default(), DecodePolicy::Strict).unwrap();
		assert!(graph.nodes.is_empty());
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn dangling_edge_passes_through() {
		let doc = GraphDocument {
			nodes: vec![node("a", "Person", &[])],
			edges: vec![edge("e1", "a", "ghost", "KNOWS")],
		};
		let graph = convert_document(&doc, DecodePolicy::Strict).unwrap();
		let e1 = graph.edges.get("e1").unwrap();
		assert_eq!(e1.to, "ghost");
		assert!(!graph.nodes.contains("ghost"));
	}

	#[test]
	fn decodes_edge_properties() {
		let mut raw = edge("e1", "a", "b", "KNOWS");
		raw.properties = props(&[("since", "MjAwMQ=="), ("empty", "")]);
		let doc = GraphDocument {
			nodes: vec![],
			edges: vec![raw],
		};
		let graph = convert_document(&doc, DecodePolicy::Strict).unwrap();
		let props = &graph.edges.get("e1").unwrap().properties;
		assert_eq!(props["since"], "2001");
		assert_eq!(props["empty"], "");
	}

	#[test]
	fn decode_round_trip() {
		use base64::engine::general_purpose::STANDARD;

		for text in ["", "John", "naïve café", "line\nbreak", "{\"json\": true}"] {
			assert_eq!(decode_value(&STANDARD.encode(text)).unwrap(), text);
		}
	}

	#[test]
	fn decode_is_as_forgiving_as_atob() {
		assert_eq!(decode_value("Sm9obg").unwrap(), "John");
		assert_eq!(decode_value("Sm9obg==\n").unwrap(), "John");
		assert_eq!(decode_value("Sm9o bg==").unwrap(), "John");
		assert_eq!(decode_value(" Sm9o\r\n\tbg== ").unwrap(), "John");
		assert!(decode_value("Sm9ob").is_err());
		assert!(decode_value("Sm9o!g==").is_err());
	}

	#[test]
	fn strict_policy_aborts_on_bad_base64() {
		let doc = GraphDocument {
			nodes: vec![node("a", "Person", &[("ok", "b2s="), ("bad", "not base64!")])],
			edges: vec![],
		};
		let err = convert_document(&doc, DecodePolicy::Strict).unwrap_err();
		assert!(matches!(
			err,
			GraphError::Decode { ref element, ref key, .. } if element == "node a" && key == "bad"
		));
	}

	#[test]
	fn pass_through_policy_keeps_raw_value() {
		let doc = GraphDocument {
			nodes: vec![node("a", "Person", &[("ok", "b2s="), ("bad", "not base64!")])],
			edges: vec![],
		};
		let graph = convert_document(&doc, DecodePolicy::PassThrough).unwrap();
		let props = &graph.nodes.get("a").unwrap().properties;
		assert_eq!(props["ok"], "ok");
		assert_eq!(props["bad"], "not base64!");
	}

	#[test]
	fn duplicate_node_id_is_rejected() {
		let doc = GraphDocument {
			nodes: vec![node("a", "Person", &[]), node("a", "City", &[])],
			edges: vec![],
		};
		assert_eq!(
			convert_document(&doc, DecodePolicy::Strict).unwrap_err(),
			GraphError::DuplicateId {
				kind: "node",
				id: "a".into()
			}
		);
	}

	#[test]
	fn typed_envelope_is_decoded() {
		let doc: GraphDocument = serde_json::from_str(
			r#"{"nodes":[{"uid":"n1","label":"Person","properties":{"age":{"type":"int","value":"NDI="}}}]}"#,
		)
		.unwrap();
		let graph = convert_document(&doc, DecodePolicy::Strict).unwrap();
		assert_eq!(graph.nodes.get("n1").unwrap().properties["age"], "42");
	}
}
