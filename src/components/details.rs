use leptos::prelude::*;

use crate::components::force_graph::Selection;
use crate::graph::RenderGraph;

/// What the details panel shows for one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Details {
	pub kind: &'static str,
	pub title: String,
	pub subtitle: String,
	pub properties: Vec<(String, String)>,
}

/// Look up the selected element. `None` when nothing is selected or the id is
/// not in the graph.
pub fn describe(graph: &RenderGraph, selection: &Selection) -> Option<Details> {
	match selection {
		Selection::Node(id) => graph.nodes.get(id).map(|node| Details {
			kind: "node",
			title: node.label.clone(),
			subtitle: node.id.clone(),
			properties: node
				.properties
				.iter()
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
		}),
		Selection::Edge(id) => graph.edges.get(id).map(|edge| Details {
			kind: "edge",
			title: edge.label.clone(),
			subtitle: format!("{}: {} → {}", edge.id, edge.from, edge.to),
			properties: edge
				.properties
				.iter()
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
		}),
	}
}

/// Panel listing the selected element's decoded properties.
#[component]
pub fn DetailsPanel(
	graph: RenderGraph,
	#[prop(into)] selection: Signal<Option<Selection>>,
) -> impl IntoView {
	move || {
		let details = selection.with(|s| s.as_ref().and_then(|s| describe(&graph, s)))?;
		let empty = details.properties.is_empty();
		Some(view! {
			<aside class="graph-details">
				<h2>{details.title}</h2>
				<p class="graph-details-id">{details.kind} " " {details.subtitle}</p>
				<Show when=move || empty>
					<p class="graph-details-empty">"No properties"</p>
				</Show>
				<dl>
					{details
						.properties
						.into_iter()
						.map(|(key, value)| view! {
							<dt>{key}</dt>
							<dd>{value}</dd>
						})
						.collect_view()}
				</dl>
			</aside>
		})
	}
}
