use leptos::prelude::*;
use log::info;

use crate::components::details::DetailsPanel;
use crate::components::force_graph::{ForceGraphCanvas, GraphOptions, Selection};
use crate::config::AppConfig;
use crate::graph::{RenderGraph, load_graph};

/// Default Home Page: loads the graph once and renders it, or the error that
/// stopped it.
#[component]
pub fn Home() -> impl IntoView {
	let config = AppConfig::load();
	let (endpoint, policy) = (config.endpoint.clone(), config.decode_policy);
	let graph = LocalResource::new(move || {
		let endpoint = endpoint.clone();
		async move { load_graph(&endpoint, policy).await }
	});

	view! {
		<Transition fallback=|| view! { <p class="graph-status">"Loading graph…"</p> }>
			<ErrorBoundary fallback=|errors| {
				view! {
					<h1>"Uh oh! Something went wrong!"</h1>

					<p>"Errors: "</p>
					<ul>
						{move || {
							errors
								.get()
								.into_iter()
								.map(|(_, e)| view! { <li>{e.to_string()}</li> })
								.collect_view()
						}}
					</ul>
				}
			}>
				{
					let config = config.clone();
					move || {
						let config = config.clone();
						Suspend::new(async move {
							graph.await.map(|graph| view! { <GraphView graph config /> })
						})
					}
				}
			</ErrorBoundary>
		</Transition>
	}
}

/// Owns the renderer options for one loaded graph. The first node drag
/// freezes the layout by switching physics off.
#[component]
fn GraphView(graph: RenderGraph, config: AppConfig) -> impl IntoView {
	let options = RwSignal::new(config.options);
	let selection = RwSignal::new(None::<Selection>);

	let on_drag = Callback::new(move |()| {
		if options.with_untracked(|o| o.nodes.physics || o.edges.physics) {
			info!("node dragged, freezing layout");
			options.update(GraphOptions::freeze);
		}
	});
	let on_select = Callback::new(move |selected: Option<Selection>| selection.set(selected));
	let summary = format!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
	let data = Signal::stored(graph.clone());

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=data
				options=options
				container_id=config.container_id
				on_drag=on_drag
				on_select=on_select
			/>
			<div class="graph-overlay">
				<h1>"Graph"</h1>
				<p class="subtitle">{summary}</p>
			</div>
			<DetailsPanel graph selection />
		</div>
	}
}
