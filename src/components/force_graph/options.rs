use serde::{Deserialize, Serialize};

/// Renderer configuration. Deserializes from the same camelCase shape the page
/// config uses, with every field optional.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
	/// CSS height of the graph container.
	pub height: String,
	/// CSS width of the graph container.
	pub width: String,
	pub nodes: NodeOptions,
	pub edges: EdgeOptions,
	pub physics: PhysicsOptions,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			height: "100%".into(),
			width: "100%".into(),
			nodes: NodeOptions::default(),
			edges: EdgeOptions::default(),
			physics: PhysicsOptions::default(),
		}
	}
}

impl GraphOptions {
	/// Stop the simulation for nodes and edges so the current layout stays put.
	pub fn freeze(&mut self) {
		self.nodes.physics = false;
		self.edges.physics = false;
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Scaling {
	pub min: f64,
	pub max: f64,
}

impl Default for Scaling {
	fn default() -> Self {
		Self { min: 1.0, max: 1.0 }
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeOptions {
	/// Radius bounds in graph units.
	pub scaling: Scaling,
	pub chosen: NodeChosen,
	pub physics: bool,
}

impl Default for NodeOptions {
	fn default() -> Self {
		Self {
			scaling: Scaling { min: 10.0, max: 20.0 },
			chosen: NodeChosen::default(),
			physics: true,
		}
	}
}

/// Style applied to a selected or hovered node.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeChosen {
	pub color: String,
	pub shadow: bool,
}

impl Default for NodeChosen {
	fn default() -> Self {
		Self {
			color: "#ffe6e6".into(),
			shadow: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeOptions {
	/// Line width bounds in graph units.
	pub scaling: Scaling,
	pub chosen: EdgeChosen,
	pub physics: bool,
}

impl Default for EdgeOptions {
	fn default() -> Self {
		Self {
			scaling: Scaling { min: 1.0, max: 3.0 },
			chosen: EdgeChosen::default(),
			physics: true,
		}
	}
}

/// Colour of a selected or hovered edge, and of the edges touching a chosen node.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeChosen {
	pub color: String,
}

impl Default for EdgeChosen {
	fn default() -> Self {
		Self { color: "red".into() }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PhysicsOptions {
	pub solver: Solver,
}

/// Named presets for the layout simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Solver {
	#[default]
	ForceAtlas2Based,
	BarnesHut,
	Repulsion,
}
