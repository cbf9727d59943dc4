use force_graph::DefaultNodeIdx;

/// Per-node data carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: String,
	pub degree: usize,
	pub radius: f64,
}

/// An edge whose endpoints both resolved to simulated nodes.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub id: String,
	pub label: String,
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub directed: bool,
}

/// What the user clicked, reported to the host by element id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
	Node(String),
	Edge(String),
}
