use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use super::options::{GraphOptions, Solver};
use super::scale::scale;
use super::types::{EdgeInfo, NodeInfo, Selection};
use crate::graph::{Arrows, RenderGraph};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const NODE_MASS: f32 = 10.0;
/// Screen pixels a press may travel and still count as a click.
const CLICK_SLOP: f64 = 3.0;
/// Screen pixels either side of an edge that still hit it.
pub const EDGE_HIT_WIDTH: f64 = 6.0;
pub const SELF_LOOP_RADIUS: f64 = 12.0;

/// Something under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
	Node(DefaultNodeIdx),
	Edge(usize),
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<Target>,
	pub selected: Option<Target>,
	pub width: f64,
	pub height: f64,
	options: GraphOptions,
	/// Position and radius of every node, refreshed after each step.
	positions: HashMap<DefaultNodeIdx, (f64, f64, f64)>,
}

fn simulation_parameters(options: &GraphOptions) -> SimulationParameters {
	let (force_charge, force_spring, force_max, node_speed, damping_factor) =
		match options.physics.solver {
			Solver::ForceAtlas2Based => (150.0, 0.05, 100.0, 3000.0, 0.9),
			Solver::BarnesHut => (250.0, 0.04, 140.0, 3000.0, 0.85),
			Solver::Repulsion => (400.0, 0.02, 200.0, 2500.0, 0.92),
		};
	SimulationParameters {
		force_charge,
		force_spring: if options.edges.physics {
			force_spring
		} else {
			0.0
		},
		force_max,
		node_speed,
		damping_factor,
	}
}

impl ForceGraphState {
	pub fn new(data: &RenderGraph, options: &GraphOptions, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(simulation_parameters(options));
		let mut id_to_idx = HashMap::new();
		let mut groups: HashMap<&str, usize> = HashMap::new();
		let mut degree: HashMap<&str, usize> = HashMap::new();

		for edge in &data.edges {
			if data.nodes.contains(&edge.from) && data.nodes.contains(&edge.to) {
				*degree.entry(edge.from.as_str()).or_default() += 1;
				*degree.entry(edge.to.as_str()).or_default() += 1;
			}
		}

		let count = data.nodes.len().max(1) as f64;
		let ring = (options.nodes.scaling.max * count / PI).max(100.0);
		for (i, node) in data.nodes.iter().enumerate() {
			let next = groups.len();
			let group = *groups.entry(node.group.as_str()).or_insert(next);
			let angle = (i as f64) * 2.0 * PI / count;

			let idx = graph.add_node(NodeData {
				x: (ring * angle.cos()) as f32,
				y: (ring * angle.sin()) as f32,
				mass: NODE_MASS,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: COLORS[group % COLORS.len()].into(),
					degree: degree.get(node.id.as_str()).copied().unwrap_or(0),
					radius: options.nodes.scaling.min,
				},
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		let mut edges = Vec::new();
		for edge in &data.edges {
			let (Some(&source), Some(&target)) =
				(id_to_idx.get(edge.from.as_str()), id_to_idx.get(edge.to.as_str()))
			else {
				warn!(
					"dropping edge {} ({} -> {}): unknown endpoint",
					edge.id, edge.from, edge.to
				);
				continue;
			};
			if source != target {
				graph.add_edge(source, target, EdgeData::default());
			}
			edges.push(EdgeInfo {
				id: edge.id.clone(),
				label: edge.label.clone(),
				source,
				target,
				directed: edge.arrows == Arrows::To,
			});
		}

		let mut state = Self {
			graph,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			selected: None,
			width,
			height,
			options: options.clone(),
			positions: HashMap::new(),
		};
		state.apply_scaling();
		state.sync_positions();
		state
	}

	pub fn options(&self) -> &GraphOptions {
		&self.options
	}

	/// Apply updated options at runtime. Physics changes rebuild the simulation
	/// in place, keeping every node where it currently is.
	pub fn set_options(&mut self, options: &GraphOptions) {
		if *options == self.options {
			return;
		}
		let rebuild = options.physics != self.options.physics
			|| options.edges.physics != self.options.edges.physics;
		let rescale = options.nodes.scaling != self.options.nodes.scaling;
		self.options = options.clone();
		if rebuild {
			self.rebuild_simulation();
		}
		if rescale {
			self.apply_scaling();
			self.sync_positions();
		}
	}

	pub fn physics_running(&self) -> bool {
		self.options.nodes.physics
	}

	fn rebuild_simulation(&mut self) {
		debug!(
			"rebuilding simulation (solver {:?}, springs {})",
			self.options.physics.solver, self.options.edges.physics
		);
		let mut nodes = Vec::new();
		self.graph.visit_nodes(|node| {
			nodes.push((
				node.index(),
				node.x(),
				node.y(),
				node.data.is_anchor,
				node.data.user_data.clone(),
			));
		});

		let mut graph = ForceGraph::new(simulation_parameters(&self.options));
		let mut remap = HashMap::new();
		for (old, x, y, is_anchor, user_data) in nodes {
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: NODE_MASS,
				is_anchor,
				user_data,
			});
			remap.insert(old, idx);
		}

		let remap_idx = |idx: DefaultNodeIdx| remap.get(&idx).copied().unwrap_or(idx);
		for edge in &mut self.edges {
			edge.source = remap_idx(edge.source);
			edge.target = remap_idx(edge.target);
			if edge.source != edge.target {
				graph.add_edge(edge.source, edge.target, EdgeData::default());
			}
		}
		let remap_target = |target: Option<Target>| match target {
			Some(Target::Node(idx)) => Some(Target::Node(remap_idx(idx))),
			other => other,
		};
		self.hover = remap_target(self.hover);
		self.selected = remap_target(self.selected);
		self.drag.node_idx = self.drag.node_idx.map(remap_idx);

		self.graph = graph;
		self.sync_positions();
	}

	/// Size nodes by degree within the configured radius bounds.
	fn apply_scaling(&mut self) {
		let (mut lo, mut hi) = (usize::MAX, 0);
		self.graph.visit_nodes(|node| {
			lo = lo.min(node.data.user_data.degree);
			hi = hi.max(node.data.user_data.degree);
		});
		let bounds = self.options.nodes.scaling;
		self.graph.visit_nodes_mut(|node| {
			let degree = node.data.user_data.degree as f64;
			node.data.user_data.radius = scale(degree, lo as f64, hi as f64, bounds);
		});
	}

	fn sync_positions(&mut self) {
		self.positions.clear();
		self.graph.visit_nodes(|node| {
			self.positions.insert(
				node.index(),
				(node.x() as f64, node.y() as f64, node.data.user_data.radius),
			);
		});
	}

	pub fn position(&self, idx: DefaultNodeIdx) -> Option<(f64, f64)> {
		self.positions.get(&idx).map(|&(x, y, _)| (x, y))
	}

	pub fn tick(&mut self, dt: f32) {
		if self.physics_running() {
			self.graph.update(dt);
		}
		self.sync_positions();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	#[cfg(test)]
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// Later nodes are drawn on top, so the last hit wins.
			if (dx * dx + dy * dy).sqrt() <= node.data.user_data.radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let tolerance = EDGE_HIT_WIDTH / self.transform.k;
		self.edges.iter().rposition(|edge| {
			let (Some((x1, y1)), Some((x2, y2))) =
				(self.position(edge.source), self.position(edge.target))
			else {
				return false;
			};
			if edge.source == edge.target {
				let (cx, cy) = self.self_loop_center(edge.source, x1, y1);
				let d = ((gx - cx).powi(2) + (gy - cy).powi(2)).sqrt();
				return (d - SELF_LOOP_RADIUS).abs() <= tolerance;
			}
			segment_distance(gx, gy, x1, y1, x2, y2) <= tolerance
		})
	}

	/// Centre of the loop drawn for an edge from a node to itself.
	pub fn self_loop_center(&self, idx: DefaultNodeIdx, x: f64, y: f64) -> (f64, f64) {
		(x, y - self.node_radius(idx) - SELF_LOOP_RADIUS * 0.5)
	}

	pub fn node_radius(&self, idx: DefaultNodeIdx) -> f64 {
		self.positions
			.get(&idx)
			.map_or(self.options.nodes.scaling.min, |&(_, _, r)| r)
	}

	pub fn target_at(&self, sx: f64, sy: f64) -> Option<Target> {
		self.node_at_position(sx, sy)
			.map(Target::Node)
			.or_else(|| self.edge_at_position(sx, sy).map(Target::Edge))
	}

	pub fn selection(&self) -> Option<Selection> {
		match self.selected? {
			Target::Node(idx) => {
				let mut id = None;
				self.graph.visit_nodes(|node| {
					if node.index() == idx {
						id = Some(node.data.user_data.id.clone());
					}
				});
				id.map(Selection::Node)
			}
			Target::Edge(i) => self.edges.get(i).map(|e| Selection::Edge(e.id.clone())),
		}
	}

	/// Selected or hovered nodes take the chosen style.
	pub fn is_chosen_node(&self, idx: DefaultNodeIdx) -> bool {
		let target = Some(Target::Node(idx));
		self.hover == target || self.selected == target
	}

	/// An edge is chosen when it is selected or hovered itself, or when it
	/// touches a chosen node.
	pub fn is_chosen_edge(&self, i: usize) -> bool {
		let target = Some(Target::Edge(i));
		if self.hover == target || self.selected == target {
			return true;
		}
		self.edges
			.get(i)
			.is_some_and(|e| self.is_chosen_node(e.source) || self.is_chosen_node(e.target))
	}

	/// Pointer pressed: grab the node under it, or start panning.
	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag = DragState {
				active: true,
				moved: false,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				..DragState::default()
			};
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					self.drag.node_start_x = node.x();
					self.drag.node_start_y = node.y();
				}
			});
		} else {
			self.pan = PanState {
				active: true,
				moved: false,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Pointer moved. Returns `true` exactly once per gesture, when a node
	/// drag actually starts.
	pub fn move_to(&mut self, x: f64, y: f64) -> bool {
		if self.drag.active {
			let started = !self.drag.moved && beyond_slop(self.drag.start_x, self.drag.start_y, x, y);
			if started {
				self.drag.moved = true;
			}
			if self.drag.moved {
				if let Some(idx) = self.drag.node_idx {
					let (dx, dy) = (
						(x - self.drag.start_x) / self.transform.k,
						(y - self.drag.start_y) / self.transform.k,
					);
					let (nx, ny) = (
						self.drag.node_start_x + dx as f32,
						self.drag.node_start_y + dy as f32,
					);
					self.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
					if let Some(pos) = self.positions.get_mut(&idx) {
						(pos.0, pos.1) = (nx as f64, ny as f64);
					}
				}
			}
			return started;
		}

		if self.pan.active {
			if !self.pan.moved && beyond_slop(self.pan.start_x, self.pan.start_y, x, y) {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else {
			self.hover = self.target_at(x, y);
		}
		false
	}

	/// Pointer released. A press that never moved is a click: it updates the
	/// selection, which is returned so the host can be told.
	pub fn release(&mut self, x: f64, y: f64) -> Option<Option<Selection>> {
		let click = (self.drag.active && !self.drag.moved) || (self.pan.active && !self.pan.moved);
		self.drag = DragState::default();
		self.pan = PanState::default();
		if !click {
			return None;
		}
		self.selected = self.target_at(x, y);
		Some(self.selection())
	}

	pub fn leave(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = None;
	}

	/// Zoom by one wheel step around the pointer.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		// horizontal-only wheel
		if delta_y == 0.0 {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}

fn beyond_slop(x0: f64, y0: f64, x: f64, y: f64) -> bool {
	(x - x0).hypot(y - y0) > CLICK_SLOP
}

fn segment_distance(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 > 0.0 {
		(((px - x1) * dx + (py - y1) * dy) / len2).clamp(0.0, 1.0)
	} else {
		0.0
	};
	(px - (x1 + t * dx)).hypot(py - (y1 + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::model::{RenderEdge, RenderNode};

	fn sample(edges: &[(&str, &str, &str)]) -> RenderGraph {
		let mut graph = RenderGraph::default();
		for (id, label) in [("a", "Person"), ("b", "City"), ("c", "Person")] {
			graph
				.nodes
				.add(RenderNode {
					id: id.into(),
					label: label.into(),
					group: label.into(),
					properties: Default::default(),
				})
				.unwrap();
		}
		for &(id, from, to) in edges {
			graph
				.edges
				.add(RenderEdge {
					id: id.into(),
					from: from.into(),
					to: to.into(),
					label: "REL".into(),
					group: "REL".into(),
					properties: Default::default(),
					arrows: Arrows::To,
				})
				.unwrap();
		}
		graph
	}

	fn state(edges: &[(&str, &str, &str)]) -> ForceGraphState {
		ForceGraphState::new(&sample(edges), &GraphOptions::default(), 800.0, 600.0)
	}

	fn idx_of(state: &ForceGraphState, id: &str) -> DefaultNodeIdx {
		let mut found = None;
		state.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				found = Some(node.index());
			}
		});
		found.unwrap()
	}

	fn screen_pos(state: &ForceGraphState, id: &str) -> (f64, f64) {
		let (gx, gy) = state.position(idx_of(state, id)).unwrap();
		state.graph_to_screen(gx, gy)
	}

	fn info(state: &ForceGraphState, id: &str) -> NodeInfo {
		let mut found = None;
		state.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				found = Some(node.data.user_data.clone());
			}
		});
		found.unwrap()
	}

	#[test]
	fn empty_graph_is_accepted() {
		let mut s = ForceGraphState::new(
			&RenderGraph::default(),
			&GraphOptions::default(),
			800.0,
			600.0,
		);
		s.tick(0.016);
		assert!(s.edges.is_empty());
		assert!(s.target_at(400.0, 300.0).is_none());
	}

	#[test]
	fn dangling_edges_are_dropped() {
		let s = state(&[("e1", "a", "b"), ("e2", "a", "ghost")]);
		let ids: Vec<_> = s.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, ["e1"]);
		assert!(s.edges[0].directed);
	}

	#[test]
	fn groups_share_colors_in_order_of_appearance() {
		let s = state(&[]);
		assert_eq!(info(&s, "a").color, COLORS[0]);
		assert_eq!(info(&s, "b").color, COLORS[1]);
		assert_eq!(info(&s, "c").color, COLORS[0]);
	}

	#[test]
	fn radius_scales_with_degree() {
		let s = state(&[("e1", "a", "b"), ("e2", "a", "c")]);
		assert_eq!(info(&s, "a").degree, 2);
		assert_eq!(info(&s, "a").radius, 20.0);
		assert_eq!(info(&s, "b").radius, 10.0);

		let flat = state(&[]);
		assert_eq!(info(&flat, "a").radius, 15.0);
	}

	#[test]
	fn simulation_moves_nodes_until_frozen() {
		let mut s = state(&[("e1", "a", "b"), ("e2", "b", "c")]);
		let before = s.position(idx_of(&s, "a")).unwrap();
		for _ in 0..10 {
			s.tick(0.016);
		}
		assert_ne!(s.position(idx_of(&s, "a")).unwrap(), before);

		let mut frozen = s.options().clone();
		frozen.freeze();
		s.set_options(&frozen);
		assert!(!s.physics_running());

		let held = s.position(idx_of(&s, "a")).unwrap();
		for _ in 0..10 {
			s.tick(0.016);
		}
		assert_eq!(s.position(idx_of(&s, "a")).unwrap(), held);
	}

	#[test]
	fn rebuild_keeps_positions_and_edges() {
		let mut s = state(&[("e1", "a", "b")]);
		let before = s.position(idx_of(&s, "b")).unwrap();

		let mut opts = s.options().clone();
		opts.physics.solver = Solver::Repulsion;
		opts.edges.physics = false;
		s.set_options(&opts);

		assert_eq!(s.position(idx_of(&s, "b")).unwrap(), before);
		assert_eq!(s.edges.len(), 1);
		assert_eq!(s.edges[0].source, idx_of(&s, "a"));
		assert_eq!(s.edges[0].target, idx_of(&s, "b"));
	}

	#[test]
	fn drag_event_fires_once_and_moves_node() {
		let mut s = state(&[]);
		let (x, y) = screen_pos(&s, "a");
		let (gx, gy) = s.position(idx_of(&s, "a")).unwrap();

		s.press(x, y);
		assert!(!s.move_to(x + 1.0, y));
		assert!(s.move_to(x + 20.0, y + 10.0));
		assert!(!s.move_to(x + 30.0, y + 10.0));

		let (nx, ny) = s.position(idx_of(&s, "a")).unwrap();
		assert!((nx - (gx + 30.0)).abs() < 1e-3);
		assert!((ny - (gy + 10.0)).abs() < 1e-3);
		assert_eq!(s.release(x + 30.0, y + 10.0), None);
		assert!(s.selected.is_none());
	}

	#[test]
	fn click_selects_node_edge_and_clears_on_background() {
		let mut s = state(&[("e1", "a", "b")]);
		let (x, y) = screen_pos(&s, "a");
		s.press(x, y);
		assert_eq!(s.release(x, y), Some(Some(Selection::Node("a".into()))));
		assert!(s.is_chosen_node(idx_of(&s, "a")));
		assert!(s.is_chosen_edge(0));

		let (bx, by) = screen_pos(&s, "b");
		let (mx, my) = ((x + bx) / 2.0, (y + by) / 2.0);
		s.press(mx, my);
		assert_eq!(s.release(mx, my), Some(Some(Selection::Edge("e1".into()))));

		s.press(5000.0, 5000.0);
		assert_eq!(s.release(5000.0, 5000.0), Some(None));
		assert!(!s.is_chosen_edge(0));
	}

	#[test]
	fn panning_is_not_a_click() {
		let mut s = state(&[]);
		s.press(5000.0, 5000.0);
		s.move_to(5040.0, 5000.0);
		assert_eq!(s.transform.x, 440.0);
		assert_eq!(s.release(5040.0, 5000.0), None);
	}

	#[test]
	fn hover_marks_node_chosen() {
		let mut s = state(&[]);
		let (x, y) = screen_pos(&s, "c");
		s.move_to(x, y);
		assert!(s.is_chosen_node(idx_of(&s, "c")));
		s.leave();
		assert!(!s.is_chosen_node(idx_of(&s, "c")));
	}

	#[test]
	fn zoom_keeps_pointer_fixed() {
		let mut s = state(&[]);
		let before = s.screen_to_graph(100.0, 50.0);
		s.zoom_at(100.0, 50.0, -1.0);
		let after = s.screen_to_graph(100.0, 50.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
		assert!(s.transform.k > 1.0);
	}

	#[test]
	fn sideways_scroll_leaves_zoom_alone() {
		let mut s = state(&[]);
		s.zoom_at(100.0, 50.0, 1.0);
		let (x, y, k) = (s.transform.x, s.transform.y, s.transform.k);
		s.zoom_at(300.0, 200.0, 0.0);
		assert_eq!((s.transform.x, s.transform.y, s.transform.k), (x, y, k));
	}

	#[test]
	fn point_to_segment_distance() {
		let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
		assert!(close(segment_distance(5.0, 3.0, 0.0, 0.0, 10.0, 0.0), 3.0));
		assert!(close(segment_distance(-4.0, 3.0, 0.0, 0.0, 10.0, 0.0), 5.0));
		assert!(close(segment_distance(1.0, 1.0, 0.0, 0.0, 0.0, 0.0), 2f64.sqrt()));
	}
}
