use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, SELF_LOOP_RADIUS};

const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: &str = "rgba(100, 180, 255, 0.6)";
const LABEL_COLOR: &str = "rgba(255, 255, 255, 0.85)";
const EDGE_LABEL_COLOR: &str = "rgba(200, 220, 255, 0.7)";

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let opts = &state.options().edges;
	let k = state.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));

	for (i, edge) in state.edges.iter().enumerate() {
		let (Some((x1, y1)), Some((x2, y2))) =
			(state.position(edge.source), state.position(edge.target))
		else {
			continue;
		};
		let chosen = state.is_chosen_edge(i);
		let color = if chosen {
			opts.chosen.color.as_str()
		} else {
			EDGE_COLOR
		};
		let width = if chosen {
			opts.scaling.max
		} else {
			opts.scaling.min
		};
		ctx.set_stroke_style_str(color);
		ctx.set_fill_style_str(color);
		ctx.set_line_width(width);

		if edge.source == edge.target {
			let (cx, cy) = state.self_loop_center(edge.source, x1, y1);
			ctx.begin_path();
			let _ = ctx.arc(cx, cy, SELF_LOOP_RADIUS, 0.0, 2.0 * PI);
			ctx.stroke();
			draw_edge_label(ctx, &edge.label, cx, cy - SELF_LOOP_RADIUS - 2.0);
			continue;
		}

		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let (r1, r2) = (
			state.node_radius(edge.source),
			state.node_radius(edge.target),
		);
		let arrow_size = 4.0 + 3.0 * width;
		let head = if edge.directed { arrow_size } else { 0.0 };

		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + head), y2 - uy * (r2 + head));
		ctx.stroke();

		if edge.directed {
			let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		draw_edge_label(ctx, &edge.label, (x1 + x2) / 2.0, (y1 + y2) / 2.0);
	}
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, label: &str, x: f64, y: f64) {
	if label.is_empty() {
		return;
	}
	ctx.set_fill_style_str(EDGE_LABEL_COLOR);
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, x, y - 3.0);
	ctx.set_text_align("start");
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let chosen = &state.options().nodes.chosen;
	let k = state.transform.k;

	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_chosen = state.is_chosen_node(node.index());

		if is_chosen && chosen.shadow {
			ctx.set_shadow_color("rgba(0, 0, 0, 0.6)");
			ctx.set_shadow_blur(10.0);
			ctx.set_shadow_offset_x(5.0);
			ctx.set_shadow_offset_y(5.0);
		}
		ctx.begin_path();
		let _ = ctx.arc(x, y, info.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if is_chosen {
			chosen.color.as_str()
		} else {
			info.color.as_str()
		});
		ctx.fill();
		ctx.set_shadow_color("transparent");
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_offset_x(0.0);
		ctx.set_shadow_offset_y(0.0);

		if is_chosen {
			ctx.set_stroke_style_str(&info.color);
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}

		if !info.label.is_empty() {
			ctx.set_fill_style_str(LABEL_COLOR);
			ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&info.label, x, y + info.radius + 12.0);
			ctx.set_text_align("start");
		}
	});
}
