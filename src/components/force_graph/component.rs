use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::options::GraphOptions;
use super::render;
use super::state::ForceGraphState;
use super::types::Selection;
use crate::graph::RenderGraph;

type Slot<T> = Rc<RefCell<Option<T>>>;

/// Canvas size follows the container, which is sized by the options.
fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Empty the loop's slots. The animation closure holds a handle to its own
/// slot, so taking it out is what lets the loop be freed.
fn release<S, A>(state: &Slot<S>, animate: &Slot<A>) {
	state.borrow_mut().take();
	drop(animate.borrow_mut().take());
}

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Interactive force-directed view of a [`RenderGraph`].
///
/// `options` may change at runtime and is applied to the live simulation.
/// `on_drag` fires once when the user starts dragging a node; `on_select`
/// fires on every click with the element under the pointer, or `None` for
/// the background.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<RenderGraph>,
	#[prop(into)] options: Signal<GraphOptions>,
	#[prop(into, default = "graph".into())] container_id: String,
	#[prop(optional)] on_drag: Option<Callback<()>>,
	#[prop(optional)] on_select: Option<Callback<Option<Selection>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Slot<ForceGraphState> = Rc::new(RefCell::new(None));
	let animate: Slot<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Slot<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	// on_cleanup only takes Send + Sync closures, so no Rc<Cell<bool>> here.
	let alive = Arc::new(AtomicBool::new(true));
	let (state_init, animate_init, resize_cb_init, alive_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), alive.clone());

	on_cleanup(move || alive.store(false, Ordering::Relaxed));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("graph canvas has no 2d context");
			return;
		};
		let graph = data.get();
		debug!(
			"renderer: {} nodes, {} edges, {}x{}",
			graph.nodes.len(),
			graph.edges.len(),
			w,
			h
		);
		*state_init.borrow_mut() = Some(ForceGraphState::new(
			&graph,
			&options.get_untracked(),
			w,
			h,
		));

		// New data only replaces the state; the loops below are set up once.
		if animate_init.borrow().is_some() {
			return;
		}

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(s) = state_resize.borrow_mut().as_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(cb) = resize_cb_init.borrow().as_ref() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, resize_anim, alive_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			alive_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			if !alive_anim.load(Ordering::Relaxed) {
				if let Some(cb) = resize_anim.borrow_mut().take() {
					let _ = window
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				// wasm-bindgen frees a running closure once it returns.
				release(&state_anim, &animate_inner);
				debug!("renderer torn down");
				return;
			}
			if let Some(s) = state_anim.borrow_mut().as_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let Some(cb) = animate_inner.borrow().as_ref() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(cb) = animate_init.borrow().as_ref() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_opts = state.clone();
	Effect::new(move |_| {
		let opts = options.get();
		if let Some(s) = state_opts.borrow_mut().as_mut() {
			s.set_options(&opts);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_ref.get().map(|c| pointer(&c, &ev)) else {
			return;
		};
		if let Some(s) = state_md.borrow_mut().as_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_ref.get().map(|c| pointer(&c, &ev)) else {
			return;
		};
		let drag_started = state_mm
			.borrow_mut()
			.as_mut()
			.is_some_and(|s| s.move_to(x, y));
		if drag_started {
			debug!("drag started");
			if let Some(cb) = on_drag {
				cb.run(());
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_ref.get().map(|c| pointer(&c, &ev)) else {
			return;
		};
		let clicked = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.release(x, y));
		if let (Some(selection), Some(cb)) = (clicked, on_select) {
			cb.run(selection);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_ml.borrow_mut().as_mut() {
			s.leave();
		}
	};

	let state_wh = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_ref.get().map(|c| pointer(&c, &ev)) else {
			return;
		};
		if let Some(s) = state_wh.borrow_mut().as_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	let container_style = move || {
		options.with(|o| {
			format!(
				"position: relative; width: {}; height: {};",
				o.width, o.height
			)
		})
	};

	view! {
		<div id=container_id class="graph-container" style=container_style>
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}
