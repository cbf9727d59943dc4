//! Value-to-size mapping for nodes and edges.

use super::options::Scaling;

/// Map `value` from `[lo, hi]` onto the `bounds` range. A degenerate input range
/// lands on the midpoint.
pub fn scale(value: f64, lo: f64, hi: f64, bounds: Scaling) -> f64 {
	let t = if hi > lo {
		((value - lo) / (hi - lo)).clamp(0.0, 1.0)
	} else {
		0.5
	};
	bounds.min + t * (bounds.max - bounds.min)
}
