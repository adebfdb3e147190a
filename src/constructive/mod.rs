//! First-solution strategies for pickup and delivery.
//!
//! - [`path_cheapest_arc`] — Extend each vehicle's path by its cheapest
//!   feasible next arc, then place leftovers by cheapest insertion
//! - [`cheapest_insertion`] — Global cheapest pair insertion, O(S² L²)
//!
//! Both keep every route feasible at every step and leave shipments that
//! fit nowhere unassigned.

mod cheapest_insertion;
mod path_cheapest_arc;

pub use cheapest_insertion::cheapest_insertion;
pub use path_cheapest_arc::path_cheapest_arc;
