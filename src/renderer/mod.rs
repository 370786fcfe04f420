//! Rendering module
//!
//! The simulation is turned into a [`DrawList`] of flat 2D primitives; in the
//! browser that list is painted onto a `CanvasRenderingContext2d`.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

pub use shapes::{DrawList, Primitive, demo_draw_list, level_draw_list};
