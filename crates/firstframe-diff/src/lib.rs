//! Diff/patch engine for the firstframe first-screen fast path.
//!
//! Reconciles a previously cached [`SceneNode`](firstframe_scene::SceneNode)
//! tree against a freshly computed one and emits the minimal ordered command
//! sequence to a [`RenderLayer`] sink. The computation is pure apart from the
//! sink emissions, so it can run off the main thread; the sink is responsible
//! for marshaling onto whichever thread actually mutates views.

pub mod cancel;
pub mod layer;
pub mod patch;

pub use cancel::CancelToken;
pub use layer::{RenderError, RenderLayer};
pub use patch::{DiffPatch, PatchOutcome};
