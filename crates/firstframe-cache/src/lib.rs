//! Persistent, single-use scene cache for the firstframe fast path.
//!
//! A page stores its recorded [`SceneNode`](firstframe_scene::SceneNode) tree
//! under a deterministic key on teardown; the next launch takes it back,
//! replays it, and lets the diff engine reconcile once the logic runtime has
//! produced the authoritative tree. Reads are destructive so a corrupt entry
//! poisons at most one launch.

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::{CacheError, SceneCache};
