//! Serializable scene tree for the firstframe first-screen fast path.
//!
//! A [`SceneNode`] tree records every rendering instruction a page issued
//! (view creation, props, frames, layout shadows, pending method calls) in a
//! form that can be written to disk and replayed on the next launch before
//! the logic runtime has booted.

pub mod codec;
pub mod geometry;
pub mod method;
pub mod node;
pub mod prop;
pub mod shadow;

pub use codec::{decode, encode, CodecError};
pub use geometry::{Rect, Size};
pub use method::{MethodCall, MethodCallKind};
pub use node::{LiveShadowHandle, SceneNode, Tag, ROOT_TAG};
pub use prop::{CallbackRef, PropKind, PropValue, Props};
pub use shadow::{Measurer, SceneShadow};
