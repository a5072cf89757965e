use firstframe_scene::{CallbackRef, PropValue, Rect, Tag};
use std::fmt;

/// Failure reported by a render sink. The engine propagates these unchanged
/// and never retries; recovery is the sink's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    UnknownTag { tag: Tag },
    Rejected { tag: Tag, reason: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { tag } => write!(f, "render layer knows no view with tag {tag}"),
            Self::Rejected { tag, reason } => {
                write!(f, "render layer rejected command for tag {tag}: {reason}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// The native rendering capability the patch pass drives.
///
/// Implemented by the host-side view layer; out of scope here beyond the
/// contract that `insert_child` with an already-attached child repositions it
/// at the given index, and that removing a view tears down its shadow too.
pub trait RenderLayer {
    fn create_view(&mut self, tag: Tag, view_name: &str) -> Result<(), RenderError>;
    fn remove_view(&mut self, tag: Tag) -> Result<(), RenderError>;
    fn insert_child(
        &mut self,
        parent_tag: Tag,
        child_tag: Tag,
        index: usize,
    ) -> Result<(), RenderError>;
    fn set_prop(&mut self, tag: Tag, key: &str, value: &PropValue) -> Result<(), RenderError>;
    fn set_frame(&mut self, tag: Tag, frame: Rect) -> Result<(), RenderError>;
    fn create_shadow(&mut self, tag: Tag, view_name: &str) -> Result<(), RenderError>;
    fn remove_shadow(&mut self, tag: Tag) -> Result<(), RenderError>;
    fn set_shadow_prop(
        &mut self,
        tag: Tag,
        key: &str,
        value: &PropValue,
    ) -> Result<(), RenderError>;
    fn call_view_method(
        &mut self,
        tag: Tag,
        method: &str,
        params: Option<&str>,
        callback: Option<&CallbackRef>,
    ) -> Result<(), RenderError>;
    fn call_module_method(
        &mut self,
        module: &str,
        method: &str,
        params: Option<&str>,
        callback: Option<&CallbackRef>,
    ) -> Result<(), RenderError>;
}
