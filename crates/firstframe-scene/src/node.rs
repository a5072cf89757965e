use crate::geometry::Rect;
use crate::method::{MethodCall, MethodCallKind};
use crate::prop::{CallbackRef, PropValue, Props};
use crate::shadow::SceneShadow;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Process-unique view identity, stable across a cache save/restore cycle.
pub type Tag = i64;

/// Tag of the host root view that every page mounts into.
pub const ROOT_TAG: Tag = -1;

/// Live layout handle attached by the host render layer. Memory-only: the
/// codec drops it on encode and `deep_copy` does not carry it over.
#[derive(Clone)]
pub struct LiveShadowHandle(pub Arc<dyn Any + Send + Sync>);

impl fmt::Debug for LiveShadowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LiveShadowHandle")
    }
}

/// One element of the recorded scene tree: a native view's identity, type,
/// props, frame, layout shadow, children, and pending method calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneNode {
    pub tag: Tag,
    pub view_name: String,
    /// Back-reference to the owning parent. Relation only, never ownership;
    /// `None` is valid only at the root of a tree.
    pub parent_tag: Option<Tag>,
    pub children: Vec<SceneNode>,
    props: Props,
    call_methods: Vec<MethodCall>,
    /// Computed layout rectangle. Carried separately from props and always
    /// re-emitted by the patch pass, never diffed against a prior value.
    pub frame: Option<Rect>,
    shadow: Option<SceneShadow>,
    view_methods_disabled: bool,
    #[serde(skip)]
    pub render_shadow: Option<LiveShadowHandle>,
}

impl SceneNode {
    pub fn new(tag: Tag, view_name: impl Into<String>) -> Self {
        Self {
            tag,
            view_name: view_name.into(),
            parent_tag: None,
            children: Vec::new(),
            props: Props::new(),
            call_methods: Vec::new(),
            frame: None,
            shadow: None,
            view_methods_disabled: false,
            render_shadow: None,
        }
    }

    /// Sets a prop, overwriting value and type in place when the key already
    /// exists. Props are never removed individually.
    pub fn set_prop(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.props.insert(key.into(), value.into());
    }

    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = Some(frame);
    }

    pub fn set_shadow(&mut self, shadow: SceneShadow) {
        self.shadow = Some(shadow);
    }

    pub fn shadow(&self) -> Option<&SceneShadow> {
        self.shadow.as_ref()
    }

    pub fn shadow_mut(&mut self) -> Option<&mut SceneShadow> {
        self.shadow.as_mut()
    }

    pub fn take_shadow(&mut self) -> Option<SceneShadow> {
        self.shadow.take()
    }

    /// Stops recording further view method calls on this node. Module calls
    /// keep recording; they are not tied to the view lifecycle.
    pub fn set_view_methods_disabled(&mut self, disabled: bool) {
        self.view_methods_disabled = disabled;
    }

    pub fn add_view_method(
        &mut self,
        method: impl Into<String>,
        params: Option<String>,
        callback: Option<CallbackRef>,
    ) {
        if self.view_methods_disabled {
            return;
        }
        self.call_methods.push(MethodCall::view(
            self.view_name.clone(),
            method,
            params,
            callback,
        ));
    }

    pub fn add_module_method(
        &mut self,
        module: impl Into<String>,
        method: impl Into<String>,
        params: Option<String>,
        callback: Option<CallbackRef>,
    ) {
        self.call_methods
            .push(MethodCall::module(module, method, params, callback));
    }

    pub fn call_methods(&self) -> &[MethodCall] {
        &self.call_methods
    }

    pub fn clear_call_methods(&mut self) {
        self.call_methods.clear();
    }

    /// Inserts `child` at `index` (clamped to the current child count) and
    /// fixes up its parent back-reference.
    pub fn insert_child(&mut self, mut child: SceneNode, index: usize) {
        child.parent_tag = Some(self.tag);
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    pub fn add_child(&mut self, child: SceneNode) {
        let index = self.children.len();
        self.insert_child(child, index);
    }

    /// Unlinks the child with `tag` and returns the detached subtree. The
    /// subtree keeps its internal structure; only the top link is severed.
    pub fn remove_child(&mut self, tag: Tag) -> Option<SceneNode> {
        let index = self.children.iter().position(|c| c.tag == tag)?;
        let mut child = self.children.remove(index);
        child.parent_tag = None;
        Some(child)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first lookup by tag, including `self`.
    pub fn find(&self, tag: Tag) -> Option<&SceneNode> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(tag))
    }

    pub fn count_nodes(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count_nodes).sum::<usize>()
    }

    /// Produces a fully independent tree sharing no ownership with `self`,
    /// safe to hand to another thread. Callback refs stay shared tokens (they
    /// are identity handles, not state); the live render shadow handle is
    /// dropped.
    pub fn deep_copy(&self) -> Self {
        Self {
            tag: self.tag,
            view_name: self.view_name.clone(),
            parent_tag: self.parent_tag,
            children: self.children.iter().map(SceneNode::deep_copy).collect(),
            props: self.props.clone(),
            call_methods: self.call_methods.clone(),
            frame: self.frame,
            shadow: self.shadow.as_ref().map(SceneShadow::deep_copy),
            view_methods_disabled: self.view_methods_disabled,
            render_shadow: None,
        }
    }

    /// Iterates the node's method calls of one kind.
    pub fn call_methods_of(&self, kind: MethodCallKind) -> impl Iterator<Item = &MethodCall> {
        self.call_methods.iter().filter(move |m| m.kind == kind)
    }
}

/// Structural equality. The live render shadow handle is transient state and
/// is deliberately left out of the comparison.
impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.view_name == other.view_name
            && self.parent_tag == other.parent_tag
            && self.frame == other.frame
            && self.props == other.props
            && self.call_methods == other.call_methods
            && self.shadow == other.shadow
            && self.view_methods_disabled == other.view_methods_disabled
            && self.children == other.children
    }
}
