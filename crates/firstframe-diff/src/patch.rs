use ahash::AHashMap;
use firstframe_scene::{MethodCallKind, SceneNode, SceneShadow, Tag};
use log::debug;

use crate::cancel::CancelToken;
use crate::layer::{RenderError, RenderLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Completed,
    /// The pass was abandoned cooperatively; commands emitted so far stand,
    /// nothing further was sent.
    Cancelled,
}

/// Tree reconciliation over a [`RenderLayer`] sink.
///
/// Two modes: [`patch_to_layer`](DiffPatch::patch_to_layer) computes and
/// applies the command delta between an optional old tree and a new one;
/// [`refresh_from`](DiffPatch::refresh_from) copies changed props into an
/// existing tree without touching its structure or identity.
///
/// Ordering guarantees, per parent and per pass:
/// - creation is parent-before-child: a node is created and inserted before
///   any of its children are inserted into it;
/// - removal is child-before-parent;
/// - removals are emitted before insertions, so `insert_child(_, _, index)`
///   indices are final positions. A reposition of a surviving child is
///   expressed as `insert_child` of the already-attached child at its new
///   index.
pub struct DiffPatch;

impl DiffPatch {
    /// Diffs `old` against `new` and applies the delta through `layer`.
    ///
    /// An absent `old` is the expected no-prior-cache input and degenerates
    /// into a pure create walk. The pass itself cannot fail for well-formed
    /// trees; any error comes from the sink and is propagated unchanged.
    pub fn patch_to_layer(
        layer: &mut dyn RenderLayer,
        old: Option<&SceneNode>,
        new: &SceneNode,
        cancel: &CancelToken,
    ) -> Result<PatchOutcome, RenderError> {
        debug_assert_well_formed(new);
        if let Some(old_tree) = old {
            debug_assert_well_formed(old_tree);
        }

        debug!(
            "patch pass: old {:?} nodes, new {} nodes",
            old.map(SceneNode::count_nodes),
            new.count_nodes()
        );

        match old {
            None => Self::create_subtree(layer, new, None, 0, cancel),
            Some(old_tree) if old_tree.tag == new.tag && old_tree.view_name == new.view_name => {
                Self::diff_node(layer, old_tree, new, cancel)
            }
            Some(old_tree) => {
                // Same slot, different identity or type: never patched in place.
                Self::remove_subtree(layer, old_tree)?;
                Self::create_subtree(layer, new, None, 0, cancel)
            }
        }
    }

    /// Copies changed props (and frames, and shadow props) from `from` into
    /// `target`, walking both trees by position. Structure and node identity
    /// of `target` are preserved. Returns whether anything changed, so a
    /// caller can skip a redundant re-render.
    ///
    /// Method-call logs are left alone: they are side effects owned by the
    /// pass that recorded them, not state to sync.
    pub fn refresh_from(target: &mut SceneNode, from: &SceneNode) -> bool {
        let mut changed = false;

        for (key, value) in from.props() {
            if target.prop(key) != Some(value) {
                target.set_prop(key.clone(), value.clone());
                changed = true;
            }
        }

        // Frames copy over only when the source carries one; a source that
        // has not been laid out yet must not clobber the target's frame.
        if from.frame.is_some() && target.frame != from.frame {
            target.frame = from.frame;
            changed = true;
        }

        if let Some(from_shadow) = from.shadow() {
            if target.shadow().is_none() {
                target.set_shadow(from_shadow.deep_copy());
                changed = true;
            } else if let Some(target_shadow) = target.shadow_mut() {
                for (key, value) in from_shadow.props() {
                    if target_shadow.prop(key) != Some(value) {
                        target_shadow.set_prop(key.clone(), value.clone());
                        changed = true;
                    }
                }
            }
        }

        let pairs = target.children.len().min(from.children.len());
        for i in 0..pairs {
            if Self::refresh_from(&mut target.children[i], &from.children[i]) {
                changed = true;
            }
        }
        changed
    }

    /// Emits a full creation walk for `node`: create, insert (when it has a
    /// parent), props, frame, shadow, children in order, then method replay.
    fn create_subtree(
        layer: &mut dyn RenderLayer,
        node: &SceneNode,
        parent: Option<Tag>,
        index: usize,
        cancel: &CancelToken,
    ) -> Result<PatchOutcome, RenderError> {
        layer.create_view(node.tag, &node.view_name)?;
        if let Some(parent_tag) = parent {
            layer.insert_child(parent_tag, node.tag, index)?;
        }
        for (key, value) in node.props() {
            layer.set_prop(node.tag, key, value)?;
        }
        if let Some(frame) = node.frame {
            layer.set_frame(node.tag, frame)?;
        }
        if let Some(shadow) = node.shadow() {
            Self::create_shadow(layer, shadow)?;
        }
        for (i, child) in node.children.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(PatchOutcome::Cancelled);
            }
            if let PatchOutcome::Cancelled =
                Self::create_subtree(layer, child, Some(node.tag), i, cancel)?
            {
                return Ok(PatchOutcome::Cancelled);
            }
        }
        Self::replay_methods(layer, node)?;
        Ok(PatchOutcome::Completed)
    }

    /// Removes a subtree, children before parent. Removal is not subject to
    /// cancellation: a half-removed subtree would leave the sink dangling.
    /// Removing a view implies its shadow; no separate `remove_shadow` here.
    fn remove_subtree(
        layer: &mut dyn RenderLayer,
        node: &SceneNode,
    ) -> Result<(), RenderError> {
        for child in &node.children {
            Self::remove_subtree(layer, child)?;
        }
        layer.remove_view(node.tag)
    }

    fn diff_node(
        layer: &mut dyn RenderLayer,
        old: &SceneNode,
        new: &SceneNode,
        cancel: &CancelToken,
    ) -> Result<PatchOutcome, RenderError> {
        for (key, value) in new.props() {
            if old.prop(key) != Some(value) {
                layer.set_prop(new.tag, key, value)?;
            }
        }

        // Layout always recomputes, so frames are re-emitted, not diffed.
        if let Some(frame) = new.frame {
            layer.set_frame(new.tag, frame)?;
        }

        match (old.shadow(), new.shadow()) {
            (None, Some(new_shadow)) => Self::create_shadow(layer, new_shadow)?,
            (Some(_), None) => layer.remove_shadow(new.tag)?,
            (Some(old_shadow), Some(new_shadow)) => {
                if old_shadow.view_name != new_shadow.view_name {
                    layer.remove_shadow(new.tag)?;
                    Self::create_shadow(layer, new_shadow)?;
                } else {
                    for (key, value) in new_shadow.props() {
                        if old_shadow.prop(key) != Some(value) {
                            layer.set_shadow_prop(new.tag, key, value)?;
                        }
                    }
                }
            }
            (None, None) => {}
        }

        if let PatchOutcome::Cancelled = Self::diff_children(layer, old, new, cancel)? {
            return Ok(PatchOutcome::Cancelled);
        }
        Self::replay_methods(layer, new)?;
        Ok(PatchOutcome::Completed)
    }

    fn diff_children(
        layer: &mut dyn RenderLayer,
        old: &SceneNode,
        new: &SceneNode,
        cancel: &CancelToken,
    ) -> Result<PatchOutcome, RenderError> {
        if !old.has_children() && !new.has_children() {
            return Ok(PatchOutcome::Completed);
        }

        let old_by_tag: AHashMap<Tag, &SceneNode> =
            old.children.iter().map(|c| (c.tag, c)).collect();
        let new_by_tag: AHashMap<Tag, &SceneNode> =
            new.children.iter().map(|c| (c.tag, c)).collect();

        // Removals first, so every insert index below is a final position.
        // A tag match with a different view type counts as removed here and
        // recreated below.
        let mut order: Vec<Tag> = Vec::with_capacity(old.children.len());
        for old_child in &old.children {
            match new_by_tag.get(&old_child.tag) {
                Some(new_child) if new_child.view_name == old_child.view_name => {
                    order.push(old_child.tag);
                }
                _ => Self::remove_subtree(layer, old_child)?,
            }
        }

        // `order` mirrors the sink's child list; walking the new children in
        // order and splicing it tells us exactly which survivors shifted.
        for (index, new_child) in new.children.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(PatchOutcome::Cancelled);
            }
            let matched = old_by_tag
                .get(&new_child.tag)
                .copied()
                .filter(|old_child| old_child.view_name == new_child.view_name);
            match matched {
                Some(old_child) => {
                    if let Some(pos) = order.iter().position(|t| *t == new_child.tag) {
                        if pos != index {
                            order.remove(pos);
                            let index = index.min(order.len());
                            order.insert(index, new_child.tag);
                            layer.insert_child(new.tag, new_child.tag, index)?;
                        }
                    }
                    if let PatchOutcome::Cancelled =
                        Self::diff_node(layer, old_child, new_child, cancel)?
                    {
                        return Ok(PatchOutcome::Cancelled);
                    }
                }
                None => {
                    let index = index.min(order.len());
                    order.insert(index, new_child.tag);
                    if let PatchOutcome::Cancelled =
                        Self::create_subtree(layer, new_child, Some(new.tag), index, cancel)?
                    {
                        return Ok(PatchOutcome::Cancelled);
                    }
                }
            }
        }
        Ok(PatchOutcome::Completed)
    }

    fn create_shadow(
        layer: &mut dyn RenderLayer,
        shadow: &SceneShadow,
    ) -> Result<(), RenderError> {
        layer.create_shadow(shadow.tag, &shadow.view_name)?;
        for (key, value) in shadow.props() {
            layer.set_shadow_prop(shadow.tag, key, value)?;
        }
        Ok(())
    }

    /// Forward-only replay: every pending call on the new tree goes out,
    /// regardless of old-tree state.
    fn replay_methods(layer: &mut dyn RenderLayer, node: &SceneNode) -> Result<(), RenderError> {
        for call in node.call_methods() {
            match call.kind {
                MethodCallKind::View => layer.call_view_method(
                    node.tag,
                    &call.method,
                    call.params.as_deref(),
                    call.callback.as_ref(),
                )?,
                MethodCallKind::Module => layer.call_module_method(
                    &call.target,
                    &call.method,
                    call.params.as_deref(),
                    call.callback.as_ref(),
                )?,
            }
        }
        Ok(())
    }
}

/// Duplicate tags or broken parent links break by-tag matching; that is a
/// programmer error, caught here in debug builds rather than tolerated.
fn debug_assert_well_formed(tree: &SceneNode) {
    if cfg!(debug_assertions) {
        let mut seen: AHashMap<Tag, ()> = AHashMap::new();
        check_node(tree, None, &mut seen);
    }

    fn check_node(node: &SceneNode, parent: Option<Tag>, seen: &mut AHashMap<Tag, ()>) {
        debug_assert!(
            seen.insert(node.tag, ()).is_none(),
            "duplicate tag {} in scene tree",
            node.tag
        );
        if let Some(parent_tag) = parent {
            debug_assert_eq!(
                node.parent_tag,
                Some(parent_tag),
                "node {} has a stale parent link",
                node.tag
            );
        }
        for child in &node.children {
            check_node(child, Some(node.tag), seen);
        }
    }
}
