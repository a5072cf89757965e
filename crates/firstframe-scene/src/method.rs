use crate::prop::CallbackRef;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodCallKind {
    View,
    Module,
}

/// A side-effecting instruction queued on a node.
///
/// Method calls form an append-only log: they are replayed once per patch
/// pass and never compared against old-tree state, so two passes over the
/// same tree replay the same calls twice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub kind: MethodCallKind,
    /// View name for view calls, module name for module calls.
    pub target: String,
    pub method: String,
    pub params: Option<String>,
    pub callback: Option<CallbackRef>,
}

impl MethodCall {
    pub fn view(
        target: impl Into<String>,
        method: impl Into<String>,
        params: Option<String>,
        callback: Option<CallbackRef>,
    ) -> Self {
        Self {
            kind: MethodCallKind::View,
            target: target.into(),
            method: method.into(),
            params,
            callback,
        }
    }

    pub fn module(
        module: impl Into<String>,
        method: impl Into<String>,
        params: Option<String>,
        callback: Option<CallbackRef>,
    ) -> Self {
        Self {
            kind: MethodCallKind::Module,
            target: module.into(),
            method: method.into(),
            params,
            callback,
        }
    }
}
