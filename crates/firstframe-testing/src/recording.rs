use firstframe_diff::{RenderError, RenderLayer};
use firstframe_scene::{CallbackRef, PropValue, Rect, SceneNode, Tag};

/// One sink invocation, recorded verbatim. Callback arguments are reduced to
/// their presence; closure identity is not interesting to assertions.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    CreateView {
        tag: Tag,
        view_name: String,
    },
    RemoveView {
        tag: Tag,
    },
    InsertChild {
        parent_tag: Tag,
        child_tag: Tag,
        index: usize,
    },
    SetProp {
        tag: Tag,
        key: String,
        value: PropValue,
    },
    SetFrame {
        tag: Tag,
        frame: Rect,
    },
    CreateShadow {
        tag: Tag,
        view_name: String,
    },
    RemoveShadow {
        tag: Tag,
    },
    SetShadowProp {
        tag: Tag,
        key: String,
        value: PropValue,
    },
    CallViewMethod {
        tag: Tag,
        method: String,
        params: Option<String>,
        with_callback: bool,
    },
    CallModuleMethod {
        module: String,
        method: String,
        params: Option<String>,
        with_callback: bool,
    },
}

/// A [`RenderLayer`] that appends every invocation in submission order.
///
/// Tags registered through [`reject_tag`](RecordingLayer::reject_tag) make
/// any tag-addressed command fail, for exercising sink-error propagation.
#[derive(Default)]
pub struct RecordingLayer {
    commands: Vec<RenderCommand>,
    rejected_tags: Vec<Tag>,
}

impl RecordingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_tag(&mut self, tag: Tag) {
        self.rejected_tags.push(tag);
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<RenderCommand> {
        self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Tags of created views, in emission order.
    pub fn created_tags(&self) -> Vec<Tag> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::CreateView { tag, .. } => Some(*tag),
                _ => None,
            })
            .collect()
    }

    /// Tags of removed views, in emission order.
    pub fn removed_tags(&self) -> Vec<Tag> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::RemoveView { tag } => Some(*tag),
                _ => None,
            })
            .collect()
    }

    /// `(key, value)` prop sets addressed to `tag`, in emission order.
    pub fn props_for(&self, target: Tag) -> Vec<(String, PropValue)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::SetProp { tag, key, value } if *tag == target => {
                    Some((key.clone(), value.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn check(&self, tag: Tag) -> Result<(), RenderError> {
        if self.rejected_tags.contains(&tag) {
            return Err(RenderError::Rejected {
                tag,
                reason: "rejected by test configuration".into(),
            });
        }
        Ok(())
    }

    fn push(&mut self, command: RenderCommand) -> Result<(), RenderError> {
        self.commands.push(command);
        Ok(())
    }
}

impl RenderLayer for RecordingLayer {
    fn create_view(&mut self, tag: Tag, view_name: &str) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::CreateView {
            tag,
            view_name: view_name.to_owned(),
        })
    }

    fn remove_view(&mut self, tag: Tag) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::RemoveView { tag })
    }

    fn insert_child(
        &mut self,
        parent_tag: Tag,
        child_tag: Tag,
        index: usize,
    ) -> Result<(), RenderError> {
        self.check(child_tag)?;
        self.push(RenderCommand::InsertChild {
            parent_tag,
            child_tag,
            index,
        })
    }

    fn set_prop(&mut self, tag: Tag, key: &str, value: &PropValue) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::SetProp {
            tag,
            key: key.to_owned(),
            value: value.clone(),
        })
    }

    fn set_frame(&mut self, tag: Tag, frame: Rect) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::SetFrame { tag, frame })
    }

    fn create_shadow(&mut self, tag: Tag, view_name: &str) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::CreateShadow {
            tag,
            view_name: view_name.to_owned(),
        })
    }

    fn remove_shadow(&mut self, tag: Tag) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::RemoveShadow { tag })
    }

    fn set_shadow_prop(
        &mut self,
        tag: Tag,
        key: &str,
        value: &PropValue,
    ) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::SetShadowProp {
            tag,
            key: key.to_owned(),
            value: value.clone(),
        })
    }

    fn call_view_method(
        &mut self,
        tag: Tag,
        method: &str,
        params: Option<&str>,
        callback: Option<&CallbackRef>,
    ) -> Result<(), RenderError> {
        self.check(tag)?;
        self.push(RenderCommand::CallViewMethod {
            tag,
            method: method.to_owned(),
            params: params.map(str::to_owned),
            with_callback: callback.is_some(),
        })
    }

    fn call_module_method(
        &mut self,
        module: &str,
        method: &str,
        params: Option<&str>,
        callback: Option<&CallbackRef>,
    ) -> Result<(), RenderError> {
        self.push(RenderCommand::CallModuleMethod {
            module: module.to_owned(),
            method: method.to_owned(),
            params: params.map(str::to_owned),
            with_callback: callback.is_some(),
        })
    }
}

/// Shorthand for a bare node in test scenes.
pub fn node(tag: Tag, view_name: &str) -> SceneNode {
    SceneNode::new(tag, view_name)
}
