use crate::geometry::Size;
use crate::method::MethodCall;
use crate::prop::{PropValue, Props};
use crate::Tag;
use serde::{Deserialize, Serialize};

/// Host hook that turns (view type, props, constraint) into a fitted size.
/// Implementations must be pure: the shadow memoizes the result per
/// constraint and the cache is only valid if equal inputs measure equal.
pub trait Measurer {
    fn measure(&self, view_name: &str, props: &Props, constraint: Size) -> Size;
}

/// Off-tree layout record paired with exactly one [`SceneNode`](crate::SceneNode)
/// by tag. Shadows self-serialize; the node they belong to stores them inline
/// but they never own or reference the node back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneShadow {
    pub tag: Tag,
    pub view_name: String,
    props: Props,
    constraint_size: Option<Size>,
    cached_size: Option<Size>,
    call_methods: Vec<MethodCall>,
}

impl SceneShadow {
    pub fn new(tag: Tag, view_name: impl Into<String>) -> Self {
        Self {
            tag,
            view_name: view_name.into(),
            props: Props::new(),
            constraint_size: None,
            cached_size: None,
            call_methods: Vec::new(),
        }
    }

    /// Sets a layout-affecting prop. Any change invalidates the cached size.
    pub fn set_prop(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        if self.props.get(&key) != Some(&value) {
            self.cached_size = None;
        }
        self.props.insert(key, value);
    }

    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn constraint_size(&self) -> Option<Size> {
        self.constraint_size
    }

    pub fn cached_size(&self) -> Option<Size> {
        self.cached_size
    }

    /// Measures the shadow under `constraint`, reusing the memoized size when
    /// neither props nor constraint changed since the last call.
    pub fn calculate(&mut self, measurer: &dyn Measurer, constraint: Size) -> Size {
        if self.constraint_size == Some(constraint) {
            if let Some(size) = self.cached_size {
                return size;
            }
        }
        let size = measurer.measure(&self.view_name, &self.props, constraint);
        self.constraint_size = Some(constraint);
        self.cached_size = Some(size);
        size
    }

    /// Queues a shadow method call. Shadow methods are consumed by the layout
    /// layer, not replayed through the render sink.
    pub fn add_method(&mut self, method: impl Into<String>, params: Option<String>) {
        self.call_methods
            .push(MethodCall::view(self.view_name.clone(), method, params, None));
    }

    pub fn call_methods(&self) -> &[MethodCall] {
        &self.call_methods
    }

    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}
