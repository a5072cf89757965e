use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Ordered prop set, unique by key. Insertion order is preserved so that
/// serialization and diffing stay stable across save/restore cycles.
pub type Props = IndexMap<String, PropValue>;

pub type CallbackFn = dyn Fn(Option<&str>) + Send + Sync;

/// Opaque reference to a host-side callback closure.
///
/// Callbacks are bound to a live runtime instance and cannot survive
/// serialization: encoding writes a detached marker and decoding yields a
/// detached ref. A detached ref still occupies its prop slot so the diff
/// engine re-sends the prop once the fresh tree carries a live binding.
#[derive(Clone)]
pub struct CallbackRef {
    inner: Option<Arc<CallbackFn>>,
}

impl CallbackRef {
    pub fn new(f: impl Fn(Option<&str>) + Send + Sync + 'static) -> Self {
        Self {
            inner: Some(Arc::new(f)),
        }
    }

    /// A ref whose binding is gone, e.g. restored from a cache file.
    pub fn detached() -> Self {
        Self { inner: None }
    }

    pub fn is_detached(&self) -> bool {
        self.inner.is_none()
    }

    /// Invokes the underlying closure if it is still bound.
    pub fn invoke(&self, params: Option<&str>) {
        if let Some(f) = &self.inner {
            f(params);
        }
    }
}

/// Two live refs are equal only when they share the same closure; two
/// detached refs compare equal to each other. A live ref never equals a
/// detached one, which is what forces callback props to be re-sent after a
/// cache restore.
impl PartialEq for CallbackRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for CallbackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            write!(f, "CallbackRef(detached)")
        } else {
            write!(f, "CallbackRef(live)")
        }
    }
}

impl Serialize for CallbackRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

impl<'de> Deserialize<'de> for CallbackRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <()>::deserialize(deserializer)?;
        Ok(Self::detached())
    }
}

/// A single typed prop value. The enum tag doubles as the persisted type
/// discriminant, so a value survives a round trip with its type intact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Str(String),
    Number(f64),
    Bool(bool),
    Callback(CallbackRef),
    Bytes(Vec<u8>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropKind {
    Str,
    Number,
    Bool,
    Callback,
    Bytes,
}

impl PropValue {
    pub fn kind(&self) -> PropKind {
        match self {
            Self::Str(_) => PropKind::Str,
            Self::Number(_) => PropKind::Number,
            Self::Bool(_) => PropKind::Bool,
            Self::Callback(_) => PropKind::Callback,
            Self::Bytes(_) => PropKind::Bytes,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
