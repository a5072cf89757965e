use std::fmt;

/// Deterministic cache identity for one `(token, page)` pair.
///
/// Both components are escaped before joining, so distinct pairs can never
/// collide ("a-b" + "c" vs "a" + "b-c" escape differently) and the result is
/// safe to use as a file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(token: &str, page_name: &str) -> Self {
        Self(format!("{}-{}", escape(token), escape(page_name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for byte in component.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' => out.push(byte as char),
            other => {
                out.push('%');
                out.push_str(&format!("{other:02X}"));
            }
        }
    }
    out
}
