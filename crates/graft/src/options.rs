//! Apply-time configuration shared by every operation in a document.

/// Naming transform applied to mapping keys and bag member names before
/// lookup, standing in for a serializer's dictionary key policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `FooBar` → `fooBar`
    CamelCase,
    /// `FooBar` → `foo_bar`
    SnakeCase,
    /// `FooBar` → `foobar`
    Lowercase,
}

impl NamingPolicy {
    pub fn convert(&self, name: &str) -> String {
        match self {
            NamingPolicy::CamelCase => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            NamingPolicy::SnakeCase => {
                let mut out = String::with_capacity(name.len() + 4);
                for (i, c) in name.chars().enumerate() {
                    if c.is_uppercase() {
                        if i > 0 {
                            out.push('_');
                        }
                        out.extend(c.to_lowercase());
                    } else {
                        out.push(c);
                    }
                }
                out
            }
            NamingPolicy::Lowercase => name.to_lowercase(),
        }
    }
}

/// Read-only configuration threaded through walking, conversion, and the
/// shape accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Optional key naming transform for mappings and bags.
    pub key_policy: Option<NamingPolicy>,
}

impl PatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_policy(mut self, policy: NamingPolicy) -> Self {
        self.key_policy = Some(policy);
        self
    }

    /// Apply the key policy to a path segment, or pass it through.
    pub(crate) fn key_name(&self, segment: &str) -> String {
        match self.key_policy {
            Some(policy) => policy.convert(segment),
            None => segment.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_lowers_first() {
        assert_eq!(NamingPolicy::CamelCase.convert("FooBar"), "fooBar");
        assert_eq!(NamingPolicy::CamelCase.convert(""), "");
    }

    #[test]
    fn snake_case_splits_words() {
        assert_eq!(NamingPolicy::SnakeCase.convert("FooBar"), "foo_bar");
        assert_eq!(NamingPolicy::SnakeCase.convert("already_snake"), "already_snake");
    }

    #[test]
    fn no_policy_passes_through() {
        let options = PatchOptions::new();
        assert_eq!(options.key_name("MiXeD"), "MiXeD");
    }
}
