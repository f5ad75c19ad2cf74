//! Configured type-name rewrites.

/// One ordered rewrite rule. The pattern is a literal type name or contains
/// a single `*` wildcard; the wildcard's match substitutes for `*` in the
/// replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub pattern: String,
    pub replacement: String,
}

impl Transformation {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Applies the rule to a type name, if it matches.
    pub fn apply(&self, name: &str) -> Option<String> {
        match self.pattern.split_once('*') {
            None => (self.pattern == name).then(|| self.replacement.clone()),
            Some((prefix, suffix)) => {
                let rest = name.strip_prefix(prefix)?;
                let captured = rest.strip_suffix(suffix)?;
                Some(self.replacement.replace('*', captured))
            }
        }
    }
}

/// Applies the first matching rule, or returns the name unchanged.
pub fn apply_transformations(rules: &[Transformation], name: &str) -> String {
    rules
        .iter()
        .find_map(|rule| rule.apply(name))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Transformation, apply_transformations};

    #[test]
    fn literal_pattern_matches_exactly() {
        let rule = Transformation::new("unsigned __int64", "ulong");
        assert_eq!(rule.apply("unsigned __int64").as_deref(), Some("ulong"));
        assert_eq!(rule.apply("__int64"), None);
    }

    #[test]
    fn wildcard_captures_and_substitutes() {
        let rule = Transformation::new("std::basic_string<*>", "string");
        assert_eq!(rule.apply("std::basic_string<char>").as_deref(), Some("string"));

        let rule = Transformation::new("CArray<*>", "Array<*>");
        assert_eq!(rule.apply("CArray<int>").as_deref(), Some("Array<int>"));
    }

    #[test]
    fn first_match_wins() {
        let rules = vec![
            Transformation::new("Foo*", "First*"),
            Transformation::new("FooBar", "Second"),
        ];
        assert_eq!(apply_transformations(&rules, "FooBar"), "FirstBar");
        assert_eq!(apply_transformations(&rules, "Other"), "Other");
    }
}
