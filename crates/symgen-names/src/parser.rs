//! Recursive-descent parser for mangled-style qualified names.
//!
//! The grammar is small: scopes separated by `::`, each scope a bare name
//! followed by an optional angle-bracketed argument list, arguments split on
//! `,` only at the top nesting level. Everything that is not a structural
//! character (`<`, `>`, `,`, `::`) belongs to the bare name, which keeps
//! pointer stars, spaces in multi-word primitives (`unsigned short`) and
//! numeric non-type arguments (`Buf<16>`) intact.

/// A parse failure with the byte offset it was detected at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSyntaxError {
    /// A scope or argument had no characters before a structural token.
    EmptyName { at: usize },
    /// A `<` without its `>`, or a stray closer at the top level.
    UnbalancedBracket { at: usize },
    /// Input continued after a complete qualified name.
    TrailingInput { at: usize },
}

impl std::fmt::Display for NameSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName { at } => write!(f, "empty name component at offset {at}"),
            Self::UnbalancedBracket { at } => {
                write!(f, "unbalanced template bracket at offset {at}")
            }
            Self::TrailingInput { at } => {
                write!(f, "unexpected trailing characters at offset {at}")
            }
        }
    }
}

impl std::error::Error for NameSyntaxError {}

/// One `::`-separated component of a qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Name with the argument list erased. Never empty.
    pub bare_name: String,
    /// Template arguments; empty for non-template scopes.
    pub arguments: Vec<ParsedName>,
    /// Whether the scope carried an argument list at all. Distinguishes
    /// `Tuple<>` from plain `Tuple`.
    templated: bool,
}

impl Scope {
    pub fn is_template(&self) -> bool {
        self.templated
    }
}

/// A fully parsed qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub scopes: Vec<Scope>,
}

impl ParsedName {
    /// True when any scope carries an argument list. `Outer<int>::Inner`
    /// counts: its specializations still group under one family.
    pub fn is_template(&self) -> bool {
        self.scopes.iter().any(Scope::is_template)
    }

    /// The family-lookup key: every argument list replaced by the `<>`
    /// placeholder, scopes rejoined with `::`.
    pub fn family_name(&self) -> String {
        let mut out = String::new();
        for (i, scope) in self.scopes.iter().enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            out.push_str(&scope.bare_name);
            if scope.is_template() {
                out.push_str("<>");
            }
        }
        out
    }

    /// Reconstructs the textual name, arguments rendered recursively.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, scope) in self.scopes.iter().enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            out.push_str(&scope.bare_name);
            if scope.is_template() {
                out.push('<');
                for (j, argument) in scope.arguments.iter().enumerate() {
                    if j > 0 {
                        out.push(',');
                    }
                    out.push_str(&argument.render());
                }
                out.push('>');
            }
        }
        out
    }

    /// Template arguments in scope order. For the common single-scope case
    /// this is the final argument list; for `Outer<K>::Inner<V>` it yields
    /// `K` then `V`, which keeps family arity well defined for nested
    /// specializations.
    pub fn template_arguments(&self) -> Vec<&ParsedName> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.arguments.iter())
            .collect()
    }

    /// Bare names of every enclosing scope (all but the last).
    pub fn namespaces(&self) -> Vec<&str> {
        let Some((_, enclosing)) = self.scopes.split_last() else {
            return Vec::new();
        };
        enclosing.iter().map(|s| s.bare_name.as_str()).collect()
    }

    /// Bare name of the final scope.
    pub fn last_name(&self) -> &str {
        &self
            .scopes
            .last()
            .expect("a parsed name has at least one scope")
            .bare_name
    }
}

/// Parses a qualified name. Fails on unbalanced brackets and empty name
/// components; succeeds on everything else.
pub fn parse(input: &str) -> Result<ParsedName, NameSyntaxError> {
    let mut cursor = Cursor {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let name = cursor.parse_name()?;
    if cursor.pos != cursor.bytes.len() {
        return Err(NameSyntaxError::TrailingInput { at: cursor.pos });
    }
    Ok(name)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    fn at_scope_separator(&self) -> bool {
        self.bytes[self.pos..].starts_with(b"::")
    }

    fn parse_name(&mut self) -> Result<ParsedName, NameSyntaxError> {
        let mut scopes = vec![self.parse_scope()?];
        while self.at_scope_separator() {
            self.pos += 2;
            scopes.push(self.parse_scope()?);
        }
        Ok(ParsedName { scopes })
    }

    fn parse_scope(&mut self) -> Result<Scope, NameSyntaxError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'<' || b == b'>' || b == b',' || self.at_scope_separator() {
                break;
            }
            self.pos += 1;
        }
        let bare = std::str::from_utf8(&self.bytes[start..self.pos])
            .expect("scope boundaries fall on ASCII structural characters")
            .trim();
        if bare.is_empty() {
            return Err(NameSyntaxError::EmptyName { at: start });
        }

        let mut arguments = Vec::new();
        let mut templated = false;
        if self.peek() == Some(b'<') {
            templated = true;
            let open = self.pos;
            self.pos += 1;
            loop {
                match self.peek() {
                    Some(b'>') => {
                        self.pos += 1;
                        break;
                    }
                    None => return Err(NameSyntaxError::UnbalancedBracket { at: open }),
                    _ => {
                        arguments.push(self.parse_name()?);
                        // Tolerate `> >`-style spacing around separators.
                        self.skip_spaces();
                        match self.peek() {
                            Some(b',') => self.pos += 1,
                            Some(b'>') => {}
                            Some(_) => {
                                return Err(NameSyntaxError::UnbalancedBracket { at: self.pos });
                            }
                            None => {
                                return Err(NameSyntaxError::UnbalancedBracket { at: open });
                            }
                        }
                    }
                }
            }
        }

        Ok(Scope {
            bare_name: bare.to_string(),
            arguments,
            templated,
        })
    }
}
