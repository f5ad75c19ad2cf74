//! Script precompilation for the scripting host.
//!
//! User scripts are fragments: they may `import "other.csx";` files and
//! declare `using` directives anywhere. Precompilation flattens the import
//! graph, hoists the usings, strips comments, and wraps everything into one
//! compilable class with a single entry point. `#line` directives map the
//! emitted regions back to their source files.
//!
//! Strings are masked before scanning so an `import` inside a literal or a
//! `//` inside a string never triggers.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Namespace and class the wrapper is synthesized into.
pub const SCRIPT_NAMESPACE: &str = "SymGenScripts";
pub const SCRIPT_CLASS: &str = "ScriptModule";
pub const SCRIPT_ENTRY_POINT: &str = "Execute";

static STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Verbatim strings first: `@"..."` with doubled quotes as escapes, then
    // standard strings with backslash escapes.
    Regex::new(r#"@"(?:[^"]|"")*"|"(?:\\.|[^"\\])*""#).expect("string pattern is valid")
});

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").expect("comment pattern is valid")
});

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"import\s+([^;]+);").expect("import pattern is valid"));

static USING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"using\s+([^;]+);").expect("using pattern is valid"));

#[derive(Debug)]
pub enum ScriptError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    ImportNotFound {
        import: String,
        from: PathBuf,
    },
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read script `{}`: {}", path.display(), source)
            }
            Self::ImportNotFound { import, from } => write!(
                f,
                "import `{import}` (from `{}`) was not found in any search folder",
                from.display()
            ),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::ImportNotFound { .. } => None,
        }
    }
}

/// Result of precompilation: the synthesized wrapper plus the hoisted
/// usings (sorted, deduplicated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecompiledScript {
    pub code: String,
    pub usings: Vec<String>,
}

/// Expands imports, hoists usings and synthesizes the wrapper class for a
/// script file.
pub fn precompile(
    start_file: &Path,
    search_folders: &[PathBuf],
) -> Result<PrecompiledScript, ScriptError> {
    let mut state = Expansion {
        search_folders,
        visited: Vec::new(),
        usings: std::collections::BTreeSet::new(),
        imported: Vec::new(),
    };
    let main = state.load(start_file)?;
    state.visited.push(main.canonical.clone());
    let body = state.expand(&main)?;

    let mut out = String::new();
    for using in &state.usings {
        out.push_str(&format!("using {using};\n"));
    }
    if !state.usings.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("namespace {SCRIPT_NAMESPACE}\n{{\n"));
    out.push_str(&format!("    public class {SCRIPT_CLASS}\n    {{\n"));
    for (path, code) in &state.imported {
        out.push_str(&format!("#line 1 \"{}\"\n", path.display()));
        out.push_str(code);
        if !code.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("#line default\n");
    }
    out.push_str(&format!("        public void {SCRIPT_ENTRY_POINT}()\n        {{\n"));
    out.push_str(&format!("#line 1 \"{}\"\n", main.path.display()));
    out.push_str(&body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("#line default\n");
    out.push_str("        }\n    }\n}\n");

    Ok(PrecompiledScript {
        code: out,
        usings: state.usings.into_iter().collect(),
    })
}

struct LoadedFile {
    path: PathBuf,
    canonical: PathBuf,
    text: String,
}

struct Expansion<'a> {
    search_folders: &'a [PathBuf],
    /// Canonical paths already expanded; keeps diamond imports single.
    visited: Vec<PathBuf>,
    usings: std::collections::BTreeSet<String>,
    /// Flattened imported code in depth-first order.
    imported: Vec<(PathBuf, String)>,
}

impl Expansion<'_> {
    fn load(&self, path: &Path) -> Result<LoadedFile, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let canonical = std::fs::canonicalize(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(LoadedFile {
            path: path.to_path_buf(),
            canonical,
            text,
        })
    }

    /// Cleans one file (comments stripped, usings hoisted, imports expanded
    /// recursively) and returns its remaining code. Line counts are
    /// preserved throughout so `#line` directives stay accurate.
    fn expand(&mut self, file: &LoadedFile) -> Result<String, ScriptError> {
        let mut code = strip_comments(&file.text);

        // Masked copy for scanning; the real text keeps literals intact.
        let masked = mask_matches(&code, &STRING_RE);

        for capture in USING_RE.captures_iter(&masked) {
            let span = capture.get(0).expect("whole match exists").range();
            let name = capture
                .get(1)
                .expect("using capture exists")
                .as_str()
                .trim()
                .to_string();
            self.usings.insert(name);
            blank_range(&mut code, span);
        }

        let imports: Vec<(std::ops::Range<usize>, String)> = IMPORT_RE
            .captures_iter(&masked)
            .map(|capture| {
                let span = capture.get(0).expect("whole match exists").range();
                let raw = capture.get(1).expect("import capture exists").as_str();
                (span, raw.trim().trim_matches('"').to_string())
            })
            .collect();
        for (span, raw) in imports {
            blank_range(&mut code, span);
            let resolved = self.resolve_import(&raw, &file.path)?;
            let loaded = self.load(&resolved)?;
            if self.visited.contains(&loaded.canonical) {
                continue;
            }
            self.visited.push(loaded.canonical.clone());
            let expanded = self.expand(&loaded)?;
            self.imported.push((loaded.path, expanded));
        }

        Ok(code)
    }

    fn resolve_import(&self, import: &str, from: &Path) -> Result<PathBuf, ScriptError> {
        let direct = PathBuf::from(import);
        if direct.is_absolute() && direct.is_file() {
            return Ok(direct);
        }
        if let Some(parent) = from.parent() {
            let sibling = parent.join(import);
            if sibling.is_file() {
                return Ok(sibling);
            }
        }
        for folder in self.search_folders {
            let candidate = folder.join(import);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(ScriptError::ImportNotFound {
            import: import.to_string(),
            from: from.to_path_buf(),
        })
    }
}

/// Replaces comments with whitespace, preserving line structure. Comment
/// detection runs on a string-masked copy so `//` inside a literal is kept.
fn strip_comments(text: &str) -> String {
    let masked = mask_matches(text, &STRING_RE);
    let mut out = text.to_string();
    for found in COMMENT_RE.find_iter(&masked) {
        blank_range(&mut out, found.range());
    }
    out
}

/// A copy of `text` with every match of `re` overwritten by spaces
/// (newlines kept), leaving byte offsets unchanged.
fn mask_matches(text: &str, re: &Regex) -> String {
    let mut bytes = text.as_bytes().to_vec();
    for found in re.find_iter(text) {
        for byte in &mut bytes[found.range()] {
            if *byte != b'\n' {
                *byte = b' ';
            }
        }
    }
    String::from_utf8(bytes).expect("masking preserves UTF-8 boundaries")
}

/// Overwrites a byte range with spaces in place, newlines kept.
fn blank_range(text: &mut String, range: std::ops::Range<usize>) {
    // Masked regions are ASCII-safe to rewrite byte-wise: the scan ran on a
    // same-length masked copy, so the range falls on character boundaries.
    let mut bytes = std::mem::take(text).into_bytes();
    for byte in &mut bytes[range] {
        if *byte != b'\n' {
            *byte = b' ';
        }
    }
    *text = String::from_utf8(bytes).expect("blanking preserves UTF-8 boundaries");
}
