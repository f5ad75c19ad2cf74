//! Output file planning and persistence.

use std::io::Write;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub content: String,
}

/// Writer-side failure; aborts the emit phase.
#[derive(Debug)]
pub struct EmitError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl std::fmt::Display for EmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to write `{}`: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Reserves unique output file names.
///
/// Uniqueness is case-insensitive so generated trees behave on
/// case-preserving filesystems. Collisions take `_1`, `_2`, ... suffixes;
/// reservations happen on the coordinator in type order, which keeps the
/// assignment reproducible run to run.
#[derive(Default)]
pub struct FileNamePlanner {
    taken: FxHashSet<String>,
}

impl FileNamePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, stem: &str) -> String {
        let mut candidate = format!("{stem}.cs");
        let mut suffix = 0usize;
        while !self.taken.insert(candidate.to_lowercase()) {
            suffix += 1;
            candidate = format!("{stem}_{suffix}.cs");
        }
        candidate
    }
}

/// Persists rendered files under the output directory.
pub fn write_files(files: &[GeneratedFile], out_dir: &Path) -> Result<(), EmitError> {
    std::fs::create_dir_all(out_dir).map_err(|source| EmitError {
        path: out_dir.to_path_buf(),
        source,
    })?;
    for file in files {
        let path = out_dir.join(&file.file_name);
        let mut handle = std::fs::File::create(&path).map_err(|source| EmitError {
            path: path.clone(),
            source,
        })?;
        handle
            .write_all(file.content.as_bytes())
            .map_err(|source| EmitError { path, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::FileNamePlanner;

    #[test]
    fn collisions_take_increasing_suffixes() {
        let mut planner = FileNamePlanner::new();
        assert_eq!(planner.reserve("Foo"), "Foo.cs");
        assert_eq!(planner.reserve("Foo"), "Foo_1.cs");
        assert_eq!(planner.reserve("Foo"), "Foo_2.cs");
        assert_eq!(planner.reserve("Bar"), "Bar.cs");
    }

    #[test]
    fn uniqueness_is_case_insensitive() {
        let mut planner = FileNamePlanner::new();
        assert_eq!(planner.reserve("Foo"), "Foo.cs");
        assert_eq!(planner.reserve("foo"), "foo_1.cs");
    }
}
