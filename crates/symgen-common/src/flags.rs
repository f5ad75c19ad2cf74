//! Output-shaping flags from the configuration record.

use bitflags::bitflags;

bitflags! {
    /// Flags that shape generated output.
    ///
    /// Flag names arrive as strings in the configuration; unknown names are
    /// preserved by the config layer rather than rejected, so adding a flag
    /// here never invalidates existing configuration files.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct GenerationFlags: u32 {
        /// Concatenate every generated type into a single output file.
        const SINGLE_FILE_EXPORT = 1 << 0;
        /// Emit without blank separator lines between members.
        const COMPRESSED_OUTPUT = 1 << 1;
        /// Generated accessors cache the field value after the first read.
        const CACHE_USER_TYPE_FIELDS = 1 << 2;
    }
}

impl GenerationFlags {
    /// Maps a configuration flag name to its bit, if recognized.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "SingleFileExport" => Some(Self::SINGLE_FILE_EXPORT),
            "CompressedOutput" => Some(Self::COMPRESSED_OUTPUT),
            "CacheUserTypeFields" => Some(Self::CACHE_USER_TYPE_FIELDS),
            _ => None,
        }
    }

    /// Folds a list of flag names into a flag set, returning the names that
    /// were not recognized alongside the set.
    pub fn from_names<'a, I>(names: I) -> (Self, Vec<&'a str>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut flags = Self::empty();
        let mut unknown = Vec::new();
        for name in names {
            match Self::from_config_name(name) {
                Some(flag) => flags |= flag,
                None => unknown.push(name),
            }
        }
        (flags, unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::GenerationFlags;

    #[test]
    fn recognized_names_fold_into_set() {
        let (flags, unknown) =
            GenerationFlags::from_names(["SingleFileExport", "CompressedOutput"]);
        assert!(flags.contains(GenerationFlags::SINGLE_FILE_EXPORT));
        assert!(flags.contains(GenerationFlags::COMPRESSED_OUTPUT));
        assert!(unknown.is_empty());
    }

    #[test]
    fn unknown_names_are_preserved() {
        let (flags, unknown) = GenerationFlags::from_names(["SingleFileExport", "FutureFlag"]);
        assert_eq!(flags, GenerationFlags::SINGLE_FILE_EXPORT);
        assert_eq!(unknown, vec!["FutureFlag"]);
    }
}
