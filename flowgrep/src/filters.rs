use std::path::Path;

/// Checks whether a file name ends with any of the ignored suffixes.
///
/// Suffixes are matched literally against the end of the file name
/// (".log" and "log" both skip "build.log"), matching how the ignore
/// list is usually written on the command line.
pub fn has_ignored_extension(path: &Path, ignore_extensions: &[String]) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    ignore_extensions.iter().any(|ext| name.ends_with(ext))
}

/// Determines whether a file should be searched at all.
pub fn should_include_file(path: &Path, ignore_extensions: &[String]) -> bool {
    !has_ignored_extension(path, ignore_extensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_ignored_extension() {
        let ignored = vec![".log".to_string(), ".tmp".to_string()];

        assert!(has_ignored_extension(Path::new("build.log"), &ignored));
        assert!(has_ignored_extension(Path::new("dir/cache.tmp"), &ignored));
        assert!(!has_ignored_extension(Path::new("main.rs"), &ignored));
        assert!(!has_ignored_extension(Path::new("log"), &ignored));

        // Bare suffix without the dot still matches the file-name tail
        let ignored = vec!["log".to_string()];
        assert!(has_ignored_extension(Path::new("build.log"), &ignored));
    }

    #[test]
    fn test_empty_ignore_list_includes_everything() {
        assert!(should_include_file(Path::new("anything.bin"), &[]));
    }
}
