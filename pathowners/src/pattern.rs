/// The matching discipline of a rule pattern. Decided once when a rule is
/// parsed or added, and consulted at lookup time to work out which entries
/// apply to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// A pure comment line; never matches any path.
    None,
    /// An exact file or directory path, e.g. `docs/README.md`.
    Absolute,
    /// A directory and everything beneath it, e.g. `docs/`.
    Recursive,
    /// A bare wildcard, e.g. `*`.
    Flat,
    /// An extension wildcard, e.g. `*.rb`.
    Type,
}

/// Decide which matching discipline applies to `pattern`.
///
/// The wildcard checks run before the trailing-slash check: a pattern whose
/// last segment starts with `*` cannot also be a bare directory.
pub fn classify(pattern: &str) -> Discipline {
    let base = base_segment(pattern);
    if base.starts_with('*') {
        return if file_extension(pattern).is_empty() {
            Discipline::Flat
        } else {
            Discipline::Type
        };
    }
    if pattern.ends_with('/') {
        return Discipline::Recursive;
    }
    Discipline::Absolute
}

/// The extension suffix of the last segment of `path`, including the leading
/// dot. Empty when the last segment has no dot.
pub(crate) fn file_extension(path: &str) -> &str {
    let base = base_segment(path);
    match base.rfind('.') {
        Some(idx) => &base[idx..],
        None => "",
    }
}

// Last path segment, ignoring a trailing slash.
fn base_segment(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let examples = vec![
            ("*", Discipline::Flat),
            ("*.rb", Discipline::Type),
            ("*.tar.gz", Discipline::Type),
            ("docs/", Discipline::Recursive),
            ("docs/*", Discipline::Flat),
            ("docs/*.md", Discipline::Type),
            // A wildcard base takes precedence over the trailing slash.
            ("*/", Discipline::Flat),
            ("README", Discipline::Absolute),
            ("app/models/user.rb", Discipline::Absolute),
            ("\\#file_with_pound.rb", Discipline::Absolute),
            (".github/", Discipline::Recursive),
        ];

        for (pattern, expected) in examples {
            assert_eq!(classify(pattern), expected, "discipline for `{}`", pattern);
        }
    }

    #[test]
    fn test_file_extension() {
        let examples = vec![
            ("user.rb", ".rb"),
            ("app/models/user.rb", ".rb"),
            ("README", ""),
            ("a.b/c", ""),
            ("archive.tar.gz", ".gz"),
            (".gitignore", ".gitignore"),
            ("docs/", ""),
            ("*.js", ".js"),
        ];

        for (path, expected) in examples {
            assert_eq!(file_extension(path), expected, "extension of `{}`", path);
        }
    }
}
