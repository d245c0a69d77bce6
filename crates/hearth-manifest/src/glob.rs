//! Glob-parent extraction for test-suite file patterns.

const GLOB_CHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Returns the non-wildcard directory prefix of a glob pattern.
///
/// Leading segments are kept until the first one containing a wildcard.
/// The final segment is always treated as a file name, so a pattern without
/// wildcards yields its parent directory. An empty prefix becomes `.` (or
/// `/` for absolute patterns).
///
/// # Example
///
/// ```
/// use hearth_manifest::glob_parent;
///
/// assert_eq!(glob_parent("tests/unit/**/*.spec.rs"), "tests/unit");
/// assert_eq!(glob_parent("tests/functional/login.rs"), "tests/functional");
/// assert_eq!(glob_parent("*.rs"), ".");
/// ```
#[must_use]
pub fn glob_parent(pattern: &str) -> String {
    let normalised = pattern.replace('\\', "/");
    let segments: Vec<&str> = normalised.split('/').collect();
    let directory_segments = segments.len().saturating_sub(1);

    let prefix: Vec<&str> = segments
        .iter()
        .take(directory_segments)
        .take_while(|segment| !is_glob_segment(segment))
        .copied()
        .collect();

    let parent = prefix.join("/");
    if !parent.is_empty() {
        return parent;
    }
    if normalised.starts_with('/') {
        String::from("/")
    } else {
        String::from(".")
    }
}

fn is_glob_segment(segment: &str) -> bool {
    segment.starts_with('!') || segment.contains(GLOB_CHARS)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::double_star("tests/unit/**/*.spec.rs", "tests/unit")]
    #[case::single_star("tests/*.rs", "tests")]
    #[case::plain_file("tests/functional/login.rs", "tests/functional")]
    #[case::bare_wildcard("*.rs", ".")]
    #[case::bare_file("main.rs", ".")]
    #[case::trailing_slash("tests/unit/", "tests/unit")]
    #[case::braces("tests/{unit,functional}/*.rs", "tests")]
    #[case::absolute("/srv/app/*.rs", "/srv/app")]
    #[case::absolute_root("/*.rs", "/")]
    #[case::dot_prefix("./tests/**/*.rs", "./tests")]
    #[case::windows_separators("tests\\unit\\*.rs", "tests/unit")]
    fn extracts_parent(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(glob_parent(pattern), expected);
    }
}
