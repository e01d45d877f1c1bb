//! Path helpers for the content tree
//!
//! Paths are `/`-separated names. The root is `/`; every other absolute path
//! is the root followed by the names of the ancestors and the item itself.
//! Paths are always derived from the tree and never stored on nodes.

/// Path of the root node
pub const ROOT_PATH: &str = "/";

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Join a parent path and a child name
///
/// Children of the root get a single leading slash.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == ROOT_PATH {
        format!("{SEPARATOR}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Check if a path is absolute
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Normalize an absolute path
///
/// Collapses duplicate slashes, `.` and `..` segments and strips a trailing
/// slash. `..` above the root stays at the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    if segments.is_empty() {
        ROOT_PATH.to_string()
    } else {
        segments.iter().fold(String::new(), |acc, s| join(&acc, s))
    }
}

/// Parent of an absolute path (`None` for the root)
pub fn parent_of(path: &str) -> Option<String> {
    let normalized = normalize(path);
    if normalized == ROOT_PATH {
        return None;
    }
    match normalized.rfind(SEPARATOR) {
        Some(0) => Some(ROOT_PATH.to_string()),
        Some(idx) => Some(normalized[..idx].to_string()),
        None => None,
    }
}

/// Last segment of a path (empty for the root)
pub fn name_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Number of names below the root (`0` for the root)
pub fn depth(path: &str) -> usize {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).count()
}

/// Split a relative path into its leading segments and the final name
///
/// `"child/grand/prop"` becomes `(["child", "grand"], "prop")`. Empty and `.`
/// segments are dropped; `..` is kept for the caller to resolve.
pub fn split_relative(rel_path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = rel_path
        .split(SEPARATOR)
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let last = segments.pop().unwrap_or("");
    (segments, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_under_root() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//a///b/"), "/a/b");
        assert_eq!(normalize("/a/./b/../c"), "/a/c");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("/a/../.."), "/");
    }

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/"), None);
        assert_eq!(parent_of("/a"), Some("/".to_string()));
        assert_eq!(parent_of("/a/b/c"), Some("/a/b".to_string()));
    }

    #[test]
    fn test_name_of() {
        assert_eq!(name_of("/"), "");
        assert_eq!(name_of("/a/b"), "b");
        assert_eq!(name_of("prop"), "prop");
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth("/"), 0);
        assert_eq!(depth("/a"), 1);
        assert_eq!(depth("/a/b/c"), 3);
    }

    #[test]
    fn test_split_relative() {
        assert_eq!(split_relative("prop"), (vec![], "prop"));
        assert_eq!(split_relative("a/./b/prop"), (vec!["a", "b"], "prop"));
        assert_eq!(split_relative("../prop"), (vec![".."], "prop"));
        assert_eq!(split_relative(""), (vec![], ""));
    }

    #[test]
    fn test_absolute() {
        assert!(is_absolute("/a"));
        assert!(!is_absolute("a/b"));
    }
}
