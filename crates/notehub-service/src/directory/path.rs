//! Pure path and level arithmetic for the materialized-path tree.
//!
//! No storage access; everything the rename/move cascades need to
//! recompute paths lives here.

/// Compute a child's path and level from its parent's path and level.
/// `parent = None` yields a root-level node (`/name`, level 0).
pub fn child_path(parent: Option<(&str, i32)>, name: &str) -> (String, i32) {
    match parent {
        Some((parent_path, parent_level)) => {
            (format!("{parent_path}/{name}"), parent_level + 1)
        }
        None => (format!("/{name}"), 0),
    }
}

/// Recompute a descendant's path and level after its ancestor moved from
/// `old_prefix` to `new_prefix`.
///
/// The caller guarantees `descendant_path` starts with `old_prefix + "/"`.
pub fn rewrite_descendant(
    old_prefix: &str,
    new_prefix: &str,
    descendant_path: &str,
) -> (String, i32) {
    let suffix = &descendant_path[old_prefix.len()..];
    let path = format!("{new_prefix}{suffix}");
    let level = level_of(&path);
    (path, level)
}

/// A path's level: the number of segments minus one (`/a` is level 0,
/// `/a/b` is level 1).
pub fn level_of(path: &str) -> i32 {
    path.matches('/').count() as i32 - 1
}

/// The parent portion of a path (`/a/b/c` → `/a/b`, `/a` → empty).
pub fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path_root() {
        assert_eq!(child_path(None, "Projects"), ("/Projects".to_string(), 0));
    }

    #[test]
    fn test_child_path_nested() {
        assert_eq!(
            child_path(Some(("/Projects", 0)), "Web"),
            ("/Projects/Web".to_string(), 1)
        );
        assert_eq!(
            child_path(Some(("/Projects/Web", 1)), "Frontend"),
            ("/Projects/Web/Frontend".to_string(), 2)
        );
    }

    #[test]
    fn test_level_of() {
        assert_eq!(level_of("/a"), 0);
        assert_eq!(level_of("/a/b"), 1);
        assert_eq!(level_of("/a/b/c"), 2);
    }

    #[test]
    fn test_rewrite_descendant_rename() {
        // /Old renamed to /New, descendant keeps its depth.
        let (path, level) = rewrite_descendant("/Old", "/New", "/Old/a/b");
        assert_eq!(path, "/New/a/b");
        assert_eq!(level, 2);
    }

    #[test]
    fn test_rewrite_descendant_move_deeper() {
        // /A moved under /X/Y, descendants gain two levels.
        let (path, level) = rewrite_descendant("/A", "/X/Y/A", "/A/child");
        assert_eq!(path, "/X/Y/A/child");
        assert_eq!(level, 3);
    }

    #[test]
    fn test_rewrite_descendant_move_shallower() {
        let (path, level) = rewrite_descendant("/X/Y/A", "/A", "/X/Y/A/child/leaf");
        assert_eq!(path, "/A/child/leaf");
        assert_eq!(level, 2);
    }

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/a/b/c"), "/a/b");
        assert_eq!(parent_of("/a"), "");
    }
}
