//! Path algebra for the virtual filesystem
//!
//! Everything here is pure string manipulation. Paths are always returned in
//! canonical absolute form: a leading `/`, no empty segments, no `.` or `..`.

/// Collapse `.`/`..` and empty segments into a canonical absolute path.
///
/// `..` above the root stays at the root, like a real shell.
pub fn normalize(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
    }
    format!("/{}", stack.join("/"))
}

/// Resolve `raw` against `cwd`. Absolute inputs ignore `cwd`.
pub fn resolve_path(raw: &str, cwd: &str) -> String {
    if raw.is_empty() {
        normalize(cwd)
    } else if raw.starts_with('/') {
        normalize(raw)
    } else {
        normalize(&format!("{}/{}", cwd, raw))
    }
}

/// Segments of a canonical path, root yields none
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Split a canonical path into parent path and leaf name. Root has no leaf.
pub fn split_parent(path: &str) -> Option<(String, String)> {
    let mut parts = segments(path);
    let leaf = parts.pop()?.to_string();
    Some((format!("/{}", parts.join("/")), leaf))
}

/// Last segment of a path, `/` for the root
pub fn basename(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("/")
}

pub fn join(base: &str, name: &str) -> String {
    normalize(&format!("{}/{}", base, name))
}

/// Whether `path` is `ancestor` itself or lies beneath it
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == "/" {
        return true;
    }
    path == ancestor || path.starts_with(&format!("{}/", ancestor))
}

/// Strip trailing slashes, keeping a lone `/` intact
pub fn trim_trailing_slash(arg: &str) -> &str {
    let trimmed = arg.trim_end_matches('/');
    if trimmed.is_empty() && arg.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Arguments containing `/` or `.` are treated as paths when checking tasks
pub fn looks_like_path(arg: &str) -> bool {
    arg.contains('/') || arg.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots_and_empties() {
        assert_eq!(normalize("/home//user/./evidence/"), "/home/user/evidence");
        assert_eq!(normalize("/home/user/../admin"), "/home/admin");
        assert_eq!(normalize("/../.."), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("relative/path"), "/relative/path");
    }

    #[test]
    fn resolve_handles_relative_and_absolute() {
        assert_eq!(resolve_path("evidence", "/home/user"), "/home/user/evidence");
        assert_eq!(resolve_path("..", "/home/user"), "/home");
        assert_eq!(resolve_path(".", "/home/user"), "/home/user");
        assert_eq!(resolve_path("/etc/passwd", "/home/user"), "/etc/passwd");
        assert_eq!(resolve_path("../../../..", "/home/user"), "/");
        assert_eq!(resolve_path("", "/tmp"), "/tmp");
    }

    #[test]
    fn resolving_a_normalized_path_is_identity() {
        let cwds = ["/", "/home/user", "/mnt/usb/docs"];
        let paths = ["/a/b/../c", "/./x//y/", "/..", "/home/user/evidence/", "/a/./b/./../c/d"];
        for cwd in cwds {
            for p in paths {
                let n = normalize(p);
                assert_eq!(resolve_path(&n, cwd), n, "path {p} cwd {cwd}");
            }
        }
    }

    #[test]
    fn split_parent_and_basename() {
        assert_eq!(split_parent("/a/b/c"), Some(("/a/b".to_string(), "c".to_string())));
        assert_eq!(split_parent("/a"), Some(("/".to_string(), "a".to_string())));
        assert_eq!(split_parent("/"), None);
        assert_eq!(basename("/a/b/c.txt"), "c.txt");
        assert_eq!(basename("/"), "/");
    }

    #[test]
    fn within_and_trailing_slashes() {
        assert!(is_within("/a/b", "/a"));
        assert!(is_within("/a", "/a"));
        assert!(!is_within("/ab", "/a"));
        assert!(is_within("/anything", "/"));
        assert_eq!(trim_trailing_slash("/home/user/"), "/home/user");
        assert_eq!(trim_trailing_slash("///"), "/");
        assert_eq!(trim_trailing_slash("docs/"), "docs");
        assert!(looks_like_path("notes.txt"));
        assert!(looks_like_path("a/b"));
        assert!(!looks_like_path("evidence"));
    }
}
