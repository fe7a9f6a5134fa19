use std::path::{Component, Path, PathBuf};

use super::ListingError;

const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";

/// The directory a request asked for, with every `..` segment removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathState {
    pub segments: Vec<String>,
    pub resolved_path: String,
    pub parent_path: Option<String>,
}

impl PathState {
    /// Resolve the raw `dir` query value.
    ///
    /// `..` segments are dropped, not collapsed: `a/../b` becomes `a/b`.
    /// A single trailing empty segment (from a trailing slash) is dropped too.
    pub fn resolve(raw: Option<&str>) -> Self {
        let mut segments: Vec<String> = match raw {
            Some(raw) if !raw.is_empty() => raw
                .split('/')
                .filter(|segment| *segment != PARENT_DIR)
                .map(str::to_string)
                .collect(),
            _ => vec![CURRENT_DIR.to_string()],
        };

        if segments.last().is_some_and(|last| last.is_empty()) {
            segments.pop();
        }

        // Nothing left ("..", "../..") means "here", never the filesystem root
        if segments.is_empty() {
            segments.push(CURRENT_DIR.to_string());
        }

        let resolved_path = segments.join("/");
        let mut state = Self {
            segments,
            resolved_path,
            parent_path: None,
        };

        // "/", "./." and ".//" land on the root too, which has no parent
        if !state.is_current_dir() {
            let n = state.segments.len();
            if n > 1 {
                state.parent_path = Some(state.segments[..n - 1].join("/"));
            }
        }

        state
    }

    /// True when the path lands on the directory the route is rooted at.
    pub fn is_current_dir(&self) -> bool {
        self.named_segments().next().is_none()
    }

    /// Segments that name an actual directory level (no `.` or empty ones).
    pub fn named_segments(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .map(String::as_str)
            .filter(|segment| !segment.is_empty() && *segment != CURRENT_DIR)
    }

    /// Map this path onto `root` without ever leaving it.
    pub fn confine(&self, root: &Path) -> Result<PathBuf, ListingError> {
        let mut result = root.to_path_buf();

        for segment in self.named_segments() {
            if segment.contains('\0') {
                return Err(ListingError::InvalidPath(segment.to_string()));
            }

            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) => result.push(name),
                _ => return Err(ListingError::InvalidPath(segment.to_string())),
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_empty_means_current_dir() {
        for raw in [None, Some("")] {
            let state = PathState::resolve(raw);
            assert_eq!(state.segments, vec!["."]);
            assert_eq!(state.resolved_path, ".");
            assert_eq!(state.parent_path, None);
            assert!(state.is_current_dir());
        }
    }

    #[test]
    fn parent_markers_are_stripped_not_collapsed() {
        assert_eq!(PathState::resolve(Some("a/../b")).resolved_path, "a/b");
        assert_eq!(PathState::resolve(Some("a/../../etc")).resolved_path, "a/etc");
    }

    #[test]
    fn only_parent_markers_fall_back_to_current_dir() {
        let state = PathState::resolve(Some("../.."));
        assert_eq!(state.resolved_path, ".");
        assert!(state.is_current_dir());
    }

    #[test]
    fn trailing_slash_is_dropped_once() {
        assert_eq!(PathState::resolve(Some("a/b/")).resolved_path, "a/b");
        assert_eq!(PathState::resolve(Some("a//")).resolved_path, "a/");
    }

    #[test]
    fn parent_path_drops_last_segment() {
        let state = PathState::resolve(Some("./docs/img"));
        assert_eq!(state.parent_path.as_deref(), Some("./docs"));

        let state = PathState::resolve(Some("./docs"));
        assert_eq!(state.parent_path.as_deref(), Some("."));

        assert_eq!(PathState::resolve(Some("docs")).parent_path, None);
    }

    #[test]
    fn confine_stays_under_root() {
        let root = Path::new("/srv/www");

        let state = PathState::resolve(Some("./a/../../etc"));
        assert_eq!(state.confine(root).unwrap(), PathBuf::from("/srv/www/a/etc"));

        // a leading slash yields an empty first segment, not an absolute path
        let state = PathState::resolve(Some("/etc/passwd"));
        assert_eq!(state.confine(root).unwrap(), PathBuf::from("/srv/www/etc/passwd"));

        let state = PathState::resolve(None);
        assert_eq!(state.confine(root).unwrap(), PathBuf::from("/srv/www"));
    }

    #[test]
    fn spellings_of_the_root_are_current_dir() {
        for raw in ["/", "./.", ".//", "./", "//", "."] {
            let state = PathState::resolve(Some(raw));
            assert!(state.is_current_dir(), "{raw:?}");
            assert_eq!(state.parent_path, None, "{raw:?}");
        }
        assert!(!PathState::resolve(Some("./docs")).is_current_dir());
        assert!(!PathState::resolve(Some("/docs")).is_current_dir());
    }

    #[test]
    fn confine_rejects_nul_bytes() {
        let state = PathState::resolve(Some("a\0b"));
        assert!(matches!(
            state.confine(Path::new("www")),
            Err(ListingError::InvalidPath(_))
        ));
    }
}
