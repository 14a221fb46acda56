use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct PathResolver;

impl PathResolver {
    /// Locates `command` the way `execvp` would: names containing a slash are
    /// taken as paths, anything else is searched for in `search_path`.
    pub fn resolve(&self, command: &str, search_path: Option<&str>) -> Option<PathBuf> {
        if command.is_empty() {
            return None;
        }

        if command.contains('/') {
            let path = Path::new(command);
            return is_executable(path).then(|| path.to_path_buf());
        }

        let paths = search_path?;
        std::env::split_paths(paths)
            .map(|dir| dir.join(command))
            .find(|full_path| is_executable(full_path))
    }
}

// A regular file with at least one execute bit, so the search moves past
// non-executable files the way `execvp` does.
fn is_executable(path: &Path) -> bool {
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}
