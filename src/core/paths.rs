// src/core/paths.rs

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The working directory expressed relative to the repository root.
/// When the working directory is the root (or lies outside it, which only
/// happens with hand-built contexts), the result is empty and joins are
/// root-relative.
pub fn relative_from_repo(repo_dir: &Path, working_directory: &Path) -> PathBuf {
    working_directory
        .strip_prefix(repo_dir)
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Joins a declarative file name onto the working directory, expressed as
/// a repo-relative path. This keeps every resolved file addressable from
/// the repository root regardless of where the descriptor lives.
pub fn repo_relative_file(repo_dir: &Path, working_directory: &Path, file_name: &str) -> PathBuf {
    relative_from_repo(repo_dir, working_directory).join(file_name)
}

/// Scans the given directories (resolved against the working directory,
/// repo-relative) for files ending in one of `suffixes`. Results are
/// repo-relative and sorted lexicographically by file name within each
/// directory, so output order is deterministic regardless of filesystem
/// enumeration order.
pub fn scan_sorted(
    repo_dir: &Path,
    working_directory: &Path,
    directories: &[String],
    suffixes: &[&str],
) -> Vec<PathBuf> {
    let mut collected = Vec::new();
    for directory in directories {
        let relative = repo_relative_file(repo_dir, working_directory, directory);
        let absolute = repo_dir.join(&relative);

        let mut names: Vec<String> = WalkDir::new(&absolute)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| suffixes.iter().any(|suffix| name.ends_with(suffix)))
            .collect();
        names.sort();

        collected.extend(names.into_iter().map(|name| relative.join(name)));
    }
    collected
}
