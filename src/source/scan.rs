//! Load a source map from a project directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jwalk::WalkDir;

use super::SourceMap;
use crate::config::SourceConfig;

/// Scan `root` for files with a configured extension.
///
/// Paths are stored relative to `root` with `/` separators and inserted in
/// lexical order. Directories named in `ignore` are not descended into;
/// files that are not valid UTF-8 are skipped.
pub fn scan_dir(root: &Path, config: &SourceConfig) -> Result<SourceMap> {
    let ignore = config.ignore.clone();

    let mut files: Vec<_> = WalkDir::new(root)
        .sort(true)
        .process_read_dir(move |_, _, _, children| {
            children.retain(|entry| {
                entry.as_ref().map_or(true, |e| {
                    !(e.file_type().is_dir()
                        && ignore.iter().any(|name| e.file_name().to_str() == Some(name)))
                })
            });
        })
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| has_extension(path, &config.scan))
        .collect();
    files.sort();

    let mut map = SourceMap::new();
    for path in files {
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect::<Vec<_>>()
            .join("/");
        match fs::read_to_string(&path) {
            Ok(source) => map.insert(key, source),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                crate::debug!("scan"; "skipping non-utf8 file {}", path.display());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        }
    }

    if map.is_empty() {
        crate::log!("scan"; "no source files under {}", root.display());
    } else {
        crate::debug!("scan"; "{} files from {}", map.len(), root.display());
    }
    Ok(map)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}
