use std::fs;
use std::path::{Path, PathBuf};

/// Extensions whose contents get `$VERSION` substituted.
const TEMPLATED: &[&str] = &["html", "sh"];

/// Version from the first `version = "..."` line of a Cargo manifest.
pub fn manifest_version(manifest: &str) -> Result<String, String> {
    let line = manifest
        .lines()
        .find(|line| line.starts_with("version ="))
        .ok_or("no `version =` line in manifest")?;

    match (line.find('"'), line.rfind('"')) {
        (Some(start), Some(end)) if start < end => Ok(line[start + 1..end].to_string()),
        _ => Err(format!("malformed version line: {line}")),
    }
}

pub fn fixup(input: &str, version: &str) -> String {
    input.replace("$VERSION", &format!("v{version}"))
}

/// Copy every file in `src_dir` to `dst_dir`, templating html and shell files.
///
/// Returns the written paths in sorted order.
pub fn render(src_dir: &Path, dst_dir: &Path, version: &str) -> Result<Vec<PathBuf>, String> {
    fs::create_dir_all(dst_dir)
        .map_err(|e| format!("failed to create {}: {e}", dst_dir.display()))?;

    let entries = fs::read_dir(src_dir)
        .map_err(|e| format!("failed to read {}: {e}", src_dir.display()))?;

    let mut written = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("failed to read directory entry: {e}"))?;
        let src = entry.path();
        if !src.is_file() {
            continue;
        }
        let dst = dst_dir.join(entry.file_name());

        let templated = src
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TEMPLATED.contains(&ext));

        if templated {
            let input = fs::read_to_string(&src)
                .map_err(|e| format!("failed to read {}: {e}", src.display()))?;
            fs::write(&dst, fixup(&input, version))
                .map_err(|e| format!("failed to write {}: {e}", dst.display()))?;
        } else {
            fs::copy(&src, &dst).map_err(|e| {
                format!("failed to copy {} to {}: {e}", src.display(), dst.display())
            })?;
        }

        tracing::debug!(path = %dst.display(), templated, "rendered");
        written.push(dst);
    }

    written.sort();
    Ok(written)
}
