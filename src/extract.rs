use std::io::{Cursor, Read};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Pick the archive format from the download URL's suffix.
    pub fn from_url(url: &str) -> Result<Self, String> {
        if url.ends_with(".tar.gz") || url.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if url.ends_with(".zip") {
            Ok(Self::Zip)
        } else {
            Err(format!("don't know how to extract {url}"))
        }
    }

    pub fn extract(self, archive_bytes: &[u8], binary_name: &str) -> Result<Vec<u8>, String> {
        match self {
            Self::TarGz => extract_tar_gz(archive_bytes, binary_name),
            Self::Zip => extract_zip(archive_bytes, binary_name),
        }
    }
}

/// Read the entry named `binary_name`, at any depth, out of a `.tar.gz` archive.
pub fn extract_tar_gz(archive_bytes: &[u8], binary_name: &str) -> Result<Vec<u8>, String> {
    let decoder = flate2::read::GzDecoder::new(Cursor::new(archive_bytes));
    let mut archive = tar::Archive::new(decoder);

    for entry in archive
        .entries()
        .map_err(|e| format!("failed to read tar entries: {e}"))?
    {
        let mut entry = entry.map_err(|e| format!("failed to read tar entry: {e}"))?;
        let path = entry
            .path()
            .map_err(|e| format!("failed to read entry path: {e}"))?;

        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n == binary_name);

        if matches {
            tracing::debug!(path = %path.display(), "found executable in tarball");
            let mut buf = Vec::new();
            entry
                .read_to_end(&mut buf)
                .map_err(|e| format!("failed to read {binary_name} from archive: {e}"))?;
            return Ok(buf);
        }
    }

    Err(format!("the tarball was missing expected executable: {binary_name}"))
}

/// Read the entry named `binary_name`, at any depth, out of a `.zip` archive.
pub fn extract_zip(archive_bytes: &[u8], binary_name: &str) -> Result<Vec<u8>, String> {
    let reader = Cursor::new(archive_bytes);
    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| format!("failed to open zip archive: {e}"))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| format!("failed to read zip entry: {e}"))?;

        let file_name = file
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
            .and_then(|n| n.into_string().ok())
            .unwrap_or_default();

        if file_name == binary_name {
            tracing::debug!(entry = file.name(), "found executable in zip");
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .map_err(|e| format!("failed to read {binary_name} from zip: {e}"))?;
            return Ok(buf);
        }
    }

    Err(format!("the zip was missing expected executable: {binary_name}"))
}
