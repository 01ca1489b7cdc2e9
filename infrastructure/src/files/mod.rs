//! Conversation attachments read from the local file system
//!
//! Layout: `<root>/<conversation_id>/<file>`. Files are visited in name
//! order; names starting with `_` or `.` (manifests, editor droppings)
//! are skipped.
//!
//! | Kind | Extensions | Becomes |
//! |------|------------|---------|
//! | Text | `txt md csv html json xml` and common source/config formats | `--- <filename> ---\n<text>` |
//! | Image | `png jpg jpeg gif webp` (≤ 2 MB) | base64 [`ImageAttachment`] |
//!
//! Anything else is ignored.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use council_application::ports::file_context::{FileContext, FileContextError, FileContextPort};
use council_domain::ImageAttachment;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Images above this size are not passed to models
pub const MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "csv", "html", "htm", "json", "xml", "py", "js", "ts", "jsx",
    "tsx", "go", "rs", "java", "c", "cpp", "h", "rb", "swift", "kt", "sh", "yaml", "yml",
    "toml", "ini", "cfg", "sql", "r", "m", "cs",
];

fn image_media_type(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct LocalFileContextLoader {
    root: PathBuf,
}

impl LocalFileContextLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn conversation_dir(&self, conversation_id: &str) -> Result<PathBuf, FileContextError> {
        let id = conversation_id.trim();
        if id.is_empty()
            || id.contains('/')
            || id.contains('\\')
            || id.contains("..")
            || id.starts_with('.')
        {
            return Err(FileContextError::InvalidConversation(conversation_id.to_string()));
        }
        Ok(self.root.join(id))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> FileContextError {
    FileContextError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Sorted list of regular files worth looking at.
async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, FileContextError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| io_error(dir, e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('_') || name.starts_with('.') {
            continue;
        }
        match entry.file_type().await {
            Ok(ft) if ft.is_file() => files.push(entry.path()),
            _ => {}
        }
    }
    files.sort();
    Ok(files)
}

#[async_trait]
impl FileContextPort for LocalFileContextLoader {
    async fn get_file_context(&self, conversation_id: &str) -> Result<FileContext, FileContextError> {
        let dir = self.conversation_dir(conversation_id)?;
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            debug!("No attachments directory at {}", dir.display());
            return Ok(FileContext::default());
        }

        let mut text_parts = Vec::new();
        let mut images = Vec::new();

        for path in list_files(&dir).await? {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_lowercase())
                .unwrap_or_default();

            if let Some(media_type) = image_media_type(&extension) {
                let size = tokio::fs::metadata(&path)
                    .await
                    .map_err(|e| io_error(&path, e))?
                    .len();
                if size > MAX_IMAGE_BYTES {
                    warn!("Skipping image {} ({} bytes > 2 MB)", filename, size);
                    continue;
                }
                let bytes = tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))?;
                images.push(ImageAttachment {
                    filename,
                    media_type: media_type.to_string(),
                    data: STANDARD.encode(bytes),
                });
            } else if TEXT_EXTENSIONS.contains(&extension.as_str()) {
                let bytes = tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))?;
                let text = String::from_utf8_lossy(&bytes);
                if text.trim().is_empty() {
                    continue;
                }
                text_parts.push(format!("--- {} ---\n{}", filename, text));
            } else {
                debug!("Ignoring attachment {} (unsupported type)", filename);
            }
        }

        debug!(
            conversation = conversation_id,
            texts = text_parts.len(),
            images = images.len(),
            "Loaded file context"
        );
        Ok(FileContext {
            text: text_parts.join("\n\n"),
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup() -> (tempfile::TempDir, LocalFileContextLoader) {
        let dir = tempfile::tempdir().unwrap();
        let loader = LocalFileContextLoader::new(dir.path());
        (dir, loader)
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty_context() {
        let (_dir, loader) = setup();
        let ctx = loader.get_file_context("conv-1").await.unwrap();
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn test_text_files_joined_in_name_order() {
        let (dir, loader) = setup();
        let conv = dir.path().join("conv-1");
        fs::create_dir(&conv).unwrap();
        fs::write(conv.join("b.md"), "# Notes").unwrap();
        fs::write(conv.join("a.csv"), "x,y\n1,2").unwrap();
        fs::write(conv.join("_manifest.json"), "[]").unwrap();
        fs::write(conv.join("blob.bin"), [0u8, 1, 2]).unwrap();
        fs::write(conv.join("empty.txt"), "  ").unwrap();

        let ctx = loader.get_file_context("conv-1").await.unwrap();
        assert_eq!(ctx.text, "--- a.csv ---\nx,y\n1,2\n\n--- b.md ---\n# Notes");
        assert!(ctx.images.is_empty());
    }

    #[tokio::test]
    async fn test_images_become_base64_attachments() {
        let (dir, loader) = setup();
        let conv = dir.path().join("conv-2");
        fs::create_dir(&conv).unwrap();
        fs::write(conv.join("chart.PNG"), b"png-bytes").unwrap();
        fs::write(
            conv.join("huge.jpg"),
            vec![0u8; (MAX_IMAGE_BYTES + 1) as usize],
        )
        .unwrap();

        let ctx = loader.get_file_context("conv-2").await.unwrap();
        assert_eq!(ctx.images.len(), 1);
        assert_eq!(ctx.images[0].filename, "chart.PNG");
        assert_eq!(ctx.images[0].media_type, "image/png");
        assert_eq!(ctx.images[0].data, STANDARD.encode(b"png-bytes"));
        assert!(ctx.text.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (_dir, loader) = setup();
        for id in ["../etc", "a/b", "", ".hidden"] {
            assert!(matches!(
                loader.get_file_context(id).await,
                Err(FileContextError::InvalidConversation(_))
            ));
        }
    }
}
