use anyhow::{Context, Result, ensure};
use camcfg_core::{CredentialSlot, FileOutput, SelectedFile};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Files the operator picked for the credential slots
///
/// The core only ever sees opaque handles; the paths stay here. A handle is
/// good for one read.
#[derive(Debug, Default)]
pub struct FileRegistry {
    next_handle: u32,
    paths: HashMap<u32, PathBuf>,
    selected: HashMap<CredentialSlot, u32>,
}

impl FileRegistry {
    /// Picks `path` for `slot`, replacing the previous pick
    pub async fn select(&mut self, slot: CredentialSlot, path: &Path) -> Result<SelectedFile> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to stat {}", path.display()))?;
        ensure!(metadata.is_file(), "failed since {} is not a file", path.display());

        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("failed to get file name of {}", path.display()))?
            .to_string();

        self.next_handle += 1;
        let handle = self.next_handle;
        self.selected.insert(slot, handle);
        // drop picks the core never read
        let live: Vec<u32> = self.selected.values().copied().collect();
        self.paths.retain(|handle, _| live.contains(handle));
        self.paths.insert(handle, path.to_path_buf());

        Ok(SelectedFile {
            name,
            size: metadata.len(),
            handle,
        })
    }

    pub async fn read(&mut self, handle: u32) -> FileOutput {
        let Some(path) = self.paths.remove(&handle) else {
            return FileOutput::Error {
                message: format!("unknown file handle {handle}"),
            };
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => FileOutput::Contents { bytes },
            Err(e) => FileOutput::Error {
                message: format!("failed to read {}: {e}", path.display()),
            },
        }
    }

    /// Forgets the pick for `slot`, like clearing a file input. A read already
    /// requested for its handle still succeeds.
    pub fn reset(&mut self, slot: CredentialSlot) {
        self.selected.remove(&slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn selected_file_is_read_once() {
        let mut file = tempfile::Builder::new()
            .suffix(".pem")
            .tempfile()
            .expect("temp file");
        file.write_all(b"-----BEGIN CERTIFICATE-----")
            .expect("write");

        let mut files = FileRegistry::default();
        let selected = files
            .select(CredentialSlot::Ca, file.path())
            .await
            .expect("select");

        assert_eq!(selected.size, 27);
        assert!(selected.name.ends_with(".pem"));
        assert_eq!(
            files.read(selected.handle).await,
            FileOutput::Contents {
                bytes: b"-----BEGIN CERTIFICATE-----".to_vec()
            }
        );

        assert!(matches!(
            files.read(selected.handle).await,
            FileOutput::Error { .. }
        ));
    }

    #[tokio::test]
    async fn reset_before_read_keeps_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ca.pem");
        std::fs::write(&path, b"pem").expect("write");

        let mut files = FileRegistry::default();
        let selected = files
            .select(CredentialSlot::Ca, &path)
            .await
            .expect("select");
        files.reset(CredentialSlot::Ca);

        assert_eq!(
            files.read(selected.handle).await,
            FileOutput::Contents {
                bytes: b"pem".to_vec()
            }
        );
    }

    #[tokio::test]
    async fn unread_pick_is_dropped_by_next_select() {
        let dir = tempfile::tempdir().expect("temp dir");
        let rejected = dir.path().join("empty.pem");
        let next = dir.path().join("ca.pem");
        std::fs::write(&rejected, b"").expect("write");
        std::fs::write(&next, b"pem").expect("write");

        let mut files = FileRegistry::default();
        let first = files
            .select(CredentialSlot::Ca, &rejected)
            .await
            .expect("first");
        files.reset(CredentialSlot::Ca);
        files.select(CredentialSlot::Cert, &next).await.expect("next");

        assert!(matches!(files.read(first.handle).await, FileOutput::Error { .. }));
    }

    #[tokio::test]
    async fn reselecting_drops_previous_handle() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = dir.path().join("a.crt");
        let second = dir.path().join("b.crt");
        std::fs::write(&first, b"a").expect("write");
        std::fs::write(&second, b"b").expect("write");

        let mut files = FileRegistry::default();
        let a = files.select(CredentialSlot::Cert, &first).await.expect("a");
        let b = files.select(CredentialSlot::Cert, &second).await.expect("b");

        assert_ne!(a.handle, b.handle);
        assert!(matches!(files.read(a.handle).await, FileOutput::Error { .. }));
        assert_eq!(
            files.read(b.handle).await,
            FileOutput::Contents { bytes: b"b".to_vec() }
        );
    }

    #[tokio::test]
    async fn directories_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");

        let mut files = FileRegistry::default();

        assert!(files.select(CredentialSlot::Key, dir.path()).await.is_err());
    }
}
