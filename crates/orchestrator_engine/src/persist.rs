use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::DownloadedForm;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory unusable: {0}")]
    DownloadDir(String),
    #[error("refusing to save form as {0:?}: not a plain file name")]
    UnsafeName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` when missing; fails when it exists as something else.
fn ensure_download_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::DownloadDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(dir)
            .map_err(|err| PersistError::DownloadDir(format!("{}: {err}", dir.display()))),
        Err(err) => Err(PersistError::DownloadDir(format!("{}: {err}", dir.display()))),
    }
}

/// Directory that downloaded forms are saved into.
#[derive(Debug, Clone)]
pub struct FormStore {
    dir: PathBuf,
}

impl FormStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Saves `form` under its `file_name`. The bytes land in a temp file first
    /// and are renamed into place, so a reader never sees a half-written form.
    /// Saving the same form again replaces the earlier copy.
    pub fn save(&self, form: &DownloadedForm) -> Result<PathBuf, PersistError> {
        if !is_plain_file_name(&form.file_name) {
            return Err(PersistError::UnsafeName(form.file_name.clone()));
        }
        ensure_download_dir(&self.dir)?;

        let target = self.dir.join(&form.file_name);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&form.bytes)?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().and_then(|base| base.to_str()) == Some(name)
}
