use std::io::Write;
use std::path::PathBuf;

use crate::ports::OutputPresenter;
use crate::shared::error::DepTreeError;
use crate::shared::Result;

/// Writes rendered output to stdout.
#[derive(Debug, Default)]
pub struct StdoutPresenter;

impl StdoutPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputPresenter for StdoutPresenter {
    fn present(&self, content: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Writes rendered output to a file.
#[derive(Debug)]
pub struct FilePresenter {
    path: PathBuf,
}

impl FilePresenter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputPresenter for FilePresenter {
    fn present(&self, content: &str) -> Result<()> {
        std::fs::write(&self.path, content).map_err(|e| {
            DepTreeError::OutputWrite {
                path: self.path.clone(),
                details: e.to_string(),
            }
            .into()
        })
    }
}
