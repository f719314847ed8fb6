//! # Download Tasklet
//!
//! Hands a finished document (usually CSV exported from a Markdown table)
//! to the host's file-save capability.
//!
//! The host decides what "download" means: a browser would offer the file to
//! the user, a terminal front end writes it to a download directory. The
//! tasklet is fire-and-forget: a failed save is logged and the step still
//! finishes, because the caller has no way to act on the failure.
//!
//! ## Examples
//!
//! ```rust
//! use tablecast::core::step::{Step, StepBuilder, StepExecution};
//! use tablecast::tasklet::download::{DownloadTaskletBuilder, FilesystemSaver};
//! use std::env::temp_dir;
//!
//! # fn example() -> Result<(), tablecast::BatchError> {
//! let saver = FilesystemSaver::new(temp_dir().join("tablecast-doc"));
//!
//! let tasklet = DownloadTaskletBuilder::new()
//!     .content("\"A\",\"B\"\n\"1\",\"2\"")
//!     .filename("table.csv")
//!     .saver(&saver)
//!     .build()?;
//!
//! let step = StepBuilder::new("download").tasklet(&tasklet).build()?;
//! let mut step_execution = StepExecution::new("download");
//! step.execute(&mut step_execution)?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    core::step::{RepeatStatus, StepExecution, Tasklet},
    BatchError,
};

/// MIME type used for CSV downloads.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Host capability that presents content to the user as a file.
pub trait FileSaver {
    /// Saves `content` under `filename`.
    ///
    /// Success only means the host accepted the content; there is no
    /// confirmation that the user kept the file.
    fn save(&self, content: &[u8], filename: &str, mime_type: &str) -> Result<(), BatchError>;
}

/// Saves downloads as files in a local directory.
///
/// The directory is created on first use. File names must be plain names:
/// anything containing a path separator or `..` is refused.
pub struct FilesystemSaver {
    directory: PathBuf,
}

impl FilesystemSaver {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn target_path(&self, filename: &str) -> Result<PathBuf, BatchError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(BatchError::Configuration(format!(
                "Invalid download file name: {:?}",
                filename
            )));
        }
        Ok(self.directory.join(filename))
    }
}

impl FileSaver for FilesystemSaver {
    fn save(&self, content: &[u8], filename: &str, mime_type: &str) -> Result<(), BatchError> {
        let target = self.target_path(filename)?;

        fs::create_dir_all(&self.directory)?;
        fs::write(&target, content)?;

        info!(
            "Saved {} ({} bytes, {}) to {}",
            filename,
            content.len(),
            mime_type,
            target.display()
        );
        Ok(())
    }
}

/// Tasklet that passes one document to a [`FileSaver`].
pub struct DownloadTasklet<'a> {
    content: String,
    filename: String,
    mime_type: String,
    saver: &'a dyn FileSaver,
}

impl Tasklet for DownloadTasklet<'_> {
    fn execute(&self, _step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
        debug!("Handing {} to the file saver", self.filename);

        if let Err(error) = self
            .saver
            .save(self.content.as_bytes(), &self.filename, &self.mime_type)
        {
            warn!("Download of {} failed: {}", self.filename, error);
        }

        Ok(RepeatStatus::Finished)
    }
}

/// Builder for [`DownloadTasklet`]. The MIME type defaults to `text/csv`.
pub struct DownloadTaskletBuilder<'a> {
    content: String,
    filename: Option<String>,
    mime_type: String,
    saver: Option<&'a dyn FileSaver>,
}

impl Default for DownloadTaskletBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DownloadTaskletBuilder<'a> {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            filename: None,
            mime_type: CSV_MIME_TYPE.to_string(),
            saver: None,
        }
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = mime_type.to_string();
        self
    }

    pub fn saver(mut self, saver: &'a dyn FileSaver) -> Self {
        self.saver = Some(saver);
        self
    }

    pub fn build(self) -> Result<DownloadTasklet<'a>, BatchError> {
        let filename = self.filename.ok_or_else(|| {
            BatchError::Configuration("A file name is required for a download".to_string())
        })?;
        let saver = self.saver.ok_or_else(|| {
            BatchError::Configuration("A file saver is required for a download".to_string())
        })?;

        Ok(DownloadTasklet {
            content: self.content,
            filename,
            mime_type: self.mime_type,
            saver,
        })
    }
}
