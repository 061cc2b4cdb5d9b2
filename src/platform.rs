use anyhow::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Destination file for edge records, created or truncated on open
pub struct OutputFile {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl OutputFile {
    /// Create the file, truncating it if it exists
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        match File::create(path_ref) {
            Ok(file) => Ok(Self {
                writer: BufWriter::with_capacity(1 << 20, file),
                path: path_ref.to_path_buf(),
            }),
            Err(e) => {
                let error_msg = create_helpful_error_message(path_ref, &e);
                Err(anyhow::anyhow!("{}", error_msg))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered records and sync the file to disk
    pub fn flush_and_sync(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.writer.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Create a helpful error message for file creation failures
fn create_helpful_error_message(path: &Path, error: &io::Error) -> String {
    let base_msg = format!("Cannot create output file '{}': {}", path.display(), error);

    let suggestion = match error.kind() {
        io::ErrorKind::PermissionDenied => {
            if path.parent().is_some_and(|p| !p.exists()) {
                "Suggestion: Parent directory does not exist, create it first"
            } else {
                "Suggestion: Check file permissions or choose a writable location"
            }
        }
        io::ErrorKind::NotFound => "Suggestion: Parent directory does not exist, create it first",
        io::ErrorKind::AlreadyExists if path.is_dir() => {
            "Suggestion: Path points to a directory, specify a filename instead"
        }
        io::ErrorKind::InvalidInput => "Suggestion: Check for invalid characters in filename",
        _ => return base_msg,
    };

    format!("{}\n{}", base_msg, suggestion)
}
