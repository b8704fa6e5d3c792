//! Problem file formats.
//!
//! # Module Organization
//!
//! - [`mps`]: Fixed and free MPS writer plus a whitespace-tokenizing reader
//! - [`lp`]: CPLEX-style LP writer

pub mod lp;
pub mod mps;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::problem::{NameKind, Problem, ProblemError};

/// Closed set of supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileFormat {
    Mps,
    FreeMps,
    Lp,
}

impl FileFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Mps => "mps",
            FileFormat::FreeMps => "free-mps",
            FileFormat::Lp => "lp",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Mps | FileFormat::FreeMps => "mps",
            FileFormat::Lp => "lp",
        }
    }

    pub fn is_readable(self) -> bool {
        matches!(self, FileFormat::Mps | FileFormat::FreeMps)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mps" => Ok(FileFormat::Mps),
            "free-mps" | "freemps" => Ok(FileFormat::FreeMps),
            "lp" => Ok(FileFormat::Lp),
            _ => Err(FormatError::Unsupported {
                format: s.to_string(),
            }),
        }
    }
}

/// Errors raised while writing or reading problem files.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Underlying I/O failure
    Io { path: String, message: String },
    /// Format tag not recognized or not readable
    Unsupported { format: String },
    /// A name cannot be represented in the target format
    InvalidName { kind: NameKind, name: String },
    /// Malformed input line
    Parse { line: usize, message: String },
    /// Parsed data rejected by the problem loaders
    Problem(ProblemError),
}

impl FormatError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            FormatError::Io { .. } => "FILE_IO",
            FormatError::Unsupported { .. } => "FILE_FORMAT_UNSUPPORTED",
            FormatError::InvalidName { .. } => "FILE_NAME_INVALID",
            FormatError::Parse { .. } => "FILE_PARSE",
            FormatError::Problem(_) => "FILE_PROBLEM_INVALID",
        }
    }

    pub(crate) fn io(path: &Path, err: &std::io::Error) -> Self {
        FormatError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FormatError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Io { path, message } => {
                write!(f, "[{}] {}: {}", self.code(), path, message)
            }
            FormatError::Unsupported { format } => {
                write!(f, "[{}] Unsupported file format '{}'", self.code(), format)
            }
            FormatError::InvalidName { kind, name } => write!(
                f,
                "[{}] {} name '{}' contains whitespace",
                self.code(),
                kind.as_str(),
                name
            ),
            FormatError::Parse { line, message } => {
                write!(f, "[{}] Line {}: {}", self.code(), line, message)
            }
            FormatError::Problem(err) => write!(f, "[{}] {}", self.code(), err),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Problem(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProblemError> for FormatError {
    fn from(err: ProblemError) -> Self {
        FormatError::Problem(err)
    }
}

/// Write `problem` in `format` to any writer.
pub fn write_problem<W: Write>(
    problem: &Problem,
    format: FileFormat,
    writer: &mut W,
) -> Result<(), FormatError> {
    match format {
        FileFormat::Mps => mps::write(problem, mps::Layout::Fixed, writer),
        FileFormat::FreeMps => mps::write(problem, mps::Layout::Free, writer),
        FileFormat::Lp => lp::write(problem, writer),
    }
}

/// Write `problem` to `path`, creating or truncating the file.
pub fn write_file(problem: &Problem, format: FileFormat, path: &Path) -> Result<(), FormatError> {
    let file = File::create(path).map_err(|err| FormatError::io(path, &err))?;
    let mut writer = BufWriter::new(file);
    write_problem(problem, format, &mut writer)?;
    writer.flush().map_err(|err| FormatError::io(path, &err))?;
    tracing::debug!(
        component = "format",
        operation = "write_file",
        status = "success",
        problem = %problem.name(),
        format = format.as_str(),
        path = %path.display(),
        "Wrote problem file"
    );
    Ok(())
}

/// Read an MPS file (fixed or free layout).
pub fn read_file(path: &Path, format: FileFormat) -> Result<Problem, FormatError> {
    if !format.is_readable() {
        return Err(FormatError::Unsupported {
            format: format.as_str().to_string(),
        });
    }
    let file = File::open(path).map_err(|err| FormatError::io(path, &err))?;
    let problem = mps::read(BufReader::new(file)).map_err(|err| match err {
        FormatError::Io { message, .. } => FormatError::Io {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })?;
    tracing::debug!(
        component = "format",
        operation = "read_file",
        status = "success",
        problem = %problem.name(),
        format = format.as_str(),
        path = %path.display(),
        columns = problem.num_columns(),
        rows = problem.num_rows(),
        "Read problem file"
    );
    Ok(problem)
}

pub(crate) fn check_name(kind: NameKind, name: &str) -> Result<(), FormatError> {
    if name.chars().any(char::is_whitespace) {
        Err(FormatError::InvalidName {
            kind,
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// I/O errors from generic writers carry no path.
pub(crate) fn stream_error(err: std::io::Error) -> FormatError {
    FormatError::Io {
        path: "<stream>".to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tags_parse() {
        assert_eq!("MPS".parse::<FileFormat>().unwrap(), FileFormat::Mps);
        assert_eq!("free-mps".parse::<FileFormat>().unwrap(), FileFormat::FreeMps);
        assert_eq!("lp".parse::<FileFormat>().unwrap(), FileFormat::Lp);
        let err = "xls".parse::<FileFormat>().unwrap_err();
        assert_eq!(err.code(), "FILE_FORMAT_UNSUPPORTED");
    }

    #[test]
    fn test_lp_is_not_readable() {
        let err = read_file(Path::new("missing.lp"), FileFormat::Lp).unwrap_err();
        assert!(matches!(err, FormatError::Unsupported { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("mpsolve-core-does-not-exist.mps");
        let err = read_file(&path, FileFormat::Mps).unwrap_err();
        assert_eq!(err.code(), "FILE_IO");
    }
}
