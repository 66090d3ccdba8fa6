//! Input handling: file reading, stdin support, and boundary validation.
//!
//! The boundary contract is enforced here, before the engine runs: only
//! `.sql`, `.txt`, and `.pls` files are accepted, content must decode as
//! UTF-8, and empty input is rejected.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// File extensions accepted for procedure input.
pub const ALLOWED_EXTENSIONS: &[&str] = &["sql", "txt", "pls"];

/// Errors raised while reading procedure input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unsupported file extension for '{path}': expected .sql, .txt, or .pls")]
    UnsupportedExtension { path: String },

    #[error("file '{path}' is not valid UTF-8")]
    NotUtf8 { path: String },

    #[error("input is empty")]
    Empty,

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A named procedure source.
#[derive(Debug)]
pub struct Source {
    pub name: String,
    pub content: String,
}

/// Reads procedure text from a file, or from stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> Result<Source, InputError> {
    match file {
        Some(path) => read_from_file(path),
        None => read_from_stdin(),
    }
}

fn read_from_stdin() -> Result<Source, InputError> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .map_err(|source| InputError::Io {
            path: "<stdin>".to_string(),
            source,
        })?;

    if content.trim().is_empty() {
        return Err(InputError::Empty);
    }

    Ok(Source {
        name: "<stdin>".to_string(),
        content,
    })
}

fn read_from_file(path: &Path) -> Result<Source, InputError> {
    let display = path.display().to_string();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    if !extension
        .as_deref()
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e))
    {
        return Err(InputError::UnsupportedExtension { path: display });
    }

    let bytes = std::fs::read(path).map_err(|source| InputError::Io {
        path: display.clone(),
        source,
    })?;

    let content = String::from_utf8(bytes).map_err(|_| InputError::NotUtf8 {
        path: display.clone(),
    })?;

    if content.trim().is_empty() {
        return Err(InputError::Empty);
    }

    Ok(Source {
        name: display,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_file(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn reads_sql_file() {
        let file = temp_file(".sql", b"CREATE PROCEDURE p AS BEGIN NULL; END;");
        let source = read_input(Some(file.path())).unwrap();
        assert!(source.content.contains("CREATE PROCEDURE"));
        assert!(source.name.ends_with(".sql"));
    }

    #[test]
    fn accepts_all_allowed_extensions() {
        for extension in ALLOWED_EXTENSIONS {
            let file = temp_file(&format!(".{extension}"), b"BEGIN NULL; END;");
            assert!(read_input(Some(file.path())).is_ok());
        }
    }

    #[test]
    fn uppercase_extension_is_accepted() {
        let file = temp_file(".SQL", b"BEGIN NULL; END;");
        assert!(read_input(Some(file.path())).is_ok());
    }

    #[test]
    fn rejects_disallowed_extension() {
        let file = temp_file(".exe", b"BEGIN NULL; END;");
        let error = read_input(Some(file.path())).unwrap_err();
        assert!(matches!(error, InputError::UnsupportedExtension { .. }));
    }

    #[test]
    fn rejects_missing_extension() {
        let file = Builder::new().tempfile().unwrap();
        let error = read_input(Some(file.path())).unwrap_err();
        assert!(matches!(error, InputError::UnsupportedExtension { .. }));
    }

    #[test]
    fn rejects_non_utf8_content() {
        let file = temp_file(".sql", &[0xff, 0xfe, 0x00, 0x41]);
        let error = read_input(Some(file.path())).unwrap_err();
        assert!(matches!(error, InputError::NotUtf8 { .. }));
    }

    #[test]
    fn rejects_empty_file() {
        let file = temp_file(".sql", b"   \n  ");
        let error = read_input(Some(file.path())).unwrap_err();
        assert!(matches!(error, InputError::Empty));
    }

    #[test]
    fn missing_file_is_io_error() {
        let error = read_input(Some(Path::new("/nonexistent/proc.sql"))).unwrap_err();
        assert!(matches!(error, InputError::Io { .. }));
    }
}
