//! Saving fetched prescription documents to disk as `receta_{id}.pdf`.

use std::path::{Path, PathBuf};

use thiserror::Error;

const MAX_STEM_CHARS: usize = 100;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Documento vacío para la receta {0}")]
    Empty(String),
    #[error("No se pudo guardar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reduce a prescription id to characters safe in a file name.
///
/// Path separators and NUL are dropped, `..` sequences removed, anything
/// else outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .filter(|&c| c != '/' && c != '\\' && c != '\0')
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut cleaned = cleaned.replace("..", "");
    if cleaned.chars().count() > MAX_STEM_CHARS {
        cleaned = cleaned.chars().take(MAX_STEM_CHARS).collect();
    }
    if cleaned.is_empty() {
        "sin_id".into()
    } else {
        cleaned
    }
}

pub fn document_file_name(id_receta: &str) -> String {
    format!("receta_{}.pdf", sanitize_id(id_receta))
}

/// Write `bytes` into `dir`, creating it if needed. Returns the final path.
/// An existing file with the same name is replaced.
pub fn save_document(dir: &Path, id_receta: &str, bytes: &[u8]) -> Result<PathBuf, DocumentError> {
    if bytes.is_empty() {
        return Err(DocumentError::Empty(id_receta.to_string()));
    }

    std::fs::create_dir_all(dir).map_err(|source| DocumentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(document_file_name(id_receta));
    std::fs::write(&path, bytes).map_err(|source| DocumentError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), size = bytes.len(), "Document saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ids_are_kept() {
        assert_eq!(document_file_name("RX-2025_0001"), "receta_RX-2025_0001.pdf");
    }

    #[test]
    fn traversal_is_neutralized() {
        let name = document_file_name("../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
    }

    #[test]
    fn odd_characters_are_replaced() {
        assert_eq!(sanitize_id("a b:c"), "a_b_c");
        assert_eq!(sanitize_id("\0/"), "sin_id");
        assert_eq!(sanitize_id(&"x".repeat(300)).len(), 100);
    }

    #[test]
    fn saves_into_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("descargas");
        let path = save_document(&dir, "R1", b"%PDF-1.4").unwrap();
        assert_eq!(path, dir.join("receta_R1.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn empty_body_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = save_document(tmp.path(), "R1", b"").unwrap_err();
        assert!(matches!(err, DocumentError::Empty(_)));
    }
}
