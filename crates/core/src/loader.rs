use crate::error::LoadError;
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::models::{Document, DocumentMetadata};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !folder.is_dir() {
        return Err(LoadError::FolderMissing(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(|error| match error.into_io_error() {
            Some(io) => LoadError::Io(io),
            None => LoadError::FolderMissing(folder.to_path_buf()),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    // lexicographic order keeps downstream chunk ordering stable
    files.sort_unstable();
    Ok(files)
}

pub fn digest_file(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Loads every PDF under `folder` recursively, one `Document` per page with
/// non-empty text. A folder without PDFs yields an empty vec; an unreadable
/// PDF aborts the whole load.
pub fn load_documents(folder: &Path) -> Result<Vec<Document>, LoadError> {
    load_documents_with(folder, &LopdfExtractor)
}

pub fn load_documents_with(
    folder: &Path,
    extractor: &dyn PdfExtractor,
) -> Result<Vec<Document>, LoadError> {
    let files = discover_pdf_files(folder)?;
    let mut documents = Vec::new();

    for path in files {
        let checksum = digest_file(&path)?;
        let pages = extractor.extract_pages(&path)?;

        for page in pages {
            documents.push(Document {
                text: page.text,
                metadata: DocumentMetadata {
                    source: path.to_string_lossy().to_string(),
                    page: page.number,
                    checksum: checksum.clone(),
                },
            });
        }
    }

    Ok(documents)
}
