//! Directory loader for text and PDF documents

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::Passage;

/// Loads files matching glob-style patterns from a directory into passages
/// tagged with a `source` metadata entry.
pub struct DirectoryLoader {
    directory: PathBuf,
    patterns: Vec<String>,
}

impl DirectoryLoader {
    /// Create a loader; fails if the directory does not exist
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(Error::Config(format!(
                "Directory not found: {}",
                directory.display()
            )));
        }

        Ok(Self {
            directory,
            patterns: vec!["*.txt".to_string(), "*.pdf".to_string()],
        })
    }

    /// Override the file patterns
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Load every matching file, in deterministic path order
    pub fn load(&self) -> Result<Vec<Passage>> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(&self.directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let name = entry.file_name().to_string_lossy();
            if !self.patterns.iter().any(|p| matches_pattern(&name, p)) {
                continue;
            }

            let content = read_file(entry.path())?;
            documents.push(Passage::with_source(
                content,
                entry.path().to_string_lossy(),
            ));
        }

        Ok(documents)
    }
}

/// Simple `*.ext` glob matching against a filename
fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(ext) => name
            .to_lowercase()
            .ends_with(&format!(".{}", ext.to_lowercase())),
        None => name == pattern,
    }
}

fn read_file(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        pdf_extract::extract_text(path)
            .map_err(|e| Error::file_parse(path.to_string_lossy(), e.to_string()))
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_directory_rejected() {
        let result = DirectoryLoader::new("/definitely/not/a/real/path");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_pattern_matching() {
        assert!(matches_pattern("notes.txt", "*.txt"));
        assert!(matches_pattern("REPORT.PDF", "*.pdf"));
        assert!(!matches_pattern("image.png", "*.txt"));
        assert!(matches_pattern("exact.name", "exact.name"));
    }

    #[test]
    fn test_load_skips_unmatched_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("b.png"), [0u8, 1, 2]).unwrap();

        let loader = DirectoryLoader::new(dir.path()).unwrap();
        let documents = loader.load().unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].content, "alpha");
        assert!(documents[0].source().unwrap().ends_with("a.txt"));
    }

    #[test]
    fn test_load_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            write!(file, "{}", name).unwrap();
        }

        let loader = DirectoryLoader::new(dir.path()).unwrap();
        let contents: Vec<String> = loader
            .load()
            .unwrap()
            .into_iter()
            .map(|d| d.content)
            .collect();

        assert_eq!(contents, vec!["a.txt", "b.txt", "c.txt"]);
    }
}
