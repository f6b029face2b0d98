//! Output files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name prefix shared by every holdings file
pub const HOLDINGS_FILE_PREFIX: &str = "institutional_holdings";

/// Name of the institutional links file
pub const LINKS_FILE_NAME: &str = "institutional_links.xml";

/// Writes each holdings document to its own numbered file
pub struct HoldingsFileWriter {
    output_dir: PathBuf,
    stem: String,
    next_index: usize,
    written: Vec<PathBuf>,
}

impl HoldingsFileWriter {
    /// `corpus` and `kind` (e.g. `journals`) are upper-cased into the file name
    pub fn new(output_dir: &Path, corpus: &str, institution: &str, kind: &str) -> io::Result<Self> {
        fs::create_dir_all(output_dir)?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            stem: format!(
                "{}_{}_{}{}",
                HOLDINGS_FILE_PREFIX,
                corpus.to_uppercase(),
                institution,
                kind.to_uppercase()
            ),
            next_index: 0,
            written: Vec::new(),
        })
    }

    pub fn file_name(&self, index: usize) -> String {
        format!("{}-{}.xml", self.stem, index)
    }

    pub fn write_document(&mut self, document: &str) -> io::Result<PathBuf> {
        let path = self.output_dir.join(self.file_name(self.next_index));
        fs::write(&path, document)?;
        tracing::info!(path = %path.display(), bytes = document.len(), "Holdings file written");

        self.next_index += 1;
        self.written.push(path.clone());
        Ok(path)
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// Holdings files in `output_dir`, sorted, relative to its parent
///
/// The paths are meant to be resolved against the public base URL, so they
/// keep the output directory name (`google-scholar/institutional_holdings_...`).
pub fn list_holdings_files(output_dir: &Path) -> io::Result<Vec<String>> {
    let dir_name = output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let mut files: Vec<String> = fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| name.starts_with(HOLDINGS_FILE_PREFIX))
        .collect();
    files.sort();

    Ok(files
        .into_iter()
        .map(|name| match &dir_name {
            Some(dir) => format!("{}/{}", dir, name),
            None => name,
        })
        .collect())
}

pub fn write_links_file(output_dir: &Path, xml: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(LINKS_FILE_NAME);
    fs::write(&path, xml)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_names() {
        let temp = TempDir::new().unwrap();
        let writer = HoldingsFileWriter::new(temp.path(), "rsl", "FRANCE_ISTEX", "journals").unwrap();
        assert_eq!(
            writer.file_name(0),
            "institutional_holdings_RSL_FRANCE_ISTEXJOURNALS-0.xml"
        );
    }

    #[test]
    fn test_documents_numbered_from_zero() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("google-scholar");
        let mut writer = HoldingsFileWriter::new(&output, "rsl", "FRANCE_ISTEX", "journals").unwrap();

        writer.write_document("<a/>").unwrap();
        let second = writer.write_document("<b/>").unwrap();

        assert_eq!(writer.written().len(), 2);
        assert!(second.ends_with("institutional_holdings_RSL_FRANCE_ISTEXJOURNALS-1.xml"));
        assert_eq!(fs::read_to_string(&second).unwrap(), "<b/>");

        fs::write(output.join("notes.txt"), "x").unwrap();
        let listed = list_holdings_files(&output).unwrap();
        assert_eq!(
            listed,
            vec![
                "google-scholar/institutional_holdings_RSL_FRANCE_ISTEXJOURNALS-0.xml",
                "google-scholar/institutional_holdings_RSL_FRANCE_ISTEXJOURNALS-1.xml",
            ]
        );
    }
}
