// Integration test utilities and common code
// WHY: every corpus test needs a throwaway directory of play pages and a way to find their outputs

#![allow(dead_code)]

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary corpus directory holding HTML play pages
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Write a play page under the corpus root
    pub fn create_play_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write play file");
        file_path
    }

    /// Write the tab-separated sources listing and return its path
    pub fn create_sources_file(&self, rows: &[(&str, &str)]) -> PathBuf {
        let listing: String = rows
            .iter()
            .map(|(name, url)| format!("{name}\t{url}\tMOLIÈRE\t1656\n"))
            .collect();
        let path = self.root_path.join("sources.tsv");
        fs::write(&path, listing).expect("Failed to write sources file");
        path
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root_path.join("tei")
    }

    /// Output written for `source` with the given extension
    pub fn output_path<P: AsRef<Path>>(&self, source: P, extension: &str) -> PathBuf {
        let stem = source
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        self.out_dir().join(format!("{stem}.{extension}"))
    }

    pub fn read_output<P: AsRef<Path>>(&self, source: P, extension: &str) -> Result<String, std::io::Error> {
        fs::read_to_string(self.output_path(source, extension))
    }

    /// Write a truncated TEI output, as left by an interrupted run
    pub fn create_partial_output<P: AsRef<Path>>(&self, source: P) -> PathBuf {
        let path = self.output_path(source, "xml");
        fs::create_dir_all(self.out_dir()).expect("Failed to create output directory");
        fs::write(&path, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<TEI>\n").expect("Failed to write partial output");
        path
    }
}

/// Split a page into the lines the extractor expects
pub fn page_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

/// Panic with the parser position if `xml` is not well-formed
pub fn assert_well_formed(xml: &str, context: &str) {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("{}: malformed XML at byte {}: {}", context, reader.buffer_position(), e),
        }
    }
}
