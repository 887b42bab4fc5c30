// WHY: a corpus run can be interrupted; an output counts as done only when it carries the
// closing TEI line, so partial files from a crash are regenerated on the next run

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::tei::TEI_END;

/// Output path for a source page: `<out_dir>/<stem>.<extension>`
pub fn generate_output_path(source_path: &Path, out_dir: &Path, extension: &str) -> PathBuf {
    let file_stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    out_dir.join(format!("{file_stem}.{extension}"))
}

/// TEI output path for a source page
pub fn generate_tei_path(source_path: &Path, out_dir: &Path) -> PathBuf {
    generate_output_path(source_path, out_dir, "xml")
}

/// True when the TEI output for `source_path` exists and ends with the closing line
pub fn output_is_complete(source_path: &Path, out_dir: &Path) -> bool {
    let tei_path = generate_tei_path(source_path, out_dir);
    fs::read_to_string(tei_path).is_ok_and(|content| content.ends_with(TEI_END))
}

/// Whether a page still needs converting
pub fn should_process_file(source_path: &Path, out_dir: &Path, overwrite_all: bool) -> bool {
    overwrite_all || !output_is_complete(source_path, out_dir)
}

/// Write `content` with a trailing newline, creating the output directory
///
/// # Example
/// ```no_run
/// use playtei::incremental::write_complete_output;
/// write_complete_output("tei/avare.xml", "<TEI>...</TEI>").expect("Failed to write output");
/// ```
pub fn write_complete_output<P: AsRef<Path>>(path: P, content: &str) -> Result<(), io::Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if content.ends_with('\n') {
        fs::write(path, content)
    } else {
        fs::write(path, format!("{content}\n"))
    }
}
