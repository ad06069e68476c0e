// LogSlice - core/export.rs
//
// JSON export of the fragment index.
// Core layer: writes to any Write trait object.

use crate::core::model::MarkupIndex;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export all indexed fragments as a JSON array of objects.
///
/// `export_path` is used only for error context; the caller owns the
/// actual file handling.
pub fn export_json<W: Write>(
    index: &MarkupIndex,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, index.fragments()).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(index.fragments().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Fragment, MarkupKind};
    use std::path::PathBuf;

    #[test]
    fn test_json_export() {
        let mut index = MarkupIndex::new();
        index.insert(Fragment {
            kind: MarkupKind::Json,
            start_line: 3,
            end_line: 3,
            raw_text: "{\"a\": 1}".to_string(),
        });

        let mut buf = Vec::new();
        let count = export_json(&index, &mut buf, &PathBuf::from("out.json")).unwrap();
        assert_eq!(count, 1);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"kind\": \"json\""));
        assert!(output.contains("\"start_line\": 3"));
    }

    #[test]
    fn test_empty_index_exports_empty_array() {
        let index = MarkupIndex::new();
        let mut buf = Vec::new();
        let count = export_json(&index, &mut buf, &PathBuf::from("out.json")).unwrap();
        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(buf).unwrap(), "[]");
    }
}
