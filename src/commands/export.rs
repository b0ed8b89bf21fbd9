// Export command - current note as a plain-text download

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::markup;
use crate::models::Note;
use crate::session::Session;

use super::{Notice, Outcome};

/// A file offered to the user for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportedFile {
    /// Write into `dir`, returning the full path
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// `# <title>`, a blank line, then the markup-stripped content
pub fn export_note(note: &Note) -> ExportedFile {
    ExportedFile {
        file_name: markup::export_file_name(&note.title),
        contents: format!("# {}\n\n{}", note.title, markup::text_content(&note.content)),
    }
}

impl Session {
    pub(crate) fn export_current(&self) -> Outcome {
        let Some(note) = self.store.current_note() else {
            warn!("export requested with no note selected");
            return Outcome::default().with_notice(Notice::error("Select a note to export."));
        };
        let file = export_note(note);
        debug!(id = note.id, file = %file.file_name, "exported note");
        Outcome {
            export: Some(file),
            ..Outcome::applied().with_notice(Notice::success("Note exported as .txt"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_strips_markup() {
        let note = Note {
            id: 1,
            title: "Trip Plan".into(),
            content: "<div>Pack <b>boots</b></div><div>Tea &amp; cake</div>".into(),
            is_pinned: false,
            last_modified: 0,
        };
        let file = export_note(&note);
        assert_eq!(file.file_name, "trip_plan.txt");
        assert_eq!(file.contents, "# Trip Plan\n\nPack bootsTea & cake");
    }

    #[test]
    fn test_blank_title_uses_default_name() {
        let file = export_note(&Note::new(1, 0));
        assert_eq!(file.file_name, "untitled_note.txt");
        assert_eq!(file.contents, "# \n\n");
    }

    #[test]
    fn test_save_to_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = ExportedFile { file_name: "a.txt".into(), contents: "# a\n\nx".into() };
        let path = file.save_to(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# a\n\nx");
    }
}
