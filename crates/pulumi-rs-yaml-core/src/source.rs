/// Owns the source text for all YAML files in a program.
///
/// All `&'src str` references in the AST and evaluation layers borrow from a `SourceArena`.
/// This enforces the lifetime invariant: source outlives AST outlives evaluation.
pub struct SourceArena {
    files: Vec<SourceFile>,
}

/// A single source file with its name and contents.
pub struct SourceFile {
    name: String,
    text: String,
}

/// Index into `SourceArena::files`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

impl SourceArena {
    /// Creates a new, empty source arena.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Adds a file to the arena and returns its `FileId`.
    pub fn add_file(&mut self, name: String, text: String) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile { name, text });
        id
    }

    /// Returns the source text for the given file.
    pub fn text(&self, id: FileId) -> &str {
        &self.files[id.0 as usize].text
    }

    /// Returns the file name for the given file.
    pub fn name(&self, id: FileId) -> &str {
        &self.files[id.0 as usize].name
    }

    /// Returns the number of files in the arena.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns an iterator over all file IDs.
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> {
        (0..self.files.len() as u32).map(FileId)
    }
}

impl Default for SourceArena {
    fn default() -> Self {
        Self::new()
    }
}
