use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::WordlistError;
use crate::filter::FinalTokenSet;

/// Write one word per line, replacing `path` only once every line is on disk.
///
/// The words go to a temporary file next to the target which is then renamed
/// over it, so a failed run never leaves a truncated wordlist behind.
pub fn write_wordlist(path: &Path, words: &FinalTokenSet) -> Result<(), WordlistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        for word in words {
            writeln!(writer, "{}", word)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
