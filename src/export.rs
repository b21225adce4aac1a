use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use crate::store::Record;

pub const HEADER: [&str; 2] = ["comentario", "emocion"];

/// Serializes records as CSV: the `comentario,emocion` header followed by one
/// row per record, labels rendered with their export-context names.
pub fn write_csv<'a, W, I>(writer: W, records: I) -> io::Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER).map_err(csv_to_io)?;
    for record in records {
        csv_writer
            .write_record([record.text(), record.label().sentiment_name()])
            .map_err(csv_to_io)?;
    }
    csv_writer.flush()
}

/// Writes the dataset next to `target` and renames it into place, so a
/// failed export never leaves a truncated file at `target`.
pub fn write_atomically(target: &Path, records: &[Record]) -> io::Result<()> {
    let tmp_path = temp_sibling(target)?;
    let result = fs::File::create(&tmp_path)
        .and_then(|file| write_csv(io::BufWriter::new(file), records))
        .and_then(|_| fs::rename(&tmp_path, target));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Destination typed into the window's path field, with `.csv` added when
/// no extension was given. The field stands in for a native save dialog, so
/// there is no cancel: an unusable path surfaces as a failed export.
pub fn with_csv_extension(path: &str) -> PathBuf {
    let mut path = PathBuf::from(path);
    // `Path::extension` sees no extension on a bare ".csv" file name.
    let named_csv = path
        .file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    if path.extension().is_none() && !named_csv {
        path.set_extension("csv");
    }
    path
}

fn temp_sibling(target: &Path) -> io::Result<PathBuf> {
    let file_name = target.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{target:?} does not name a file"),
        )
    })?;
    let tmp_name = format!(".{}.{}.tmp", file_name.to_string_lossy(), process::id());
    Ok(target.with_file_name(tmp_name))
}

fn csv_to_io(err: csv::Error) -> io::Error {
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => io_err,
        other => io::Error::new(io::ErrorKind::Other, format!("{other:?}")),
    }
}
