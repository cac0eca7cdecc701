use crate::domain::model::Decision;
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 5] = ["content_type", "entry_uid", "title", "created_at", "action"];

/// The header is written even when there are no decisions.
pub fn write_decisions<W: Write>(writer: W, decisions: &[Decision]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for decision in decisions {
        csv_writer.serialize(decision)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_report<P: AsRef<Path>>(path: P, decisions: &[Decision]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    write_decisions(file, decisions)?;
    tracing::debug!(path = %path.display(), rows = decisions.len(), "Decision report written");
    Ok(())
}
