//! JSON export of fetched incidents.
use std::io::{self, Write};

use crate::model::Incident;

/// Write `incidents` as one pretty-printed JSON array followed by a newline.
///
/// Callers pass the complete result set, so a failed fetch never leaves a
/// truncated array behind.
pub fn write_incidents<W: Write>(mut writer: W, incidents: &[Incident]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, incidents)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
