use crate::error::ExportError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes any analysis, mapping or diagnostics record as pretty JSON.
pub fn export_json<T, P>(value: &T, path: P) -> Result<(), ExportError>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;

    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })?;

    Ok(())
}
