use crate::error::ExportError;
use crate::model::ElementSpaceMap;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One row per assigned element.
pub fn export_assignments_csv<P: AsRef<Path>>(
    map: &ElementSpaceMap,
    path: P,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(create(path.as_ref())?);
    write_assignments(&mut writer, map)?;
    finish(writer)
}

/// One row per GlobalId → value mapping.
pub fn export_mappings_csv<P: AsRef<Path>>(
    mappings: &BTreeMap<String, String>,
    path: P,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(create(path.as_ref())?);
    write_mappings(&mut writer, mappings)?;
    finish(writer)
}

pub fn write_assignments<W: Write>(
    writer: &mut csv::Writer<W>,
    map: &ElementSpaceMap,
) -> Result<(), ExportError> {
    writer.write_record(["Global ID", "Space ID", "Space Name", "Space Type", "Storey"])?;

    for (global_id, assignment) in map {
        writer.write_record([
            global_id.as_str(),
            assignment.space_id.as_str(),
            assignment.space_name.as_deref().unwrap_or_default(),
            assignment.space_type.as_str(),
            assignment.storey.as_deref().unwrap_or_default(),
        ])?;
    }

    Ok(())
}

pub fn write_mappings<W: Write>(
    writer: &mut csv::Writer<W>,
    mappings: &BTreeMap<String, String>,
) -> Result<(), ExportError> {
    writer.write_record(["Global ID", "Value"])?;

    for (global_id, value) in mappings {
        writer.write_record([global_id, value])?;
    }

    Ok(())
}

fn create(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|source| ExportError::FileCreate {
        path: path.to_path_buf(),
        source,
    })
}

fn finish<W: Write>(mut writer: csv::Writer<W>) -> Result<(), ExportError> {
    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })
}
