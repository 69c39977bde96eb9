//! CSV input templates: a header row listing the source fields a product
//! accepts, ready to be filled in and fed back through [`crate::read_records`].

use std::fs;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Renders the template as CSV text.
pub fn csv_template<S: AsRef<str>>(fields: &[S]) -> std::result::Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields.iter().map(AsRef::as_ref))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes the template to `path`.
pub fn write_csv_template<S: AsRef<str>>(path: &Path, fields: &[S]) -> Result<()> {
    let text = csv_template(fields).map_err(|source| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
