//! Container handling: `.twbx` packages are zip archives holding a
//! single `.twb` XML payload; `.twb` files are the raw XML itself.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::ExtractError;

/// Local file header magic for a zip archive.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Workbook XML text plus whether it came out of a zip package.
///
/// The flag decides how a downstream XML parse failure is classified:
/// raw input that is not XML is an unsupported format, while a packaged
/// `.twb` entry that fails to parse is a corrupt document.
pub(crate) fn workbook_xml(bytes: &[u8]) -> Result<(String, bool), ExtractError> {
    if bytes.starts_with(&ZIP_MAGIC) {
        read_twb_entry(bytes).map(|xml| (xml, true))
    } else {
        Ok((String::from_utf8_lossy(bytes).into_owned(), false))
    }
}

/// Extract the first `.twb` entry from a `.twbx` package.
///
/// There is usually exactly one; the first match wins, matching the
/// archive's central-directory order so repeated runs agree.
fn read_twb_entry(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut twb_index = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.name().to_ascii_lowercase().ends_with(".twb") {
            twb_index = Some(i);
            break;
        }
    }
    let Some(index) = twb_index else {
        return Err(ExtractError::NoWorkbookEntry);
    };

    let mut entry = archive.by_index(index)?;
    let mut raw = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut raw)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
