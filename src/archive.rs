use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};

use crate::error::{IoResultExt, Result};

/// gzip header metadata carried by every object archive
///
/// name is the entry basename (empty for commits), comment is the commit
/// message (empty for trees and blobs), mtime is unix seconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub name: String,
    pub mtime: u32,
    pub comment: String,
}

/// write an object archive: a single gzip member with header metadata
///
/// empty name/comment are omitted from the written header; writes are
/// last-writer-wins whole-file replacements.
pub fn write_archive(
    path: &Path,
    name: &str,
    mtime: u32,
    comment: Option<&str>,
    payload: &[u8],
) -> Result<()> {
    let file = File::create(path).with_path(path)?;

    let mut builder = GzBuilder::new().mtime(mtime);
    if !name.is_empty() {
        builder = builder.filename(name);
    }
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        builder = builder.comment(comment);
    }

    let mut encoder = builder.write(file, Compression::default());
    encoder.write_all(payload).with_path(path)?;
    // finish flushes the gzip trailer before the file handle drops
    encoder.finish().with_path(path)?;

    Ok(())
}

/// read an object archive back into (header, inflated payload)
pub fn read_archive(path: &Path) -> Result<(ArchiveHeader, Vec<u8>)> {
    let file = File::open(path).with_path(path)?;
    let mut decoder = GzDecoder::new(file);

    let mut payload = Vec::new();
    decoder.read_to_end(&mut payload).with_path(path)?;

    let header = match decoder.header() {
        Some(h) => ArchiveHeader {
            name: field_to_string(h.filename()),
            mtime: h.mtime(),
            comment: field_to_string(h.comment()),
        },
        None => ArchiveHeader::default(),
    };

    Ok((header, payload))
}

fn field_to_string(field: Option<&[u8]>) -> String {
    field
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}
