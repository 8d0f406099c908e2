//! Fixture builders shared by unit tests

use std::io::{Cursor, Write};
use std::path::Path;

/// Build an in-memory compound file holding the given `(path, contents)` streams
pub(crate) fn build_compound(streams: &[(&str, &[u8])]) -> Vec<u8> {
    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    for (path, contents) in streams {
        let path = Path::new(path);
        if let Some(parent) = path.parent() {
            if parent != Path::new("/") && !comp.exists(parent) {
                comp.create_storage_all(parent).unwrap();
            }
        }
        let mut stream = comp.create_stream(path).unwrap();
        stream.write_all(contents).unwrap();
        stream.flush().unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}

/// Build a `\u{5}SummaryInformation` property set with a code page property
/// followed by `VT_LPSTR` string properties encoded as UTF-8 bytes
pub(crate) fn build_summary_information(codepage: u16, props: &[(u32, &str)]) -> Vec<u8> {
    const FMTID_SUMMARY: [u8; 16] = [
        0xE0, 0x85, 0x9F, 0xF2, 0xF9, 0x4F, 0x68, 0x10, 0xAB, 0x91, 0x08, 0x00, 0x2B, 0x27, 0xB3,
        0xD9,
    ];

    let mut values: Vec<(u32, Vec<u8>)> = Vec::new();

    let mut cp = Vec::new();
    cp.extend_from_slice(&0x02u32.to_le_bytes());
    cp.extend_from_slice(&codepage.to_le_bytes());
    cp.extend_from_slice(&[0, 0]);
    values.push((0x01, cp));

    for (pid, text) in props {
        let mut value = Vec::new();
        value.extend_from_slice(&0x1Eu32.to_le_bytes());
        let len = u32::try_from(text.len() + 1).unwrap();
        value.extend_from_slice(&len.to_le_bytes());
        value.extend_from_slice(text.as_bytes());
        value.push(0);
        while value.len() % 4 != 0 {
            value.push(0);
        }
        values.push((*pid, value));
    }

    let table_len = 8 + values.len() * 8;
    let mut table = Vec::new();
    let mut body = Vec::new();
    for (pid, value) in &values {
        let offset = u32::try_from(table_len + body.len()).unwrap();
        table.extend_from_slice(&pid.to_le_bytes());
        table.extend_from_slice(&offset.to_le_bytes());
        body.extend_from_slice(value);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&0xFFFEu16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0x0002_0006u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&FMTID_SUMMARY);
    out.extend_from_slice(&48u32.to_le_bytes());

    let section_size = u32::try_from(table_len + body.len()).unwrap();
    out.extend_from_slice(&section_size.to_le_bytes());
    out.extend_from_slice(&u32::try_from(values.len()).unwrap().to_le_bytes());
    out.extend_from_slice(&table[..]);
    out.extend_from_slice(&body);
    out
}
