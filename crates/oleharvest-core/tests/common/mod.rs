//! Common test fixtures: compound files and zip packages built in memory
#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use zip::unstable::write::FileOptionsExt;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

/// Compound file holding the given `(path, contents)` streams
pub fn compound(streams: &[(&str, &[u8])]) -> Vec<u8> {
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

/// An embedded OLE object as Word stores it, wrapping `streams`
pub fn ole_object(streams: &[(&str, &[u8])]) -> Vec<u8> {
    let mut all: Vec<(&str, &[u8])> = vec![
        ("/\u{1}CompObj", &b"\x01\x00\xFE\xFF\x03\x0A\x00\x00"[..]),
        ("/\u{3}ObjInfo", &b"\x00\x00\x03\x00\x04\x00"[..]),
    ];
    all.extend_from_slice(streams);
    compound(&all)
}

/// Zip archive with the given members, `encrypted` ones using ZipCrypto
pub fn zip_archive(members: &[(&str, &[u8], bool)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents, encrypted) in members {
        let options = if *encrypted {
            SimpleFileOptions::default().with_deprecated_encryption(b"secret")
        } else {
            SimpleFileOptions::default()
        };
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Minimal `.docx` package with the given embedded parts
pub fn docx(embedded: &[(&str, &[u8])]) -> Vec<u8> {
    let mut members: Vec<(&str, &[u8], bool)> = vec![
        ("[Content_Types].xml", &b"<Types/>"[..], false),
        ("word/document.xml", &b"<w:document/>"[..], false),
        ("word/media/image1.png", &b"\x89PNG\r\n\x1a\n"[..], false),
    ];
    members.extend(embedded.iter().map(|(name, bytes)| (*name, *bytes, false)));
    zip_archive(&members)
}

/// `\u{1}Ole10Native` stream wrapping `payload` under `label`
pub fn ole_native(label: &str, source_path: &str, payload: &[u8]) -> Vec<u8> {
    let temp_path = format!("C:\\Temp\\{label}\0");

    let mut body = Vec::new();
    body.extend_from_slice(&2u16.to_le_bytes());
    for text in [label, source_path] {
        body.extend_from_slice(text.as_bytes());
        body.push(0);
    }
    body.extend_from_slice(&0x0003_0000u32.to_le_bytes());
    body.extend_from_slice(&u32::try_from(temp_path.len()).unwrap().to_le_bytes());
    body.extend_from_slice(temp_path.as_bytes());
    body.extend_from_slice(&u32::try_from(payload.len()).unwrap().to_le_bytes());
    body.extend_from_slice(payload);

    let mut out = u32::try_from(body.len()).unwrap().to_le_bytes().to_vec();
    out.extend_from_slice(&body);
    out
}

/// File names in a report, in write order
pub fn file_names(report: &oleharvest_core::ExtractionReport) -> Vec<&str> {
    report
        .artifacts
        .iter()
        .map(|a| a.file_name.as_str())
        .collect()
}
