//! `\u{1}Ole10Native` stream unwrapping
//!
//! An OLE Package object (a file dragged into a document) stores the file in
//! a single native-data stream:
//!
//! ```text
//! u32   total size of what follows
//! u16   flags (2 for embedded files)
//! cstr  label (display name)
//! cstr  original source path
//! u32   reserved (0x00030000)
//! u32   length of the temp path, NUL included
//! ..    temp path
//! u32   payload size
//! ..    payload
//! ```

/// An embedded file recovered from an `Ole10Native` stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePackage<'a> {
    /// Display name of the embedded file
    pub label: String,
    /// Path the file was embedded from
    pub source_path: String,
    /// The file contents
    pub payload: &'a [u8],
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn u16(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn cstr(&mut self) -> Option<String> {
        let rest = self.data.get(self.pos..)?;
        let nul = rest.iter().position(|&b| b == 0)?;
        self.pos += nul + 1;
        Some(String::from_utf8_lossy(&rest[..nul]).into_owned())
    }
}

/// Parse an `Ole10Native` stream
///
/// Returns `None` when the stream is truncated or its declared sizes do not
/// fit the data.
#[must_use]
pub fn parse(data: &[u8]) -> Option<NativePackage<'_>> {
    let mut reader = Reader { data, pos: 0 };

    let total = reader.u32()? as usize;
    if total > data.len().saturating_sub(4) {
        return None;
    }
    let _flags = reader.u16()?;
    let label = reader.cstr()?;
    let source_path = reader.cstr()?;
    let _reserved = reader.u32()?;
    let temp_len = reader.u32()? as usize;
    reader.take(temp_len)?;
    let payload_len = reader.u32()? as usize;
    let payload = reader.take(payload_len)?;

    Some(NativePackage {
        label,
        source_path,
        payload,
    })
}
