use crate::errors::CacheError;
use super::table::CacheTable;

/// Magic bytes identifying a holdings cache file.
pub const MAGIC: &[u8; 4] = b"HLDC";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// Header size in bytes: magic(4) + version(2) + payload_len(8) = 14
pub const HEADER_SIZE: usize = 14;

/// Frame a payload with the cache file header.
///
/// Layout:
/// ```text
/// [HLDC: 4B] [version: 2B LE] [payload_len: 8B LE] [payload: bincode CacheTable]
/// ```
pub fn write_file(version: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Validate the header and return `(version, payload)`.
pub fn read_file(data: &[u8]) -> Result<(u16, &[u8]), CacheError> {
    if data.len() < HEADER_SIZE {
        return Err(CacheError::InvalidFileFormat(
            "File too small to be a holdings cache file".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(CacheError::InvalidFileFormat(
            "Invalid magic bytes: not a holdings cache file".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CacheError::UnsupportedVersion(version));
    }

    let payload_len = u64::from_le_bytes(data[6..HEADER_SIZE].try_into().map_err(|_| {
        CacheError::InvalidFileFormat("Failed to read payload length".into())
    })?);

    let available = (data.len() - HEADER_SIZE) as u64;
    if available < payload_len {
        return Err(CacheError::InvalidFileFormat(format!(
            "File truncated: expected {payload_len} bytes of payload, got {available}"
        )));
    }

    let end = HEADER_SIZE + payload_len as usize;
    Ok((version, &data[HEADER_SIZE..end]))
}

/// CacheTable → bincode → framed bytes
pub fn encode_table(table: &CacheTable) -> Result<Vec<u8>, CacheError> {
    let payload = bincode::serialize(table)
        .map_err(|e| CacheError::Write(format!("Failed to serialize cache table: {e}")))?;
    Ok(write_file(CURRENT_VERSION, &payload))
}

/// Framed bytes → bincode → CacheTable
pub fn decode_table(data: &[u8]) -> Result<CacheTable, CacheError> {
    let (_version, payload) = read_file(data)?;
    bincode::deserialize(payload)
        .map_err(|e| CacheError::InvalidFileFormat(format!("Failed to deserialize cache table: {e}")))
}
