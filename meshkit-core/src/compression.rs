//! Transparent decompression of OBJ streams.

use std::io::{BufRead, BufReader};

use flate2::bufread::GzDecoder;

use crate::error::{MeshError, Result};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Magic numbers of compression formats that are recognized but not read.
const UNSUPPORTED: &[(&str, &[u8])] = &[
    ("zstd", &[0x28, 0xb5, 0x2f, 0xfd]),
    ("xz", &[0xfd, b'7', b'z', b'X', b'Z', 0x00]),
    ("zip", b"PK\x03\x04"),
    ("zlib", &[0x78, 0x01]),
    ("zlib", &[0x78, 0x5e]),
    ("zlib", &[0x78, 0x9c]),
    ("zlib", &[0x78, 0xda]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

/// Identify the compression of a stream from its first bytes.
pub fn detect(prefix: &[u8]) -> Result<Compression> {
    if prefix.starts_with(GZIP_MAGIC) {
        return Ok(Compression::Gzip);
    }
    if prefix.len() >= 4 && prefix.starts_with(b"BZh") && prefix[3].is_ascii_digit() {
        return Err(MeshError::UnsupportedFormat(
            "bzip2-compressed stream".to_string(),
        ));
    }
    if let Some((name, _)) = UNSUPPORTED
        .iter()
        .find(|(_, magic)| prefix.starts_with(magic))
    {
        return Err(MeshError::UnsupportedFormat(format!(
            "{name}-compressed stream"
        )));
    }
    Ok(Compression::None)
}

/// Wrap `reader` in a decoder if its content is compressed.
pub fn decompress<'a, R: BufRead + 'a>(mut reader: R) -> Result<Box<dyn BufRead + 'a>> {
    match detect(reader.fill_buf()?)? {
        Compression::Gzip => Ok(Box::new(BufReader::new(GzDecoder::new(reader)))),
        Compression::None => Ok(Box::new(reader)),
    }
}

/// Wrap `reader` in a gzip decoder, rejecting anything that is not gzip.
pub fn gunzip<'a, R: BufRead + 'a>(mut reader: R) -> Result<Box<dyn BufRead + 'a>> {
    match detect(reader.fill_buf()?)? {
        Compression::Gzip => Ok(Box::new(BufReader::new(GzDecoder::new(reader)))),
        Compression::None => Err(MeshError::UnsupportedFormat(
            "stream is not gzip-compressed".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression as Level};
    use std::io::{Read, Write};

    #[test]
    fn test_detect() {
        assert_eq!(detect(b"v 1 2 3").unwrap(), Compression::None);
        assert_eq!(detect(b"").unwrap(), Compression::None);
        assert_eq!(detect(&[0x1f, 0x8b, 0x08]).unwrap(), Compression::Gzip);
        assert!(matches!(
            detect(b"BZh91AY&SY"),
            Err(MeshError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect(&[0x28, 0xb5, 0x2f, 0xfd, 0x00]),
            Err(MeshError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_gzip_round_trip() {
        let mut encoder = GzEncoder::new(Vec::new(), Level::default());
        encoder.write_all(b"v 1 2 3\n").unwrap();
        let data = encoder.finish().unwrap();

        let mut text = String::new();
        decompress(data.as_slice())
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "v 1 2 3\n");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let mut text = String::new();
        decompress(&b"g a\n"[..]).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "g a\n");
        assert!(gunzip(&b"g a\n"[..]).is_err());
    }
}
