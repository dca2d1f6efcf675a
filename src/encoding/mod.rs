// src/encoding/mod.rs
use encoding_rs::{DecoderResult, Encoding, SHIFT_JIS_INIT};
use std::{fs, path::Path};
use tracing::{debug, instrument};

use crate::error::{LoadError, Result};

/// The only encoding the source dataset is published in.
pub static LEGACY_ENCODING: &Encoding = &SHIFT_JIS_INIT;

/// Decode the whole buffer as Shift_JIS, refusing any malformed sequence.
///
/// The error carries the byte offset just past the first bad sequence so the
/// offending line can be located in the source file.
pub fn decode_legacy(bytes: &[u8]) -> Result<String> {
    let mut decoder = LEGACY_ENCODING.new_decoder_without_bom_handling();
    let mut text = String::with_capacity(
        decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .unwrap_or(bytes.len() * 3),
    );

    let mut offset = 0;
    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[offset..], &mut text, true);
        offset += read;
        match result {
            DecoderResult::InputEmpty => return Ok(text),
            DecoderResult::OutputFull => {
                let remaining = bytes.len() - offset;
                text.reserve(
                    decoder
                        .max_utf8_buffer_length_without_replacement(remaining)
                        .unwrap_or(remaining * 3)
                        .max(16),
                );
            }
            DecoderResult::Malformed(_, _) => {
                return Err(LoadError::Decode {
                    encoding: LEGACY_ENCODING.name(),
                    offset,
                })
            }
        }
    }
}

/// Read `src` fully, decode it and write the UTF-8 text to `dst`.
/// Returns the number of bytes written. Nothing is written when decoding fails.
#[instrument(level = "info", skip_all, fields(src = %src.as_ref().display(), dst = %dst.as_ref().display()))]
pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<usize> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let raw = fs::read(src).map_err(|e| LoadError::io(src, e))?;
    debug!(bytes = raw.len(), "read legacy source");

    let text = decode_legacy(&raw)?;
    fs::write(dst, text.as_bytes()).map_err(|e| LoadError::io(dst, e))?;
    debug!(bytes = text.len(), "wrote canonical text");
    Ok(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use anyhow::Result;
    use encoding_rs::SHIFT_JIS;
    use tempfile::tempdir;

    #[test]
    fn decodes_kanji_and_half_width_kana() -> Result<()> {
        let source = "13101,\"1000000\",\"ﾄｳｷｮｳﾄ\",\"東京都\"\r\n";
        let (bytes, _, had_errors) = SHIFT_JIS.encode(source);
        assert!(!had_errors);
        // half-width katakana is single-byte in the legacy encoding
        assert!(bytes.len() < source.len());

        assert_eq!(decode_legacy(&bytes)?, source);
        Ok(())
    }

    #[test]
    fn malformed_bytes_report_offset() {
        let err = decode_legacy(&[b'1', b',', 0xFF, b'2']).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        match err {
            LoadError::Decode { offset, .. } => assert_eq!(offset, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncated_lead_byte_is_rejected() {
        // 0x93 starts a double-byte kanji; the trail byte is missing
        let err = decode_legacy(&[b'a', 0x93]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn normalize_file_writes_utf8() -> Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("KEN_ALL.CSV");
        let dst = dir.path().join("KEN_ALL_UTF8.CSV");
        let (bytes, _, _) = SHIFT_JIS.encode("千代田区,ﾁﾖﾀﾞｸ\r\n");
        fs::write(&src, &bytes)?;

        let written = normalize_file(&src, &dst)?;
        let text = fs::read_to_string(&dst)?;
        assert_eq!(text, "千代田区,ﾁﾖﾀﾞｸ\r\n");
        assert_eq!(written, text.len());
        Ok(())
    }

    #[test]
    fn normalize_file_leaves_no_output_on_failure() -> Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("KEN_ALL.CSV");
        let dst = dir.path().join("KEN_ALL_UTF8.CSV");
        fs::write(&src, [0x41, 0xFD, 0x41])?;

        let err = normalize_file(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!dst.exists());
        Ok(())
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempdir().unwrap();
        let err = normalize_file(dir.path().join("nope.csv"), dir.path().join("out.csv"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
