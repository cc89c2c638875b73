use std::borrow::Cow;

use conv::ValueFrom;
use unicode_normalization::UnicodeNormalization;

use crate::TorrentFileError;

pub(crate) fn i64_to_u64(src: i64) -> Result<u64, TorrentFileError> {
    match u64::value_from(src) {
        Ok(n) => Ok(n),
        Err(_) => Err(TorrentFileError::FailedNumericConv(Cow::Owned(format!(
            "[{}] does not fit into u64.",
            src
        )))),
    }
}

pub(crate) fn u64_to_i64(src: u64) -> Result<i64, TorrentFileError> {
    match i64::value_from(src) {
        Ok(n) => Ok(n),
        Err(_) => Err(TorrentFileError::FailedNumericConv(Cow::Owned(format!(
            "[{}] does not fit into i64.",
            src
        )))),
    }
}

// Byte strings that are interpreted as text (announce urls, names, path
// components, ...) are NFC-normalized, so that info hashes computed over
// the retained source bytes are unaffected but the typed view is uniform.
pub(crate) fn bytes_to_string(bytes: Vec<u8>) -> Result<String, TorrentFileError> {
    match String::from_utf8(bytes) {
        Ok(string) => Ok(string.nfc().collect()),
        Err(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
            "Expected a UTF8 string, but got invalid bytes.",
        ))),
    }
}
