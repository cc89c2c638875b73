//! Module for `.torrent` metainfo files ([v1](http://bittorrent.org/beps/bep_0003.html))
//! related parsing/encoding.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_bencode::value::Value;
use sha1::{Digest, Sha1};

use crate::TorrentFileError;

mod read;
mod write;

/// Byte length of a single SHA1 piece hash.
pub const PIECE_STRING_LENGTH: usize = 20;

/// A piece in `pieces`--the SHA1 hash of a torrent block.
pub type Piece = [u8; PIECE_STRING_LENGTH];
/// The SHA1 hash of the bencoded `info` dictionary.
pub type InfoHash = [u8; PIECE_STRING_LENGTH];
/// Corresponds to a bencode dictionary of the underlying codec.
pub type Dictionary = HashMap<Vec<u8>, Value>;
/// Corresponds to a bencode integer. The underlying type is `i64`.
/// Technically a bencode integer has no size limit, but it is not
/// so in the current implementation. By using a type alias it is
/// easier to change the underlying type in the future.
pub type Integer = i64;

/// A file contained in a torrent.
///
/// Modeled after the specifications
/// in [BEP 3](http://bittorrent.org/beps/bep_0003.html).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct File {
    /// File size in bytes.
    pub length: u64,
    /// File path, relative to the torrent's root, with components
    /// joined by `/`. A path without any `/` denotes a file placed
    /// directly under the root.
    pub path: String,
}

/// Everything found in a *.torrent* file.
///
/// Modeled after the specifications
/// in [BEP 3](http://bittorrent.org/beps/bep_0003.html),
/// [BEP 12](http://bittorrent.org/beps/bep_0012.html), and
/// [BEP 27](http://bittorrent.org/beps/bep_0027.html).
///
/// A `Torrent` is obtained either from [`read_from_bytes()`] or by
/// filling in the fields of a [`default()`] value. Only torrents produced
/// by decoding carry the source `info` dictionary needed by
/// [`info_hash()`]; see that method for details.
///
/// [`read_from_bytes()`]: #method.read_from_bytes
/// [`default()`]: #method.default
/// [`info_hash()`]: #method.info_hash
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Torrent {
    /// If the torrent contains only 1 file then `name` is the file name.
    /// Otherwise it's the suggested root directory's name.
    pub name: String,
    /// URL of the torrent's primary tracker.
    pub announce: String,
    /// Backup tracker URLs, in order of preference. An empty list is
    /// valid and is omitted when encoding.
    pub announce_list: Vec<String>,
    /// Block size in bytes.
    pub piece_length: u64,
    /// SHA1 hashes of each block, in block order.
    pub pieces: Vec<Piece>,
    /// The files described by this torrent. A single entry whose path
    /// contains no `/` puts the torrent in single-file mode when encoding.
    pub files: Vec<File>,
    /// Whether the torrent is private as defined in
    /// [BEP 27](http://bittorrent.org/beps/bep_0027.html).
    pub private: bool,
    /// Free-form comment. Empty means unset and is omitted when encoding.
    pub comment: String,
    /// Name/version of the program that created the torrent. Empty means
    /// unset and is omitted when encoding.
    pub created_by: String,
    /// Character encoding declared for the torrent's strings. Empty means
    /// unset and is omitted when encoding.
    pub encoding: String,
    /// Creation time in Unix seconds. `None` means unset; it is never
    /// conflated with "explicitly set to the epoch".
    pub creation_date: Option<Integer>,
    /// The `info` dictionary exactly as decoded, kept so that
    /// [`info_hash()`](#method.info_hash) reproduces the digest any peer
    /// would derive from the same source bytes. `None` for torrents that
    /// were not produced by decoding.
    info: Option<Value>,
}

/// Join path `components` with `/`, trimming any trailing `/`.
///
/// This is the inverse of [`partition_path()`](fn.partition_path.html)
/// for paths without empty components.
pub fn flatten_path(components: &[String]) -> String {
    let path = components.join("/");
    path.trim_end_matches('/').to_owned()
}

/// Split `path` into its `/`-separated components.
///
/// Leading/trailing/doubled separators yield empty components, which are
/// preserved rather than filtered. Such paths do not round-trip through
/// [`flatten_path()`](fn.flatten_path.html).
pub fn partition_path(path: &str) -> Vec<String> {
    path.split('/').map(String::from).collect()
}

/// Group a flat piece blob into consecutive 20-byte hashes, in order.
///
/// A blob whose length is not a multiple of 20 is rejected instead of
/// silently truncated.
pub fn group_pieces(bytes: &[u8]) -> Result<Vec<Piece>, TorrentFileError> {
    if (bytes.len() % PIECE_STRING_LENGTH) != 0 {
        return Err(TorrentFileError::MalformedTorrent(Cow::Owned(format!(
            "\"pieces\"' length is not a multiple of {}.",
            PIECE_STRING_LENGTH,
        ))));
    }

    Ok(bytes
        .chunks_exact(PIECE_STRING_LENGTH)
        .map(|chunk| {
            let mut piece = [0; PIECE_STRING_LENGTH];
            piece.copy_from_slice(chunk);
            piece
        })
        .collect())
}

/// Concatenate `pieces` into one flat blob, preserving order.
pub fn concat_pieces(pieces: &[Piece]) -> Vec<u8> {
    pieces.iter().flatten().copied().collect()
}

impl File {
    /// Construct the `File`'s absolute path using `parent`.
    ///
    /// Caller has to ensure that `parent` is an absolute path.
    /// Otherwise an error would be returned.
    ///
    /// This method effectively appends/joins `self.path` to `parent`.
    pub fn absolute_path<P>(&self, parent: P) -> Result<PathBuf, TorrentFileError>
    where
        P: AsRef<Path>,
    {
        let result = parent.as_ref().join(&self.path);
        if result.is_absolute() {
            Ok(result)
        } else {
            Err(TorrentFileError::InvalidArgument(Cow::Borrowed(
                "Joined path is not absolute.",
            )))
        }
    }
}

impl Torrent {
    /// Total torrent size in bytes (i.e. sum of all files' sizes).
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|file| file.length).sum()
    }

    /// Check if this torrent is private as defined in
    /// [BEP 27](http://bittorrent.org/beps/bep_0027.html).
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Calculate the `Torrent`'s info hash as defined in
    /// [BEP 3](http://bittorrent.org/beps/bep_0003.html).
    ///
    /// The digest is computed over the re-encoded **source** `info`
    /// dictionary retained by decoding, not over a reconstruction from the
    /// typed fields. A reconstruction could drop unknown keys or change
    /// value representations and silently yield a digest no other peer
    /// agrees with.
    ///
    /// For a `Torrent` that was not produced by decoding there is no source
    /// document, and this method returns
    /// [`TorrentFileError::InvalidArgument`] instead of guessing. Callers
    /// that accept the reconstruction caveat can hash the result of
    /// [`construct_info()`](#method.construct_info) themselves.
    ///
    /// Note that the calculated info hash is not cached.
    /// So if this method is called multiple times, multiple
    /// calculations will be performed. To avoid that, the
    /// caller should cache the return value as needed.
    pub fn info_hash(&self) -> Result<InfoHash, TorrentFileError> {
        match self.info {
            Some(ref info) => {
                let encoded = serde_bencode::to_bytes(info)?;
                Ok(Sha1::digest(&encoded).into())
            }
            None => Err(TorrentFileError::InvalidArgument(Cow::Borrowed(
                "Torrent has no source info dictionary (it was not produced by decoding).",
            ))),
        }
    }

    /// Calculate the info hash and render it as lowercase hex.
    pub fn info_hash_hex(&self) -> Result<String, TorrentFileError> {
        let hash = self.info_hash()?;
        Ok(format!("{:02x}", hash.iter().format("")))
    }

    /// Calculate the `Torrent`'s magnet link as defined in
    /// [BEP 9](http://bittorrent.org/beps/bep_0009.html).
    ///
    /// The `dn` parameter is set to `self.name`.
    ///
    /// Either `self.announce` or all trackers in `self.announce_list` will
    /// be used, meaning that there might be multiple `tr` entries. We don't
    /// use both because per
    /// [BEP 12](http://bittorrent.org/beps/bep_0012.html), clients that
    /// understand `announce-list` ignore `announce` when the list is
    /// present.
    ///
    /// Like [`info_hash()`](#method.info_hash), this requires a `Torrent`
    /// that was produced by decoding.
    pub fn magnet_link(&self) -> Result<String, TorrentFileError> {
        let info_hash = self.info_hash_hex()?;
        let name = utf8_percent_encode(&self.name, NON_ALPHANUMERIC);

        if self.announce_list.is_empty() {
            Ok(format!(
                "magnet:?xt=urn:btih:{}&dn={}&tr={}",
                info_hash,
                name,
                utf8_percent_encode(&self.announce, NON_ALPHANUMERIC),
            ))
        } else {
            Ok(format!(
                "magnet:?xt=urn:btih:{}&dn={}{}",
                info_hash,
                name,
                self.announce_list.iter().format_with("", |url, f| f(
                    &format_args!("&tr={}", utf8_percent_encode(url, NON_ALPHANUMERIC))
                )),
            ))
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{}\n\
             -size: {} bytes",
            self.path, self.length
        )?;

        writeln!(f, "========================================")
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}.torrent", self.name)?;
        writeln!(f, "-announce: {}", self.announce)?;
        if !self.announce_list.is_empty() {
            writeln!(
                f,
                "-announce-list: [{}]",
                itertools::join(&self.announce_list, ", ")
            )?;
        }
        writeln!(f, "-size: {} bytes", self.total_size())?;
        writeln!(f, "-piece length: {} bytes", self.piece_length)?;
        if self.private {
            writeln!(f, "-private: 1")?;
        }
        if !self.comment.is_empty() {
            writeln!(f, "-comment: {}", self.comment)?;
        }
        if !self.created_by.is_empty() {
            writeln!(f, "-created by: {}", self.created_by)?;
        }
        if let Some(date) = self.creation_date {
            writeln!(f, "-creation date: {}", date)?;
        }
        if !self.encoding.is_empty() {
            writeln!(f, "-encoding: {}", self.encoding)?;
        }

        writeln!(f, "-files:")?;
        for (counter, file) in self.files.iter().enumerate() {
            writeln!(f, "[{}] {}", counter + 1, file)?;
        }

        writeln!(
            f,
            "-pieces: [{}]",
            self.pieces.iter().format_with(", ", |piece, f| {
                f(&format_args!("[{:02x}]", piece.iter().format("")))
            }),
        )
    }
}





#[cfg(test)]
mod torrent_display_tests {
    use super::*;

    #[test]
    fn torrent_display_ok() {
        let torrent = Torrent {
            name: "sample".to_owned(),
            announce: "url".to_owned(),
            piece_length: 2,
            pieces: vec![[1; 20]],
            files: vec![File {
                length: 4,
                path: "sample".to_owned(),
            }],
            ..Default::default()
        };

        assert_eq!(
            torrent.to_string(),
            format!(
                "sample.torrent\n\
                 -announce: url\n\
                 -size: 4 bytes\n\
                 -piece length: 2 bytes\n\
                 -files:\n\
                 [1] sample\n\
                 -size: 4 bytes\n\
                 ========================================\n\
                 \n\
                 -pieces: [[{}]]\n",
                "01".repeat(20)
            )
        );
    }

    #[test]
    fn torrent_display_with_optional_fields() {
        let torrent = Torrent {
            name: "sample".to_owned(),
            announce: "url".to_owned(),
            announce_list: vec!["url1".to_owned(), "url2".to_owned()],
            piece_length: 2,
            pieces: vec![[1; 20]],
            files: vec![File {
                length: 4,
                path: "sample".to_owned(),
            }],
            private: true,
            comment: "no comment".to_owned(),
            created_by: "torrentfile".to_owned(),
            encoding: "UTF-8".to_owned(),
            creation_date: Some(1_700_000_000),
            ..Default::default()
        };

        assert_eq!(
            torrent.to_string(),
            format!(
                "sample.torrent\n\
                 -announce: url\n\
                 -announce-list: [url1, url2]\n\
                 -size: 4 bytes\n\
                 -piece length: 2 bytes\n\
                 -private: 1\n\
                 -comment: no comment\n\
                 -created by: torrentfile\n\
                 -creation date: 1700000000\n\
                 -encoding: UTF-8\n\
                 -files:\n\
                 [1] sample\n\
                 -size: 4 bytes\n\
                 ========================================\n\
                 \n\
                 -pieces: [[{}]]\n",
                "01".repeat(20)
            )
        );
    }
}
