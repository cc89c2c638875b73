//! [`torrentfile`] is a library for parsing/encoding *.torrent* metainfo
//! files ([v1]). It is dual-licensed under [Apache 2.0] and [MIT].
//!
//! # *Quick Start*
//! Read a torrent ([v1]) and print it and its info hash.
//!
//! ```no_run
//! use torrentfile::torrent::v1::Torrent;
//!
//! # let bytes: Vec<u8> = Vec::new();
//! let torrent = Torrent::read_from_bytes(bytes).unwrap();
//! println!("{}", torrent);
//! println!("Info hash: {}", torrent.info_hash_hex().unwrap());
//! ```
//!
//! # *Overview*
//! - Only the metainfo document itself is modeled. [`torrentfile`] does not
//!   talk to trackers, read files from disk, or verify piece hashes against
//!   payload data.
//! - Bencoding/bdecoding of the generic value tree is delegated to the
//!   [`serde_bencode`] crate. This crate only handles the typed view on top:
//!   extracting known keys with checked conversions on decode, and
//!   assembling the canonical dictionaries on encode.
//! - Methods for parsing and encoding are bound to [`Torrent`] (i.e. they
//!   are "associated methods"). Helpers that are general enough (the path
//!   and piece codecs) are placed at the module level.
//!
//! ## Functionality
//! - torrent parsing/encoding => [`Torrent`]
//! - info hash and magnet link derivation => [`Torrent::info_hash()`]
//!
//! # *Correctness*
//! The [BitTorrent specification] is rather vague on certain points, so a
//! few decisions had to be made explicit:
//! - A bencode integer technically has no size limit, but here (as in
//!   [`serde_bencode`]) it is represented as `i64`. Sizes and lengths are
//!   exposed as `u64`; conversions are checked and a failure surfaces as
//!   [`TorrentFileError::FailedNumericConv`].
//! - A `pieces` value whose length is not a multiple of 20 is rejected
//!   instead of silently truncated.
//! - [`Torrent::info_hash()`] only works on torrents that were produced by
//!   decoding, so that the digest is derived from the source document
//!   instead of a possibly-divergent reconstruction. See its documentation.
//!
//! [`torrentfile`]: index.html
//! [Apache 2.0]: https://www.apache.org/licenses/LICENSE-2.0
//! [MIT]: https://opensource.org/licenses/MIT
//! [v1]: http://bittorrent.org/beps/bep_0003.html
//! [BitTorrent specification]: http://bittorrent.org/beps/bep_0003.html
//! [`Torrent`]: torrent/v1/struct.Torrent.html
//! [`Torrent::info_hash()`]: torrent/v1/struct.Torrent.html#method.info_hash

use std::borrow::Cow;
use thiserror::Error;

pub(crate) mod util;
pub mod torrent;

/// Custom error.
#[derive(Debug, Error)]
pub enum TorrentFileError {
    /// The bencode is found to be bad before we can parse the torrent,
    /// so the torrent may or may not be malformed. This wraps the error
    /// reported by the underlying bencode codec.
    #[error("malformed bencode: {0}")]
    MalformedBencode(#[from] serde_bencode::Error),

    /// Bencode is fine, but parsed data is gibberish, so we
    /// can't extract a torrent from it.
    #[error("malformed torrent: {0}")]
    MalformedTorrent(Cow<'static, str>),

    /// An invalid argument is passed to a function, or a method is
    /// called on a `Torrent` that can't support it.
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    /// Conversion between numeric types (e.g. `i64 -> u64`) has failed.
    #[error("numeric conversion failed: {0}")]
    FailedNumericConv(Cow<'static, str>),
}
