//! Modules for parsing/encoding torrent metainfo files of different versions.

pub mod v1;
