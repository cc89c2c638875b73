use std::borrow::Cow;

use serde_bencode::value::Value;

use super::*;
use crate::util;

impl File {
    fn extract_file(elem: Value) -> Result<File, TorrentFileError> {
        match elem {
            Value::Dict(mut dict) => Ok(File {
                length: Self::extract_file_length(&mut dict)?,
                path: Self::extract_file_path(&mut dict)?,
            }),
            _ => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"files\" contains a non-dictionary element.",
            ))),
        }
    }

    fn extract_file_length(dict: &mut Dictionary) -> Result<u64, TorrentFileError> {
        match dict.remove("length".as_bytes()) {
            Some(Value::Int(len)) => util::i64_to_u64(len),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"length\" does not map to an integer.",
            ))),
            None => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"length\" does not exist.",
            ))),
        }
    }

    fn extract_file_path(dict: &mut Dictionary) -> Result<String, TorrentFileError> {
        match dict.remove("path".as_bytes()) {
            Some(Value::List(list)) => {
                if list.is_empty() {
                    return Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                        "\"path\" maps to a 0-length list.",
                    )));
                }

                let mut components = Vec::with_capacity(list.len());
                for component in list {
                    match component {
                        Value::Bytes(bytes) => components.push(util::bytes_to_string(bytes)?),
                        _ => {
                            return Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                                "\"path\" contains a non-string element.",
                            )));
                        }
                    }
                }
                Ok(flatten_path(&components))
            }
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"path\" does not map to a list.",
            ))),
            None => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"path\" does not exist.",
            ))),
        }
    }
}

impl Torrent {
    /// Parse `bytes` and return the extracted `Torrent`.
    ///
    /// If `bytes` is missing any required field (e.g. `info`), or if any
    /// field maps to a value of an unexpected kind, then `Err(error)` will
    /// be returned. Nothing is returned partially: decoding either yields
    /// a complete `Torrent` or fails.
    pub fn read_from_bytes<B>(bytes: B) -> Result<Torrent, TorrentFileError>
    where
        B: AsRef<[u8]>,
    {
        Self::from_parsed(serde_bencode::from_bytes(bytes.as_ref())?)
    }

    fn from_parsed(parsed: Value) -> Result<Torrent, TorrentFileError> {
        if let Value::Dict(mut parsed) = parsed {
            // 2nd-level items
            let announce = Self::extract_announce(&mut parsed)?;
            let announce_list = Self::extract_announce_list(&mut parsed)?;
            let comment = Self::extract_string(&mut parsed, "comment")?;
            let created_by = Self::extract_string(&mut parsed, "created by")?;
            let encoding = Self::extract_string(&mut parsed, "encoding")?;
            let creation_date = Self::extract_creation_date(&mut parsed)?;

            match parsed.remove("info".as_bytes()) {
                Some(Value::Dict(info)) => {
                    // 3rd-level items. Extraction consumes a scratch copy so
                    // that the source dictionary survives verbatim for hash
                    // derivation.
                    let mut fields = info.clone();

                    let name = Self::extract_string(&mut fields, "name")?;
                    let files = match Self::extract_files(&mut fields)? {
                        Some(files) => files, // multiple file mode
                        None => vec![File {
                            length: Self::extract_single_file_length(&mut fields)?,
                            path: name.clone(),
                        }],
                    };

                    Ok(Torrent {
                        name,
                        announce,
                        announce_list,
                        piece_length: Self::extract_piece_length(&mut fields)?,
                        pieces: Self::extract_pieces(&mut fields)?,
                        files,
                        private: Self::extract_private(&mut fields)?,
                        comment,
                        created_by,
                        encoding,
                        creation_date,
                        info: Some(Value::Dict(info)),
                    })
                }
                Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                    "\"info\" is not a dictionary.",
                ))),
                None => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                    "\"info\" does not exist.",
                ))),
            }
        } else {
            Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "Torrent's top-level element is not a dictionary.",
            )))
        }
    }

    fn extract_announce(dict: &mut Dictionary) -> Result<String, TorrentFileError> {
        match dict.remove("announce".as_bytes()) {
            Some(Value::Bytes(url)) => util::bytes_to_string(url),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"announce\" does not map to a string.",
            ))),
            None => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"announce\" does not exist.",
            ))),
        }
    }

    fn extract_announce_list(dict: &mut Dictionary) -> Result<Vec<String>, TorrentFileError> {
        match dict.remove("announce-list".as_bytes()) {
            Some(Value::List(urls)) => {
                let mut announce_list = Vec::with_capacity(urls.len());
                for url in urls {
                    match url {
                        Value::Bytes(url) => announce_list.push(util::bytes_to_string(url)?),
                        _ => {
                            return Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                                "\"announce-list\" contains a non-string element.",
                            )));
                        }
                    }
                }
                Ok(announce_list)
            }
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"announce-list\" does not map to a list.",
            ))),
            // `announce-list` is an extension, its absence is fine
            None => Ok(Vec::new()),
        }
    }

    // Optional descriptive strings (`comment`, `created by`, ...):
    // absence yields an empty string, a value of the wrong kind is an error.
    fn extract_string(dict: &mut Dictionary, key: &'static str) -> Result<String, TorrentFileError> {
        match dict.remove(key.as_bytes()) {
            Some(Value::Bytes(bytes)) => util::bytes_to_string(bytes),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Owned(format!(
                "\"{}\" does not map to a string.",
                key
            )))),
            None => Ok(String::new()),
        }
    }

    fn extract_creation_date(dict: &mut Dictionary) -> Result<Option<Integer>, TorrentFileError> {
        match dict.remove("creation date".as_bytes()) {
            Some(Value::Int(timestamp)) => Ok(Some(timestamp)),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"creation date\" does not map to an integer.",
            ))),
            None => Ok(None),
        }
    }

    fn extract_private(dict: &mut Dictionary) -> Result<bool, TorrentFileError> {
        match dict.remove("private".as_bytes()) {
            Some(Value::Int(flag)) => Ok(flag == 1),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"private\" does not map to an integer.",
            ))),
            None => Ok(false),
        }
    }

    fn extract_piece_length(dict: &mut Dictionary) -> Result<u64, TorrentFileError> {
        match dict.remove("piece length".as_bytes()) {
            Some(Value::Int(len)) => util::i64_to_u64(len),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"piece length\" does not map to an integer.",
            ))),
            None => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"piece length\" does not exist.",
            ))),
        }
    }

    fn extract_pieces(dict: &mut Dictionary) -> Result<Vec<Piece>, TorrentFileError> {
        match dict.remove("pieces".as_bytes()) {
            Some(Value::Bytes(bytes)) => group_pieces(&bytes),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"pieces\" does not map to a sequence of bytes.",
            ))),
            None => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"pieces\" does not exist.",
            ))),
        }
    }

    fn extract_files(dict: &mut Dictionary) -> Result<Option<Vec<File>>, TorrentFileError> {
        match dict.remove("files".as_bytes()) {
            Some(Value::List(list)) => {
                if list.is_empty() {
                    return Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                        "\"files\" maps to an empty list.",
                    )));
                }

                let mut files = Vec::with_capacity(list.len());
                for file in list {
                    files.push(File::extract_file(file)?);
                }
                Ok(Some(files))
            }
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"files\" does not map to a list.",
            ))),
            None => Ok(None),
        }
    }

    // In single file mode `length` lives directly in `info`.
    fn extract_single_file_length(dict: &mut Dictionary) -> Result<u64, TorrentFileError> {
        match dict.remove("length".as_bytes()) {
            Some(Value::Int(len)) => util::i64_to_u64(len),
            Some(_) => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "\"length\" does not map to an integer.",
            ))),
            None => Err(TorrentFileError::MalformedTorrent(Cow::Borrowed(
                "Neither \"length\" nor \"files\" exists.",
            ))),
        }
    }
}
