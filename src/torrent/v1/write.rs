use std::collections::HashMap;

use serde_bencode::value::Value;

use super::*;
use crate::util;

impl File {
    fn to_bencode_elem(&self) -> Result<Value, TorrentFileError> {
        let mut result: Dictionary = HashMap::new();

        result.insert(
            b"length".to_vec(),
            Value::Int(util::u64_to_i64(self.length)?),
        );
        result.insert(
            b"path".to_vec(),
            Value::List(
                partition_path(&self.path)
                    .into_iter()
                    .map(|component| Value::Bytes(component.into_bytes()))
                    .collect(),
            ),
        );

        Ok(Value::Dict(result))
    }
}

impl Torrent {
    /// Construct the `info` dict based on the fields of `self`.
    ///
    /// This is the exact dictionary the encoder embeds, so hand-built
    /// torrents can derive an info hash from it if they accept the caveat
    /// described in [`info_hash()`](#method.info_hash).
    ///
    /// Note that the `info` dict is constructed each time this method is
    /// called (i.e. the return value is not cached).
    pub fn construct_info(&self) -> Result<Value, TorrentFileError> {
        let mut info: Dictionary = HashMap::new();

        info.insert(
            b"piece length".to_vec(),
            Value::Int(util::u64_to_i64(self.piece_length)?),
        );
        info.insert(b"pieces".to_vec(), Value::Bytes(concat_pieces(&self.pieces)));
        if self.private {
            info.insert(b"private".to_vec(), Value::Int(1));
        }
        if !self.name.is_empty() {
            info.insert(b"name".to_vec(), Value::Bytes(self.name.clone().into_bytes()));
        }

        // Single file mode applies to exactly one file placed directly
        // under the root; it is detected structurally on every encode.
        if let [file] = self.files.as_slice() {
            if !file.path.contains('/') {
                info.insert(
                    b"name".to_vec(),
                    Value::Bytes(file.path.clone().into_bytes()),
                );
                info.insert(
                    b"length".to_vec(),
                    Value::Int(util::u64_to_i64(file.length)?),
                );
                return Ok(Value::Dict(info));
            }
        }

        let mut files = Vec::with_capacity(self.files.len());
        for file in &self.files {
            files.push(file.to_bencode_elem()?);
        }
        info.insert(b"files".to_vec(), Value::List(files));

        Ok(Value::Dict(info))
    }

    /// Encode `self` as bencode and return the result in a `Vec`.
    ///
    /// Optional fields that are unset (empty strings, empty
    /// `announce_list`, `None` creation date, `private == false`) are
    /// omitted from the output entirely. Field values themselves are not
    /// validated; well-formedness is the caller's responsibility.
    pub fn encode(&self) -> Result<Vec<u8>, TorrentFileError> {
        let mut result: Dictionary = HashMap::new();

        result.insert(
            b"announce".to_vec(),
            Value::Bytes(self.announce.clone().into_bytes()),
        );
        if !self.announce_list.is_empty() {
            result.insert(
                b"announce-list".to_vec(),
                Value::List(
                    self.announce_list
                        .iter()
                        .map(|url| Value::Bytes(url.clone().into_bytes()))
                        .collect(),
                ),
            );
        }
        if let Some(timestamp) = self.creation_date {
            result.insert(b"creation date".to_vec(), Value::Int(timestamp));
        }
        if !self.created_by.is_empty() {
            result.insert(
                b"created by".to_vec(),
                Value::Bytes(self.created_by.clone().into_bytes()),
            );
        }
        if !self.comment.is_empty() {
            result.insert(
                b"comment".to_vec(),
                Value::Bytes(self.comment.clone().into_bytes()),
            );
        }
        if !self.encoding.is_empty() {
            result.insert(
                b"encoding".to_vec(),
                Value::Bytes(self.encoding.clone().into_bytes()),
            );
        }

        result.insert(b"info".to_vec(), self.construct_info()?);

        Ok(serde_bencode::to_bytes(&Value::Dict(result))?)
    }
}


#[cfg(test)]
mod torrent_write_tests {
    use super::*;

    fn single_file_torrent() -> Torrent {
        Torrent {
            name: "sample".to_owned(),
            announce: "url".to_owned(),
            piece_length: 2,
            pieces: vec![[1; 20], [2; 20]],
            files: vec![File {
                length: 4,
                path: "sample.bin".to_owned(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn construct_info_single_file_mode() {
        let info = single_file_torrent().construct_info().unwrap();

        assert_eq!(
            info,
            Value::Dict(HashMap::from([
                // the sole file's path wins over the torrent's own name
                (b"name".to_vec(), Value::Bytes(b"sample.bin".to_vec())),
                (b"length".to_vec(), Value::Int(4)),
                (b"piece length".to_vec(), Value::Int(2)),
                (
                    b"pieces".to_vec(),
                    Value::Bytes([[1u8; 20], [2u8; 20]].concat()),
                ),
            ]))
        );
    }

    #[test]
    fn construct_info_single_file_in_subdirectory_is_not_single_file_mode() {
        let mut torrent = single_file_torrent();
        torrent.files[0].path = "dir1/sample.bin".to_owned();

        let info = torrent.construct_info().unwrap();

        assert_eq!(
            info,
            Value::Dict(HashMap::from([
                (b"name".to_vec(), Value::Bytes(b"sample".to_vec())),
                (
                    b"files".to_vec(),
                    Value::List(vec![Value::Dict(HashMap::from([
                        (b"length".to_vec(), Value::Int(4)),
                        (
                            b"path".to_vec(),
                            Value::List(vec![
                                Value::Bytes(b"dir1".to_vec()),
                                Value::Bytes(b"sample.bin".to_vec()),
                            ]),
                        ),
                    ]))]),
                ),
                (b"piece length".to_vec(), Value::Int(2)),
                (
                    b"pieces".to_vec(),
                    Value::Bytes([[1u8; 20], [2u8; 20]].concat()),
                ),
            ]))
        );
    }

    #[test]
    fn construct_info_multiple_files() {
        let mut torrent = single_file_torrent();
        torrent.files = vec![
            File {
                length: 2,
                path: "file1".to_owned(),
            },
            File {
                length: 2,
                path: "file2".to_owned(),
            },
        ];

        match torrent.construct_info().unwrap() {
            Value::Dict(info) => {
                assert!(info.contains_key("files".as_bytes()));
                assert!(!info.contains_key("length".as_bytes()));
                assert_eq!(
                    info.get("name".as_bytes()),
                    Some(&Value::Bytes(b"sample".to_vec()))
                );
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn construct_info_private() {
        let mut torrent = single_file_torrent();
        torrent.private = true;

        match torrent.construct_info().unwrap() {
            Value::Dict(info) => {
                assert_eq!(info.get("private".as_bytes()), Some(&Value::Int(1)));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn construct_info_not_private_omits_key() {
        match single_file_torrent().construct_info().unwrap() {
            Value::Dict(info) => assert!(!info.contains_key("private".as_bytes())),
            _ => unreachable!(),
        }
    }

    #[test]
    fn encode_ok() {
        let encoded = single_file_torrent().encode().unwrap();

        let expected = serde_bencode::to_bytes(&Value::Dict(HashMap::from([
            (b"announce".to_vec(), Value::Bytes(b"url".to_vec())),
            (
                b"info".to_vec(),
                single_file_torrent().construct_info().unwrap(),
            ),
        ])))
        .unwrap();

        assert_eq!(encoded, expected);
    }

    #[test]
    fn encode_with_optional_fields() {
        let mut torrent = single_file_torrent();
        torrent.announce_list = vec!["url1".to_owned(), "url2".to_owned()];
        torrent.comment = "no comment".to_owned();
        torrent.created_by = "torrentfile".to_owned();
        torrent.encoding = "UTF-8".to_owned();
        torrent.creation_date = Some(1_700_000_000);

        let encoded = torrent.encode().unwrap();

        let expected = serde_bencode::to_bytes(&Value::Dict(HashMap::from([
            (b"announce".to_vec(), Value::Bytes(b"url".to_vec())),
            (
                b"announce-list".to_vec(),
                Value::List(vec![
                    Value::Bytes(b"url1".to_vec()),
                    Value::Bytes(b"url2".to_vec()),
                ]),
            ),
            (b"comment".to_vec(), Value::Bytes(b"no comment".to_vec())),
            (
                b"created by".to_vec(),
                Value::Bytes(b"torrentfile".to_vec()),
            ),
            (b"creation date".to_vec(), Value::Int(1_700_000_000)),
            (b"encoding".to_vec(), Value::Bytes(b"UTF-8".to_vec())),
            (b"info".to_vec(), torrent.construct_info().unwrap()),
        ])))
        .unwrap();

        assert_eq!(encoded, expected);
    }

    #[test]
    fn encode_unset_fields_are_omitted() {
        let encoded = single_file_torrent().encode().unwrap();
        let parsed: Value = serde_bencode::from_bytes(&encoded).unwrap();

        match parsed {
            Value::Dict(dict) => {
                assert!(!dict.contains_key("announce-list".as_bytes()));
                assert!(!dict.contains_key("comment".as_bytes()));
                assert!(!dict.contains_key("created by".as_bytes()));
                assert!(!dict.contains_key("creation date".as_bytes()));
                assert!(!dict.contains_key("encoding".as_bytes()));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn encode_announce_is_always_present() {
        let torrent = Torrent {
            piece_length: 2,
            pieces: vec![[1; 20]],
            files: vec![File {
                length: 2,
                path: "file".to_owned(),
            }],
            ..Default::default()
        };

        let parsed: Value = serde_bencode::from_bytes(&torrent.encode().unwrap()).unwrap();
        match parsed {
            Value::Dict(dict) => {
                assert_eq!(
                    dict.get("announce".as_bytes()),
                    Some(&Value::Bytes(Vec::new()))
                );
            }
            _ => unreachable!(),
        }
    }
}
