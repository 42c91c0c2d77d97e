use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::interface::AddressCodec;
use crate::models::datasets::accounts::TokenMetaData;

const IPFS_URL: &str = "https://ipfs.io/ipfs/";
const IPFS_NO_SECURE_PREFIX: &str = "ipfs://";
const DWEB_PREFIX_URL: &str = "https://dweb.link/ipfs";
const PINATA_CLOUD: &str = ".pinata.cloud/ipfs";
const SECURE_URL: &str = "https://";

const TAGS_KEY: &str = "tags";
const METADATA_KEY: &str = "metadata";

/// The token metadata payload embedded in an NFT create event topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadataPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: Vec<u8>,
    #[serde(default)]
    pub royalties: u64,
    #[serde(default)]
    pub hash: Vec<u8>,
    #[serde(default)]
    pub uris: Vec<Vec<u8>>,
    #[serde(default)]
    pub attributes: Vec<u8>,
}

/// Projects the embedded creation payload into the database shape, pulling
/// tags and the metadata reference out of the attribute sub-language.
pub fn prepare_token_metadata(
    codec: &dyn AddressCodec,
    payload: &TokenMetadataPayload,
) -> TokenMetaData {
    let creator = if payload.creator.is_empty() {
        String::new()
    } else {
        codec.encode(&payload.creator)
    };

    TokenMetaData {
        name: payload.name.clone(),
        creator,
        royalties: payload.royalties,
        hash: hex::encode(&payload.hash),
        uris: payload
            .uris
            .iter()
            .map(|uri| String::from_utf8_lossy(uri).into_owned())
            .collect(),
        tags: extract_tags_from_attributes(&payload.attributes),
        attributes: if payload.attributes.is_empty() {
            String::new()
        } else {
            BASE64.encode(&payload.attributes)
        },
        meta_data: extract_metadata_from_attributes(&payload.attributes),
        non_empty_uris: payload.uris.iter().any(|uri| !uri.is_empty()),
        white_listed_storage: white_listed_storage(&payload.uris),
    }
}

/// Pulls the tag list out of a `tags:a,b,c;metadata:<ref>` attribute string.
pub fn extract_tags_from_attributes(attributes: &[u8]) -> Vec<String> {
    attribute_value(attributes, TAGS_KEY)
        .map(|value| {
            value
                .split(',')
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Pulls the metadata reference out of the attribute string.
pub fn extract_metadata_from_attributes(attributes: &[u8]) -> String {
    attribute_value(attributes, METADATA_KEY).unwrap_or_default().to_string()
}

fn attribute_value<'a>(attributes: &'a [u8], key: &str) -> Option<&'a str> {
    let attributes = std::str::from_utf8(attributes).ok()?;
    attributes.split(';').find_map(|part| {
        part.split_once(':')
            .filter(|(part_key, _)| *part_key == key)
            .map(|(_, value)| value)
    })
}

fn white_listed_storage(uris: &[Vec<u8>]) -> bool {
    let Some(first) = uris.first() else {
        return false;
    };
    let uri = String::from_utf8_lossy(first);

    uri.starts_with(IPFS_URL)
        || uri.starts_with(IPFS_NO_SECURE_PREFIX)
        || uri.starts_with(DWEB_PREFIX_URL)
        || (uri.contains(PINATA_CLOUD) && uri.starts_with(SECURE_URL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_and_metadata_extraction() {
        let attributes = b"tags:art,gallery,ferret;metadata:QmYcrfDrs3".to_vec();
        assert_eq!(
            extract_tags_from_attributes(&attributes),
            vec!["art", "gallery", "ferret"]
        );
        assert_eq!(extract_metadata_from_attributes(&attributes), "QmYcrfDrs3");
    }

    #[test]
    fn attributes_without_sublanguage_yield_nothing() {
        assert!(extract_tags_from_attributes(b"free form description").is_empty());
        assert_eq!(extract_metadata_from_attributes(b"free form description"), "");
        assert!(extract_tags_from_attributes(&[0xff, 0xfe]).is_empty());
    }

    #[test]
    fn white_listed_storage_detection() {
        assert!(white_listed_storage(&[b"https://ipfs.io/ipfs/QmYcrf".to_vec()]));
        assert!(white_listed_storage(&[b"ipfs://QmYcrf".to_vec()]));
        assert!(white_listed_storage(&[
            b"https://gateway.pinata.cloud/ipfs/QmYcrf".to_vec()
        ]));
        assert!(!white_listed_storage(&[b"https://example.com/1.png".to_vec()]));
        assert!(!white_listed_storage(&[]));
    }
}
