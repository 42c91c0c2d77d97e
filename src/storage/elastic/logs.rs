use crate::models::datasets::logs::Logs;
use crate::models::errors::SerializeError;
use crate::storage::BufferSlice;

use super::{index_meta, marshal};

/// Raw log documents, keyed by the hash of the operation they belong to.
pub fn serialize_logs(
    logs: &[Logs],
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for log in logs {
        buffer.put_data(&index_meta(index, &log.id), &marshal(log, index)?)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LOGS_INDEX;
    use crate::models::datasets::logs::EventDoc;
    use crate::storage::DEFAULT_MAX_BULK_SIZE;

    #[test]
    fn log_documents_are_plain_indexed_by_hash() {
        let logs = vec![Logs {
            id: "aabb".to_string(),
            address: "616263".to_string(),
            events: vec![EventDoc {
                address: "616263".to_string(),
                identifier: "MECTTransfer".to_string(),
                topics: vec!["dG9rZW4=".to_string()],
                data: String::new(),
                order: 0,
            }],
            timestamp: 1234,
            original_tx_hash: String::new(),
        }];
        let mut buffer = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();

        serialize_logs(&logs, &mut buffer, LOGS_INDEX).unwrap();

        let out = &buffer.buffers()[0];
        assert!(out.contains(r#""index":{"_id":"aabb","_index":"logs"}"#));
        assert!(out.contains(r#""identifier":"MECTTransfer""#));
        // the internal id never leaks into the document body
        assert!(!out.contains(r#""id":"aabb""#));
    }
}
