use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Negative denomination value: {denomination}")]
    NegativeDenomination { denomination: i32 },
    #[error("Bulk size limit must be greater than zero")]
    ZeroBulkSizeLimit,
}

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("Failed to marshal document for index {index}: {source}")]
    Marshal {
        index: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Bulk entry of {entry_size} bytes exceeds the buffer limit of {limit} bytes")]
    EntryTooLarge { entry_size: usize, limit: usize },
}
