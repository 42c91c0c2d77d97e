//! Operation identifiers, statuses and index names shared across the pipeline.

// Built-in token operation identifiers, as they appear in event logs.
pub const MECT_TRANSFER: &str = "MECTTransfer";
pub const MECT_BURN: &str = "MECTBurn";
pub const MECT_LOCAL_MINT: &str = "MECTLocalMint";
pub const MECT_LOCAL_BURN: &str = "MECTLocalBurn";
pub const MECT_WIPE: &str = "MECTWipe";
pub const MECT_NFT_TRANSFER: &str = "MECTNFTTransfer";
pub const MECT_NFT_BURN: &str = "MECTNFTBurn";
pub const MECT_NFT_ADD_QUANTITY: &str = "MECTNFTAddQuantity";
pub const MECT_NFT_CREATE: &str = "MECTNFTCreate";
pub const MULTI_MECT_NFT_TRANSFER: &str = "MultiMECTNFTTransfer";
pub const MECT_NFT_ADD_URI: &str = "MECTNFTAddURI";
pub const MECT_NFT_UPDATE_ATTRIBUTES: &str = "MECTNFTUpdateAttributes";
pub const MECT_SET_ROLE: &str = "MECTSetRole";
pub const MECT_UNSET_ROLE: &str = "MECTUnSetRole";
pub const MECT_NFT_CREATE_ROLE_TRANSFER: &str = "MECTNFTCreateRoleTransfer";
pub const MECT_ROLE_NFT_CREATE: &str = "MECTRoleNFTCreate";

// Contract deployment identifiers.
pub const SC_DEPLOY: &str = "SCDeploy";
pub const SC_UPGRADE: &str = "SCUpgrade";

// Informative log identifiers carrying no state change.
pub const WRITE_LOG: &str = "writeLog";
pub const SIGNAL_ERROR: &str = "signalError";
pub const COMPLETED_TX_EVENT: &str = "completedTxEvent";

// Token types.
pub const FUNGIBLE_MECT: &str = "FungibleMECT";
pub const NON_FUNGIBLE_MECT: &str = "NonFungibleMECT";
pub const SEMI_FUNGIBLE_MECT: &str = "SemiFungibleMECT";
pub const META_MECT: &str = "MetaMECT";

// Transaction statuses.
pub const TX_STATUS_SUCCESS: &str = "success";
pub const TX_STATUS_PENDING: &str = "pending";
pub const TX_STATUS_INVALID: &str = "invalid";
pub const TX_STATUS_FAIL: &str = "fail";

// Payload conventions.
pub const AT_SEPARATOR: &str = "@";
pub const RELAYED_TX_PREFIX: &str = "relayedTx";
pub const VM_OK: &str = "ok";
pub const GAS_REFUND_FOR_RELAYER_MESSAGE: &str = "gas refund for relayer";
pub const REWARDS_OPERATION: &str = "reward";

/// The shard id reserved for the metachain.
pub const METACHAIN_SHARD_ID: u32 = 4294967295;

/// Return codes a failed VM execution can surface inside a smart contract
/// result payload or return message.
pub const VM_ERROR_CODES: [&str; 11] = [
    "function not found",
    "wrong signature for function",
    "contract not found",
    "user error",
    "out of gas",
    "account collision",
    "out of funds",
    "call stack overflow",
    "contract invalid",
    "execution failed",
    "upgrade failed",
];

// Index names the serializers write to.
pub const TRANSACTIONS_INDEX: &str = "transactions";
pub const OPERATIONS_INDEX: &str = "operations";
pub const SCRESULTS_INDEX: &str = "scresults";
pub const RECEIPTS_INDEX: &str = "receipts";
pub const LOGS_INDEX: &str = "logs";
pub const ACCOUNTS_INDEX: &str = "accounts";
pub const ACCOUNTS_MECT_INDEX: &str = "accountsmect";
pub const ACCOUNTS_HISTORY_INDEX: &str = "accountshistory";
pub const COLLECTIONS_INDEX: &str = "collections";
pub const TOKENS_INDEX: &str = "tokens";
pub const SC_DEPLOYS_INDEX: &str = "scdeploys";
pub const DELEGATORS_INDEX: &str = "delegators";
pub const TAGS_INDEX: &str = "tags";
