//! Painless script sources used by the guarded-merge serializers. Each script
//! is a single line so it can be embedded directly in a bulk entry.

/// Replaces the stored document only when the incoming snapshot is at least
/// as recent. Ties favor the incoming document.
pub const ACCOUNT_MERGE: &str = "if ('create' == ctx.op) { ctx._source = params.account } else { if (ctx._source.containsKey('timestamp')) { if (ctx._source.timestamp <= params.account.timestamp) { ctx._source = params.account } } else { ctx._source = params.account } }";

/// Deletes the stored document only when the incoming timestamp is at least
/// as recent. Creation of a tombstone is suppressed.
pub const ACCOUNT_DELETE: &str = "if ('create' == ctx.op) { ctx.op = 'noop' } else { if (ctx._source.containsKey('timestamp')) { if (ctx._source.timestamp <= params.timestamp) { ctx.op = 'delete' } } else { ctx.op = 'delete' } }";

/// Overwrites only the status field, leaving the rest of the document as the
/// destination shard wrote it.
pub const TX_SET_STATUS: &str = "ctx._source.status = params.status";

/// Replaces the whole transaction document but keeps the stored status. Used
/// for same-shard token transfers whose final status may already have been
/// patched in.
pub const TX_PRESERVE_STATUS: &str = "if ('create' == ctx.op) { ctx._source = params.tx } else { def status = ctx._source.status; ctx._source = params.tx; ctx._source.status = status }";

/// Structural merge of one `token -> nonce -> balance` entry into the per
/// address collections document. A zero balance removes the key and deletes
/// the document once it holds nothing else; creation from a zero balance is
/// suppressed.
pub const COLLECTIONS_MERGE: &str = "if (('create' == ctx.op) && ('0' == params.value)) { ctx.op = 'noop' } else if ('0' != params.value) { if (!ctx._source.containsKey(params.col)) { ctx._source[params.col] = new HashMap() } ctx._source[params.col][params.nonce] = params.value } else { if (ctx._source.containsKey(params.col)) { ctx._source[params.col].remove(params.nonce); if (ctx._source[params.col].size() == 0) { ctx._source.remove(params.col) } if (ctx._source.size() == 0) { ctx.op = 'delete' } } }";

/// Rewrites the current owner and appends the previous ownership interval to
/// the history list.
pub const TOKEN_TRANSFER_OWNERSHIP: &str = "if (!ctx._source.containsKey('ownersHistory')) { ctx._source.ownersHistory = [params.elem] } else { ctx._source.ownersHistory.add(params.elem) } ctx._source.currentOwner = params.owner";

/// Adds or removes one address from the per-role address list under `roles`.
pub const TOKEN_ROLE_MERGE: &str = "if (!ctx._source.containsKey('roles')) { if (params.set) { ctx._source.roles = new HashMap(); ctx._source.roles[params.role] = [params.address] } } else if (!ctx._source.roles.containsKey(params.role)) { if (params.set) { ctx._source.roles[params.role] = [params.address] } } else { if (params.set) { if (!ctx._source.roles[params.role].contains(params.address)) { ctx._source.roles[params.role].add(params.address) } } else { ctx._source.roles[params.role].removeIf(a -> a == params.address) } }";

/// Replaces the attributes of an existing NFT document. The document is never
/// created by this patch.
pub const NFT_UPDATE_ATTRIBUTES: &str = "if ('create' == ctx.op) { ctx.op = 'noop' } else { ctx._source.data.attributes = params.attributes }";

/// Appends URIs to an existing NFT document. The document is never created by
/// this patch.
pub const NFT_ADD_URIS: &str = "if ('create' == ctx.op) { ctx.op = 'noop' } else { if (ctx._source.data.containsKey('uris')) { ctx._source.data.uris.addAll(params.uris) } else { ctx._source.data.uris = params.uris } ctx._source.data.nonEmptyURIs = true }";

/// Commutative usage counter increment, safe under replay from any shard.
pub const TAG_COUNT_INCREMENT: &str = "ctx._source.count += params.count";

/// Timestamp-guarded replacement of a delegator document.
pub const DELEGATOR_MERGE: &str = "if ('create' == ctx.op) { ctx._source = params.delegator } else { if (ctx._source.containsKey('timestamp')) { if (ctx._source.timestamp <= params.delegator.timestamp) { ctx._source = params.delegator } } else { ctx._source = params.delegator } }";
