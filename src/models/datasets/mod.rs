pub mod accounts;
pub mod logs;
pub mod tokens;
pub mod transactions;

pub(crate) fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
