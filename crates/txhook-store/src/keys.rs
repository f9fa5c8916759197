//! Key encoding utilities.
//!
//! Keys are the raw UTF-8 bytes of the transaction id, so byte order matches
//! string order.

use txhook_core::TransactionId;

/// Create a transaction key from a transaction id.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_key_is_utf8_bytes() {
        let id = TransactionId::parse("tx-é1").unwrap();
        let key = transaction_key(&id);
        assert_eq!(key, "tx-é1".as_bytes());
    }

    #[test]
    fn distinct_ids_give_distinct_keys() {
        let a = TransactionId::parse("tx1").unwrap();
        let b = TransactionId::parse("tx10").unwrap();
        assert_ne!(transaction_key(&a), transaction_key(&b));
    }
}
