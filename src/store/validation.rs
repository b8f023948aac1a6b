use crate::error::IndexError;

/// Validate and lowercase an address. Every `Gateway` method normalises
/// its address/hash inputs through here before building SQL.
pub fn normalize_address(field: &str, value: &str) -> Result<String, IndexError> {
    if is_address_shape(value) {
        Ok(value.to_lowercase())
    } else {
        Err(IndexError::validation(field, value))
    }
}

pub fn normalize_hash(field: &str, value: &str) -> Result<String, IndexError> {
    if is_hash_shape(value) {
        Ok(value.to_lowercase())
    } else {
        Err(IndexError::validation(field, value))
    }
}

fn is_address_shape(s: &str) -> bool {
    s.starts_with("0x") && s.len() == 42 && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn is_hash_shape(s: &str) -> bool {
    s.starts_with("0x") && s.len() == 66 && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// uint256 values travel through the store as decimal-string TEXT to
/// avoid truncating 256-bit precision; this just confirms the value is
/// a well-formed non-negative base-10 integer before it is bound into
/// a query.
pub fn normalize_uint256(field: &str, value: &str) -> Result<String, IndexError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value.to_string())
    } else {
        Err(IndexError::validation(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_lowercases_well_formed_address() {
        let addr = "0xABCDEF0000000000000000000000000000000a";
        assert_eq!(normalize_address("owner", addr).unwrap(), addr.to_lowercase());
    }

    #[test]
    fn rejects_short_address() {
        assert!(normalize_address("owner", "0x123").is_err());
    }

    #[test]
    fn rejects_hash_that_is_address_shaped() {
        let addr = "0x1111111111111111111111111111111111111111";
        assert!(normalize_hash("txHash", addr).is_err());
    }

    #[test]
    fn accepts_well_formed_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(normalize_hash("txHash", &hash).unwrap(), hash.to_lowercase());
    }

    #[test]
    fn uint256_rejects_negative_and_non_numeric() {
        assert!(normalize_uint256("value", "-1").is_err());
        assert!(normalize_uint256("value", "not-a-number").is_err());
        assert!(normalize_uint256("value", "").is_err());
    }

    #[test]
    fn uint256_accepts_large_decimal_string() {
        let huge = "1".repeat(70);
        assert_eq!(normalize_uint256("value", &huge).unwrap(), huge);
    }
}
