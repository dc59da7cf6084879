use chrono::Utc;

/// Reserved prefix marking a resource code as not-yet-real: the record was
/// created locally while offline and has no server identity until the
/// reconciliation engine promotes it.
pub const TEMP_CODE_PREFIX: &str = "TEMP-";

const TEMP_ID_PREFIX: &str = "offline-resource-";

/// Generate a temporary resource code. The millisecond timestamp suffix keeps
/// codes unique within a single local store.
pub fn generate_temp_code() -> String {
    format!("{}{}", TEMP_CODE_PREFIX, Utc::now().timestamp_millis())
}

/// Generate the matching temporary record id.
pub fn generate_temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, uuid::Uuid::new_v4())
}

pub fn is_temp_code(code: &str) -> bool {
    code.starts_with(TEMP_CODE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_codes_carry_the_reserved_prefix() {
        let code = generate_temp_code();
        assert!(is_temp_code(&code));
        assert!(code.len() > TEMP_CODE_PREFIX.len());
    }

    #[test]
    fn backend_codes_are_not_temporary() {
        assert!(!is_temp_code("AF-000123"));
        assert!(!is_temp_code(""));
    }
}
