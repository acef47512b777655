use uuid::Uuid;

const SUFFIX_LEN: usize = 8;

pub fn generate_user_id() -> String {
    prefixed("user_")
}

pub fn generate_session_id() -> String {
    prefixed("sess_")
}

/// Keeps a caller-supplied id; a missing or empty one is replaced by `generate()`.
pub fn resolve(supplied: Option<String>, generate: fn() -> String) -> String {
    supplied.filter(|id| !id.is_empty()).unwrap_or_else(generate)
}

fn prefixed(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &hex[..SUFFIX_LEN])
}
