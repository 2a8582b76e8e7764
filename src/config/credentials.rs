use tracing::debug;

/// Shown in place of any password value echoed to the operator.
pub const MASK: &str = "********";

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Keys ending in "password" (any case) hold secrets.
pub fn is_password_key(key: &str) -> bool {
    key.to_lowercase().ends_with("password")
}

/// Value safe to display for `key`.
pub fn display_value<'a>(key: &str, value: &'a str) -> &'a str {
    if is_password_key(key) {
        MASK
    } else {
        value
    }
}
