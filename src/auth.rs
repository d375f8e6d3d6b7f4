//! Session token access for the gateway.
//!
//! The dashboard never reaches into process-global state for credentials;
//! whoever constructs the gateway decides where tokens come from.

use std::env;

/// Environment variable consulted when no token is given explicitly.
pub const TOKEN_ENV_VAR: &str = "SURVEYDASH_TOKEN";

/// Source of the bearer credential attached to API requests.
///
/// Returning `None` is not an error; requests simply go out
/// unauthenticated and the server decides whether to reject them.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// A fixed token supplied up front (CLI flag or config file).
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl TokenProvider for StaticToken {
    fn current_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// A token read from the environment on every request, so a session
/// established mid-run is picked up without restarting.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvToken {
    fn current_token(&self) -> Option<String> {
        env::var(&self.var).ok().filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        let provider = StaticToken::new(Some("abc123".to_string()));
        assert_eq!(provider.current_token(), Some("abc123".to_string()));

        let empty = StaticToken::new(None);
        assert_eq!(empty.current_token(), None);
    }

    #[test]
    fn test_env_token_reads_variable() {
        let var = "SURVEYDASH_TEST_TOKEN_READS";
        env::set_var(var, "secret");
        let provider = EnvToken::new(var);
        assert_eq!(provider.current_token(), Some("secret".to_string()));
        env::remove_var(var);
    }

    #[test]
    fn test_env_token_absent_or_empty() {
        let var = "SURVEYDASH_TEST_TOKEN_ABSENT";
        env::remove_var(var);
        let provider = EnvToken::new(var);
        assert_eq!(provider.current_token(), None);

        env::set_var(var, "");
        assert_eq!(provider.current_token(), None);
        env::remove_var(var);
    }
}
