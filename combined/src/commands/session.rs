//! Session commands - login, logout, whoami.

use common::AppResult;

use super::AppContext;
use crate::cli::LoginArgs;

/// Shown by whoami when nobody is signed in
const UNKNOWN_USER: &str = "unknown";

/// Execute the login command
pub fn login(ctx: &AppContext, args: LoginArgs) -> AppResult<String> {
    if let Some(current) = ctx.auth.authenticated_username()? {
        return Ok(format!("Already signed in as {}", current));
    }

    let user = ctx.auth.login(&args.username, &args.password)?;
    Ok(format!("Signed in as {}", user.username))
}

/// Execute the logout command
pub fn logout(ctx: &AppContext) -> AppResult<String> {
    ctx.auth.logout()?;
    Ok("Signed out".to_string())
}

/// Execute the whoami command
pub fn whoami(ctx: &AppContext) -> AppResult<String> {
    Ok(ctx
        .auth
        .authenticated_username()?
        .unwrap_or_else(|| UNKNOWN_USER.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::{AppConfig, AppError, MemoryStore};

    use super::*;

    fn context() -> AppContext {
        AppContext::with_store(Arc::new(MemoryStore::new()), &AppConfig::default()).unwrap()
    }

    fn args(username: &str, password: &str) -> LoginArgs {
        LoginArgs {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_then_whoami() {
        let ctx = context();
        assert_eq!(whoami(&ctx).unwrap(), "unknown");

        assert_eq!(login(&ctx, args("admin", "admin123")).unwrap(), "Signed in as admin");
        assert_eq!(whoami(&ctx).unwrap(), "admin");
    }

    #[test]
    fn test_login_while_signed_in_is_a_no_op() {
        let ctx = context();
        login(&ctx, args("admin", "admin123")).unwrap();

        let output = login(&ctx, args("someone", "else")).unwrap();
        assert_eq!(output, "Already signed in as admin");
    }

    #[test]
    fn test_wrong_password() {
        let ctx = context();
        let result = login(&ctx, args("admin", "nope"));
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_logout() {
        let ctx = context();
        login(&ctx, args("admin", "admin123")).unwrap();
        logout(&ctx).unwrap();
        assert_eq!(whoami(&ctx).unwrap(), "unknown");
    }
}
