/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and validation (HS256)
/// - [`middleware`]: Request identity (`AuthContext`) extracted from the
///   `Authorization` header
/// - [`authorization`]: Access control gate (role checks, effective
///   executive resolution)
///
/// # Example
///
/// ```no_run
/// use leadtrack_shared::auth::password::{hash_password, verify_password};
/// use leadtrack_shared::auth::jwt::{create_token, validate_token, Claims};
/// use leadtrack_shared::models::executive::ExecutiveRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(42, ExecutiveRole::Standard);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
