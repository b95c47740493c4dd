use tracing::{info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, RegisteredUser},
        jwt::JwtKeys,
        password::{hash_password, verify_password, DUMMY_PASSWORD_HASH},
        repo_types::{NewUser, Role},
    },
    db::StoreError,
    error::AppError,
    state::AppState,
};

/// Creates an active account with the `USER` role.
pub async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
) -> Result<RegisteredUser, AppError> {
    if state.users.exists_by_email(email).await? {
        warn!(email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(password, &state.config.password)?;
    let new_user = NewUser {
        name: name.to_owned(),
        email: email.to_owned(),
        password_hash,
        roles: vec![Role::User],
    };

    let user = match state.users.insert(new_user).await {
        Ok(user) => user,
        Err(StoreError::Conflict(constraint)) => {
            warn!(email, %constraint, "email registered concurrently");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(RegisteredUser {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}

/// Verifies credentials and issues a bearer token.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<AuthResponse, AppError> {
    let Some(user) = state.users.find_by_email(email).await? else {
        // same hashing work as a real account
        let _ = verify_password(password, DUMMY_PASSWORD_HASH);
        warn!(email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email, user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    if !user.active {
        warn!(email, user_id = user.id, "login to inactive account");
        return Err(AppError::InvalidCredentials);
    }

    let issued = JwtKeys::new(&state.config.jwt).issue(&user)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(issued)
}
