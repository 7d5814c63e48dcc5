//! Autenticación JWT
//!
//! `Caller` se extrae directamente del header Authorization: el token ya
//! trae el id y el rol, así que no se consulta ninguna tabla de usuarios.
//! Las rutas públicas simplemente no piden `Caller`.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    models::Caller,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

        let token = extract_token_from_header(auth_header)?;
        let claims = verify_token(token, &state.jwt)?;
        claims.caller()
    }
}
