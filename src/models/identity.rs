//! Identidad de quien llama
//!
//! El rol se resuelve una sola vez en la frontera (token JWT) y el resto del
//! sistema consulta capacidades en lugar de volver a buscar en tablas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Rol de un usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Consumer,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Consumer => "consumer",
            Role::Driver => "driver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer" => Ok(Role::Consumer),
            "driver" => Ok(Role::Driver),
            other => Err(AppError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// Usuario autenticado con su capacidad ya resuelta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn consumer(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Consumer }
    }

    pub fn driver(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Driver }
    }

    pub fn consumer_id(&self) -> Option<Uuid> {
        (self.role == Role::Consumer).then_some(self.user_id)
    }

    pub fn driver_id(&self) -> Option<Uuid> {
        (self.role == Role::Driver).then_some(self.user_id)
    }
}
