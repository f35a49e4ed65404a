//! The acting user and the roles the ledger recognizes.
//!
//! Identity itself is established by the authentication layer; this crate
//! only carries the resolved user id and role into the business rules.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full access.
    Admin,
    /// Finance: payables, receivables, investors.
    Financeiro,
    /// Purchasing.
    Compras,
    /// Sales.
    Vendas,
    /// Warehouse / stock keeping.
    Estoque,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Financeiro => "FINANCEIRO",
            Self::Compras => "COMPRAS",
            Self::Vendas => "VENDAS",
            Self::Estoque => "ESTOQUE",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "FINANCEIRO" => Ok(Self::Financeiro),
            "COMPRAS" => Ok(Self::Compras),
            "VENDAS" => Ok(Self::Vendas),
            "ESTOQUE" => Ok(Self::Estoque),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User ID.
    pub user_id: UserId,
    /// User's role.
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
