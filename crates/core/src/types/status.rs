//! Status and role enums.
//!
//! Both are stored inside documents as lowercase Spanish strings (`"admin"`,
//! `"cliente"`, `"pendiente"`, ...) because that is what existing records
//! and the order-status form use.

use serde::{Deserialize, Serialize};

/// User permission level ("permisos").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Store administrator: manages products and order statuses.
    #[serde(rename = "admin")]
    Admin,
    /// Regular customer.
    #[default]
    #[serde(rename = "cliente")]
    Customer,
}

impl Role {
    /// Returns `true` for administrators.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire/storage name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "cliente",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order ("pedido") status shown in the sales view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Placed, not yet handled.
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    /// Being prepared.
    #[serde(rename = "procesando")]
    Processing,
    /// Handed to the carrier.
    #[serde(rename = "enviado")]
    Shipped,
    /// Received by the customer.
    #[serde(rename = "entregado")]
    Delivered,
    /// Cancelled by the store or the customer.
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in the order the sales view lists them.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Processing => "procesando",
            Self::Shipped => "enviado",
            Self::Delivered => "entregado",
            Self::Cancelled => "cancelado",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Processing => "Procesando",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregado",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_storage_names() {
        assert_eq!(serde_json::from_str::<Role>("\"admin\"").unwrap(), Role::Admin);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"cliente\"");
        assert_eq!(Role::Customer.to_string(), "cliente");
        assert!(Role::Admin.is_admin());
        assert!(!Role::default().is_admin());
    }

    #[test]
    fn test_order_status_parse_matches_storage_names() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
