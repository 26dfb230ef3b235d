//! # Roles
//!
//! Staff roles and the actions each may perform at the register.
//!
//! ```text
//!                   Admin  Manager  Cashier  Kitchen
//!  TakeOrders         ✓       ✓        ✓
//!  ApplyDiscounts     ✓       ✓        ✓
//!  RedeemLoyalty      ✓       ✓        ✓
//!  Checkout           ✓       ✓        ✓
//!  CancelOrders       ✓       ✓
//!  AdvanceOrders      ✓       ✓                 ✓
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// A staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Cashier,
    Kitchen,
}

/// An action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Permission {
    TakeOrders,
    ApplyDiscounts,
    RedeemLoyalty,
    Checkout,
    CancelOrders,
    /// Move orders through Preparing and Ready.
    AdvanceOrders,
}

impl Role {
    /// Checks whether this role may perform `permission`.
    pub fn can(&self, permission: Permission) -> bool {
        use Permission::*;

        match self {
            Role::Admin | Role::Manager => true,
            Role::Cashier => matches!(
                permission,
                TakeOrders | ApplyDiscounts | RedeemLoyalty | Checkout
            ),
            Role::Kitchen => matches!(permission, AdvanceOrders),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Kitchen => "kitchen",
        };
        f.write_str(label)
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            "kitchen" => Ok(Role::Kitchen),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![
                    "admin".into(),
                    "manager".into(),
                    "cashier".into(),
                    "kitchen".into(),
                ],
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Permission::TakeOrders => "take orders",
            Permission::ApplyDiscounts => "apply discounts",
            Permission::RedeemLoyalty => "redeem loyalty points",
            Permission::Checkout => "check out orders",
            Permission::CancelOrders => "cancel orders",
            Permission::AdvanceOrders => "advance orders",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cashier_permissions() {
        let cashier = Role::Cashier;
        assert!(cashier.can(Permission::TakeOrders));
        assert!(cashier.can(Permission::Checkout));
        assert!(!cashier.can(Permission::CancelOrders));
        assert!(!cashier.can(Permission::AdvanceOrders));
    }

    #[test]
    fn test_kitchen_only_advances() {
        assert!(Role::Kitchen.can(Permission::AdvanceOrders));
        assert!(!Role::Kitchen.can(Permission::TakeOrders));
        assert!(!Role::Kitchen.can(Permission::Checkout));
    }

    #[test]
    fn test_managers_can_do_everything() {
        for permission in [
            Permission::TakeOrders,
            Permission::ApplyDiscounts,
            Permission::RedeemLoyalty,
            Permission::Checkout,
            Permission::CancelOrders,
            Permission::AdvanceOrders,
        ] {
            assert!(Role::Manager.can(permission));
            assert!(Role::Admin.can(permission));
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!(" kitchen ".parse::<Role>().unwrap(), Role::Kitchen);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::Cashier.to_string(), "cashier");
    }
}
