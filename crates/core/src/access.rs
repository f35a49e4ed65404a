//! Role checks for state-changing ledger operations.

use ledgerly_shared::{Actor, AppError, ErrorKind, Role};
use thiserror::Error;

/// State-changing operations guarded by a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create, update or delete a payable.
    ManagePayable,
    /// Pay a payable.
    PayPayable,
    /// Reverse a paid payable.
    ReversePayable,
    /// Toggle the delivery-cost flag on paid payables.
    FlagDeliveryCost,
    /// Create, update, delete or cancel a receivable.
    ManageReceivable,
    /// Receive (fully or partially) a receivable.
    ReceiveReceivable,
    /// Reverse a received receivable.
    ReverseReceivable,
    /// Create or cancel a purchase order.
    ManagePurchaseOrder,
    /// Receive a purchase order into stock.
    ReceivePurchaseOrder,
    /// Create or cancel a sales order.
    ManageSalesOrder,
    /// Deliver a sales order out of stock.
    DeliverSalesOrder,
    /// Record a manual stock adjustment.
    AdjustStock,
    /// Recompute a stock balance from its movements.
    ReconcileStock,
    /// Create, deactivate or remove investors.
    ManageInvestor,
}

impl Operation {
    /// Returns the roles allowed to perform this operation.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::ManagePayable
            | Self::PayPayable
            | Self::ReversePayable
            | Self::FlagDeliveryCost
            | Self::ManageReceivable
            | Self::ReceiveReceivable
            | Self::ReverseReceivable
            | Self::ManageInvestor => &[Role::Admin, Role::Financeiro],
            Self::ManagePurchaseOrder | Self::ReceivePurchaseOrder => &[Role::Admin, Role::Compras],
            Self::ManageSalesOrder | Self::DeliverSalesOrder => &[Role::Admin, Role::Vendas],
            Self::AdjustStock | Self::ReconcileStock => &[Role::Admin, Role::Estoque],
        }
    }

    /// Returns a short name for logs and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManagePayable => "manage_payable",
            Self::PayPayable => "pay_payable",
            Self::ReversePayable => "reverse_payable",
            Self::FlagDeliveryCost => "flag_delivery_cost",
            Self::ManageReceivable => "manage_receivable",
            Self::ReceiveReceivable => "receive_receivable",
            Self::ReverseReceivable => "reverse_receivable",
            Self::ManagePurchaseOrder => "manage_purchase_order",
            Self::ReceivePurchaseOrder => "receive_purchase_order",
            Self::ManageSalesOrder => "manage_sales_order",
            Self::DeliverSalesOrder => "deliver_sales_order",
            Self::AdjustStock => "adjust_stock",
            Self::ReconcileStock => "reconcile_stock",
            Self::ManageInvestor => "manage_investor",
        }
    }
}

/// The actor's role does not allow the operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Role {role} is not allowed to {}", .operation.as_str())]
pub struct AccessError {
    /// The actor's role.
    pub role: Role,
    /// The attempted operation.
    pub operation: Operation,
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        Self::new(ErrorKind::Forbidden, "ROLE_NOT_ALLOWED", err.to_string())
    }
}

/// Checks that the actor may perform the operation.
///
/// # Errors
///
/// Returns `AccessError` if the actor's role is not in the allowed set.
pub fn authorize(actor: &Actor, operation: Operation) -> Result<(), AccessError> {
    if operation.allowed_roles().contains(&actor.role) {
        Ok(())
    } else {
        Err(AccessError {
            role: actor.role,
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_shared::types::UserId;
    use rstest::rstest;

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::new(), role)
    }

    #[rstest]
    #[case(Role::Admin, Operation::PayPayable, true)]
    #[case(Role::Financeiro, Operation::ReversePayable, true)]
    #[case(Role::Compras, Operation::PayPayable, false)]
    #[case(Role::Compras, Operation::ReceivePurchaseOrder, true)]
    #[case(Role::Vendas, Operation::ReceivePurchaseOrder, false)]
    #[case(Role::Vendas, Operation::DeliverSalesOrder, true)]
    #[case(Role::Estoque, Operation::ReconcileStock, true)]
    #[case(Role::Estoque, Operation::ReceiveReceivable, false)]
    #[case(Role::Admin, Operation::AdjustStock, true)]
    fn test_role_matrix(#[case] role: Role, #[case] op: Operation, #[case] allowed: bool) {
        assert_eq!(authorize(&actor(role), op).is_ok(), allowed);
    }

    #[test]
    fn test_admin_allowed_everywhere() {
        let ops = [
            Operation::ManagePayable,
            Operation::FlagDeliveryCost,
            Operation::ManageReceivable,
            Operation::ManagePurchaseOrder,
            Operation::ManageSalesOrder,
            Operation::ManageInvestor,
        ];
        for op in ops {
            assert!(authorize(&actor(Role::Admin), op).is_ok(), "{}", op.as_str());
        }
    }

    #[test]
    fn test_access_error_maps_to_forbidden() {
        let err = authorize(&actor(Role::Vendas), Operation::PayPayable).unwrap_err();
        assert_eq!(err.to_string(), "Role VENDAS is not allowed to pay_payable");
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 403);
        assert_eq!(app.error_code(), "FORBIDDEN");
    }
}
