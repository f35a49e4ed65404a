//! Stock ledger types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductType {
    /// Raw material.
    Mp,
    /// Finished good.
    Pa,
    /// Service; never moves stock.
    Servico,
}

impl ProductType {
    /// Returns the string representation of the product type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp => "MP",
            Self::Pa => "PA",
            Self::Servico => "SERVICO",
        }
    }

    /// Returns true if the product has a stock balance.
    #[must_use]
    pub const fn moves_stock(self) -> bool {
        !matches!(self, Self::Servico)
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock movement type.
///
/// IN and OUT quantities are unsigned; the type carries the direction.
/// ADJUST quantities are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Stock in.
    In,
    /// Stock out.
    Out,
    /// Signed manual adjustment.
    Adjust,
}

impl MovementType {
    /// Returns the string representation of the movement type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Adjust => "ADJUST",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What produced a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferenceType {
    /// Purchase order receipt.
    Purchase,
    /// Sales order delivery.
    Sale,
    /// Manual adjustment.
    Manual,
}

impl ReferenceType {
    /// Returns the string representation of the reference type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "PURCHASE",
            Self::Sale => "SALE",
            Self::Manual => "MANUAL",
        }
    }
}

/// Manual adjustment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentType {
    /// Damage; requires a photo.
    Avaria,
    /// Inventory count correction.
    Inventario,
}

impl AdjustmentType {
    /// Returns the string representation of the adjustment type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avaria => "AVARIA",
            Self::Inventario => "INVENTARIO",
        }
    }
}

/// A stock movement ready to be appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockMovement {
    /// Product moved.
    pub product_id: Uuid,
    /// IN, OUT or ADJUST.
    pub movement_type: MovementType,
    /// Quantity (unsigned for IN/OUT, signed for ADJUST).
    pub quantity: Decimal,
    /// Producing record type.
    pub reference_type: ReferenceType,
    /// Producing record ID, if any.
    pub reference_id: Option<Uuid>,
    /// Unit cost for purchase receipts.
    pub unit_cost: Option<Decimal>,
    /// Free-form note.
    pub note: Option<String>,
}

impl NewStockMovement {
    /// Effect of this movement on the balance.
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        super::StockService::signed_effect(self.movement_type, self.quantity)
    }
}

/// Input for a manual adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentInput {
    /// Product adjusted.
    pub product_id: Uuid,
    /// AVARIA or INVENTARIO.
    #[serde(rename = "type")]
    pub adjustment_type: AdjustmentType,
    /// Signed, non-zero quantity.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
    /// Why the adjustment was made.
    pub reason: String,
    /// Photo reference; required for AVARIA.
    pub photo: Option<String>,
}

/// A purchase order line being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptLine {
    /// Product received.
    pub product_id: Uuid,
    /// Product type; services are skipped.
    pub product_type: ProductType,
    /// Quantity received.
    pub quantity: Decimal,
    /// Unit price paid, recorded as the movement's unit cost.
    pub unit_cost: Decimal,
}

/// A sales order line being delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryLine {
    /// Product delivered.
    pub product_id: Uuid,
    /// Product name, for error messages.
    pub product_name: String,
    /// Product type; services are skipped.
    pub product_type: ProductType,
    /// Quantity delivered.
    pub quantity: Decimal,
}
