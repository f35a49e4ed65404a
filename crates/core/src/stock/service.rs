//! Stock ledger rules: movement effects, adjustments, deliveries and reconciliation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::StockError;
use super::types::{
    AdjustmentInput, AdjustmentType, DeliveryLine, MovementType, NewStockMovement, ReceiptLine,
    ReferenceType,
};

/// Stateless service for stock ledger rules.
pub struct StockService;

impl StockService {
    /// Effect of a movement on the balance.
    ///
    /// IN adds and OUT subtracts the magnitude; ADJUST adds its signed quantity.
    #[must_use]
    pub fn signed_effect(movement_type: MovementType, quantity: Decimal) -> Decimal {
        match movement_type {
            MovementType::In => quantity.abs(),
            MovementType::Out => -quantity.abs(),
            MovementType::Adjust => quantity,
        }
    }

    /// Recompute a balance from its full movement log, clamped at zero.
    #[must_use]
    pub fn reconcile<I>(movements: I) -> Decimal
    where
        I: IntoIterator<Item = (MovementType, Decimal)>,
    {
        let total: Decimal = movements
            .into_iter()
            .map(|(movement_type, quantity)| Self::signed_effect(movement_type, quantity))
            .sum();
        total.max(Decimal::ZERO)
    }

    /// Balance after applying `delta`; a missing balance starts at zero.
    #[must_use]
    pub fn apply(current: Option<Decimal>, delta: Decimal) -> Decimal {
        current.unwrap_or(Decimal::ZERO) + delta
    }

    /// Validate a manual adjustment and build its paired ADJUST movement.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero quantity, a blank reason, or a
    /// damage adjustment without a photo.
    pub fn plan_adjustment(input: &AdjustmentInput) -> Result<NewStockMovement, StockError> {
        if input.quantity.is_zero() {
            return Err(StockError::ZeroQuantity);
        }
        if input.reason.trim().is_empty() {
            return Err(StockError::ReasonRequired);
        }
        let has_photo = input.photo.as_deref().is_some_and(|p| !p.trim().is_empty());
        if input.adjustment_type == AdjustmentType::Avaria && !has_photo {
            return Err(StockError::PhotoRequired);
        }

        Ok(NewStockMovement {
            product_id: input.product_id,
            movement_type: MovementType::Adjust,
            quantity: input.quantity,
            reference_type: ReferenceType::Manual,
            reference_id: None,
            unit_cost: None,
            note: Some(format!(
                "{}: {}",
                input.adjustment_type.as_str(),
                input.reason.trim()
            )),
        })
    }

    /// Build the IN movements for receiving a purchase order.
    ///
    /// Services are skipped.
    #[must_use]
    pub fn plan_purchase_receipt(order_id: Uuid, lines: &[ReceiptLine]) -> Vec<NewStockMovement> {
        lines
            .iter()
            .filter(|line| line.product_type.moves_stock())
            .map(|line| NewStockMovement {
                product_id: line.product_id,
                movement_type: MovementType::In,
                quantity: line.quantity,
                reference_type: ReferenceType::Purchase,
                reference_id: Some(order_id),
                unit_cost: Some(line.unit_cost),
                note: None,
            })
            .collect()
    }

    /// Check availability for every physical line and build the OUT movements.
    ///
    /// Services are skipped. Quantities of repeated products are added up
    /// before comparing against the balance, so the whole order is checked
    /// before any movement is built.
    ///
    /// # Errors
    ///
    /// Returns `StockError::InsufficientStock` for the first product whose
    /// balance does not cover the order.
    pub fn plan_delivery(
        order_id: Uuid,
        lines: &[DeliveryLine],
        balances: &HashMap<Uuid, Decimal>,
    ) -> Result<Vec<NewStockMovement>, StockError> {
        Self::check_availability(lines, balances)?;

        Ok(lines
            .iter()
            .filter(|line| line.product_type.moves_stock())
            .map(|line| NewStockMovement {
                product_id: line.product_id,
                movement_type: MovementType::Out,
                quantity: line.quantity,
                reference_type: ReferenceType::Sale,
                reference_id: Some(order_id),
                unit_cost: None,
                note: None,
            })
            .collect())
    }

    /// Check that balances cover the physical lines of a sales order.
    ///
    /// # Errors
    ///
    /// Returns `StockError::InsufficientStock` naming the product and its balance.
    pub fn check_availability(
        lines: &[DeliveryLine],
        balances: &HashMap<Uuid, Decimal>,
    ) -> Result<(), StockError> {
        let mut requested: Vec<(&DeliveryLine, Decimal)> = Vec::new();
        for line in lines.iter().filter(|l| l.product_type.moves_stock()) {
            match requested
                .iter_mut()
                .find(|(seen, _)| seen.product_id == line.product_id)
            {
                Some((_, total)) => *total += line.quantity,
                None => requested.push((line, line.quantity)),
            }
        }

        for (line, total) in requested {
            let available = balances
                .get(&line.product_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if total > available {
                return Err(StockError::InsufficientStock {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    available,
                    requested: total,
                });
            }
        }
        Ok(())
    }
}
