//! `SeaORM` active enums.
//!
//! Stored as short strings so the same schema runs on PostgreSQL and SQLite.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use ledgerly_core::journal::{CashDirection, CashOrigin};
use ledgerly_core::order::{PurchaseOrderStatus, SalesOrderStatus};
use ledgerly_core::payable::PayableStatus;
use ledgerly_core::receivable::ReceivableStatus;
use ledgerly_core::stock::{AdjustmentType, MovementType, ProductType, ReferenceType};

/// Maps a stored enum to its core counterpart and back.
macro_rules! mirror_enum {
    ($db:ident, $core:ident, { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PayableStatusDb {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "PAID")]
    Paid,
}

mirror_enum!(PayableStatusDb, PayableStatus, { Open, Paid });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ReceivableStatusDb {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

mirror_enum!(ReceivableStatusDb, ReceivableStatus, { Open, Received, Canceled });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum CashDirectionDb {
    #[sea_orm(string_value = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    Out,
}

mirror_enum!(CashDirectionDb, CashDirection, { In, Out });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CashOriginDb {
    #[sea_orm(string_value = "AP")]
    Ap,
    #[sea_orm(string_value = "AR")]
    Ar,
    #[sea_orm(string_value = "MANUAL")]
    Manual,
}

mirror_enum!(CashOriginDb, CashOrigin, { Ap, Ar, Manual });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ProductTypeDb {
    #[sea_orm(string_value = "MP")]
    Mp,
    #[sea_orm(string_value = "PA")]
    Pa,
    #[sea_orm(string_value = "SERVICO")]
    Servico,
}

mirror_enum!(ProductTypeDb, ProductType, { Mp, Pa, Servico });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MovementTypeDb {
    #[sea_orm(string_value = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    Out,
    #[sea_orm(string_value = "ADJUST")]
    Adjust,
}

mirror_enum!(MovementTypeDb, MovementType, { In, Out, Adjust });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ReferenceTypeDb {
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
    #[sea_orm(string_value = "SALE")]
    Sale,
    #[sea_orm(string_value = "MANUAL")]
    Manual,
}

mirror_enum!(ReferenceTypeDb, ReferenceType, { Purchase, Sale, Manual });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AdjustmentTypeDb {
    #[sea_orm(string_value = "AVARIA")]
    Avaria,
    #[sea_orm(string_value = "INVENTARIO")]
    Inventario,
}

mirror_enum!(AdjustmentTypeDb, AdjustmentType, { Avaria, Inventario });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PurchaseOrderStatusDb {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

mirror_enum!(PurchaseOrderStatusDb, PurchaseOrderStatus, { Open, Received, Canceled });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SalesOrderStatusDb {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

mirror_enum!(SalesOrderStatusDb, SalesOrderStatus, { Open, Delivered, Canceled });
