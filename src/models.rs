use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! text_enum {
    ($ty:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }

            fn allowed() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!(
                        "Invalid {} value: {}. Must be one of: {}.",
                        $label,
                        other,
                        Self::allowed()
                    )),
                }
            }
        }
    };
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema, sqlx::Type,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "cashier")]
    Cashier,
    #[sea_orm(string_value = "waiter")]
    Waiter,
    #[sea_orm(string_value = "chef")]
    Chef,
}

text_enum!(Role, "role" {
    Admin => "admin",
    Manager => "manager",
    Cashier => "cashier",
    Waiter => "waiter",
    Chef => "chef",
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema, sqlx::Type,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TableStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "occupied")]
    Occupied,
}

text_enum!(TableStatus, "table status" {
    Available => "available",
    Occupied => "occupied",
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema, sqlx::Type,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "prepared")]
    Prepared,
    #[sea_orm(string_value = "served")]
    Served,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

text_enum!(OrderStatus, "status" {
    Pending => "pending",
    Prepared => "prepared",
    Served => "served",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl OrderStatus {
    pub const ACTIVE: [OrderStatus; 3] =
        [OrderStatus::Pending, OrderStatus::Prepared, OrderStatus::Served];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    ToSchema, sqlx::Type,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ItemStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "cooked")]
    Cooked,
    #[sea_orm(string_value = "ready")]
    Ready,
}

text_enum!(ItemStatus, "item status" {
    Pending => "pending",
    Cooked => "cooked",
    Ready => "ready",
});

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Floor {
    pub id: i64,
    pub name: String,
}

/// A dining table together with the name of its floor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct DiningTable {
    pub id: i64,
    pub name: String,
    pub status: TableStatus,
    pub floor_id: i64,
    pub floor_name: String,
}

/// User as exposed over the API; the password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub transaction_id: String,
    pub initial_total: f64,
    pub discount_percentage: Option<f64>,
    pub discount_amount: Option<f64>,
    pub final_total: f64,
    pub order_date: String,
    pub floor_id: Option<i64>,
    pub table_id: Option<i64>,
    pub cashier_id: Option<i64>,
    pub waiter_id: Option<i64>,
    pub payment_type: Option<String>,
    pub amount_paid: Option<f64>,
    pub change_due: Option<f64>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price_at_sale: f64,
    pub item_status: ItemStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_from_their_column_text() {
        assert_eq!("served".parse::<OrderStatus>(), Ok(OrderStatus::Served));
        assert_eq!("cooked".parse::<ItemStatus>(), Ok(ItemStatus::Cooked));
        assert_eq!("occupied".parse::<TableStatus>(), Ok(TableStatus::Occupied));
        assert_eq!("chef".parse::<Role>(), Ok(Role::Chef));
    }

    #[test]
    fn unknown_status_lists_allowed_values() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(
            err,
            "Invalid status value: shipped. Must be one of: pending, prepared, served, completed, cancelled."
        );
    }

    #[test]
    fn active_and_terminal_order_statuses() {
        assert!(OrderStatus::Pending.is_active());
        assert!(OrderStatus::Served.is_active());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }
}
