use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
pub use bg_common::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------    DiscountBps      ---------------------------------------------------------
/// A discount percentage, stored as integer basis points (1550 == 15.50%).
///
/// Storing basis points keeps the database column an integer (like [`Money`]) while the pricing
/// engine works in exact [`Decimal`] percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct DiscountBps(i64);

impl DiscountBps {
    pub fn new(basis_points: i64) -> Self {
        Self(basis_points)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// The discount as a percentage, e.g. 1550 -> 15.50.
    pub fn as_percent(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn is_valid(&self) -> bool {
        (0..=10_000).contains(&self.0)
    }
}

impl From<i64> for DiscountBps {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for DiscountBps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

//--------------------------------------        Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------        User         ---------------------------------------------------------
/// A wallet owner. `balance` is only ever written by the wallet functions in `sqlite/db/users.rs`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub balance: Money,
    pub currency: String,
    pub rating: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default = "default_rating")]
    pub rating: i64,
}

fn default_rating() -> i64 {
    1
}

impl NewUser {
    pub fn new<S: Into<String>>(email: S) -> Self {
        Self { email: email.into(), rating: default_rating() }
    }
}

//--------------------------------------      Service        ---------------------------------------------------------
/// A sellable product family, e.g. "YouTube". Created and edited by admins only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub name: String,
    pub icon: Option<String>,
}

//--------------------------------------      Period         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Period {
    Hour,
    Day,
    Week,
    Month,
}

impl Period {
    /// The wall-clock duration used to auto-compute a completion deadline for running orders.
    pub fn duration(&self) -> Duration {
        match self {
            Period::Hour => Duration::hours(1),
            Period::Day => Duration::days(1),
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Hour => write!(f, "Hour"),
            Period::Day => write!(f, "Day"),
            Period::Week => write!(f, "Week"),
            Period::Month => write!(f, "Month"),
        }
    }
}

impl FromStr for Period {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hour" => Ok(Self::Hour),
            "Day" => Ok(Self::Day),
            "Week" => Ok(Self::Week),
            "Month" => Ok(Self::Month),
            s => Err(ConversionError(format!("Invalid period: {s}"))),
        }
    }
}

//--------------------------------------   ServiceOption     ---------------------------------------------------------
/// A purchasable variant of a [`Service`], e.g. "Followers".
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceOption {
    pub id: i64,
    pub service_id: i64,
    pub name: String,
    pub unit_price: Money,
    pub currency: String,
    pub discount: DiscountBps,
    pub period: Option<Period>,
    pub is_interval_required: bool,
    /// Free-form schema of the custom fields the storefront collects for this option.
    pub required_fields: Json<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceOption {
    pub service_id: i64,
    pub name: String,
    pub unit_price: Money,
    #[serde(default)]
    pub discount: DiscountBps,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub is_interval_required: bool,
    #[serde(default)]
    pub required_fields: Value,
}

//--------------------------------------  OrderStatusType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created and paid for out of the wallet balance.
    Pending,
    /// The boost is being delivered.
    Running,
    /// Terminal. The order has been fulfilled.
    Completed,
}

impl OrderStatusType {
    /// The order state machine: Pending -> Running -> Completed, Pending -> Completed.
    /// No backward transitions, and nothing leaves Completed.
    pub fn can_transition_to(&self, new_status: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!((self, new_status), (Pending, Running) | (Pending, Completed) | (Running, Completed))
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Running => write!(f, "Running"),
            OrderStatusType::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Running" => Ok(Self::Running),
            "Completed" => Ok(Self::Completed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
/// A placed order. Immutable after creation except for status and the completion stamps.
/// `unit_price` and `total_price` are captured at order time and never recomputed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub service_option_id: i64,
    pub custom_data: Json<Value>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub currency: String,
    pub status: OrderStatusType,
    pub period: Option<Period>,
    pub interval: Option<i64>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
}

/// A fully priced order, ready to be persisted. Produced by the order flow API after validation
/// and pricing; never constructed from raw client input.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub service_id: i64,
    pub service_option_id: i64,
    pub custom_data: Value,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub currency: String,
    pub period: Option<Period>,
    pub interval: Option<i64>,
    pub notes: String,
}

//--------------------------------------  TransactionType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TransactionType {
    /// A gateway top-up credit.
    Deposit,
    /// An order debit.
    Purchase,
    /// A manual balance credit issued by an admin.
    AdminDeposit,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "Deposit"),
            TransactionType::Purchase => write!(f, "Purchase"),
            TransactionType::AdminDeposit => write!(f, "AdminDeposit"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deposit" => Ok(Self::Deposit),
            "Purchase" => Ok(Self::Purchase),
            "AdminDeposit" => Ok(Self::AdminDeposit),
            s => Err(ConversionError(format!("Invalid transaction type: {s}"))),
        }
    }
}

//--------------------------------------    BalanceEntry     ---------------------------------------------------------
/// One row of the append-only balance ledger. Never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BalanceEntry {
    pub id: i64,
    pub user_id: i64,
    pub old_balance: Money,
    pub new_balance: Money,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl BalanceEntry {
    /// The signed amount of the transition. Debits are negative, credits positive.
    pub fn delta(&self) -> Money {
        self.new_balance - self.old_balance
    }
}

//--------------------------------------    TopUpStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TopUpStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl TopUpStatus {
    /// Terminal statuses are reached at most once; redeliveries for a terminal top-up are no-ops.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TopUpStatus::Pending)
    }
}

impl Display for TopUpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopUpStatus::Pending => write!(f, "Pending"),
            TopUpStatus::Paid => write!(f, "Paid"),
            TopUpStatus::Failed => write!(f, "Failed"),
            TopUpStatus::Expired => write!(f, "Expired"),
        }
    }
}

impl FromStr for TopUpStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            "Expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid top-up status: {s}"))),
        }
    }
}

//--------------------------------------       TopUp         ---------------------------------------------------------
/// A balance top-up request against the external payment gateway, keyed by the gateway-assigned
/// invoice id (unique).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopUp {
    pub id: i64,
    pub user_id: i64,
    pub amount: Money,
    pub currency: String,
    pub invoice_id: String,
    pub status: TopUpStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTopUp {
    pub user_id: i64,
    pub amount: Money,
    pub currency: String,
    pub invoice_id: String,
}
