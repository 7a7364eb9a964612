use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable identifier for an employee, distinct from any storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Tenant identifier for a company.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Catalog stock-keeping unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(pub String);

/// Catalog product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Generated identifier for a committed order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Uniform categories sold through the platform. Only the first four carry a
/// per-cycle entitlement; accessories are never counted against an allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformCategory {
    Shirt,
    Pant,
    Shoe,
    Jacket,
    Accessory,
}

impl UniformCategory {
    pub const TRACKED: [Self; 4] = [Self::Shirt, Self::Pant, Self::Shoe, Self::Jacket];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Shirt => "shirt",
            Self::Pant => "pant",
            Self::Shoe => "shoe",
            Self::Jacket => "jacket",
            Self::Accessory => "accessory",
        }
    }

    pub const fn is_tracked(self) -> bool {
        !matches!(self, Self::Accessory)
    }
}

impl fmt::Display for UniformCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-category quantities used for allowances, renewal cycle lengths, and
/// derived consumption. Always carries all four tracked categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub shirt: u32,
    pub pant: u32,
    pub shoe: u32,
    pub jacket: u32,
}

impl CategoryCounts {
    /// Returns the count for a tracked category, `None` for accessories.
    pub const fn get(&self, category: UniformCategory) -> Option<u32> {
        match category {
            UniformCategory::Shirt => Some(self.shirt),
            UniformCategory::Pant => Some(self.pant),
            UniformCategory::Shoe => Some(self.shoe),
            UniformCategory::Jacket => Some(self.jacket),
            UniformCategory::Accessory => None,
        }
    }

    /// Saturating on purpose: a sum pinned at `u32::MAX` still fails any
    /// realistic allowance comparison, while wrapping could sneak back under
    /// it.
    pub fn add(&mut self, category: UniformCategory, quantity: u32) {
        match category {
            UniformCategory::Shirt => self.shirt = self.shirt.saturating_add(quantity),
            UniformCategory::Pant => self.pant = self.pant.saturating_add(quantity),
            UniformCategory::Shoe => self.shoe = self.shoe.saturating_add(quantity),
            UniformCategory::Jacket => self.jacket = self.jacket.saturating_add(quantity),
            UniformCategory::Accessory => {}
        }
    }
}

/// Where an order is dispatched from, which also determines the delivery
/// estimate quoted to the employee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPreference {
    Direct,
    Central,
    #[serde(other)]
    #[default]
    Unspecified,
}

impl DispatchPreference {
    /// Fixed delivery-estimate policy. Unrecognized preferences deliberately
    /// quote the most conservative window.
    pub const fn estimated_delivery(self) -> &'static str {
        match self {
            Self::Direct => "3-5 business days",
            Self::Central => "5-7 business days",
            Self::Unspecified => "7-10 business days",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Central => "central",
            Self::Unspecified => "unspecified",
        }
    }
}

/// A person entitled to uniforms, owned by exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub company_id: CompanyId,
    pub name: String,
    /// Total allowance per renewal cycle for each tracked category.
    pub eligibility: CategoryCounts,
    /// Renewal period length in months for each tracked category.
    pub cycle_months: CategoryCounts,
    pub delivery_address: String,
    pub dispatch_preference: DispatchPreference,
}

/// A sellable catalog item, linked to the companies it is offered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: Sku,
    pub name: String,
    pub category: UniformCategory,
    pub sizes: BTreeSet<String>,
    /// Unit price in minor currency units.
    pub price: u32,
    pub company_ids: Vec<CompanyId>,
    pub vendor_ids: Vec<String>,
}

impl Product {
    pub fn available_to(&self, company: &CompanyId) -> bool {
        self.company_ids.iter().any(|id| id == company)
    }

    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.contains(size)
    }
}

/// Lifecycle state of an order. Transition rules live in the lifecycle module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    AwaitingApproval,
    AwaitingFulfilment,
    Dispatched,
    Delivered,
}

impl OrderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AwaitingApproval => "Awaiting approval",
            Self::AwaitingFulfilment => "Awaiting fulfilment",
            Self::Dispatched => "Dispatched",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of an order. Product name, category, and price are snapshotted at
/// creation so later catalog edits never change a committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: UniformCategory,
    pub size: String,
    pub quantity: u32,
    pub unit_price: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> u64 {
        u64::from(self.quantity) * u64::from(self.unit_price)
    }
}

/// The committed unit of fulfillment. The item list never mutates after
/// creation; corrections require a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub employee_id: EmployeeId,
    pub company_id: CompanyId,
    pub items: Vec<OrderItem>,
    pub total: u64,
    pub status: OrderStatus,
    pub order_date: NaiveDate,
    pub dispatch_location: DispatchPreference,
    pub delivery_address: String,
    pub estimated_delivery: String,
}

impl Order {
    pub fn compute_total(items: &[OrderItem]) -> u64 {
        items.iter().map(OrderItem::line_total).sum()
    }
}

/// Roster entry for a company contact. Approval capability is independent of
/// roster membership so read-only contacts can exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAdmin {
    pub email: String,
    pub can_approve_orders: bool,
}

/// Tenant boundary and admin roster holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub admins: Vec<CompanyAdmin>,
}
