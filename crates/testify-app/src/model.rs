// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::*;

pub const POSITION_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: u8,
    pub y: u8,
}

impl MapPosition {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub const fn in_bounds(self) -> bool {
        self.x <= POSITION_MAX && self.y <= POSITION_MAX
    }
}

/// Price, required quantity and turnaround for one test at one lab.
///
/// All three fields are display text taken verbatim from the catalog: prices
/// carry their unit suffix (`₹1000/sample`, `₹3000/hour`) and may be ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOffering {
    pub price: String,
    pub quantity: String,
    pub turnaround: String,
}

impl TestOffering {
    pub fn new(
        price: impl Into<String>,
        quantity: impl Into<String>,
        turnaround: impl Into<String>,
    ) -> Self {
        Self {
            price: price.into(),
            quantity: quantity.into(),
            turnaround: turnaround.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    pub id: LabId,
    pub name: String,
    pub address: String,
    pub position: MapPosition,
    pub certified: bool,
    pub offerings: BTreeMap<String, TestOffering>,
}

impl Lab {
    pub fn offering(&self, test: &str) -> Option<&TestOffering> {
        self.offerings.get(test)
    }

    pub fn offers(&self, test: &str) -> bool {
        self.offerings.contains_key(test)
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.address.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub tests: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Catalog,
    Labs,
    Requirements,
    Pickup,
    Payment,
    Orders,
}

impl Screen {
    pub const ALL: [Self; 6] = [
        Self::Catalog,
        Self::Labs,
        Self::Requirements,
        Self::Pickup,
        Self::Payment,
        Self::Orders,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Catalog => "tests",
            Self::Labs => "labs",
            Self::Requirements => "requirements",
            Self::Pickup => "pickup",
            Self::Payment => "payment",
            Self::Orders => "orders",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "catalog" | "tests" => Some(Self::Catalog),
            "labs" => Some(Self::Labs),
            "requirements" => Some(Self::Requirements),
            "pickup" => Some(Self::Pickup),
            "payment" => Some(Self::Payment),
            "orders" => Some(Self::Orders),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageCondition {
    RoomTemperature,
    Refrigerated,
    Frozen,
    Desiccated,
    InertAtmosphere,
}

impl StorageCondition {
    pub const ALL: [Self; 5] = [
        Self::RoomTemperature,
        Self::Refrigerated,
        Self::Frozen,
        Self::Desiccated,
        Self::InertAtmosphere,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoomTemperature => "room_temperature",
            Self::Refrigerated => "refrigerated",
            Self::Frozen => "frozen",
            Self::Desiccated => "desiccated",
            Self::InertAtmosphere => "inert_atmosphere",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RoomTemperature => "Room Temperature",
            Self::Refrigerated => "Refrigerated (2-8 °C)",
            Self::Frozen => "Frozen (-20 °C)",
            Self::Desiccated => "Desiccated (Moisture-sensitive)",
            Self::InertAtmosphere => "Inert Atmosphere",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Standard,
    Priority,
    Urgent,
}

impl Urgency {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Priority, Self::Urgent];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Priority => "priority",
            Self::Urgent => "urgent",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard (Normal turnaround)",
            Self::Priority => "Priority (Faster processing - additional charges may apply)",
            Self::Urgent => "Urgent (Contact lab before dispatch)",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPreference {
    Email,
    Phone,
    WhatsApp,
}

impl ContactPreference {
    pub const ALL: [Self; 3] = [Self::Email, Self::Phone, Self::WhatsApp];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::WhatsApp => "whatsapp",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::WhatsApp => "WhatsApp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PickupStage {
    Scheduled,
    PickedUp,
    InTransit,
    Delivered,
}

impl PickupStage {
    pub const ALL: [Self; 4] = [
        Self::Scheduled,
        Self::PickedUp,
        Self::InTransit,
        Self::Delivered,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::PickedUp => "Picked Up",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Scheduled => 0,
            Self::PickedUp => 1,
            Self::InTransit => 2,
            Self::Delivered => 3,
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Scheduled => Some(Self::PickedUp),
            Self::PickedUp => Some(Self::InTransit),
            Self::InTransit => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    pub const fn percent(self) -> u8 {
        ((self.index() + 1) * 100 / Self::ALL.len()) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDecision {
    Accept,
    Reject,
}

impl OrderDecision {
    pub const fn status(self) -> OrderStatus {
        match self {
            Self::Accept => OrderStatus::Accepted,
            Self::Reject => OrderStatus::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lab, MapPosition, PickupStage, Screen, StorageCondition, TestOffering};
    use crate::LabId;
    use std::collections::BTreeMap;

    fn lab(name: &str, address: &str) -> Lab {
        Lab {
            id: LabId::from("x"),
            name: name.to_owned(),
            address: address.to_owned(),
            position: MapPosition::new(10, 10),
            certified: false,
            offerings: BTreeMap::from([(
                "FTIR".to_owned(),
                TestOffering::new("₹1/sample", "1 mg", "1 day"),
            )]),
        }
    }

    #[test]
    fn pickup_stage_percent_tracks_quarters() {
        let percents = PickupStage::ALL.map(PickupStage::percent);
        assert_eq!(percents, [25, 50, 75, 100]);
        assert_eq!(PickupStage::Delivered.next(), None);
    }

    #[test]
    fn lab_query_matches_name_or_address_case_insensitively() {
        let lab = lab("DIYA Labs", "Kopar Khairane, Navi Mumbai");
        assert!(lab.matches_query("diya"));
        assert!(lab.matches_query("  MUMBAI "));
        assert!(lab.matches_query(""));
        assert!(!lab.matches_query("pune"));
        assert!(lab.offers("FTIR"));
        assert!(!lab.offers("ftir"));
    }

    #[test]
    fn position_bounds_are_inclusive() {
        assert!(MapPosition::new(100, 0).in_bounds());
        assert!(!MapPosition::new(101, 50).in_bounds());
    }

    #[test]
    fn screen_and_storage_parse_known_values() {
        assert_eq!(Screen::parse("labs"), Some(Screen::Labs));
        assert_eq!(Screen::parse("catalog"), Some(Screen::Catalog));
        assert_eq!(Screen::parse("dashboard"), None);
        assert_eq!(
            StorageCondition::parse("desiccated"),
            Some(StorageCondition::Desiccated)
        );
    }
}
