// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::{
    BookingSummary, ContactPreference, LabId, Notification, OrderDecision, OrderId, OrderStatus,
    RequirementsFormInput, SafetyFlags, StorageCondition, Urgency,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabOrder {
    pub id: OrderId,
    pub researcher: String,
    pub institution: String,
    pub lab_id: LabId,
    pub test: String,
    pub sample_quantity: String,
    pub requirements: RequirementsFormInput,
    pub status: OrderStatus,
    pub booked_at: OffsetDateTime,
    pub decided_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub researcher: String,
    pub institution: String,
    pub summary: BookingSummary,
    pub requirements: RequirementsFormInput,
}

/// Orders a lab has received, pending ones first in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderInbox {
    orders: Vec<LabOrder>,
    next_id: i64,
}

impl OrderInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, order: NewOrder, now: OffsetDateTime) -> OrderId {
        self.next_id += 1;
        let id = OrderId::new(self.next_id);
        info!(
            order = id.get(),
            lab = %order.summary.lab_id,
            test = %order.summary.test,
            "order received"
        );
        self.orders.push(LabOrder {
            id,
            researcher: order.researcher,
            institution: order.institution,
            lab_id: order.summary.lab_id,
            test: order.summary.test,
            sample_quantity: order.requirements.quantity.clone(),
            requirements: order.requirements,
            status: OrderStatus::Pending,
            booked_at: now,
            decided_at: None,
        });
        id
    }

    pub fn get(&self, id: OrderId) -> Option<&LabOrder> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &LabOrder> {
        self.orders
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
    }

    /// Decided orders, most recent decision first.
    pub fn history(&self) -> Vec<&LabOrder> {
        let mut decided = self
            .orders
            .iter()
            .filter(|order| order.decided_at.is_some())
            .collect::<Vec<_>>();
        decided.sort_by(|left, right| right.decided_at.cmp(&left.decided_at));
        decided
    }

    pub fn decide(
        &mut self,
        id: OrderId,
        decision: OrderDecision,
        now: OffsetDateTime,
    ) -> Result<&LabOrder> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| anyhow!("order {} not found -- refresh the inbox and retry", id.get()))?;
        if order.status != OrderStatus::Pending {
            bail!(
                "order {} was already {}",
                id.get(),
                order.status.as_str()
            );
        }

        order.status = decision.status();
        order.decided_at = Some(now);
        info!(order = id.get(), status = order.status.as_str(), "order decided");
        Ok(order)
    }

    /// Seeds the two walk-in orders the lab dashboard opens with.
    pub fn with_demo_orders(now: OffsetDateTime) -> Self {
        let mut inbox = Self::new();
        for (offset_minutes, order) in demo_orders() {
            inbox.submit(order, now - Duration::minutes(offset_minutes));
        }
        inbox
    }
}

pub fn decision_notification(order: &LabOrder) -> Notification {
    let message = format!(
        "Order from {} for {} has been {}.",
        order.researcher,
        order.test,
        order.status.as_str()
    );
    match order.status {
        OrderStatus::Rejected => Notification::error(message),
        OrderStatus::Accepted | OrderStatus::Pending => Notification::success(message),
    }
}

fn demo_orders() -> [(i64, NewOrder); 2] {
    let summary = |test: &str, quantity: &str, price: &str, turnaround: &str| BookingSummary {
        lab_id: LabId::from("ncl"),
        lab_name: "National Chemical Laboratory (NCL), Pune".to_owned(),
        lab_address: "Dr. Homi Bhabha Road, Pune".to_owned(),
        test: test.to_owned(),
        quantity: quantity.to_owned(),
        turnaround: turnaround.to_owned(),
        price: price.to_owned(),
    };

    [
        (
            75,
            NewOrder {
                researcher: "Dr. Priya Sharma".to_owned(),
                institution: "IIT Bombay".to_owned(),
                summary: summary("FTIR", "20 mg", "₹1000/sample", "3 days"),
                requirements: RequirementsFormInput {
                    description: "Polymer powder sample for functional group identification"
                        .to_owned(),
                    quantity: "20 mg".to_owned(),
                    storage: StorageCondition::RoomTemperature,
                    urgency: Urgency::Standard,
                    special_instructions: "Please ensure the sample is completely dry before analysis. Focus on the carbonyl and hydroxyl regions.".to_owned(),
                    safety: SafetyFlags {
                        air_sensitive: true,
                        ..SafetyFlags::default()
                    },
                    expected_results: "Expecting peaks around 1715 cm⁻¹ (C=O) and 3200-3600 cm⁻¹ (O-H)".to_owned(),
                    contact: ContactPreference::Email,
                },
            },
        ),
        (
            30,
            NewOrder {
                researcher: "Prof. Rajesh Kumar".to_owned(),
                institution: "IISc Bangalore".to_owned(),
                summary: summary("SEM (SEM+EDX+Mapping)", "30 mg", "₹12000/sample", "10 days"),
                requirements: RequirementsFormInput {
                    description: "Nanoparticle sample for morphology and size distribution analysis".to_owned(),
                    quantity: "30 mg".to_owned(),
                    storage: StorageCondition::Desiccated,
                    urgency: Urgency::Priority,
                    special_instructions: "Sample is highly moisture sensitive. Please handle in dry environment. Looking for particle size distribution analysis with EDX mapping.".to_owned(),
                    safety: SafetyFlags {
                        air_sensitive: true,
                        ..SafetyFlags::default()
                    },
                    expected_results: "Expecting uniform spherical particles in the range of 50-200 nm".to_owned(),
                    contact: ContactPreference::WhatsApp,
                },
            },
        ),
    ]
}
