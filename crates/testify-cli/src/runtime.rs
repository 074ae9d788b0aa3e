// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use testify_app::{
    BookingSummary, Catalog, LabOrder, NewOrder, OrderDecision, OrderId, OrderInbox,
    RequirementsFormInput,
};
use testify_tui::{AppRuntime, OrderSnapshot};
use time::OffsetDateTime;

/// In-memory host for one session: the loaded catalog, the researcher the
/// orders are filed under, and a lab inbox seeded with walk-in orders.
pub struct DemoRuntime {
    catalog: Catalog,
    inbox: OrderInbox,
    researcher: String,
    institution: String,
}

impl DemoRuntime {
    pub fn new(
        catalog: Catalog,
        researcher: impl Into<String>,
        institution: impl Into<String>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            catalog,
            inbox: OrderInbox::with_demo_orders(now),
            researcher: researcher.into(),
            institution: institution.into(),
        }
    }
}

impl AppRuntime for DemoRuntime {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn submit_order(
        &mut self,
        summary: &BookingSummary,
        requirements: &RequirementsFormInput,
    ) -> Result<OrderId> {
        let now = self.now();
        Ok(self.inbox.submit(
            NewOrder {
                researcher: self.researcher.clone(),
                institution: self.institution.clone(),
                summary: summary.clone(),
                requirements: requirements.clone(),
            },
            now,
        ))
    }

    fn load_orders(&mut self) -> Result<OrderSnapshot> {
        Ok(OrderSnapshot {
            pending: self.inbox.pending().cloned().collect(),
            history: self.inbox.history().into_iter().cloned().collect(),
        })
    }

    fn decide_order(&mut self, id: OrderId, decision: OrderDecision) -> Result<LabOrder> {
        let now = self.now();
        self.inbox.decide(id, decision, now).cloned()
    }
}
