// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::PickupStage;

pub const TERMS_REQUIRED_MESSAGE: &str = "Please agree to the terms.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickupTracker {
    stage: Option<PickupStage>,
}

impl PickupTracker {
    pub fn stage(&self) -> Option<PickupStage> {
        self.stage
    }

    pub fn start(&mut self) -> PickupStage {
        self.stage = Some(PickupStage::Scheduled);
        PickupStage::Scheduled
    }

    /// Moves one stage forward. Returns `None` before the pickup starts and
    /// once the sample is delivered.
    pub fn advance(&mut self) -> Option<PickupStage> {
        let next = self.stage?.next()?;
        self.stage = Some(next);
        Some(next)
    }

    pub fn percent(&self) -> u8 {
        self.stage.map_or(0, PickupStage::percent)
    }

    pub fn is_delivered(&self) -> bool {
        self.stage == Some(PickupStage::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub sample_id: String,
    pub paid_at: OffsetDateTime,
    pub report_date: Date,
}

impl PaymentReceipt {
    pub fn issue(now: OffsetDateTime) -> Self {
        Self {
            sample_id: sample_id_for(now),
            paid_at: now,
            report_date: now.date(),
        }
    }
}

/// `TS-` followed by the last six digits of the Unix time in milliseconds.
pub fn sample_id_for(now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("TS-{:06}", millis.rem_euclid(1_000_000))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentState {
    pub terms_accepted: bool,
    receipt: Option<PaymentReceipt>,
}

impl PaymentState {
    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_paid(&self) -> bool {
        self.receipt.is_some()
    }

    pub fn report_unlocked(&self) -> bool {
        self.is_paid()
    }

    pub fn record(&mut self, receipt: PaymentReceipt) {
        self.receipt = Some(receipt);
    }
}

#[cfg(test)]
mod tests {
    use super::{PaymentReceipt, PaymentState, PickupTracker, sample_id_for};
    use crate::PickupStage;
    use time::{Duration, OffsetDateTime};

    #[test]
    fn tracker_walks_stages_and_stops_at_delivered() {
        let mut tracker = PickupTracker::default();
        assert_eq!(tracker.advance(), None);
        assert_eq!(tracker.percent(), 0);

        assert_eq!(tracker.start(), PickupStage::Scheduled);
        assert_eq!(tracker.advance(), Some(PickupStage::PickedUp));
        assert_eq!(tracker.advance(), Some(PickupStage::InTransit));
        assert_eq!(tracker.advance(), Some(PickupStage::Delivered));
        assert_eq!(tracker.advance(), None);
        assert!(tracker.is_delivered());
        assert_eq!(tracker.percent(), 100);
    }

    #[test]
    fn sample_id_uses_last_six_millisecond_digits() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::milliseconds(1_700_000_123_456);
        assert_eq!(sample_id_for(now), "TS-123456");
        assert_eq!(sample_id_for(OffsetDateTime::UNIX_EPOCH), "TS-000000");
    }

    #[test]
    fn report_unlocks_only_after_receipt() {
        let mut payment = PaymentState::default();
        assert!(!payment.report_unlocked());
        payment.record(PaymentReceipt::issue(OffsetDateTime::UNIX_EPOCH));
        assert!(payment.report_unlocked());
        assert_eq!(
            payment.receipt().map(|receipt| receipt.sample_id.as_str()),
            Some("TS-000000")
        );
    }
}
