// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{CatalogStore, LabId, SelectionState};

/// Why a (test, lab) selection cannot move on to booking.
///
/// All three are recoverable by the visitor picking again; none abort the
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("no test selected")]
    NoTestSelected,
    #[error("no lab selected")]
    NoLabSelected,
    #[error("test {test:?} is not offered by lab {lab}")]
    OfferingUnavailable { test: String, lab: LabId },
}

impl BookingError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NoTestSelected => "Please select a test first.".to_owned(),
            Self::NoLabSelected => "Please select a lab.".to_owned(),
            Self::OfferingUnavailable { .. } => {
                "Selected test is not available at this lab. Please choose a different combination."
                    .to_owned()
            }
        }
    }
}

/// Everything the booking summary shows, resolved from one offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub lab_id: LabId,
    pub lab_name: String,
    pub lab_address: String,
    pub test: String,
    pub quantity: String,
    pub turnaround: String,
    pub price: String,
}

pub fn can_book(
    store: &CatalogStore,
    selection: &SelectionState,
) -> Result<BookingSummary, BookingError> {
    let test = selection.test().ok_or(BookingError::NoTestSelected)?;
    let lab_id = selection.lab().ok_or(BookingError::NoLabSelected)?;

    let Some(lab) = store.lab(lab_id) else {
        warn!(lab = %lab_id, "selected lab missing from catalog");
        return Err(BookingError::OfferingUnavailable {
            test: test.to_owned(),
            lab: lab_id.clone(),
        });
    };
    let Some(offering) = lab.offering(test) else {
        warn!(lab = %lab_id, test, "booking gate: offering unavailable");
        return Err(BookingError::OfferingUnavailable {
            test: test.to_owned(),
            lab: lab_id.clone(),
        });
    };

    info!(lab = %lab_id, test, price = %offering.price, "booking gate passed");
    Ok(BookingSummary {
        lab_id: lab.id.clone(),
        lab_name: lab.name.clone(),
        lab_address: lab.address.clone(),
        test: test.to_owned(),
        quantity: offering.quantity.clone(),
        turnaround: offering.turnaround.clone(),
        price: offering.price.clone(),
    })
}
