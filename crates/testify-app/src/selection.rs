// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, warn};

use crate::{BookingError, Lab, LabId};

/// The visitor's current picks.
///
/// Either half can be overwritten independently and nothing re-checks the
/// other half when the test changes, so the pair must be validated again
/// with [`crate::can_book`] before anything is booked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    test: Option<String>,
    lab: Option<LabId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test(&self) -> Option<&str> {
        self.test.as_deref()
    }

    pub fn lab(&self) -> Option<&LabId> {
        self.lab.as_ref()
    }

    pub fn choose_test(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!(test = %name, lab = ?self.lab, "test selected");
        self.test = Some(name);
    }

    /// Rejects a lab that does not offer the currently selected test and
    /// leaves the previous lab in place.
    pub fn choose_lab(&mut self, lab: &Lab) -> Result<(), BookingError> {
        if let Some(test) = &self.test
            && !lab.offers(test)
        {
            warn!(test = %test, lab = %lab.id, "lab rejected: test not offered");
            return Err(BookingError::OfferingUnavailable {
                test: test.clone(),
                lab: lab.id.clone(),
            });
        }

        debug!(lab = %lab.id, test = ?self.test, "lab selected");
        self.lab = Some(lab.id.clone());
        Ok(())
    }
}
