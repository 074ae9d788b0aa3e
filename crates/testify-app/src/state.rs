// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    BookingError, BookingSummary, Catalog, LabId, Notification, PaymentReceipt, PaymentState,
    PickupStage, PickupTracker, RequirementsFormInput, Screen, SelectionState,
    TERMS_REQUIRED_MESSAGE, can_book,
};

pub const REQUIREMENTS_ACCEPTED_MESSAGE: &str =
    "Requirements submitted successfully! Proceed with sample pickup.";
pub const REQUIREMENTS_MISSING_MESSAGE: &str = "Submit sample requirements before paying.";
pub const PAYMENT_DONE_MESSAGE: &str = "Payment successful. AI report unlocked.";
pub const ALREADY_PAID_MESSAGE: &str = "Payment already completed.";

/// One visitor session: the selection plus everything downstream of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub screen: Screen,
    pub selection: SelectionState,
    pub catalog_query: String,
    pub lab_query: String,
    pub booking: Option<BookingSummary>,
    pub requirements: Option<RequirementsFormInput>,
    /// The booking `requirements` were submitted for.
    pub requirements_booking: Option<BookingSummary>,
    pub pickup: PickupTracker,
    pub payment: PaymentState,
    pub notification: Option<Notification>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            screen: Screen::Catalog,
            selection: SelectionState::new(),
            catalog_query: String::new(),
            lab_query: String::new(),
            booking: None,
            requirements: None,
            requirements_booking: None,
            pickup: PickupTracker::default(),
            payment: PaymentState::default(),
            notification: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    NextScreen,
    PrevScreen,
    ShowScreen(Screen),
    SetCatalogQuery(String),
    SetLabQuery(String),
    ChooseTest(String),
    ChooseLab(LabId),
    Book,
    BackToLabs,
    SubmitRequirements(RequirementsFormInput),
    AdvancePickup,
    SetTermsAccepted(bool),
    Pay { now: OffsetDateTime },
    Notify(Notification),
    ClearNotification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ScreenChanged(Screen),
    CatalogQueryChanged(String),
    LabQueryChanged(String),
    TestChosen(String),
    LabChosen(LabId),
    Booked(BookingSummary),
    RequirementsSubmitted {
        summary: BookingSummary,
        requirements: RequirementsFormInput,
    },
    PickupAdvanced(PickupStage),
    TermsChanged(bool),
    Paid(PaymentReceipt),
    Notified(Notification),
    NotificationCleared,
}

impl SessionState {
    pub fn dispatch(&mut self, catalog: &Catalog, command: SessionCommand) -> Vec<SessionEvent> {
        debug!(?command, screen = ?self.screen, "dispatch");
        match command {
            SessionCommand::NextScreen => self.rotate_screen(1),
            SessionCommand::PrevScreen => self.rotate_screen(-1),
            SessionCommand::ShowScreen(screen) => vec![self.show(screen)],
            SessionCommand::SetCatalogQuery(query) => {
                self.catalog_query = query.clone();
                vec![SessionEvent::CatalogQueryChanged(query)]
            }
            SessionCommand::SetLabQuery(query) => {
                self.lab_query = query.clone();
                vec![SessionEvent::LabQueryChanged(query)]
            }
            SessionCommand::ChooseTest(test) => {
                self.selection.choose_test(test.clone());
                self.booking = None;
                vec![SessionEvent::TestChosen(test), self.show(Screen::Labs)]
            }
            SessionCommand::ChooseLab(lab_id) => self.choose_lab(catalog, &lab_id),
            SessionCommand::Book => self.book(catalog),
            SessionCommand::BackToLabs => vec![self.show(Screen::Labs)],
            SessionCommand::SubmitRequirements(form) => self.submit_requirements(catalog, form),
            SessionCommand::AdvancePickup => self
                .pickup
                .advance()
                .map(SessionEvent::PickupAdvanced)
                .into_iter()
                .collect(),
            SessionCommand::SetTermsAccepted(accepted) => {
                self.payment.terms_accepted = accepted;
                vec![SessionEvent::TermsChanged(accepted)]
            }
            SessionCommand::Pay { now } => self.pay(catalog, now),
            SessionCommand::Notify(notification) => vec![self.notify(notification)],
            SessionCommand::ClearNotification => {
                self.notification = None;
                vec![SessionEvent::NotificationCleared]
            }
        }
    }

    fn choose_lab(&mut self, catalog: &Catalog, lab_id: &LabId) -> Vec<SessionEvent> {
        let Some(lab) = catalog.store.lab(lab_id) else {
            return vec![self.notify(Notification::error(format!("Unknown lab {lab_id}.")))];
        };

        match self.selection.choose_lab(lab) {
            Ok(()) => {
                self.booking = None;
                vec![SessionEvent::LabChosen(lab.id.clone())]
            }
            Err(BookingError::OfferingUnavailable { test, .. }) => {
                vec![self.notify(Notification::error(format!(
                    "{test} is not available at {}. Please select a different lab or test.",
                    lab.name
                )))]
            }
            Err(error) => vec![self.notify(Notification::error(error.user_message()))],
        }
    }

    fn book(&mut self, catalog: &Catalog) -> Vec<SessionEvent> {
        match can_book(&catalog.store, &self.selection) {
            Ok(summary) => {
                if self
                    .requirements_booking
                    .as_ref()
                    .is_some_and(|submitted| *submitted != summary)
                {
                    self.reset_downstream();
                }
                self.booking = Some(summary.clone());
                vec![SessionEvent::Booked(summary), self.show(Screen::Requirements)]
            }
            Err(error) => {
                self.booking = None;
                vec![self.notify(Notification::error(error.user_message()))]
            }
        }
    }

    fn submit_requirements(
        &mut self,
        catalog: &Catalog,
        form: RequirementsFormInput,
    ) -> Vec<SessionEvent> {
        let summary = match can_book(&catalog.store, &self.selection) {
            Ok(summary) => summary,
            Err(error) => {
                self.booking = None;
                return vec![self.notify(Notification::error(error.user_message()))];
            }
        };
        if let Err(error) = form.validate() {
            return vec![self.notify(Notification::error(error.to_string()))];
        }

        let requirements = form.normalized();
        self.booking = Some(summary.clone());
        self.requirements = Some(requirements.clone());
        self.requirements_booking = Some(summary.clone());
        let stage = self.pickup.start();
        info!(lab = %summary.lab_id, test = %summary.test, "requirements submitted");
        vec![
            SessionEvent::RequirementsSubmitted {
                summary,
                requirements,
            },
            SessionEvent::PickupAdvanced(stage),
            self.show(Screen::Pickup),
            self.notify(Notification::success(REQUIREMENTS_ACCEPTED_MESSAGE)),
        ]
    }

    fn pay(&mut self, catalog: &Catalog, now: OffsetDateTime) -> Vec<SessionEvent> {
        if self.payment.is_paid() {
            return vec![self.notify(Notification::error(ALREADY_PAID_MESSAGE))];
        }
        if !self.payment.terms_accepted {
            return vec![self.notify(Notification::error(TERMS_REQUIRED_MESSAGE))];
        }
        let summary = match can_book(&catalog.store, &self.selection) {
            Ok(summary) => summary,
            Err(error) => {
                self.booking = None;
                return vec![self.notify(Notification::error(error.user_message()))];
            }
        };
        if self.requirements.is_none() || self.requirements_booking.as_ref() != Some(&summary) {
            return vec![self.notify(Notification::error(REQUIREMENTS_MISSING_MESSAGE))];
        }

        let receipt = PaymentReceipt::issue(now);
        info!(sample_id = %receipt.sample_id, "payment recorded");
        self.payment.record(receipt.clone());
        vec![
            SessionEvent::Paid(receipt),
            self.notify(Notification::success(PAYMENT_DONE_MESSAGE)),
        ]
    }

    /// Drops requirements, pickup and payment left from an earlier booking.
    fn reset_downstream(&mut self) {
        self.requirements = None;
        self.requirements_booking = None;
        self.pickup = PickupTracker::default();
        self.payment = PaymentState::default();
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<SessionEvent> {
        let screens = Screen::ALL;
        let current = screens
            .iter()
            .position(|screen| *screen == self.screen)
            .unwrap_or(0) as isize;
        let len = screens.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        vec![self.show(screens[next])]
    }

    fn show(&mut self, screen: Screen) -> SessionEvent {
        self.screen = screen;
        SessionEvent::ScreenChanged(screen)
    }

    fn notify(&mut self, notification: Notification) -> SessionEvent {
        self.notification = Some(notification.clone());
        SessionEvent::Notified(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ALREADY_PAID_MESSAGE, REQUIREMENTS_ACCEPTED_MESSAGE, REQUIREMENTS_MISSING_MESSAGE,
        SessionCommand, SessionEvent, SessionState,
    };
    use crate::{
        Catalog, LabId, Notification, PickupStage, RequirementsFormInput, Screen,
        TERMS_REQUIRED_MESSAGE, builtin_catalog,
    };
    use time::OffsetDateTime;

    fn catalog() -> Catalog {
        builtin_catalog().expect("builtin catalog is valid")
    }

    fn filled_form() -> RequirementsFormInput {
        RequirementsFormInput {
            description: "Polymer film".to_owned(),
            quantity: "20 mg".to_owned(),
            ..RequirementsFormInput::default()
        }
    }

    fn booked_session(catalog: &Catalog) -> SessionState {
        let mut state = SessionState::default();
        state.dispatch(catalog, SessionCommand::ChooseTest("FTIR".to_owned()));
        state.dispatch(catalog, SessionCommand::ChooseLab(LabId::from("ncl")));
        state.dispatch(catalog, SessionCommand::Book);
        state
    }

    #[test]
    fn screen_rotation_wraps() {
        let catalog = catalog();
        let mut state = SessionState {
            screen: Screen::Orders,
            ..SessionState::default()
        };
        let events = state.dispatch(&catalog, SessionCommand::NextScreen);
        assert_eq!(state.screen, Screen::Catalog);
        assert_eq!(events, vec![SessionEvent::ScreenChanged(Screen::Catalog)]);

        state.dispatch(&catalog, SessionCommand::PrevScreen);
        assert_eq!(state.screen, Screen::Orders);
    }

    #[test]
    fn choosing_test_moves_to_labs() {
        let catalog = catalog();
        let mut state = SessionState::default();
        let events = state.dispatch(&catalog, SessionCommand::ChooseTest("XPS".to_owned()));
        assert_eq!(
            events,
            vec![
                SessionEvent::TestChosen("XPS".to_owned()),
                SessionEvent::ScreenChanged(Screen::Labs),
            ]
        );
    }

    #[test]
    fn unavailable_lab_pick_names_test_and_lab() {
        let catalog = catalog();
        let mut state = SessionState::default();
        state.dispatch(&catalog, SessionCommand::ChooseTest("TEM".to_owned()));
        let events = state.dispatch(&catalog, SessionCommand::ChooseLab(LabId::from("ncl")));

        assert_eq!(
            events,
            vec![SessionEvent::Notified(Notification::error(
                "TEM is not available at National Chemical Laboratory (NCL), Pune. Please select a different lab or test."
            ))]
        );
        assert_eq!(state.selection.lab(), None);
    }

    #[test]
    fn unknown_lab_is_reported_without_state_change() {
        let catalog = catalog();
        let mut state = SessionState::default();
        let events = state.dispatch(&catalog, SessionCommand::ChooseLab(LabId::from("nope")));
        assert_eq!(
            events,
            vec![SessionEvent::Notified(Notification::error("Unknown lab nope."))]
        );
        assert_eq!(state.selection.lab(), None);
    }

    #[test]
    fn book_moves_to_requirements_with_summary() {
        let catalog = catalog();
        let state = booked_session(&catalog);
        assert_eq!(state.screen, Screen::Requirements);
        let booking = state.booking.expect("booked");
        assert_eq!(booking.price, "₹1000/sample");
        assert_eq!(booking.turnaround, "3 days");
    }

    #[test]
    fn changing_test_drops_stale_booking() {
        let catalog = catalog();
        let mut state = booked_session(&catalog);
        state.dispatch(&catalog, SessionCommand::ChooseTest("TEM".to_owned()));
        assert!(state.booking.is_none());

        let events = state.dispatch(&catalog, SessionCommand::SubmitRequirements(filled_form()));
        assert_eq!(
            events,
            vec![SessionEvent::Notified(Notification::error(
                "Selected test is not available at this lab. Please choose a different combination."
            ))]
        );
        assert!(state.requirements.is_none());
    }

    #[test]
    fn requirements_start_pickup() {
        let catalog = catalog();
        let mut state = booked_session(&catalog);

        let rejected = state.dispatch(
            &catalog,
            SessionCommand::SubmitRequirements(RequirementsFormInput::default()),
        );
        assert_eq!(rejected.len(), 1);
        assert_eq!(state.screen, Screen::Requirements);

        let events = state.dispatch(&catalog, SessionCommand::SubmitRequirements(filled_form()));
        assert!(matches!(
            events.first(),
            Some(SessionEvent::RequirementsSubmitted { .. })
        ));
        assert_eq!(state.screen, Screen::Pickup);
        assert_eq!(state.pickup.stage(), Some(PickupStage::Scheduled));
        assert_eq!(
            state.notification,
            Some(Notification::success(REQUIREMENTS_ACCEPTED_MESSAGE))
        );

        for _ in 0..5 {
            state.dispatch(&catalog, SessionCommand::AdvancePickup);
        }
        assert!(state.pickup.is_delivered());
        assert!(
            state
                .dispatch(&catalog, SessionCommand::AdvancePickup)
                .is_empty()
        );
    }

    #[test]
    fn payment_requires_terms_requirements_and_happens_once() {
        let catalog = catalog();
        let now = OffsetDateTime::UNIX_EPOCH;
        let mut state = booked_session(&catalog);

        state.dispatch(&catalog, SessionCommand::Pay { now });
        assert_eq!(
            state.notification,
            Some(Notification::error(TERMS_REQUIRED_MESSAGE))
        );

        state.dispatch(&catalog, SessionCommand::SetTermsAccepted(true));
        state.dispatch(&catalog, SessionCommand::Pay { now });
        assert_eq!(
            state.notification,
            Some(Notification::error(REQUIREMENTS_MISSING_MESSAGE))
        );
        assert!(!state.payment.report_unlocked());

        state.dispatch(&catalog, SessionCommand::SubmitRequirements(filled_form()));
        let events = state.dispatch(&catalog, SessionCommand::Pay { now });
        assert!(matches!(events.first(), Some(SessionEvent::Paid(_))));
        assert!(state.payment.report_unlocked());

        state.dispatch(&catalog, SessionCommand::Pay { now });
        assert_eq!(
            state.notification,
            Some(Notification::error(ALREADY_PAID_MESSAGE))
        );
    }

    #[test]
    fn rebooking_another_pair_discards_earlier_requirements() {
        let catalog = catalog();
        let now = OffsetDateTime::UNIX_EPOCH;
        let mut state = booked_session(&catalog);
        state.dispatch(&catalog, SessionCommand::SubmitRequirements(filled_form()));
        assert_eq!(state.pickup.stage(), Some(PickupStage::Scheduled));

        state.dispatch(&catalog, SessionCommand::ChooseTest("XPS".to_owned()));
        state.dispatch(&catalog, SessionCommand::ChooseLab(LabId::from("diya")));
        let booked = state.dispatch(&catalog, SessionCommand::Book);
        assert!(matches!(booked.first(), Some(SessionEvent::Booked(_))));
        assert!(state.requirements.is_none());
        assert!(state.requirements_booking.is_none());
        assert_eq!(state.pickup.stage(), None);

        state.dispatch(&catalog, SessionCommand::SetTermsAccepted(true));
        let events = state.dispatch(&catalog, SessionCommand::Pay { now });
        assert_eq!(
            events,
            vec![SessionEvent::Notified(Notification::error(
                REQUIREMENTS_MISSING_MESSAGE
            ))]
        );
        assert!(!state.payment.report_unlocked());
    }

    #[test]
    fn rebooking_the_same_pair_keeps_requirements() {
        let catalog = catalog();
        let mut state = booked_session(&catalog);
        state.dispatch(&catalog, SessionCommand::SubmitRequirements(filled_form()));

        state.dispatch(&catalog, SessionCommand::BackToLabs);
        state.dispatch(&catalog, SessionCommand::Book);
        assert!(state.requirements.is_some());
        assert_eq!(state.pickup.stage(), Some(PickupStage::Scheduled));
    }

    #[test]
    fn paying_for_a_pair_without_its_requirements_is_refused() {
        let catalog = catalog();
        let now = OffsetDateTime::UNIX_EPOCH;
        let mut state = SessionState::default();
        state.dispatch(&catalog, SessionCommand::ChooseLab(LabId::from("diya")));
        state.dispatch(&catalog, SessionCommand::ChooseTest("XPS".to_owned()));
        state.dispatch(&catalog, SessionCommand::Book);
        state.dispatch(&catalog, SessionCommand::SubmitRequirements(filled_form()));

        // switch to another test the same lab offers, skipping the booking step
        let other = catalog
            .store
            .lab(&LabId::from("diya"))
            .and_then(|lab| lab.offerings.keys().find(|test| test.as_str() != "XPS"))
            .cloned()
            .expect("diya offers more than XPS");
        state.dispatch(&catalog, SessionCommand::ChooseTest(other));
        state.dispatch(&catalog, SessionCommand::SetTermsAccepted(true));
        state.dispatch(&catalog, SessionCommand::Pay { now });
        assert_eq!(
            state.notification,
            Some(Notification::error(REQUIREMENTS_MISSING_MESSAGE))
        );
        assert!(!state.payment.is_paid());
    }
}
