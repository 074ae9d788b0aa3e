// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use testify_app::{
    Availability, BookingSummary, Catalog, ContactPreference, LabId, LabOrder, MapPin,
    Notification, OrderDecision, OrderId, POSITION_MAX, PaymentReceipt, PickupStage,
    RequirementsField, RequirementsFormInput, Resolution, SafetyFlags, Screen, SessionCommand,
    SessionEvent, SessionState, Severity, StorageCondition, Urgency, catalog_tiles,
    decision_notification, lab_cards, map_pins, resolve,
};
use time::OffsetDateTime;

const CURSOR_MARK: &str = "›";
const INPUT_CARET: &str = "▏";
const MAP_WIDTH: usize = 41;
const MAP_HEIGHT: usize = 17;
const PROGRESS_WIDTH: usize = 20;

/// Host side of the UI: catalog access plus the lab order inbox.
pub trait AppRuntime {
    fn catalog(&self) -> &Catalog;
    fn submit_order(
        &mut self,
        summary: &BookingSummary,
        requirements: &RequirementsFormInput,
    ) -> Result<OrderId>;
    fn load_orders(&mut self) -> Result<OrderSnapshot>;
    fn decide_order(&mut self, id: OrderId, decision: OrderDecision) -> Result<LabOrder>;
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSnapshot {
    pub pending: Vec<LabOrder>,
    pub history: Vec<LabOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub status_clear: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            status_clear: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    CatalogSearch,
    LabFilter,
    FormField(RequirementsField),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormUiState {
    draft: RequirementsFormInput,
    field_index: usize,
}

impl FormUiState {
    fn field(&self) -> RequirementsField {
        RequirementsField::ALL[self.field_index.min(RequirementsField::ALL.len() - 1)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewData {
    catalog_cursor: usize,
    lab_cursor: usize,
    order_cursor: usize,
    input: Option<InputTarget>,
    form: FormUiState,
    orders: OrderSnapshot,
    help_visible: bool,
    status_token: u64,
    status_clear: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PanelText {
    body: String,
    focus: usize,
}

impl PanelText {
    fn new(lines: Vec<String>, focus: usize) -> Self {
        Self {
            body: lines.join("\n"),
            focus,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        status_clear: options.status_clear,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    refresh_orders(session, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(session, runtime, &view_data, &internal_rx);

        let now = runtime.now();
        if let Err(error) =
            terminal.draw(|frame| render(frame, session, runtime.catalog(), &view_data, now))
        {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)) {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error).context("poll event");
                break;
            }
        };
        if has_event {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if handle_key_event(session, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error).context("read event");
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &R,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                session.dispatch(runtime.catalog(), SessionCommand::ClearNotification);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, delay: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn arm_status_clear(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token, view_data.status_clear);
}

fn notify<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notification: Notification,
) {
    session.dispatch(runtime.catalog(), SessionCommand::Notify(notification));
    arm_status_clear(view_data, internal_tx);
}

fn dispatch_session<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: SessionCommand,
) -> Vec<SessionEvent> {
    let events = session.dispatch(runtime.catalog(), command);
    for event in &events {
        match event {
            SessionEvent::Notified(_) => arm_status_clear(view_data, internal_tx),
            SessionEvent::ScreenChanged(_) => view_data.input = None,
            SessionEvent::RequirementsSubmitted {
                summary,
                requirements,
            } => {
                view_data.form = FormUiState::default();
                match runtime.submit_order(summary, requirements) {
                    Ok(_) => refresh_orders(session, runtime, view_data, internal_tx),
                    Err(error) => notify(
                        session,
                        runtime,
                        view_data,
                        internal_tx,
                        Notification::error(format!("order submission failed: {error:#}")),
                    ),
                }
            }
            _ => {}
        }
    }
    events
}

fn refresh_orders<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_orders() {
        Ok(orders) => {
            view_data.order_cursor = view_data
                .order_cursor
                .min(orders.pending.len().saturating_sub(1));
            view_data.orders = orders;
        }
        Err(error) => notify(
            session,
            runtime,
            view_data,
            internal_tx,
            Notification::error(format!("load orders failed: {error:#}")),
        ),
    }
}

fn handle_key_event<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if let Some(target) = view_data.input {
        handle_input_key(session, runtime, view_data, internal_tx, target, key);
        return false;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            return false;
        }
        (KeyCode::Char('f'), KeyModifiers::NONE) | (KeyCode::Tab, _) => {
            dispatch_session(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::NextScreen,
            );
            return false;
        }
        (KeyCode::Char('b'), KeyModifiers::NONE) | (KeyCode::BackTab, _) => {
            dispatch_session(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::PrevScreen,
            );
            return false;
        }
        (KeyCode::Esc, _) => {
            session.dispatch(runtime.catalog(), SessionCommand::ClearNotification);
            return false;
        }
        _ => {}
    }

    match session.screen {
        Screen::Catalog => handle_catalog_key(session, runtime, view_data, internal_tx, key),
        Screen::Labs => handle_labs_key(session, runtime, view_data, internal_tx, key),
        Screen::Requirements => {
            handle_requirements_key(session, runtime, view_data, internal_tx, key)
        }
        Screen::Pickup => {
            if key.code == KeyCode::Char('n') {
                dispatch_session(
                    session,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::AdvancePickup,
                );
            }
        }
        Screen::Payment => handle_payment_key(session, runtime, view_data, internal_tx, key),
        Screen::Orders => handle_orders_key(session, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_input_key<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    target: InputTarget,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => view_data.input = None,
        KeyCode::Backspace => {
            edit_input(session, runtime, view_data, internal_tx, target, |text| {
                text.pop();
            });
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit_input(session, runtime, view_data, internal_tx, target, |text| {
                text.push(ch);
            });
        }
        _ => {}
    }
}

fn edit_input<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    target: InputTarget,
    edit: impl FnOnce(&mut String),
) {
    match target {
        InputTarget::CatalogSearch => {
            let mut query = session.catalog_query.clone();
            edit(&mut query);
            view_data.catalog_cursor = 0;
            dispatch_session(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetCatalogQuery(query),
            );
        }
        InputTarget::LabFilter => {
            let mut query = session.lab_query.clone();
            edit(&mut query);
            view_data.lab_cursor = 0;
            dispatch_session(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetLabQuery(query),
            );
        }
        InputTarget::FormField(field) => {
            if let Some(text) = text_field_mut(&mut view_data.form.draft, field) {
                edit(text);
            }
        }
    }
}

fn handle_catalog_key<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let names = visible_test_names(session, runtime.catalog());
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            move_cursor(&mut view_data.catalog_cursor, names.len(), 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_cursor(&mut view_data.catalog_cursor, names.len(), -1);
        }
        KeyCode::Char('/') => view_data.input = Some(InputTarget::CatalogSearch),
        KeyCode::Enter => {
            if let Some(name) = names.get(view_data.catalog_cursor) {
                dispatch_session(
                    session,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::ChooseTest(name.clone()),
                );
            }
        }
        _ => {}
    }
}

fn handle_labs_key<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let lab_ids = visible_lab_ids(session, runtime.catalog());
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            move_cursor(&mut view_data.lab_cursor, lab_ids.len(), 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_cursor(&mut view_data.lab_cursor, lab_ids.len(), -1);
        }
        KeyCode::Char('/') => view_data.input = Some(InputTarget::LabFilter),
        KeyCode::Enter => {
            if let Some(lab_id) = lab_ids.get(view_data.lab_cursor) {
                dispatch_session(
                    session,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::ChooseLab(lab_id.clone()),
                );
            }
        }
        KeyCode::Char('B') => {
            dispatch_session(session, runtime, view_data, internal_tx, SessionCommand::Book);
        }
        _ => {}
    }
}

fn handle_requirements_key<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let field = view_data.form.field();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_cursor(
            &mut view_data.form.field_index,
            RequirementsField::ALL.len(),
            1,
        ),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(
            &mut view_data.form.field_index,
            RequirementsField::ALL.len(),
            -1,
        ),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if field.is_text() {
                view_data.input = Some(InputTarget::FormField(field));
            } else {
                cycle_choice(&mut view_data.form.draft, field);
            }
        }
        KeyCode::Char(digit @ '1'..='5') if field == RequirementsField::Safety => {
            let index = digit as usize - '1' as usize;
            view_data.form.draft.safety.toggle(index);
        }
        KeyCode::Char('s') => {
            let form = view_data.form.draft.clone();
            dispatch_session(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SubmitRequirements(form),
            );
        }
        KeyCode::Char('l') => {
            dispatch_session(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::BackToLabs,
            );
        }
        _ => {}
    }
}

fn handle_payment_key<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Char('t') => SessionCommand::SetTermsAccepted(!session.payment.terms_accepted),
        KeyCode::Char('p') => SessionCommand::Pay { now: runtime.now() },
        _ => return,
    };
    dispatch_session(session, runtime, view_data, internal_tx, command);
}

fn handle_orders_key<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let len = view_data.orders.pending.len();
            move_cursor(&mut view_data.order_cursor, len, 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let len = view_data.orders.pending.len();
            move_cursor(&mut view_data.order_cursor, len, -1);
        }
        KeyCode::Char('a') => decide_selected_order(
            session,
            runtime,
            view_data,
            internal_tx,
            OrderDecision::Accept,
        ),
        KeyCode::Char('r') => decide_selected_order(
            session,
            runtime,
            view_data,
            internal_tx,
            OrderDecision::Reject,
        ),
        KeyCode::Char('R') => refresh_orders(session, runtime, view_data, internal_tx),
        _ => {}
    }
}

fn decide_selected_order<R: AppRuntime>(
    session: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    decision: OrderDecision,
) {
    let Some(id) = view_data
        .orders
        .pending
        .get(view_data.order_cursor)
        .map(|order| order.id)
    else {
        notify(
            session,
            runtime,
            view_data,
            internal_tx,
            Notification::error("No pending orders."),
        );
        return;
    };

    let notification = match runtime.decide_order(id, decision) {
        Ok(order) => decision_notification(&order),
        Err(error) => Notification::error(format!("{error:#}")),
    };
    notify(session, runtime, view_data, internal_tx, notification);
    refresh_orders(session, runtime, view_data, internal_tx);
}

fn visible_test_names(session: &SessionState, catalog: &Catalog) -> Vec<String> {
    catalog
        .index
        .search(&session.catalog_query)
        .into_iter()
        .flat_map(|category| category.tests)
        .collect()
}

fn visible_lab_ids(session: &SessionState, catalog: &Catalog) -> Vec<LabId> {
    catalog
        .store
        .filter_labs(&session.lab_query)
        .into_iter()
        .map(|lab| lab.id.clone())
        .collect()
}

fn move_cursor(cursor: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *cursor = 0;
        return;
    }
    let max = (len - 1) as isize;
    *cursor = (*cursor as isize + delta).clamp(0, max) as usize;
}

fn text_field_mut(
    draft: &mut RequirementsFormInput,
    field: RequirementsField,
) -> Option<&mut String> {
    match field {
        RequirementsField::Description => Some(&mut draft.description),
        RequirementsField::Quantity => Some(&mut draft.quantity),
        RequirementsField::SpecialInstructions => Some(&mut draft.special_instructions),
        RequirementsField::ExpectedResults => Some(&mut draft.expected_results),
        RequirementsField::Storage
        | RequirementsField::Urgency
        | RequirementsField::Safety
        | RequirementsField::Contact => None,
    }
}

fn cycle_choice(draft: &mut RequirementsFormInput, field: RequirementsField) {
    match field {
        RequirementsField::Storage => {
            draft.storage = next_in(&StorageCondition::ALL, draft.storage);
        }
        RequirementsField::Urgency => draft.urgency = next_in(&Urgency::ALL, draft.urgency),
        RequirementsField::Contact => {
            draft.contact = next_in(&ContactPreference::ALL, draft.contact);
        }
        _ => {}
    }
}

fn next_in<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let index = all.iter().position(|value| *value == current).unwrap_or(0);
    all[(index + 1) % all.len()]
}

fn field_value(draft: &RequirementsFormInput, field: RequirementsField) -> String {
    match field {
        RequirementsField::Description => draft.description.clone(),
        RequirementsField::Quantity => draft.quantity.clone(),
        RequirementsField::Storage => draft.storage.label().to_owned(),
        RequirementsField::Urgency => draft.urgency.label().to_owned(),
        RequirementsField::SpecialInstructions => draft.special_instructions.clone(),
        RequirementsField::Safety => draft.safety.labels().join(", "),
        RequirementsField::ExpectedResults => draft.expected_results.clone(),
        RequirementsField::Contact => draft.contact.label().to_owned(),
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    session: &SessionState,
    catalog: &Catalog,
    view_data: &ViewData,
    now: OffsetDateTime,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = Screen::ALL
        .iter()
        .position(|screen| *screen == session.screen)
        .unwrap_or(0);
    let titles = Screen::ALL
        .iter()
        .map(|screen| screen.label())
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("testify").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let text = screen_text(session, catalog, view_data, now);
    if session.screen == Screen::Labs {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(layout[1]);
        render_panel(frame, columns[0], session.screen.label(), text);
        let pins = map_pins(&catalog.store, &session.selection, &session.lab_query);
        render_panel(
            frame,
            columns[1],
            "map",
            PanelText::new(vec![render_map_text(&pins)], 0),
        );
    } else {
        render_panel(frame, layout[1], session.screen.label(), text);
    }

    let status_style = match session.notification.as_ref().map(|note| note.severity) {
        Some(Severity::Success) => Style::default().fg(Color::Green),
        Some(Severity::Error) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::Yellow),
    };
    let status = Paragraph::new(status_text(session, view_data))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn screen_text(
    session: &SessionState,
    catalog: &Catalog,
    view_data: &ViewData,
    now: OffsetDateTime,
) -> PanelText {
    match session.screen {
        Screen::Catalog => render_catalog_text(session, catalog, view_data),
        Screen::Labs => render_labs_text(session, catalog, view_data),
        Screen::Requirements => render_requirements_text(session, view_data),
        Screen::Pickup => render_pickup_text(session),
        Screen::Payment => render_payment_text(session),
        Screen::Orders => render_orders_text(&view_data.orders, view_data.order_cursor, now),
    }
}

fn render_panel(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, text: PanelText) {
    let visible_rows = usize::from(area.height.saturating_sub(2));
    let offset = text.focus.saturating_sub(visible_rows / 2);
    let panel = Paragraph::new(text.body)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
        .block(Block::default().title(title.to_owned()).borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_catalog_text(session: &SessionState, catalog: &Catalog, view_data: &ViewData) -> PanelText {
    let caret = if view_data.input == Some(InputTarget::CatalogSearch) {
        INPUT_CARET
    } else {
        ""
    };
    let mut lines = vec![
        format!("search: {}{caret}", session.catalog_query),
        format!(
            "selected test: {}",
            session.selection.test().unwrap_or("none")
        ),
    ];

    let found = catalog.index.search(&session.catalog_query);
    let tiles = catalog_tiles(&found, &catalog.store);
    if tiles.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "no tests match \"{}\"",
            session.catalog_query.trim()
        ));
        return PanelText::new(lines, 0);
    }

    let mut focus = 0;
    let mut current_category = None;
    for (index, tile) in tiles.iter().enumerate() {
        if current_category != Some(tile.category) {
            lines.push(String::new());
            lines.push(format!("[{}]", tile.category));
            current_category = Some(tile.category);
        }
        let marker = if index == view_data.catalog_cursor {
            focus = lines.len();
            CURSOR_MARK
        } else {
            " "
        };
        let picked = if session.selection.test() == Some(tile.name) {
            "*"
        } else {
            " "
        };
        let terms = [tile.price(), tile.quantity(), tile.turnaround()]
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" · ");
        lines.push(format!("{marker}{picked} {:<30} {terms}", tile.name));
    }
    PanelText::new(lines, focus)
}

fn resolution_line(resolution: &Resolution<'_>) -> String {
    match resolution {
        Resolution::Idle => "Pick a test on the tests screen to compare labs.".to_owned(),
        Resolution::Browsing {
            test,
            representative: Some(offering),
            ..
        } => format!(
            "{test}: from {} · {} · {}",
            offering.price, offering.quantity, offering.turnaround
        ),
        Resolution::Browsing {
            test,
            representative: None,
            ..
        } => format!("{test}: no lab offers this test"),
        Resolution::Resolved {
            lab,
            test,
            offering,
        } => format!(
            "{test} at {}: {} · {} · {}",
            lab.name, offering.price, offering.quantity, offering.turnaround
        ),
        Resolution::Unavailable { test, lab } => {
            format!("{test} is not offered by lab {lab}")
        }
    }
}

fn render_labs_text(session: &SessionState, catalog: &Catalog, view_data: &ViewData) -> PanelText {
    let caret = if view_data.input == Some(InputTarget::LabFilter) {
        INPUT_CARET
    } else {
        ""
    };
    let mut lines = vec![
        resolution_line(&resolve(&catalog.store, &session.selection)),
        format!("filter: {}{caret}", session.lab_query),
        String::new(),
    ];

    let cards = lab_cards(&catalog.store, &session.selection, &session.lab_query);
    if cards.is_empty() {
        lines.push(format!("no labs match \"{}\"", session.lab_query.trim()));
        return PanelText::new(lines, 0);
    }

    let mut focus = 0;
    for (index, card) in cards.iter().enumerate() {
        let marker = if index == view_data.lab_cursor {
            focus = lines.len();
            CURSOR_MARK
        } else {
            " "
        };
        let check = if card.selected { "[x]" } else { "[ ]" };
        let badge = if card.lab.certified {
            "  [Certified]"
        } else {
            ""
        };
        lines.push(format!("{marker} {check} {}{badge}", card.lab.name));
        if !card.lab.address.is_empty() {
            lines.push(format!("      {}", card.lab.address));
        }
        let status = card.availability.status_label();
        if status.is_empty() {
            lines.push(format!("      {}", card.availability.price()));
        } else {
            lines.push(format!("      {}  {status}", card.availability.price()));
        }
        if let Availability::Available(offering) = card.availability {
            lines.push(format!(
                "      {} · {}",
                offering.quantity, offering.turnaround
            ));
        }
    }
    PanelText::new(lines, focus)
}

fn render_map_text(pins: &[MapPin<'_>]) -> String {
    let mut grid = vec![vec!['·'; MAP_WIDTH]; MAP_HEIGHT];
    let scale = usize::from(POSITION_MAX);
    let mut legend = Vec::with_capacity(pins.len());
    for (index, pin) in pins.iter().enumerate() {
        let x = usize::from(pin.position.x.min(POSITION_MAX));
        let y = usize::from(pin.position.y.min(POSITION_MAX));
        let glyph = pin_glyph(index, pin.selected);
        grid[y * (MAP_HEIGHT - 1) / scale][x * (MAP_WIDTH - 1) / scale] = glyph;

        let certified = if pin.certified { " (certified)" } else { "" };
        legend.push(format!("{glyph} {}{certified}", pin.name));
    }

    let mut lines = grid
        .into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.extend(legend);
    lines.join("\n")
}

fn pin_glyph(index: usize, selected: bool) -> char {
    if selected {
        return '◉';
    }
    char::from_digit((index % 9 + 1) as u32, 10).unwrap_or('•')
}

fn booking_lines(booking: Option<&BookingSummary>) -> Vec<String> {
    match booking {
        Some(summary) => vec![
            format!("lab: {}", summary.lab_name),
            format!("address: {}", summary.lab_address),
            format!("test: {}", summary.test),
            format!("price: {}", summary.price),
            format!("sample required: {}", summary.quantity),
            format!("turnaround: {}", summary.turnaround),
        ],
        None => vec![
            "No booking yet. Pick a test and a lab, then press B on the labs screen.".to_owned(),
        ],
    }
}

fn render_requirements_text(session: &SessionState, view_data: &ViewData) -> PanelText {
    let mut lines = booking_lines(session.booking.as_ref());
    lines.push(String::new());

    let draft = &view_data.form.draft;
    let selected_flags = draft.safety.labels();
    let mut focus = 0;
    for (index, field) in RequirementsField::ALL.iter().enumerate() {
        let marker = if index == view_data.form.field_index {
            focus = lines.len();
            CURSOR_MARK
        } else {
            " "
        };
        if *field == RequirementsField::Safety {
            lines.push(format!("{marker} {}:", field.label()));
            for (flag_index, label) in SafetyFlags::LABELS.iter().enumerate() {
                let mark = if selected_flags.contains(label) {
                    "x"
                } else {
                    " "
                };
                lines.push(format!("    [{mark}] {} {label}", flag_index + 1));
            }
            continue;
        }
        let caret = if view_data.input == Some(InputTarget::FormField(*field)) {
            INPUT_CARET
        } else {
            ""
        };
        lines.push(format!(
            "{marker} {}: {}{caret}",
            field.label(),
            field_value(draft, *field)
        ));
    }
    PanelText::new(lines, focus)
}

fn render_pickup_text(session: &SessionState) -> PanelText {
    let Some(current) = session.pickup.stage() else {
        return PanelText::new(
            vec!["Pickup starts once sample requirements are submitted.".to_owned()],
            0,
        );
    };

    let mut lines = PickupStage::ALL
        .iter()
        .map(|stage| {
            let mark = if stage.index() <= current.index() {
                "✓"
            } else {
                " "
            };
            format!("[{mark}] {}", stage.label())
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push(progress_bar(session.pickup.percent()));
    if session.pickup.is_delivered() {
        lines.push("Sample delivered to the lab. Continue to payment.".to_owned());
    }
    PanelText::new(lines, 0)
}

fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = usize::from(percent) * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}] {percent}%",
        "█".repeat(filled),
        " ".repeat(PROGRESS_WIDTH - filled)
    )
}

fn render_payment_text(session: &SessionState) -> PanelText {
    let mut lines = booking_lines(session.booking.as_ref());
    lines.push(String::new());
    let terms = if session.payment.terms_accepted {
        "[x]"
    } else {
        "[ ]"
    };
    lines.push(format!("{terms} I agree to the terms of service"));
    lines.push(String::new());

    match session.payment.receipt() {
        Some(receipt) => lines.extend(report_lines(session.booking.as_ref(), receipt)),
        None => lines.push("Report locked until payment.".to_owned()),
    }
    PanelText::new(lines, 0)
}

fn report_lines(booking: Option<&BookingSummary>, receipt: &PaymentReceipt) -> Vec<String> {
    let mut lines = vec![
        format!("Paid. Sample id {}", receipt.sample_id),
        String::new(),
        "AI analysis report".to_owned(),
        format!("sample id: {}", receipt.sample_id),
        format!("report date: {}", receipt.report_date),
    ];
    if let Some(summary) = booking {
        lines.push(format!("test: {} at {}", summary.test, summary.lab_name));
    }
    lines.push("status: results are being compiled by the lab".to_owned());
    lines
}

fn render_orders_text(orders: &OrderSnapshot, cursor: usize, now: OffsetDateTime) -> PanelText {
    let mut lines = vec![format!("pending ({})", orders.pending.len())];
    let mut focus = 0;
    if orders.pending.is_empty() {
        lines.push("  no pending orders".to_owned());
    }
    for (index, order) in orders.pending.iter().enumerate() {
        let marker = if index == cursor {
            focus = lines.len();
            CURSOR_MARK
        } else {
            " "
        };
        let requirements = &order.requirements;
        lines.push(format!(
            "{marker} #{} {} · {} · {}",
            order.id.get(),
            order.researcher,
            order.institution,
            format_age(order.booked_at, now)
        ));
        lines.push(format!(
            "     {} · {} · {} · {}",
            order.test,
            order.sample_quantity,
            requirements.urgency.label(),
            requirements.storage.label()
        ));
        if !requirements.description.is_empty() {
            lines.push(format!("     {}", requirements.description));
        }
        let flags = requirements.safety.labels();
        if !flags.is_empty() {
            lines.push(format!("     safety: {}", flags.join(", ")));
        }
        if !requirements.special_instructions.is_empty() {
            lines.push(format!("     notes: {}", requirements.special_instructions));
        }
    }

    lines.push(String::new());
    lines.push("history".to_owned());
    if orders.history.is_empty() {
        lines.push("  no decisions yet".to_owned());
    }
    for order in &orders.history {
        lines.push(format!(
            "  #{} {} · {} · {}",
            order.id.get(),
            order.researcher,
            order.test,
            order.status.label()
        ));
    }
    PanelText::new(lines, focus)
}

fn format_age(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let minutes = (now - then).whole_minutes();
    match minutes {
        i64::MIN..=0 => "just now".to_owned(),
        1..=59 => format!("{minutes} min ago"),
        60..=1439 => format!("{} h ago", minutes / 60),
        _ => format!("{} d ago", minutes / 1440),
    }
}

fn screen_hints(screen: Screen) -> &'static str {
    match screen {
        Screen::Catalog => "j/k move | / search | enter pick test",
        Screen::Labs => "j/k move | / filter | enter pick lab | B book",
        Screen::Requirements => "j/k field | enter edit | 1-5 safety | s submit | l labs",
        Screen::Pickup => "n advance",
        Screen::Payment => "t terms | p pay",
        Screen::Orders => "j/k move | a accept | r reject | R refresh",
    }
}

fn status_text(session: &SessionState, view_data: &ViewData) -> String {
    let hints = if view_data.input.is_some() {
        "typing | enter/esc done".to_owned()
    } else {
        format!(
            "{} | f/b screen | ? help | ctrl+q",
            screen_hints(session.screen)
        )
    };
    match &session.notification {
        Some(notification) => format!("{} | {hints}", notification.message),
        None => hints,
    }
}

fn help_overlay_text() -> &'static str {
    "f / tab       next screen\n\
b / shift+tab previous screen\n\
j / k         move\n\
/             search tests or filter labs\n\
enter         pick the highlighted test or lab\n\
B             book the selected test at the selected lab\n\
s             submit sample requirements\n\
l             back to labs from requirements\n\
n             advance the pickup tracker\n\
t / p         toggle terms / pay\n\
a / r         accept / reject a lab order\n\
esc           dismiss the notification\n\
ctrl+q        quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
