//! Application state and event handling

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use clinic_core::api::ApiClient;
use clinic_core::auth::AuthService;
use clinic_core::browser::ResourceBrowser;
use clinic_core::config::Config;
use clinic_core::daterange::{DateRangeState, Period};
use clinic_core::identifier::classify_search;
use clinic_core::notify::{Notification, Notifier};
use clinic_core::resources::{
    Appointment, AppointmentStatus, Billing, Patient, PersonRef, RecordStatus, StaffMember,
    Vitals, VitalsRecord,
};
use clinic_core::router::{Dashboard, RoleRouter, Workspace};
use clinic_core::session::SessionStore;
use clinic_core::validate::{validate_phone, validate_required};
use clinic_core::{Error, Result};

/// Run a browser method on whichever resource browser is active
macro_rules! with_browser {
    ($active:expr, $b:ident => $body:expr) => {
        match $active {
            ActiveBrowser::Patients($b) => Some($body),
            ActiveBrowser::Staff($b) => Some($body),
            ActiveBrowser::Appointments($b) => Some($body),
            ActiveBrowser::Billing($b) => Some($body),
            ActiveBrowser::Records($b) => Some($body),
            ActiveBrowser::Static => None,
        }
    };
}

/// Which field of the login form has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Identifier,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
    pub focus: LoginField,
}

/// One labelled text input of an edit form
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

/// What submitting the open form does
#[derive(Debug)]
pub enum FormKind {
    /// Create a new pending appointment
    BookAppointment,
    /// Save vitals readings onto the selected record
    CompleteVitals(VitalsRecord),
}

/// An open edit form; captures all key input until submitted or closed
#[derive(Debug)]
pub struct ResourceForm {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl ResourceForm {
    fn booking() -> Self {
        let field = |label| FormField {
            label,
            value: String::new(),
        };
        Self {
            kind: FormKind::BookAppointment,
            fields: vec![
                field("patient id"),
                field("patient name"),
                field("patient phone number"),
                field("doctor id"),
                field("doctor name"),
            ],
            focus: 0,
        }
    }

    fn vitals(record: VitalsRecord) -> Self {
        // Pre-fill from existing readings so re-editing a complete
        // record shows what was captured
        let existing = record.vitals.clone();
        let field = |label, get: fn(&Vitals) -> f64| FormField {
            label,
            value: existing
                .as_ref()
                .map(|v| get(v).to_string())
                .unwrap_or_default(),
        };
        Self {
            fields: vec![
                field("temperature", |v| v.temperature),
                field("height", |v| v.height),
                field("mass", |v| v.mass),
                field("heart rate", |v| v.heart_rate),
                field("systolic pressure", |v| v.systolic_number),
                field("diastolic pressure", |v| v.diastolic_number),
            ],
            kind: FormKind::CompleteVitals(record),
            focus: 0,
        }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn focus_previous(&mut self) {
        self.focus = self
            .focus
            .checked_sub(1)
            .unwrap_or(self.fields.len() - 1);
    }
}

fn required_pairs<'a>(fields: &'a [FormField]) -> Vec<(&'a str, &'a str)> {
    fields.iter().map(|f| (f.label, f.value.as_str())).collect()
}

fn parse_reading(field: &FormField) -> Result<f64> {
    field.value.trim().parse().map_err(|_| {
        Error::Validation(format!("Please provide a valid {}!", field.label))
    })
}

fn parse_id(field: &FormField) -> Result<i64> {
    field.value.trim().parse().map_err(|_| {
        Error::Validation(format!("Please provide a valid {}!", field.label))
    })
}

/// Build the updated record a vitals form submission saves
///
/// Fail fast: the first blank or non-numeric field produces the single
/// validation error, in field order.
fn completed_record(record: &VitalsRecord, fields: &[FormField]) -> Result<VitalsRecord> {
    validate_required(&required_pairs(fields))?;

    let vitals = Vitals {
        temperature: parse_reading(&fields[0])?,
        height: parse_reading(&fields[1])?,
        mass: parse_reading(&fields[2])?,
        heart_rate: parse_reading(&fields[3])?,
        systolic_number: parse_reading(&fields[4])?,
        diastolic_number: parse_reading(&fields[5])?,
    };

    let mut updated = record.clone();
    updated.vitals = Some(vitals);
    updated.status = RecordStatus::Complete;
    Ok(updated)
}

/// Build the pending appointment a booking form submission creates
fn appointment_from(fields: &[FormField], default_region: &str) -> Result<Appointment> {
    validate_required(&required_pairs(fields))?;
    validate_phone(fields[2].label, &fields[2].value, default_region)?;

    Ok(Appointment {
        id: 0,
        patient: PersonRef {
            id: parse_id(&fields[0])?,
            name: fields[1].value.trim().to_string(),
            phone: Some(fields[2].value.trim().to_string()),
        },
        doctor: PersonRef {
            id: parse_id(&fields[3])?,
            name: fields[4].value.trim().to_string(),
            phone: None,
        },
        status: AppointmentStatus::Pending,
        created_at: None,
    })
}

/// The resource browser mounted for the active workspace
pub enum ActiveBrowser {
    Patients(ResourceBrowser<Patient>),
    Staff(ResourceBrowser<StaffMember>),
    Appointments(ResourceBrowser<Appointment>),
    Billing(ResourceBrowser<Billing>),
    Records(ResourceBrowser<VitalsRecord>),
    /// Workspaces without a list view (report)
    Static,
}

pub struct DashboardState {
    pub dashboard: Dashboard,
    pub active_workspace: usize,
    pub browser: ActiveBrowser,
    pub dates: DateRangeState,
    pub filter_index: usize,
    /// Row highlighted in the list view
    pub cursor: usize,
    /// Search input buffer while the user is typing a search
    pub search_input: Option<String>,
    /// Open edit form; when set, it owns all key input
    pub form: Option<ResourceForm>,
}

impl DashboardState {
    pub fn workspace(&self) -> Workspace {
        self.dashboard.workspaces()[self.active_workspace]
    }

    /// Status filter choices offered for the active workspace
    pub fn filter_options(&self) -> &'static [&'static str] {
        match self.workspace() {
            Workspace::Appointments => &["", "PENDING", "COMPLETE", "CANCELLED"],
            Workspace::Billing => &["", "PENDING", "PARTIALLY_PAID", "PAID", "CANCELLED"],
            Workspace::Staff => &[
                "", "NURSE", "DOCTOR", "PHARMACIST", "TECHNICIAN", "RECEPTIONIST", "ON_DUTY",
                "OFF", "SUSPENDED",
            ],
            Workspace::IncompleteRecords => &["", "MISSING_VITALS"],
            _ => &[""],
        }
    }

    /// Whether the active workspace filters by date period
    pub fn is_date_filtered(&self) -> bool {
        matches!(
            self.workspace(),
            Workspace::Appointments | Workspace::Billing | Workspace::PastRecords
        )
    }
}

pub enum Screen {
    Login(LoginForm),
    Dashboard(DashboardState),
}

pub struct App {
    pub config: Config,
    pub client: ApiClient,
    pub notifier: Notifier,
    pub router: RoleRouter,
    pub auth: AuthService,
    pub screen: Screen,
    /// Most recent toasts, newest last
    pub toasts: Vec<Notification>,
    pub should_quit: bool,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = ApiClient::new(&config.api)?;
        let notifier = Notifier::new();
        let store = SessionStore::new();
        let router = RoleRouter::new(store.clone());
        let auth = AuthService::new(
            Arc::new(client.clone()),
            store,
            notifier.clone(),
            config.locale.default_region.clone(),
        );

        let screen = match router.dashboard() {
            Some(dashboard) => Screen::Dashboard(Self::mount_dashboard(
                &client,
                &notifier,
                dashboard,
                0,
            )),
            None => Screen::Login(LoginForm::default()),
        };

        Ok(Self {
            config,
            client,
            notifier,
            router,
            auth,
            screen,
            toasts: Vec::new(),
            should_quit: false,
        })
    }

    fn mount_dashboard(
        client: &ApiClient,
        notifier: &Notifier,
        dashboard: Dashboard,
        workspace: usize,
    ) -> DashboardState {
        let browser = match dashboard.workspaces()[workspace] {
            Workspace::Patients => {
                ActiveBrowser::Patients(ResourceBrowser::new(
                    Arc::new(client.gateway::<Patient>()),
                    notifier.clone(),
                ))
            }
            Workspace::Staff => ActiveBrowser::Staff(ResourceBrowser::new(
                Arc::new(client.gateway::<StaffMember>()),
                notifier.clone(),
            )),
            // Booking creates appointments, so it shares the
            // appointment gateway; the form opens on top of the list
            Workspace::Appointments | Workspace::BookAppointment => {
                ActiveBrowser::Appointments(ResourceBrowser::new(
                    Arc::new(client.gateway::<Appointment>()),
                    notifier.clone(),
                ))
            }
            Workspace::Billing => ActiveBrowser::Billing(ResourceBrowser::new(
                Arc::new(client.gateway::<Billing>()),
                notifier.clone(),
            )),
            Workspace::IncompleteRecords | Workspace::PastRecords => {
                ActiveBrowser::Records(ResourceBrowser::new(
                    Arc::new(client.gateway::<VitalsRecord>()),
                    notifier.clone(),
                ))
            }
            Workspace::Report => ActiveBrowser::Static,
        };

        let mut state = DashboardState {
            dashboard,
            active_workspace: workspace,
            browser,
            dates: DateRangeState::new(now()),
            filter_index: 0,
            cursor: 0,
            search_input: None,
            form: None,
        };

        // Date-filtered lists open on today's interval
        if state.is_date_filtered() {
            let range = state.dates.current(now());
            with_browser!(&mut state.browser, b => b.set_date_range(range));
        }

        match state.workspace() {
            Workspace::BookAppointment => {
                state.form = Some(ResourceForm::booking());
            }
            // The incomplete-records view shows only records still
            // waiting on vitals
            Workspace::IncompleteRecords => {
                let options = state.filter_options();
                state.filter_index = options
                    .iter()
                    .position(|o| *o == "MISSING_VITALS")
                    .unwrap_or(0);
                with_browser!(
                    &mut state.browser,
                    b => b.set_status_filter(Some("MISSING_VITALS".to_string()))
                );
            }
            _ => {}
        }

        state
    }

    /// Load the first page for a restored session's dashboard
    pub async fn initial_refresh(&mut self) {
        if let Screen::Dashboard(state) = &mut self.screen {
            with_browser!(&mut state.browser, b => b.refresh().await);
        }
    }

    /// Collect fresh toasts from the notifier, keeping the last three
    pub fn pump_toasts(&mut self) {
        self.toasts.extend(self.notifier.drain());
        let overflow = self.toasts.len().saturating_sub(3);
        if overflow > 0 {
            self.toasts.drain(..overflow);
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match &mut self.screen {
            Screen::Login(_) => self.handle_login_key(key).await,
            Screen::Dashboard(_) => self.handle_dashboard_key(key).await,
        }
    }

    async fn handle_login_key(&mut self, key: KeyEvent) {
        let Screen::Login(form) = &mut self.screen else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                form.focus = match form.focus {
                    LoginField::Identifier => LoginField::Password,
                    LoginField::Password => LoginField::Identifier,
                };
            }
            KeyCode::Backspace => {
                match form.focus {
                    LoginField::Identifier => form.identifier.pop(),
                    LoginField::Password => form.password.pop(),
                };
            }
            KeyCode::Char(c) => match form.focus {
                LoginField::Identifier => form.identifier.push(c),
                LoginField::Password => form.password.push(c),
            },
            KeyCode::Enter => {
                let identifier = form.identifier.clone();
                let password = form.password.clone();
                if let Some(session) = self.auth.login(&identifier, &password).await {
                    self.router.login(session);
                    if let Some(dashboard) = self.router.dashboard() {
                        let mut state =
                            Self::mount_dashboard(&self.client, &self.notifier, dashboard, 0);
                        with_browser!(&mut state.browser, b => b.refresh().await);
                        self.screen = Screen::Dashboard(state);
                    }
                }
            }
            _ => {}
        }
    }

    async fn handle_dashboard_key(&mut self, key: KeyEvent) {
        let Screen::Dashboard(state) = &mut self.screen else {
            return;
        };

        // An open form owns all key input
        if let Some(form) = &mut state.form {
            match key.code {
                KeyCode::Esc => state.form = None,
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::Up => form.focus_previous(),
                KeyCode::Backspace => {
                    form.fields[form.focus].value.pop();
                }
                KeyCode::Char(c) => form.fields[form.focus].value.push(c),
                KeyCode::Enter => match &form.kind {
                    FormKind::CompleteVitals(record) => {
                        match completed_record(record, &form.fields) {
                            Ok(updated) => {
                                if let ActiveBrowser::Records(b) = &mut state.browser {
                                    b.save(updated).await;
                                }
                                state.form = None;
                            }
                            Err(e) => self.notifier.push(e.notification()),
                        }
                    }
                    FormKind::BookAppointment => {
                        match appointment_from(&form.fields, &self.config.locale.default_region)
                        {
                            Ok(appointment) => {
                                let created = match &mut state.browser {
                                    ActiveBrowser::Appointments(b) => {
                                        b.create(appointment).await
                                    }
                                    _ => false,
                                };
                                if created {
                                    // Blank form, ready for the next booking
                                    state.form = Some(ResourceForm::booking());
                                }
                            }
                            Err(e) => self.notifier.push(e.notification()),
                        }
                    }
                },
                _ => {}
            }
            return;
        }

        // Search input mode captures everything except Enter/Esc
        if let Some(input) = &mut state.search_input {
            match key.code {
                KeyCode::Esc => state.search_input = None,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                KeyCode::Enter => {
                    let term = input.clone();
                    state.search_input = None;
                    let kind = classify_search(&term, &self.config.locale.default_region);
                    let needs_fetch =
                        with_browser!(&mut state.browser, b => b.set_search(&term, kind));
                    if needs_fetch == Some(true) {
                        with_browser!(&mut state.browser, b => b.refresh().await);
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('l') => {
                self.auth.logout();
                self.router.logout();
                self.screen = Screen::Login(LoginForm::default());
                return;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                if index < state.dashboard.workspaces().len() && index != state.active_workspace {
                    let mut next = Self::mount_dashboard(
                        &self.client,
                        &self.notifier,
                        state.dashboard,
                        index,
                    );
                    with_browser!(&mut next.browser, b => b.refresh().await);
                    *state = next;
                }
            }
            KeyCode::Char('r') => {
                with_browser!(&mut state.browser, b => b.refresh().await);
            }
            KeyCode::Char('n') | KeyCode::Right => {
                let current =
                    with_browser!(&state.browser, b => b.query().page).unwrap_or(1);
                Self::change_page(state, i64::from(current) + 1).await;
            }
            KeyCode::Char('p') | KeyCode::Left => {
                let current =
                    with_browser!(&state.browser, b => b.query().page).unwrap_or(1);
                Self::change_page(state, i64::from(current) - 1).await;
            }
            KeyCode::Char('f') => {
                let options = state.filter_options();
                state.filter_index = (state.filter_index + 1) % options.len();
                let choice = options[state.filter_index];
                let filter = (!choice.is_empty()).then(|| choice.to_string());
                let needs_fetch =
                    with_browser!(&mut state.browser, b => b.set_status_filter(filter));
                if needs_fetch == Some(true) {
                    with_browser!(&mut state.browser, b => b.refresh().await);
                }
                state.cursor = 0;
            }
            KeyCode::Char('d') if state.is_date_filtered() => {
                let next = match state.dates.period() {
                    Period::Today => Period::Week,
                    Period::Week => Period::Month,
                    Period::Month => Period::Year,
                    Period::Year => Period::Custom,
                    Period::Custom => Period::Today,
                };
                state.dates.set_period(next);
                let range = state.dates.current(now());
                let needs_fetch =
                    with_browser!(&mut state.browser, b => b.set_date_range(range));
                if needs_fetch == Some(true) {
                    with_browser!(&mut state.browser, b => b.refresh().await);
                }
            }
            KeyCode::Char('/') => state.search_input = Some(String::new()),
            KeyCode::Char('b') if state.workspace() == Workspace::BookAppointment => {
                state.form = Some(ResourceForm::booking());
            }
            KeyCode::Char('e') => {
                // Edit the selected record: vitals entry for the nurse
                let record = match &state.browser {
                    ActiveBrowser::Records(b) => b.selected_item().cloned(),
                    _ => None,
                };
                if let Some(record) = record {
                    state.form = Some(ResourceForm::vitals(record));
                }
            }
            KeyCode::Down => {
                let visible =
                    with_browser!(&state.browser, b => b.visible_items().len()).unwrap_or(0);
                if visible > 0 {
                    state.cursor = (state.cursor + 1).min(visible - 1);
                }
            }
            KeyCode::Up => state.cursor = state.cursor.saturating_sub(1),
            KeyCode::Enter => {
                let cursor = state.cursor;
                with_browser!(&mut state.browser, b => b.select_visible(cursor));
            }
            KeyCode::Esc => {
                with_browser!(&mut state.browser, b => b.deselect());
            }
            _ => {}
        }

        // A fetch that failed with an invalid session drops back to the
        // login screen; the notification explains why
        let expired =
            with_browser!(&mut state.browser, b => b.take_session_expired()).unwrap_or(false);
        if expired {
            self.auth.logout();
            self.router.logout();
            self.screen = Screen::Login(LoginForm::default());
        }
    }

    async fn change_page(state: &mut DashboardState, requested: i64) {
        let needs_fetch = with_browser!(&mut state.browser, b => b.set_page(requested));
        if needs_fetch == Some(true) {
            with_browser!(&mut state.browser, b => b.refresh().await);
        }
        state.cursor = 0;
    }
}
