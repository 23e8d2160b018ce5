//! Frame rendering
//!
//! One body per browser view, by fixed precedence: loading indicator,
//! then selected-item detail, then empty-state, then the list table.
//! The precedence lives in `clinic_core::browser::BrowserBody`; this
//! module only draws whichever body it is handed.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use clinic_core::browser::BrowserBody;
use clinic_core::notify::Level;
use clinic_core::resources::{Appointment, Billing, Patient, Resource, StaffMember, VitalsRecord};

use crate::app::{
    ActiveBrowser, App, DashboardState, FormKind, LoginField, LoginForm, ResourceForm, Screen,
};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer / toasts
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    match &app.screen {
        Screen::Login(form) => draw_login(frame, form, chunks[1]),
        Screen::Dashboard(state) => draw_dashboard(frame, state, chunks[1]),
    }

    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.router.session() {
        Some(session) => format!(
            "Clinic Staff - {} ({})",
            session.display_name, session.role
        ),
        None => "Clinic Staff - Login".to_string(),
    };
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_login(frame: &mut Frame, form: &LoginForm, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let focus_style = Style::default().fg(Color::Yellow);
    let blur_style = Style::default();

    let identifier = Paragraph::new(form.identifier.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Username, phone number or email")
            .border_style(if form.focus == LoginField::Identifier {
                focus_style
            } else {
                blur_style
            }),
    );
    frame.render_widget(identifier, chunks[0]);

    let masked = "*".repeat(form.password.chars().count());
    let password = Paragraph::new(masked).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Password")
            .border_style(if form.focus == LoginField::Password {
                focus_style
            } else {
                blur_style
            }),
    );
    frame.render_widget(password, chunks[1]);

    let hint = Paragraph::new("Enter: login | Tab: switch field | Esc: quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[2]);
}

fn draw_dashboard(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(30)])
        .split(area);

    draw_sidebar(frame, state, chunks[0]);
    draw_workspace(frame, state, chunks[1]);
}

fn draw_sidebar(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let items: Vec<ListItem> = state
        .dashboard
        .workspaces()
        .iter()
        .enumerate()
        .map(|(i, workspace)| {
            let label = format!("{} {}", i + 1, workspace.label());
            let style = if i == state.active_workspace {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(label).style(style)
        })
        .collect();

    let sidebar = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(state.dashboard.title()),
    );
    frame.render_widget(sidebar, area);
}

fn draw_workspace(frame: &mut Frame, state: &DashboardState, area: Rect) {
    if let Some(form) = &state.form {
        draw_form(frame, form, area);
        return;
    }

    if let Some(input) = &state.search_input {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);
        let search = Paragraph::new(input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search (Enter: apply, Esc: cancel)")
                .border_style(Style::default().fg(Color::Yellow)),
        );
        frame.render_widget(search, chunks[0]);
        draw_browser(frame, state, chunks[1]);
        return;
    }

    draw_browser(frame, state, area);
}

fn draw_browser(frame: &mut Frame, state: &DashboardState, area: Rect) {
    match &state.browser {
        ActiveBrowser::Patients(b) => draw_body(frame, state, area, b.body(), patient_columns, patient_row, b.page().current_page, b.page().total_pages),
        ActiveBrowser::Staff(b) => draw_body(frame, state, area, b.body(), staff_columns, staff_row, b.page().current_page, b.page().total_pages),
        ActiveBrowser::Appointments(b) => draw_body(frame, state, area, b.body(), appointment_columns, appointment_row, b.page().current_page, b.page().total_pages),
        ActiveBrowser::Billing(b) => draw_body(frame, state, area, b.body(), billing_columns, billing_row, b.page().current_page, b.page().total_pages),
        ActiveBrowser::Records(b) => draw_body(frame, state, area, b.body(), record_columns, record_row, b.page().current_page, b.page().total_pages),
        ActiveBrowser::Static => {
            let body =
                Paragraph::new("Daily report is generated server-side at close of business.")
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(state.workspace().label()),
                    );
            frame.render_widget(body, area);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_body<T: Resource>(
    frame: &mut Frame,
    state: &DashboardState,
    area: Rect,
    body: BrowserBody<'_, T>,
    columns: fn() -> Vec<&'static str>,
    row: fn(&T) -> Vec<String>,
    current_page: u32,
    total_pages: u32,
) {
    let title = format!(
        "{} - {} (page {}/{})",
        state.workspace().label(),
        state.dates.period().label(),
        current_page,
        total_pages
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    match body {
        BrowserBody::Loading => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(loading, area);
        }
        BrowserBody::Detail(item) => {
            let lines: Vec<Line> = columns()
                .into_iter()
                .zip(row(item))
                .map(|(name, value)| {
                    Line::from(vec![
                        Span::styled(format!("{name}: "), Style::default().fg(Color::Cyan)),
                        Span::raw(value),
                    ])
                })
                .collect();
            let detail =
                Paragraph::new(lines).block(block.title("Detail (e: edit, Esc: back to list)"));
            frame.render_widget(detail, area);
        }
        BrowserBody::Empty => {
            let empty = Paragraph::new(format!("No {} found", T::NAME.to_lowercase()))
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
        }
        BrowserBody::List(items) => {
            let header = Row::new(columns().into_iter().map(Cell::from))
                .style(Style::default().add_modifier(Modifier::BOLD));
            let rows: Vec<Row> = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let cells = row(item).into_iter().map(Cell::from);
                    let style = if i == state.cursor {
                        Style::default().bg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    Row::new(cells).style(style)
                })
                .collect();
            let widths = vec![Constraint::Fill(1); columns().len()];
            let table = Table::new(rows, widths).header(header).block(block);
            frame.render_widget(table, area);
        }
    }
}

fn draw_form(frame: &mut Frame, form: &ResourceForm, area: Rect) {
    let title = match form.kind {
        FormKind::BookAppointment => "Book Appointment",
        FormKind::CompleteVitals(_) => "Complete Vitals",
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints: Vec<Constraint> =
        form.fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let style = if i == form.focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input = Paragraph::new(field.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(field.label)
                .border_style(style),
        );
        frame.render_widget(input, chunks[i]);
    }

    let hint = Paragraph::new("Enter: submit | Tab: next field | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[form.fields.len()]);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();
    for toast in &app.toasts {
        let color = match toast.level {
            Level::Info => Color::White,
            Level::Success => Color::Green,
            Level::Error => Color::Red,
        };
        spans.push(Span::styled(
            format!(" {} ", toast.message),
            Style::default().fg(color),
        ));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            "q: quit | 1-9: workspace | /: search | f: filter | d: period | n/p: page | e: edit | l: logout",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn patient_columns() -> Vec<&'static str> {
    vec!["ID", "Full Name", "Phone", "National ID", "Blood Type"]
}

fn patient_row(p: &Patient) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.full_name.clone(),
        p.phone.clone(),
        p.national_id.clone(),
        p.blood_type.clone(),
    ]
}

fn staff_columns() -> Vec<&'static str> {
    vec!["ID", "Full Name", "Email", "Phone", "Role", "Status"]
}

fn staff_row(s: &StaffMember) -> Vec<String> {
    vec![
        s.id.to_string(),
        s.full_name.clone(),
        s.email.clone(),
        s.phone.clone(),
        s.role.to_string(),
        s.is_active.as_str().to_string(),
    ]
}

fn appointment_columns() -> Vec<&'static str> {
    vec!["ID", "Patient", "Doctor", "Status", "Created"]
}

fn appointment_row(a: &Appointment) -> Vec<String> {
    vec![
        a.id.to_string(),
        a.patient.name.clone(),
        a.doctor.name.clone(),
        a.status.as_str().to_string(),
        a.created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
    ]
}

fn billing_columns() -> Vec<&'static str> {
    vec!["ID", "Patient", "Total", "Paid", "Status"]
}

fn billing_row(b: &Billing) -> Vec<String> {
    vec![
        b.id.to_string(),
        b.patient.name.clone(),
        format!("KES {:.2}", b.total_amount),
        format!("KES {:.2}", b.amount_paid),
        b.status.as_str().to_string(),
    ]
}

fn record_columns() -> Vec<&'static str> {
    vec!["ID", "Patient", "Status", "Created"]
}

fn record_row(r: &VitalsRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.patient.name.clone(),
        r.status.as_str().to_string(),
        r.created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
    ]
}
