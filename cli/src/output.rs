use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use servicedesk_core::api::knowledge::{Article, SearchHit};
use servicedesk_core::api::log_analysis::LogAnalysis;
use servicedesk_core::api::notifications::Notification;
use servicedesk_core::api::stations::Station;
use servicedesk_core::api::tickets::{ParsedMessage, Ticket, TicketDetail};
use servicedesk_core::{parse_timestamp, CurrentUser, Paginated};
use std::time::Duration;

/// Spinner shown while waiting on slow backend calls
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Render a timestamp from the backend as UTC `YYYY-MM-DD HH:MM`
pub fn format_timestamp(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| value.to_string())
}

fn colored_status(status: &str) -> ColoredString {
    match status {
        "new" => status.cyan(),
        "in_progress" | "assigned" => status.yellow(),
        "resolved" | "closed" => status.green(),
        "cancelled" => status.dimmed(),
        _ => status.normal(),
    }
}

fn colored_priority(priority: &str) -> ColoredString {
    match priority {
        "critical" => priority.red().bold(),
        "high" => priority.red(),
        "medium" => priority.yellow(),
        _ => priority.normal(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Plain text table: bold header, dimmed rule, columns padded to the widest cell
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut col_widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < col_widths.len() {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();
    for (j, header) in headers.iter().enumerate() {
        let padding = col_widths[j].saturating_sub(header.chars().count());
        output.push_str(&format!("{}{} ", header.bold(), " ".repeat(padding)));
    }
    output.push('\n');

    for (j, width) in col_widths.iter().enumerate() {
        output.push_str(&"─".repeat(*width).dimmed().to_string());
        if j < col_widths.len() - 1 {
            output.push(' ');
        }
    }
    output.push('\n');

    for row in rows {
        for (j, cell) in row.iter().enumerate() {
            if j < col_widths.len() {
                let padding = col_widths[j].saturating_sub(cell.chars().count());
                output.push_str(&format!("{}{} ", cell, " ".repeat(padding)));
            }
        }
        output.push('\n');
    }
    output
}

pub fn print_user(user: &CurrentUser) {
    println!("{} <{}>", user.full_name().bold(), user.email);
    if let Some(department) = &user.department {
        println!("  Department: {}", department.name);
    }
    if !user.roles.is_empty() {
        let roles: Vec<&str> = user.roles.iter().map(|r| r.name.as_str()).collect();
        println!("  Roles:      {}", roles.join(", "));
    }
    if user.is_admin {
        println!("  {}", "Administrator".magenta());
    } else if !user.permissions.is_empty() {
        println!("  Permissions: {}", user.permissions.join(", ").dimmed());
    }
}

pub fn print_ticket_page(page: &Paginated<Ticket>) {
    if page.items.is_empty() {
        println!("No tickets found.");
        return;
    }

    let rows: Vec<Vec<String>> = page
        .items
        .iter()
        .map(|t| {
            vec![
                t.ticket_number.clone(),
                colored_status(&t.status).to_string(),
                colored_priority(&t.priority).to_string(),
                t.station
                    .as_ref()
                    .map(|s| s.station_id.clone())
                    .unwrap_or_else(|| "-".to_string()),
                t.title.clone(),
                format_timestamp(&t.created_at),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(&["Number", "Status", "Priority", "Station", "Title", "Created"], &rows)
    );
    println!(
        "{}",
        format!("Page {}/{} · {} tickets", page.page, page.pages.max(1), page.total).dimmed()
    );
}

pub fn print_ticket(ticket: &Ticket) {
    println!(
        "{} {} [{} / {}]",
        ticket.ticket_number.bold(),
        ticket.title,
        colored_status(&ticket.status),
        colored_priority(&ticket.priority)
    );
    println!("  Category:   {}", ticket.category);
    if let Some(station) = &ticket.station {
        println!(
            "  Station:    {} {} ({})",
            station.station_id, station.name, station.operator_name
        );
    }
    if let Some(port) = ticket.port_number {
        println!("  Port:       {}", port);
    }
    if let Some(user) = &ticket.assigned_user {
        println!("  Assignee:   {}", user.full_name());
    }
    if let Some(department) = &ticket.assigned_department {
        println!("  Department: {}", department.name);
    }
    if let Some(due) = &ticket.sla_due_date {
        let due = format_timestamp(due);
        if ticket.sla_breached {
            println!("  SLA due:    {} {}", due, "(breached)".red().bold());
        } else {
            println!("  SLA due:    {}", due);
        }
    }
    println!("  Reporter:   {} {}", or_dash(ticket.reporter_name.as_deref()), or_dash(ticket.reporter_phone.as_deref()));
    println!("  Created:    {}", format_timestamp(&ticket.created_at));
    println!();
    println!("{}", ticket.description);
    if let Some(analysis) = &ticket.ai_log_analysis {
        println!();
        print_log_analysis(analysis);
    }
}

pub fn print_ticket_detail(detail: &TicketDetail) {
    print_ticket(&detail.ticket);

    if !detail.comments.is_empty() {
        println!();
        println!("{}", "Comments".bold().underline());
        for comment in &detail.comments {
            let author = comment
                .user
                .as_ref()
                .map(|u| u.full_name())
                .unwrap_or_else(|| format!("user #{}", comment.user_id));
            let marker = if comment.is_internal {
                " (internal)".dimmed().to_string()
            } else {
                String::new()
            };
            println!(
                "{} {}{}",
                format_timestamp(&comment.created_at).dimmed(),
                author.blue(),
                marker
            );
            println!("  {}", comment.content);
        }
    }

    if !detail.history.is_empty() {
        println!();
        println!("{}", "History".bold().underline());
        for entry in &detail.history {
            let change = match (&entry.old_value, &entry.new_value) {
                (Some(old), Some(new)) => format!("{} → {}", old, new),
                (None, Some(new)) => new.clone(),
                _ => String::new(),
            };
            println!(
                "{} {} {}",
                format_timestamp(&entry.created_at).dimmed(),
                entry.action,
                change
            );
        }
    }
}

pub fn print_parsed_message(parsed: &ParsedMessage) {
    let field = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            println!("  {:<12}{}", label, value);
        }
    };
    println!("{}", "Extracted fields".bold());
    field("Title", parsed.title.clone());
    field("Category", parsed.category.clone());
    field("Priority", parsed.priority.clone());
    field("Port", parsed.port_number.map(|p| p.to_string()));
    field("Vehicle", parsed.vehicle_info.clone());
    field("Reporter", parsed.reporter_name.clone());
    field("Phone", parsed.reporter_phone.clone());

    let station = parsed.station_id.clone().unwrap_or_else(|| "-".to_string());
    let found = if parsed.station_found {
        "found".green()
    } else {
        "not found".yellow()
    };
    println!("  {:<12}{} ({})", "Station", station, found);
    if let Some(operator) = &parsed.operator_name {
        let found = if parsed.operator_found {
            "found".green()
        } else {
            "not found".yellow()
        };
        println!("  {:<12}{} ({})", "Operator", operator, found);
    }
    if let Some(description) = &parsed.description {
        println!();
        println!("{}", description);
    }
}

pub fn print_log_analysis(analysis: &LogAnalysis) {
    println!("{} {}", "AI analysis:".bold(), analysis.status);
    println!("{}", analysis.analysis);
    if !analysis.error_codes.is_empty() {
        println!("{} {}", "Error codes:".bold(), analysis.error_codes.join(", ").red());
    }
    for recommendation in &analysis.recommendations {
        println!("  • {}", recommendation);
    }
}

pub fn print_stations(stations: &[Station]) {
    if stations.is_empty() {
        println!("No stations found.");
        return;
    }
    let rows: Vec<Vec<String>> = stations
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.station_id.clone(),
                s.name.clone(),
                s.operator
                    .as_ref()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "-".to_string()),
                or_dash(s.city.as_deref()),
                s.status.clone(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(&["Id", "Station", "Name", "Operator", "City", "Status"], &rows)
    );
}

pub fn print_station(station: &Station) {
    println!("{} {} [{}]", station.station_id.bold(), station.name, station.status);
    if let Some(operator) = &station.operator {
        println!("  Operator:  {}", operator.name);
    }
    println!(
        "  Address:   {} {}",
        or_dash(station.city.as_deref()),
        or_dash(station.address.as_deref())
    );
    println!(
        "  Model:     {} {}",
        or_dash(station.manufacturer.as_deref()),
        or_dash(station.model.as_deref())
    );
    println!("  Firmware:  {}", or_dash(station.firmware_version.as_deref()));

    if !station.ports.is_empty() {
        let rows: Vec<Vec<String>> = station
            .ports
            .iter()
            .map(|p| {
                vec![
                    p.port_number.to_string(),
                    or_dash(p.connector_type.as_deref()),
                    p.power_kw.map(|kw| format!("{} kW", kw)).unwrap_or_else(|| "-".to_string()),
                    p.status.clone(),
                ]
            })
            .collect();
        println!();
        print!("{}", render_table(&["Port", "Connector", "Power", "Status"], &rows));
    }
}

pub fn print_search_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No articles found.");
        return;
    }
    for hit in hits {
        println!(
            "{} {} {}",
            format!("#{}", hit.article_id).dimmed(),
            hit.title.bold(),
            format!("[{}] {:.2}", hit.category, hit.score).dimmed()
        );
        println!("  {}", hit.content_preview);
    }
}

pub fn print_article(article: &Article) {
    println!("{} {}", article.title.bold(), format!("[{}]", article.category).dimmed());
    if !article.error_codes.is_empty() {
        println!("Error codes: {}", article.error_codes.join(", "));
    }
    if !article.tags.is_empty() {
        println!("Tags: {}", article.tags.join(", ").dimmed());
    }
    println!();
    println!("{}", article.content.as_deref().unwrap_or(""));
}

pub fn print_notifications(page: &Paginated<Notification>) {
    if page.items.is_empty() {
        println!("No notifications.");
        return;
    }
    for notification in &page.items {
        let marker = if notification.is_read {
            " ".normal()
        } else {
            "●".blue()
        };
        println!(
            "{} {} {} {}",
            marker,
            format!("#{}", notification.id).dimmed(),
            notification.title.bold(),
            format_timestamp(&notification.created_at).dimmed()
        );
        println!("    {}", notification.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_pads_columns() {
        colored::control::set_override(false);
        let rows = vec![
            vec!["1".to_string(), "short".to_string()],
            vec!["22".to_string(), "much longer".to_string()],
        ];
        let table = render_table(&["Id", "Name"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Id Name        ");
        assert_eq!(lines[1], "── ───────────");
        assert_eq!(lines[2], "1  short       ");
        assert_eq!(lines[3], "22 much longer ");
    }

    #[test]
    fn test_format_timestamp_falls_back_to_raw() {
        assert_eq!(format_timestamp("2024-03-01T10:15:00.5"), "2024-03-01 10:15");
        assert_eq!(format_timestamp("soon"), "soon");
    }
}
