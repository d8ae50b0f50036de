use anyhow::{bail, Context, Result};
use colored::*;
use dialoguer::{Input, Password};
use servicedesk_core::api::knowledge::ArticleSearch;
use servicedesk_core::api::log_analysis::LogAnalysisRequest;
use servicedesk_core::api::notifications::NotificationListParams;
use servicedesk_core::api::tickets::{LogUploadMeta, TicketInput, TicketListParams, Upload};
use servicedesk_core::{get_default_config_file, AuthState, DeskClient, DeskConfig, LoginRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::{
    Command, ConfigCommand, KbCommand, NotificationCommand, StationCommand, TicketCommand,
    TicketFilters,
};
use crate::output::{self, print_json, print_success, spinner};
use crate::session_manager::SessionManager;

/// Everything a command handler needs
pub struct AppContext {
    pub config: DeskConfig,
    pub config_path: Option<PathBuf>,
    pub json: bool,
}

impl AppContext {
    fn language(&self) -> Option<&str> {
        self.config.language.as_deref()
    }
}

pub async fn run(command: Command, ctx: AppContext) -> Result<()> {
    // Config commands must work even when the stored config cannot produce a client
    if let Command::Config(command) = command {
        return handle_config(command, &ctx);
    }

    let client = SessionManager::client(&ctx.config)?;
    debug!("API base URL: {}", client.base_url());

    match command {
        Command::Login { email, password } => handle_login(client, email, password, &ctx).await,
        Command::Logout => handle_logout(client).await,
        Command::Whoami => handle_whoami(client, &ctx).await,
        Command::Passwd => handle_passwd(&client).await,
        Command::Tickets(command) => handle_tickets(&client, command, &ctx).await,
        Command::Stations(command) => handle_stations(&client, command, &ctx).await,
        Command::Kb(command) => handle_kb(&client, command, &ctx).await,
        Command::Notifications(command) => handle_notifications(&client, command, &ctx).await,
        Command::AnalyzeLog { file, language } => {
            handle_analyze_log(&client, &file, language, &ctx).await
        }
        Command::Config(_) => Ok(()),
    }
}

fn handle_config(command: ConfigCommand, ctx: &AppContext) -> Result<()> {
    let path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => get_default_config_file()?,
    };

    match command {
        ConfigCommand::Show => {
            if ctx.json {
                return print_json(&ctx.config);
            }
            let base_url = ctx
                .config
                .base_url()
                .unwrap_or_else(|e| format!("{} ({})", "unresolved".red(), e));
            println!("{} {}", "Config file:".bold(), path.display());
            println!("{} {}", "API URL:    ".bold(), base_url);
            println!(
                "{} {}",
                "Session:    ".bold(),
                ctx.config
                    .session_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "-".to_string())
            );
            println!(
                "{} {}",
                "Log level:  ".bold(),
                ctx.config.log_level.as_deref().unwrap_or("warn")
            );
            println!(
                "{} {}",
                "Language:   ".bold(),
                ctx.language().unwrap_or("-")
            );
            Ok(())
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config file {} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            DeskConfig::default().save_to_file(&path)?;
            print_success(&format!("Wrote {}", path.display()));
            Ok(())
        }
    }
}

async fn handle_login(
    client: DeskClient,
    email: Option<String>,
    password: Option<String>,
    ctx: &AppContext,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    let mut auth = AuthState::new(client);
    let user = auth
        .login(&LoginRequest { email, password })
        .await
        .context("Login failed")?;
    info!("Session stored for user {}", user.id);

    if ctx.json {
        return print_json(user);
    }
    print_success(&format!("Logged in as {}", user.full_name()));
    Ok(())
}

async fn handle_logout(client: DeskClient) -> Result<()> {
    let mut auth = AuthState::new(client);
    match auth.logout().await {
        Ok(()) => print_success("Logged out"),
        Err(e) => {
            eprintln!("{} {}", "Server logout failed:".yellow(), e);
            print_success("Local session removed");
        }
    }
    Ok(())
}

async fn handle_whoami(client: DeskClient, ctx: &AppContext) -> Result<()> {
    let mut auth = AuthState::new(client);
    let Some(user) = auth.check_auth().await? else {
        bail!("Not logged in. Run `servicedesk login` first.");
    };

    if ctx.json {
        return print_json(user);
    }
    output::print_user(user);
    Ok(())
}

async fn handle_passwd(client: &DeskClient) -> Result<()> {
    let current = Password::new()
        .with_prompt("Current password")
        .interact()
        .context("Failed to read password")?;
    let new = Password::new()
        .with_prompt("New password")
        .with_confirmation("Repeat new password", "Passwords do not match")
        .interact()
        .context("Failed to read password")?;

    client.auth().change_password(&current, &new).await?;
    print_success("Password changed");
    Ok(())
}

fn list_params(filters: TicketFilters) -> TicketListParams {
    TicketListParams {
        page: filters.page,
        per_page: filters.per_page,
        search: filters.search,
        status: filters.status,
        priority: filters.priority,
        category: filters.category,
        my_tickets: filters.mine.then_some(true),
        delegated_to_me: filters.delegated.then_some(true),
        ..TicketListParams::default()
    }
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Upload {
        file_name,
        mime_type: None,
        bytes,
    })
}

fn write_download(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    print_success(&format!("Saved {} bytes to {}", bytes.len(), path.display()));
    Ok(())
}

async fn handle_tickets(client: &DeskClient, command: TicketCommand, ctx: &AppContext) -> Result<()> {
    let tickets = client.tickets();

    match command {
        TicketCommand::List(filters) => {
            let page = tickets.list(&list_params(filters)).await?;
            if ctx.json {
                return print_json(&page);
            }
            output::print_ticket_page(&page);
        }
        TicketCommand::Show { id } => {
            let detail = tickets.get(id).await?;
            if ctx.json {
                return print_json(&detail);
            }
            output::print_ticket_detail(&detail);
        }
        TicketCommand::Create {
            title,
            description,
            category,
            priority,
            station_id,
            port,
            reporter_name,
            reporter_phone,
            incident_type,
        } => {
            let input = TicketInput {
                title: Some(title),
                description: Some(description),
                category: Some(category),
                priority,
                station_id,
                port_number: port,
                reporter_name,
                reporter_phone,
                incident_type,
                ..TicketInput::default()
            };
            let ticket = tickets.create(&input).await?;
            if ctx.json {
                return print_json(&ticket);
            }
            print_success(&format!("Created ticket {}", ticket.ticket_number));
        }
        TicketCommand::Status {
            id,
            status,
            comment,
        } => {
            let ticket = tickets.update_status(id, &status, comment.as_deref()).await?;
            if ctx.json {
                return print_json(&ticket);
            }
            print_success(&format!("{} is now {}", ticket.ticket_number, ticket.status));
        }
        TicketCommand::Assign { id, user, comment } => {
            let ticket = tickets.assign(id, user, comment.as_deref()).await?;
            if ctx.json {
                return print_json(&ticket);
            }
            match &ticket.assigned_user {
                Some(user) => print_success(&format!(
                    "{} assigned to {}",
                    ticket.ticket_number,
                    user.full_name()
                )),
                None => print_success(&format!("{} unassigned", ticket.ticket_number)),
            }
        }
        TicketCommand::Delegate {
            id,
            department,
            user,
            comment,
        } => {
            let ticket = tickets
                .delegate(id, department, user, comment.as_deref())
                .await?;
            if ctx.json {
                return print_json(&ticket);
            }
            let target = ticket
                .assigned_department
                .as_ref()
                .map(|d| d.name.clone())
                .unwrap_or_else(|| format!("department #{}", department));
            print_success(&format!("{} delegated to {}", ticket.ticket_number, target));
        }
        TicketCommand::Comment { id, text, internal } => {
            let comment = tickets.add_comment(id, &text, internal).await?;
            if ctx.json {
                return print_json(&comment);
            }
            print_success(&format!("Comment #{} added", comment.id));
        }
        TicketCommand::Attach { id, file } => {
            let upload = read_upload(&file)?;
            let attachment = tickets.upload_attachment(id, upload).await?;
            if ctx.json {
                return print_json(&attachment);
            }
            print_success(&format!(
                "Attached {} ({} bytes)",
                attachment.filename, attachment.file_size
            ));
        }
        TicketCommand::UploadLog {
            id,
            file,
            description,
            start,
            end,
        } => {
            let upload = read_upload(&file)?;
            let meta = LogUploadMeta {
                description,
                log_start_time: start,
                log_end_time: end,
            };
            let log = tickets.upload_log(id, upload, &meta).await?;
            if ctx.json {
                return print_json(&log);
            }
            print_success(&format!("Uploaded log #{} ({})", log.id, log.filename));
        }
        TicketCommand::DownloadLog { id, log_id, output } => {
            let bytes = tickets.download_log(id, log_id).await?;
            write_download(&output, &bytes)?;
        }
        TicketCommand::Parse { message } => {
            let progress = spinner("Parsing message...");
            let parsed = tickets.parse_message(&message).await;
            progress.finish_and_clear();
            let parsed = parsed?;
            if ctx.json {
                return print_json(&parsed);
            }
            output::print_parsed_message(&parsed);
        }
        TicketCommand::Export { filters, output } => {
            let progress = spinner("Exporting tickets...");
            let bytes = tickets.export(&list_params(filters)).await;
            progress.finish_and_clear();
            write_download(&output, &bytes?)?;
        }
    }
    Ok(())
}

async fn handle_stations(client: &DeskClient, command: StationCommand, ctx: &AppContext) -> Result<()> {
    match command {
        StationCommand::Search { query, limit } => {
            let stations = client
                .stations()
                .search(&query, limit, ctx.language())
                .await?;
            if ctx.json {
                return print_json(&stations);
            }
            output::print_stations(&stations);
        }
        StationCommand::Show { id } => {
            let station = client.stations().get(id, ctx.language()).await?;
            if ctx.json {
                return print_json(&station);
            }
            output::print_station(&station);
        }
    }
    Ok(())
}

async fn handle_kb(client: &DeskClient, command: KbCommand, ctx: &AppContext) -> Result<()> {
    let knowledge = client.knowledge();

    match command {
        KbCommand::Search {
            query,
            category,
            limit,
        } => {
            let search = ArticleSearch {
                query,
                limit,
                category,
                language: ctx.config.language.clone(),
                ..ArticleSearch::default()
            };
            let hits = knowledge.search(&search).await?;
            if ctx.json {
                return print_json(&hits);
            }
            output::print_search_hits(&hits);
        }
        KbCommand::Show { id } => {
            let article = knowledge.get(id).await?;
            if ctx.json {
                return print_json(&article);
            }
            output::print_article(&article);
        }
        KbCommand::Categories => {
            let categories = knowledge.categories().await?;
            if ctx.json {
                return print_json(&categories);
            }
            for category in categories {
                println!("{}", category);
            }
        }
    }
    Ok(())
}

async fn handle_notifications(
    client: &DeskClient,
    command: NotificationCommand,
    ctx: &AppContext,
) -> Result<()> {
    let notifications = client.notifications();

    match command {
        NotificationCommand::List { unread } => {
            let params = NotificationListParams {
                unread_only: unread.then_some(true),
                ..NotificationListParams::default()
            };
            let page = notifications.list(&params).await?;
            if ctx.json {
                return print_json(&page);
            }
            output::print_notifications(&page);
        }
        NotificationCommand::Read { id } => {
            notifications.mark_read(id).await?;
            print_success(&format!("Notification #{} marked as read", id));
        }
        NotificationCommand::ReadAll => {
            notifications.mark_all_read().await?;
            print_success("All notifications marked as read");
        }
    }
    Ok(())
}

async fn handle_analyze_log(
    client: &DeskClient,
    file: &Path,
    language: Option<String>,
    ctx: &AppContext,
) -> Result<()> {
    let log_content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let request = LogAnalysisRequest {
        log_content,
        language: language.or_else(|| ctx.config.language.clone()),
    };

    let progress = spinner("Analyzing log...");
    let analysis = client.log_analysis().analyze(&request).await;
    progress.finish_and_clear();
    let analysis = analysis?;

    if ctx.json {
        return print_json(&analysis);
    }
    output::print_log_analysis(&analysis);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_from_filters() {
        let params = list_params(TicketFilters {
            status: Some("new".to_string()),
            mine: true,
            ..TicketFilters::default()
        });
        assert_eq!(params.status.as_deref(), Some("new"));
        assert_eq!(params.my_tickets, Some(true));
        assert_eq!(params.delegated_to_me, None);
    }

    #[test]
    fn test_read_upload_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.log");
        fs::write(&path, b"ERR 42").unwrap();

        let upload = read_upload(&path).unwrap();
        assert_eq!(upload.file_name, "station.log");
        assert_eq!(upload.bytes, b"ERR 42");
    }

    #[test]
    fn test_config_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let ctx = AppContext {
            config: DeskConfig::default(),
            config_path: Some(path.clone()),
            json: false,
        };

        handle_config(ConfigCommand::Init { force: false }, &ctx).unwrap();
        assert!(path.exists());
        assert!(handle_config(ConfigCommand::Init { force: false }, &ctx).is_err());
        handle_config(ConfigCommand::Init { force: true }, &ctx).unwrap();
    }
}
