use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use barangay_reports::backup::{self, Snapshot};
use barangay_reports::config::AppConfig;
use barangay_reports::export::reports_csv;
use barangay_reports::models::ReportStatus;
use barangay_reports::photo::PhotoSource;
use barangay_reports::services::query::ReportQuery;
use barangay_reports::services::report_service::{RemarkPreset, RemarkRequest, ReportDraft, DEFAULT_INFO_REQUEST};
use barangay_reports::services::session_service::SignupRequest;
use barangay_reports::{store, AppState};
use barangay_shared::errors::{AppError, AppResult};
use barangay_shared::types::auth::Identity;
use barangay_shared::types::pagination::PaginationParams;

/// Barangay issue reporting desk
#[derive(Parser, Debug)]
#[command(name = "barangay")]
#[command(about = "File, triage and audit barangay resident reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a resident account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "BARANGAY_PASSWORD")]
        password: String,
    },
    /// Log in and persist the session
    Login {
        username: String,
        #[arg(long, env = "BARANGAY_PASSWORD")]
        password: String,
    },
    Logout,
    /// Show the current session
    Whoami,
    /// File a new report
    Submit {
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Image file stored inline on the report
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// List reports, newest first
    List {
        #[arg(long)]
        category: Option<String>,
        /// Free text; dates like `2025-10-20` or `oct` match the filing date
        #[arg(short, long)]
        query: Option<String>,
        /// Only my reports
        #[arg(long)]
        mine: bool,
        #[arg(long, default_value = "1")]
        page: u64,
        #[arg(long, default_value = "20")]
        per_page: u64,
    },
    /// Show one report and what the current session may do with it
    Show { id: String },
    /// Flip Pending and Done (admin)
    Toggle { id: String },
    /// Add a remark, optionally changing status (admin)
    Remark {
        id: String,
        /// received, verifying, in-progress, resolved, invalid, or free text
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        status: Option<ReportStatus>,
    },
    Delete { id: String },
    /// Ask the reporter for more information (admin)
    RequestInfo {
        id: String,
        #[arg(long, default_value = DEFAULT_INFO_REQUEST)]
        message: String,
    },
    /// Audit entries for a report
    History { id: String },
    Stats,
    Recent {
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Export all reports as CSV
    ExportCsv {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a full snapshot
    Backup {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load a snapshot, replacing the collections it carries
    Restore { file: PathBuf },
    /// Show or set the stored theme name
    Theme { name: Option<String> },
}

enum Output {
    Json(serde_json::Value),
    Text(String),
}

fn json(value: impl Serialize) -> AppResult<Output> {
    serde_json::to_value(value)
        .map(Output::Json)
        .map_err(|e| AppError::internal(e.to_string()))
}

async fn write_or_print(out: Option<PathBuf>, body: String) -> AppResult<Output> {
    match out {
        Some(path) => {
            tokio::fs::write(&path, body)
                .await
                .map_err(|e| AppError::storage(format!("cannot write {}: {e}", path.display())))?;
            json(serde_json::json!({ "written": path }))
        }
        None => Ok(Output::Text(body)),
    }
}

async fn run(state: &AppState, command: Commands) -> AppResult<Output> {
    let session: Option<Identity> = state.sessions.current()?;
    let me = session.as_ref();

    match command {
        Commands::Signup { name, username, password } => {
            let user = state.sessions.signup(SignupRequest { name, username, password })?;
            json(serde_json::json!({ "username": user.username, "role": user.role }))
        }
        Commands::Login { username, password } => json(state.sessions.login(&username, &password)?),
        Commands::Logout => {
            state.sessions.logout()?;
            json(serde_json::json!({ "loggedOut": true }))
        }
        Commands::Whoami => json(me),
        Commands::Submit { description, category, location, photo } => {
            let draft = ReportDraft { category, location, description, photo: None };
            let report = state
                .reports
                .submit_with_photo(me, draft, photo.map(PhotoSource::File))
                .await?;
            json(report)
        }
        Commands::List { category, query, mine, page, per_page } => {
            let query = ReportQuery { category, text: query, mine };
            json(state.reports.list_page(me, &query, &PaginationParams::new(page, per_page))?)
        }
        Commands::Show { id } => {
            let report = state.reports.get(&id)?;
            let permissions = state.reports.permissions(me, &id)?;
            json(serde_json::json!({ "report": report, "permissions": permissions }))
        }
        Commands::Toggle { id } => json(state.reports.toggle_quick_status(me, &id)?),
        Commands::Remark { id, preset, text, status } => {
            let req = RemarkRequest {
                preset_text: preset.as_deref().map(RemarkPreset::resolve_text),
                custom_text: text,
                new_status: status,
            };
            json(state.reports.add_remark(me, &id, req)?)
        }
        Commands::Delete { id } => {
            state.reports.delete(me, &id)?;
            json(serde_json::json!({ "deleted": id }))
        }
        Commands::RequestInfo { id, message } => json(state.reports.request_more_info(me, &id, &message)?),
        Commands::History { id } => json(state.reports.history(&id)?),
        Commands::Stats => json(state.reports.stats()?),
        Commands::Recent { limit } => json(state.reports.recent(limit)?),
        Commands::ExportCsv { out } => {
            let csv = reports_csv(&state.reports.list(me, &ReportQuery::default())?);
            write_or_print(out, csv).await
        }
        Commands::Backup { out } => write_or_print(out, Snapshot::capture(&state.store)?.to_json()?).await,
        Commands::Restore { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| AppError::storage(format!("cannot read {}: {e}", file.display())))?;
            json(backup::restore(&state.store, &raw, state.config.audit_capacity)?)
        }
        Commands::Theme { name } => {
            if let Some(name) = name {
                state.store.set_theme(&name)?;
            }
            let theme = state.store.theme()?.unwrap_or_else(|| backup::DEFAULT_THEME.to_string());
            json(serde_json::json!({ "theme": theme }))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    barangay_shared::telemetry::init_tracing("barangay-reports");

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let store = store::open(&config)?;
    let state = AppState::new(store, config);

    match run(&state, cli.command).await {
        Ok(Output::Json(value)) => println!("{}", serde_json::to_string_pretty(&value)?),
        Ok(Output::Text(text)) => println!("{text}"),
        Err(err) => {
            err.log();
            eprintln!("error [{}]: {err}", err.code().code());
            std::process::exit(1);
        }
    }

    Ok(())
}
