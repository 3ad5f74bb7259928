use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rosterprint::{
    config::Config,
    dates,
    dispatch::{Dispatcher, RunMode},
    locate, partition,
    render::{footer_from_toggles, RenderMeta, Renderer},
    table, transform,
};
use std::{env, fs, path::Path};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) run mode + logging ───────────────────────────────────────
    let mode = RunMode::from_env("ROSTERPRINT_DEBUG");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_log_filter()));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup, mode {:?}", mode);

    // ─── 2) load + validate config ───────────────────────────────────
    let config_path =
        env::var("ROSTERPRINT_CONFIG").unwrap_or_else(|_| "./config.yaml".to_string());
    debug!(%config_path, "loading config");
    let config = Config::load(Path::new(&config_path))?;

    // ─── 3) locate the newest roster ─────────────────────────────────
    let source = locate::find_latest_spreadsheet(&config.search_dir, &config.spreadsheet_pattern)?;
    info!("using roster {}", source.display());
    let modified_at: DateTime<Local> = fs::metadata(&source)
        .and_then(|m| m.modified())
        .with_context(|| format!("reading mtime of {}", source.display()))?
        .into();

    // ─── 4) read + reshape ───────────────────────────────────────────
    let roster = table::read::read_roster(&source)?;
    let roster = transform::apply_merge_rules(&roster, &config.merge_rules)?;

    // ─── 5) run-wide metadata ────────────────────────────────────────
    let session_date_label = match &config.date_column {
        Some(column) => dates::session_date_label(&roster, column, &config.date_format)?,
        None => None,
    };
    let meta = RenderMeta {
        title: String::new(),
        session_date_label,
        printed_at: Local::now(),
        modified_at,
    };

    // ─── 6) partition into sessions ──────────────────────────────────
    let sessions = partition::split_sessions(
        &roster,
        &config.class_column_name,
        &config.columns_to_print,
    )?;
    if sessions.is_empty() {
        anyhow::bail!("roster {} produced no sessions", source.display());
    }
    info!("{} sessions to print", sessions.len());

    // ─── 7) render + dispatch each session ───────────────────────────
    let renderer = Renderer::new(
        config.orientation,
        config.extra_row_columns.clone(),
        footer_from_toggles(config.show_print_date, config.show_modified_time),
    );
    let dispatcher = Dispatcher::new(mode, config.work_dir.clone())?;

    for session in &sessions {
        debug!(session = %session.key, "rendering session");
        let title = format!("{} {}", session.key, config.title_suffix)
            .trim()
            .to_string();
        let document = renderer.render(&session.table, &meta.with_title(&title))?;
        dispatcher.dispatch(&document, &title)?;
    }

    // ─── 8) let the spooler drain, then clean up ─────────────────────
    dispatcher.finish()?;
    info!("all done");
    Ok(())
}
