use std::{fs, path::PathBuf};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use client_core::{config::DEFAULT_SETTINGS_FILE, load_settings, normalize_base_url, ClientSettings};
use crossbeam_channel::bounded;
use eframe::egui;
use shared::{
    domain::{FileContext, FileId},
    protocol::{DeclarativeUi, Endpoint, Method},
    samples,
};
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{DeclarativeUiApp, ScreenSource, StartupConfig};

const APP_TITLE: &str = "Declarative UI";
const CONFIG_DIR_NAME: &str = "declarative-ui";

#[derive(Parser, Debug)]
#[command(name = "declarative-ui-gui", about = "Render a server-declared screen")]
struct Args {
    /// Settings file; defaults to the per-user config dir, then ./declarative_ui.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    /// Endpoint url template the screen is fetched from.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long, default_value = "GET")]
    method: Method,
    /// Endpoint parameter as name=value; may repeat.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
    #[arg(long)]
    file_id: Option<i64>,
    #[arg(long)]
    file_path: Option<String>,
    /// Render a document from disk instead of fetching one.
    #[arg(long)]
    document: Option<PathBuf>,
    /// Render a built-in preview: vertical, horizontal or empty.
    #[arg(long)]
    preview: Option<String>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}

fn user_settings_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?
        .join(CONFIG_DIR_NAME)
        .join(DEFAULT_SETTINGS_FILE);
    path.exists().then_some(path)
}

fn resolve_settings(args: &Args) -> Result<ClientSettings> {
    let path = args.config.clone().or_else(user_settings_path);
    let mut settings = load_settings(path.as_deref())?;
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    Ok(settings)
}

fn resolve_source(args: &Args) -> Result<ScreenSource> {
    if let Some(name) = &args.preview {
        let document = samples::by_name(name).ok_or_else(|| {
            anyhow!("unknown preview `{name}`; expected vertical, horizontal or empty")
        })?;
        return Ok(ScreenSource::Local(document));
    }
    if let Some(path) = &args.document {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read document '{}'", path.display()))?;
        let document = DeclarativeUi::from_json(&raw)
            .with_context(|| format!("failed to decode document '{}'", path.display()))?;
        return Ok(ScreenSource::Local(document));
    }
    let Some(url) = &args.endpoint else {
        bail!("one of --endpoint, --document or --preview is required");
    };

    let mut endpoint = match args.method {
        Method::Get => Endpoint::get(url),
        Method::Post => Endpoint::post(url),
    };
    for (name, value) in &args.params {
        endpoint = endpoint.with_param(name, value);
    }
    Ok(ScreenSource::Remote(endpoint))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = resolve_settings(&args)?;
    let source = resolve_source(&args)?;
    let base_url = match normalize_base_url(&settings.base_url) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::warn!("relative links will not resolve: {err}");
            None
        }
    };
    let startup = StartupConfig {
        source,
        context: FileContext {
            file_id: args.file_id.map(FileId),
            file_path: args.file_path.clone(),
        },
        base_url,
        title: args
            .file_path
            .as_deref()
            .and_then(|path| path.rsplit('/').find(|segment| !segment.is_empty()))
            .unwrap_or(APP_TITLE)
            .to_string(),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([720.0, 540.0])
            .with_min_inner_size([360.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DeclarativeUiApp::new(cmd_tx, ui_rx, startup)))
        }),
    )
    .map_err(|err| anyhow!("gui exited with error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["declarative-ui-gui"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn preview_wins_over_endpoint() {
        let source = resolve_source(&args(&["--preview", "horizontal", "--endpoint", "/x"]))
            .expect("source");
        assert!(matches!(source, ScreenSource::Local(doc) if doc == samples::preview_horizontal()));
    }

    #[test]
    fn endpoint_flags_build_remote_source() {
        let source = resolve_source(&args(&[
            "--endpoint",
            "/ocs/v2.php/apps/demo/screen/{fileId}",
            "--method",
            "post",
            "--param",
            "path={filePath}",
        ]))
        .expect("source");
        let ScreenSource::Remote(endpoint) = source else {
            panic!("expected remote source");
        };
        assert_eq!(endpoint.method, Method::Post);
        assert_eq!(endpoint.params.get("path").map(String::as_str), Some("{filePath}"));
    }

    #[test]
    fn requires_some_source() {
        assert!(resolve_source(&args(&[])).is_err());
        assert!(resolve_source(&args(&["--preview", "sideways"])).is_err());
    }
}
