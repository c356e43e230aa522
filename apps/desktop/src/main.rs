use std::{fmt::Write as _, fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{load_settings, DeclarativeUiClient, ScreenPhase, ScreenSession};
use shared::{
    domain::{FileContext, FileId},
    layout::{arrange, Arrangement},
    protocol::{DeclarativeUi, Element, ElementId, Endpoint, Method},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "declarative-ui", about = "Fetch, inspect and drive server-declared screens")]
struct Args {
    /// Settings file (defaults to ./declarative_ui.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the server base url from settings and environment.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a screen and print its arranged layout.
    Fetch(ScreenArgs),
    /// Print the arranged layout of a document stored on disk.
    Show { document: PathBuf },
    /// Fetch a screen, then trigger the element at --row/--index.
    Press {
        #[command(flatten)]
        screen: ScreenArgs,
        #[arg(long)]
        row: usize,
        #[arg(long)]
        index: usize,
    },
}

#[derive(ClapArgs, Debug)]
struct ScreenArgs {
    /// Endpoint url template, relative to the base url or absolute.
    #[arg(long)]
    endpoint: String,
    #[arg(long, default_value = "GET")]
    method: Method,
    /// Endpoint parameter as name=value; may repeat.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
    #[arg(long)]
    file_id: Option<i64>,
    #[arg(long)]
    file_path: Option<String>,
}

impl ScreenArgs {
    fn endpoint(&self) -> Endpoint {
        let mut endpoint = match self.method {
            Method::Get => Endpoint::get(&self.endpoint),
            Method::Post => Endpoint::post(&self.endpoint),
        };
        for (name, value) in &self.params {
            endpoint = endpoint.with_param(name, value);
        }
        endpoint
    }

    fn context(&self) -> FileContext {
        FileContext {
            file_id: self.file_id.map(FileId),
            file_path: self.file_path.clone(),
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    match args.command {
        Command::Show { document } => {
            let raw = fs::read_to_string(&document)
                .with_context(|| format!("failed to read document '{}'", document.display()))?;
            let ui = DeclarativeUi::from_json(&raw)
                .with_context(|| format!("failed to decode document '{}'", document.display()))?;
            print!("{}", outline(&ui, &arrange(&ui.root)));
        }
        Command::Fetch(screen) => {
            let client = build_client(args.config, args.base_url)?;
            let ui = client
                .load_screen(&screen.endpoint(), &screen.context())
                .await
                .context("failed to load screen")?;
            print!("{}", outline(&ui, &arrange(&ui.root)));
        }
        Command::Press { screen, row, index } => {
            let client = Arc::new(build_client(args.config, args.base_url)?);
            let id = ElementId::new(row, index);
            let session = ScreenSession::new(client.clone(), screen.endpoint(), screen.context());

            let ui = match session.load().await {
                ScreenPhase::Ready(ui) => ui,
                ScreenPhase::Failed(failure) => bail!("failed to load screen: {}", failure.message),
                phase => bail!("screen did not settle: {phase:?}"),
            };

            match ui.element(id) {
                Some(Element::Url(link)) => {
                    let target = client.link_target(&link.url, session.context())?;
                    println!("open {target}");
                }
                Some(_) => {
                    let report = session.press(id).await?;
                    println!("{report:?}");
                    let state = session.snapshot().await;
                    if let Some(ui) = state.document() {
                        if let Some(arrangement) = state.arrangement() {
                            print!("{}", outline(ui, arrangement));
                        }
                    }
                }
                None => bail!("no element at {id}"),
            }
        }
    }

    Ok(())
}

fn build_client(config: Option<PathBuf>, base_url: Option<String>) -> Result<DeclarativeUiClient> {
    let mut settings = load_settings(config.as_deref())?;
    if let Some(base_url) = base_url {
        settings.base_url = base_url;
    }
    tracing::debug!(base_url = %settings.base_url, "client settings loaded");
    Ok(DeclarativeUiClient::from_settings(&settings)?)
}

fn outline(ui: &DeclarativeUi, arrangement: &Arrangement) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "version {} | {:?} layout | {} x {} grid",
        ui.version, ui.root.orientation, arrangement.columns, arrangement.rows
    );
    if let Some(tooltip) = &ui.tooltip {
        let _ = writeln!(out, "tooltip: {tooltip}");
    }
    if arrangement.is_empty() {
        let _ = writeln!(out, "(empty)");
        return out;
    }

    for (line_no, line) in arrangement.lines.iter().enumerate() {
        let _ = writeln!(out, "line {line_no} ({:?})", line.axis);
        for cell in &line.cells {
            let Some(element) = ui.element(cell.id) else {
                continue;
            };
            let _ = writeln!(
                out,
                "  [{},{}] {} {}",
                cell.column,
                cell.row,
                cell.id,
                describe(element)
            );
        }
    }
    out
}

fn describe(element: &Element) -> String {
    match element {
        Element::Button(button) => match &button.endpoint {
            Some(endpoint) => format!(
                "button \"{}\" -> {} {}",
                button.label, endpoint.method, endpoint.url
            ),
            None => format!("button \"{}\"", button.label),
        },
        Element::Text(text) => format!("text \"{}\"", text.text),
        Element::Url(link) => format!("link \"{}\" -> {}", link.text, link.url),
        Element::Image(image) => format!("image {}", image.url),
        Element::Unsupported { kind, .. } => format!("unsupported {kind}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe, outline, parse_param};
    use shared::{layout::arrange, protocol::Element, samples};

    #[test]
    fn parses_name_value_params() {
        assert_eq!(
            parse_param("path={filePath}").expect("param"),
            ("path".to_string(), "{filePath}".to_string())
        );
        assert_eq!(parse_param("q=a=b").expect("param").1, "a=b");
        assert!(parse_param("=x").is_err());
        assert!(parse_param("novalue").is_err());
    }

    #[test]
    fn outlines_horizontal_preview_by_column() {
        let ui = samples::preview_horizontal();
        let text = outline(&ui, &arrange(&ui.root));
        assert!(text.contains("3 x 2 grid"));
        assert!(text.contains("  [1,0] 1:0 button \"Click2\""));
        assert!(text.contains("  [2,0] 2:0 link \"Analytics report created\""));
    }

    #[test]
    fn outlines_empty_screen() {
        let ui = samples::preview_empty();
        assert!(outline(&ui, &arrange(&ui.root)).ends_with("(empty)\n"));
    }

    #[test]
    fn describes_unknown_kinds() {
        let element = Element::Unsupported {
            kind: "Chart".into(),
            body: serde_json::Value::Null,
        };
        assert_eq!(describe(&element), "unsupported Chart");
    }
}
