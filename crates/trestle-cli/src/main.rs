use futures::executor::block_on;
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use trestle_canvas::{CanvasConfig, CanvasSnapshot, EditorSession, Layout};
use trestle_core::{Architecture, ConfigValue, DiagramType, EditIntent, Patch, apply_script};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Model(trestle_core::Error),
    Canvas(trestle_canvas::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Model(err) => write!(f, "{err}"),
            CliError::Canvas(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<trestle_core::Error> for CliError {
    fn from(value: trestle_core::Error) -> Self {
        Self::Model(value)
    }
}

impl From<trestle_canvas::Error> for CliError {
    fn from(value: trestle_canvas::Error) -> Self {
        Self::Canvas(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Validate,
    Layout,
    Handles,
    Apply,
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "validate" => Ok(Self::Validate),
            "layout" => Ok(Self::Layout),
            "handles" => Ok(Self::Handles),
            "apply" => Ok(Self::Apply),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    diagram_type: DiagramType,
    layout: Option<String>,
    config: Option<String>,
    edits: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateOut<'a> {
    nodes: usize,
    relationships: usize,
    containers: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut<'a> {
    fallback: bool,
    canvas: CanvasSnapshot,
    layout: &'a Layout,
}

#[derive(Serialize)]
struct ApplyOut<'a> {
    patches: &'a [Patch],
    architecture: &'a Architecture,
}

fn usage() -> &'static str {
    "trestle\n\
\n\
USAGE:\n\
  trestle [validate] [--pretty] [<path>|-]\n\
  trestle layout [--layout <path>] [--config <path>] [--diagram architecture|flow] [--out <path>] [--pretty] [<path>|-]\n\
  trestle handles [--layout <path>] [--config <path>] [--diagram architecture|flow] [--pretty] [<path>|-]\n\
  trestle apply --edits <path> [--out <path>] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the architecture is read from stdin.\n\
  - layout prints the placed canvas and the updated layout record; --out also writes the record.\n\
  - handles prints only the routed edges (connection sides per endpoint).\n\
  - --config is a JSON object merged over the built-in canvas defaults.\n\
  - apply runs a JSON array of edit intents and prints the patch batch with the new model;\n\
    --out also writes the new model.\n\
  - Set TRESTLE_LOG (e.g. TRESTLE_LOG=debug) to enable diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<String, CliError> {
    it.next().cloned().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => args.pretty = true,
            "--layout" => args.layout = Some(next_value(&mut it)?),
            "--config" => args.config = Some(next_value(&mut it)?),
            "--edits" => args.edits = Some(next_value(&mut it)?),
            "--out" => args.out = Some(next_value(&mut it)?),
            "--diagram" => {
                let raw = next_value(&mut it)?;
                args.diagram_type = DiagramType::parse(&raw).ok_or(CliError::Usage(usage()))?;
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            word => {
                if !command_seen && args.input.is_none() {
                    if let Ok(command) = word.parse::<Command>() {
                        args.command = command;
                        command_seen = true;
                        continue;
                    }
                }
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(word.to_string());
            }
        }
    }

    if matches!(args.command, Command::Apply) && args.edits.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<CanvasConfig, CliError> {
    let Some(path) = path else {
        return Ok(CanvasConfig::default());
    };
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let mut cfg = ConfigValue::default();
    cfg.deep_merge(&value);
    Ok(CanvasConfig::from_config(&cfg))
}

fn load_layout(path: Option<&str>) -> Result<Option<Layout>, CliError> {
    match path {
        None => Ok(None),
        Some(path) => Ok(Some(Layout::from_json(&std::fs::read_to_string(path)?)?)),
    }
}

fn laid_out_session(architecture: Architecture, args: &Args) -> Result<EditorSession, CliError> {
    let config = load_config(args.config.as_deref())?;
    let saved = load_layout(args.layout.as_deref())?;
    let mut session = EditorSession::new(architecture, saved, args.diagram_type, config);
    if !block_on(session.relayout()) {
        tracing::warn!("layout result was superseded");
    }
    Ok(session)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let architecture = Architecture::from_json(&text)?;

    match args.command {
        Command::Validate => {
            let containers = architecture
                .nodes
                .iter()
                .map(|n| n.unique_id.as_str())
                .filter(|id| architecture.is_container(id))
                .collect();
            write_json(
                &ValidateOut {
                    nodes: architecture.nodes.len(),
                    relationships: architecture.relationships.len(),
                    containers,
                },
                args.pretty,
            )
        }
        Command::Handles => {
            let session = laid_out_session(architecture, &args)?;
            write_json(&session.edges(), args.pretty)
        }
        Command::Layout => {
            let session = laid_out_session(architecture, &args)?;
            let mut layout = session.layout().clone();
            layout.diagram_type = args.diagram_type;
            layout.stamp(chrono::Utc::now());
            if let Some(out) = args.out.as_deref() {
                std::fs::write(out, layout.to_json_pretty()?)?;
            }
            write_json(
                &LayoutOut {
                    fallback: session.used_fallback(),
                    canvas: session.snapshot(),
                    layout: &layout,
                },
                args.pretty,
            )
        }
        Command::Apply => {
            let edits_path = args.edits.as_deref().ok_or(CliError::Usage(usage()))?;
            let intents: Vec<EditIntent> =
                serde_json::from_str(&std::fs::read_to_string(edits_path)?)?;
            let mutation = apply_script(&architecture, &intents);
            tracing::debug!(
                intents = intents.len(),
                patches = mutation.patches.len(),
                "applied edit script"
            );
            if let Some(out) = args.out.as_deref() {
                std::fs::write(out, mutation.architecture.to_json_pretty()?)?;
            }
            write_json(
                &ApplyOut {
                    patches: &mutation.patches,
                    architecture: &mutation.architecture,
                },
                args.pretty,
            )
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TRESTLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
