use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cmv_core::MainData;
use cmv_views::{Condition, FieldKind, MappedData, MenuOption, SettingsForm, ViewType, menu_options};
use cmv_workspace::{
    ResultOutcome, WorkerBackend, Workspace, WorkspaceConfig, WorkspaceError, WorkspaceResult,
    load_color_tags, load_dataset,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cmv-cli")]
#[command(about = "Configure and compute data views over a tabular dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available view types by category
    Catalog,
    /// Show the settings form of a view type
    Form {
        /// View type tag, e.g. scatter3D
        type_tag: String,
        /// Dataset JSON used to list column choices
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Compute every view of a config over a dataset
    Run {
        /// Dataset JSON: { data, schema: { fields } }
        #[arg(long)]
        dataset: PathBuf,
        /// Workspace config YAML
        #[arg(long)]
        config: Option<PathBuf>,
        /// Color tags JSON: [{ id, color }]
        #[arg(long)]
        tags: Option<PathBuf>,
    },
}

fn main() -> WorkspaceResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog => {
            init_tracing("info");
            cmd_catalog();
            Ok(())
        }
        Commands::Form { type_tag, dataset } => {
            init_tracing("info");
            cmd_form(&type_tag, dataset.as_deref())
        }
        Commands::Run {
            dataset,
            config,
            tags,
        } => {
            let config = match config {
                Some(path) => WorkspaceConfig::load(&path)?,
                None => WorkspaceConfig::default(),
            };
            init_tracing(&config.log_filter);
            cmd_run(config, &dataset, tags.as_deref())
        }
    }
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_catalog() {
    for option in menu_options() {
        match option {
            MenuOption::Header { category } => println!("{category}"),
            MenuOption::Entry { text, value } => println!("  {value:<16} {text}"),
        }
    }
}

fn cmd_form(type_tag: &str, dataset: Option<&Path>) -> WorkspaceResult<()> {
    let view_type = ViewType::from_tag(type_tag).ok_or_else(|| {
        WorkspaceError::View(cmv_views::ViewError::UnknownType {
            type_tag: type_tag.to_string(),
        })
    })?;
    let main = match dataset {
        Some(path) => Some(load_dataset(path)?),
        None => None,
    };
    let form = SettingsForm::for_type(view_type);

    println!("{view_type} settings:");
    for field in form.fields {
        println!(
            "  {:<24} {:<22} {:<10} {}",
            field.name,
            field.label,
            kind_label(field.kind),
            condition_label(field.required)
        );
        if let Some(main) = &main {
            let options = form.options(field, &main.schema, &[]);
            if !options.is_empty() {
                let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
                println!("  {:<24} choices: {}", "", texts.join(", "));
            }
        }
    }
    Ok(())
}

fn cmd_run(config: WorkspaceConfig, dataset: &Path, tags: Option<&Path>) -> WorkspaceResult<()> {
    let main: MainData = load_dataset(dataset)?;
    let timeout = config.result_timeout();
    let specs = config.views.clone();
    let mut workspace = Workspace::new(config, main);
    if let Some(path) = tags {
        workspace.set_color_tags(load_color_tags(path)?);
    }

    let mut backend = WorkerBackend::start();
    for spec in &specs {
        let id = workspace.add_view(&spec.type_tag)?;
        match workspace.submit_settings(id, &spec.settings, &mut backend) {
            Ok(_) => {}
            Err(WorkspaceError::Validation(e)) => {
                println!("view {id} ({}): not submitted: {e}", spec.type_tag)
            }
            Err(e) => return Err(e),
        }
    }

    while workspace.coordinator().pending_count() > 0 {
        let Some(message) = backend.recv_timeout(timeout)? else {
            tracing::warn!(
                pending = workspace.coordinator().pending_count(),
                "timed out waiting for results"
            );
            break;
        };
        let ticket = message.ticket();
        if let ResultOutcome::Failed { message } = workspace.apply_message(message) {
            println!("view {}: failed: {message}", ticket.view_id);
        }
    }

    let ids: Vec<_> = workspace.views().map(|v| v.id()).collect();
    for id in ids {
        let Some(payload) = workspace.render(id)? else {
            continue;
        };
        let summary = match &payload.data {
            MappedData::Empty => "no data".to_string(),
            MappedData::Reset => "reset".to_string(),
            MappedData::Data(data) => {
                let keys: Vec<&str> = data.as_map().keys().map(String::as_str).collect();
                format!("data [{}]", keys.join(", "))
            }
        };
        println!("view {id} ({}): {summary}", payload.view_type);
    }

    Ok(())
}

fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Choice(_) => "choice",
        FieldKind::Column => "column",
        FieldKind::Columns => "columns",
        FieldKind::ColorTags => "tags",
        FieldKind::Text => "text",
        FieldKind::Number => "number",
        FieldKind::Toggle => "toggle",
    }
}

fn condition_label(condition: Condition) -> String {
    match condition {
        Condition::Never => String::new(),
        Condition::Always => "required".to_string(),
        Condition::MethodIn(methods) => format!("required for {}", methods.join("/")),
        Condition::Enabled(toggle) => format!("required with {toggle}"),
    }
}
