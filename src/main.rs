use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use widgetsmith::screens::{DetailScreen, Generation, ListScreen};
use widgetsmith::{
    markup, AspectRatio, FileStore, GeminiModel, GeneratorConfig, UnitMode, WidgetGenerator, WidgetStore,
};

type Screen = DetailScreen<GeminiModel>;

#[derive(Parser)]
#[command(name = "widgetsmith")]
#[command(about = "Describe a widget, generate it with a hosted model, render it at a fixed aspect ratio", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Directory holding the widget collection
    #[arg(long, global = true, default_value = ".widgetsmith")]
    data_dir: PathBuf,
    /// Model name (overrides WIDGETSMITH_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,
    /// Base URL of the generation service (overrides WIDGETSMITH_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Request timeout in milliseconds (none by default)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored widgets
    List,
    /// Create a widget from a description, generate it and save it
    New {
        /// What the widget should be
        #[arg(long)]
        prompt: String,
        /// Canvas shape: 1x1, 2x1 or 2x2
        #[arg(long, default_value = "1x1")]
        ratio: AspectRatio,
        /// Title (derived from the prompt when omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// Show a widget's details
    Show { id: String },
    /// Generate a widget again, optionally with a new description
    Regenerate {
        id: String,
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Change a widget's canvas shape (regenerates existing content)
    Ratio { id: String, ratio: AspectRatio },
    /// Rename a widget
    Rename { id: String, name: String },
    /// Clear a widget's generated markup
    Reset {
        id: String,
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
    /// Delete a widget
    Delete { id: String },
    /// Print the embeddable document for a widget
    Render {
        id: String,
        /// Print the data: URI instead of the document
        #[arg(long)]
        uri: bool,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Width of the hosting screen, used for the preview size
        #[arg(long, default_value_t = 400.0)]
        screen_width: f64,
    },
    /// Fit an HTML file to a canvas without touching the store
    Normalize {
        file: PathBuf,
        #[arg(long, default_value = "1x1")]
        ratio: AspectRatio,
        /// Convert vertical properties against the canvas height
        #[arg(long)]
        per_axis: bool,
        /// Print the data: URI instead of the document
        #[arg(long)]
        uri: bool,
    },
}

struct App {
    store: Arc<WidgetStore>,
    generator: Arc<WidgetGenerator<GeminiModel>>,
}

impl App {
    fn new(args: GlobalArgs) -> Result<Self> {
        let mut config = GeneratorConfig::from_env();
        if let Some(model) = args.model {
            config.model = model;
        }
        if let Some(endpoint) = args.endpoint {
            config.endpoint = endpoint;
        }
        config.timeout_ms = args.timeout_ms.or(config.timeout_ms);

        let backend = FileStore::open(&args.data_dir)?;
        Ok(Self {
            store: Arc::new(WidgetStore::new(backend)),
            generator: Arc::new(WidgetGenerator::new(GeminiModel::new(config)?)),
        })
    }

    fn open(&self, id: &str) -> Result<Screen> {
        Ok(DetailScreen::open(self.store.clone(), self.generator.clone(), id)?)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn report(outcome: Generation, screen: &Screen) {
    match outcome {
        Generation::Applied => println!("Generated `{}` ({})", screen.name(), screen.aspect_ratio()),
        Generation::Skipped => println!("Set `{}` to {}", screen.name(), screen.aspect_ratio()),
        Generation::Discarded => println!("Generation discarded"),
    }
}

fn normalize_file(file: &Path, ratio: AspectRatio, per_axis: bool, uri: bool) -> Result<()> {
    let source = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let mode = if per_axis { UnitMode::PerAxis } else { UnitMode::WidthRelative };
    let document = markup::normalize_with(&source, ratio, mode);
    let text = if uri { markup::to_embeddable_uri(&document) } else { document };
    emit(&text, None)
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Normalize { file, ratio, per_axis, uri } => normalize_file(&file, ratio, per_axis, uri),
        command => {
            let app = App::new(cli.global)?;
            execute(&app, command).await
        }
    }
}

async fn execute(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::List => {
            let mut list = ListScreen::new(app.store.clone());
            list.on_focus();
            if list.is_empty() {
                println!("No widgets yet. Create your first one with `widgetsmith new --prompt ...`");
            }
            for row in list.rows() {
                println!("{}  {}  [{}]  {}", row.id, row.name, row.aspect_ratio, row.updated);
                if !row.preview.is_empty() {
                    println!("    {}", row.preview);
                }
            }
        }
        Commands::New { prompt, ratio, name } => {
            let mut screen = DetailScreen::new_widget(app.store.clone(), app.generator.clone());
            screen.set_prompt(prompt);
            screen.change_aspect_ratio(ratio).await?;
            if let Some(name) = name {
                screen.set_name(&name);
            }
            let outcome = screen.generate().await?;
            report(outcome, &screen);
            println!("{}", screen.record().id);
        }
        Commands::Show { id } => {
            let screen = app.open(&id)?;
            let record = screen.record();
            println!("id:      {}", record.id);
            println!("name:    {}", record.display_name());
            println!("ratio:   {}", record.aspect_ratio);
            println!("prompt:  {}", record.prompt);
            println!("markup:  {} bytes", record.html.len());
            println!("created: {}", format_millis(record.created_at));
            println!("updated: {}", format_millis(record.updated_at));
        }
        Commands::Regenerate { id, prompt } => {
            let mut screen = app.open(&id)?;
            if let Some(prompt) = prompt {
                screen.set_prompt(prompt);
            }
            let outcome = screen.generate().await?;
            report(outcome, &screen);
        }
        Commands::Ratio { id, ratio } => {
            let mut screen = app.open(&id)?;
            let outcome = screen.change_aspect_ratio(ratio).await?;
            report(outcome, &screen);
        }
        Commands::Rename { id, name } => {
            let mut screen = app.open(&id)?;
            screen.begin_rename();
            screen.set_name(&name);
            screen.commit_name()?;
            println!("Renamed to `{}`", screen.name());
        }
        Commands::Reset { id, yes } => {
            let mut screen = app.open(&id)?;
            screen.request_reset();
            let question = format!("Reset `{}`? Its generated markup will be cleared.", screen.name());
            if yes || confirm(&question)? {
                screen.confirm_reset()?;
                println!("Reset `{}`", screen.name());
            } else {
                screen.cancel_reset();
            }
        }
        Commands::Delete { id } => {
            let mut list = ListScreen::new(app.store.clone());
            if app.store.get(&id).is_none() {
                bail!(widgetsmith::Error::NotFound(id));
            }
            list.delete(&id)?;
            println!("Deleted {}", id);
        }
        Commands::Render { id, uri, out, screen_width } => {
            let screen = app.open(&id)?;
            let Some(rendered) = screen.render(screen_width) else {
                bail!("`{}` has no generated markup yet", screen.name());
            };
            log::info!(
                "preview {}x{} for {}",
                rendered.preview.width,
                rendered.preview.height,
                screen.aspect_ratio()
            );
            let text = if uri { rendered.uri } else { rendered.document };
            emit(&text, out.as_deref())?;
        }
        Commands::Normalize { file, ratio, per_axis, uri } => normalize_file(&file, ratio, per_axis, uri)?,
    }

    Ok(())
}

fn format_millis(ms: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ms)
        .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
