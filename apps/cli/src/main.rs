use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::ProgressBar;
use output::{OutputFormat, Renderer};
use progress::spinner;
use research_core::{Pipeline, Settings};
use time::OffsetDateTime;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "scout",
    version,
    about = "Ask the multi-source research pipeline from the shell."
)]
struct Cli {
    /// Preferred renderer for command output.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    /// Suppress non-critical CLI output.
    #[arg(long, global = true)]
    quiet: bool,
    /// Disable progress indicators for long-running tasks.
    #[arg(long, global = true)]
    no_progress: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    /// Run the HTTP research server.
    Serve {
        /// Bind address, overriding SCOUT_BIND_ADDR.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one query through the research pipeline.
    Ask {
        /// The query text.
        query: Vec<String>,
    },
    /// List registered data sources and their usage statistics.
    Sources {
        /// Maximum number of sources to display (0 = all).
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Inspect session memory.
    Memory {
        #[command(subcommand)]
        command: MemoryCommand,
    },
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand, Clone)]
enum MemoryCommand {
    /// Show the context summary for the current session.
    Summary,
    /// Drop entries older than the retention window.
    Prune,
}

impl Cli {
    fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let mut settings = Settings::from_env();
    if let Command::Serve { bind: Some(raw) } = &cli.command {
        settings.bind_addr = raw
            .parse()
            .map_err(|_| anyhow!("invalid bind address: {raw}"))?;
    }

    let pipeline = Pipeline::bootstrap(settings.clone());

    match &cli.command {
        Command::Serve { .. } => research_server::serve(pipeline, settings.bind_addr).await,
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "scout", &mut std::io::stdout());
            Ok(())
        }
        Command::Ask { query } => {
            let renderer = Renderer::new(cli.format);
            handle_ask(&query.join(" "), &cli, &renderer, &pipeline).await
        }
        Command::Sources { limit } => {
            let renderer = Renderer::new(cli.format);
            handle_sources(*limit, &cli, &renderer, &pipeline).await
        }
        Command::Memory { command } => {
            let renderer = Renderer::new(cli.format);
            handle_memory(command.clone(), &cli, &renderer, &pipeline).await
        }
    }
}

async fn handle_ask(query: &str, cli: &Cli, renderer: &Renderer, pipeline: &Pipeline) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("query must not be empty");
    }

    let spinner = spinner(cli.progress_enabled(), "Researching...");
    let output = pipeline.run(query).await;
    finish_spinner(spinner, None);

    if cli.quiet {
        return Ok(());
    }
    renderer.research_output(&output)
}

async fn handle_sources(
    limit: usize,
    cli: &Cli,
    renderer: &Renderer,
    pipeline: &Pipeline,
) -> Result<()> {
    if cli.quiet {
        return Ok(());
    }
    let limit = if limit == 0 { usize::MAX } else { limit };
    let sources = pipeline.memory().top_sources(limit).await;
    renderer.sources(&sources)
}

async fn handle_memory(
    command: MemoryCommand,
    cli: &Cli,
    renderer: &Renderer,
    pipeline: &Pipeline,
) -> Result<()> {
    match command {
        MemoryCommand::Summary => {
            if cli.quiet {
                return Ok(());
            }
            let summary = pipeline.memory().context_summary().await;
            renderer.memory_summary(&summary)
        }
        MemoryCommand::Prune => {
            let removed = pipeline.memory().prune(OffsetDateTime::now_utc()).await;
            if cli.quiet {
                return Ok(());
            }
            renderer.memory_pruned(removed)
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,scout=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn finish_spinner(spinner: Option<ProgressBar>, message: Option<String>) {
    if let Some(progress) = spinner {
        if let Some(msg) = message {
            progress.finish_with_message(msg);
        } else {
            progress.finish_and_clear();
        }
    }
}

mod output {
    use anyhow::Result;
    use clap::ValueEnum;
    use research_core::{ContextSummary, PipelineOutput, SourceIndexEntry};
    use serde_json::json;
    use std::fmt::Write;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
    pub enum OutputFormat {
        Json,
        Markdown,
        Table,
        Text,
    }

    #[derive(Copy, Clone, Debug)]
    pub struct Renderer {
        format: OutputFormat,
    }

    impl Renderer {
        pub fn new(format: OutputFormat) -> Self {
            Self { format }
        }

        pub fn research_output(&self, output: &PipelineOutput) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(output)?);
                }
                OutputFormat::Markdown => {
                    println!(
                        "**Intent:** {} ({}% confidence)",
                        output.intent.primary.name(),
                        output.intent.confidence
                    );
                    println!();
                    println!("{}", output.answer);
                    if !output.sources.is_empty() {
                        println!();
                        println!("| Source | Confidence |");
                        println!("| --- | ---: |");
                        for source in &output.sources {
                            println!("| {} | {}% |", source.source, source.confidence);
                        }
                    }
                }
                OutputFormat::Table => {
                    let rows: Vec<Vec<String>> = output
                        .sources
                        .iter()
                        .map(|source| {
                            vec![
                                source.source.clone(),
                                format!("{}%", source.confidence),
                                truncate(&source.data, 100),
                            ]
                        })
                        .collect();
                    if rows.is_empty() {
                        println!("{}", output.answer);
                    } else {
                        render_table(&["Source", "Confidence", "Data"], &rows);
                    }
                }
                OutputFormat::Text => {
                    println!("{}", output.answer);
                    if output.degraded {
                        eprintln!("(degraded: no data source or completion backend reachable)");
                    }
                }
            }
            Ok(())
        }

        pub fn sources(&self, sources: &[SourceIndexEntry]) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    let payload = json!({ "sources": sources });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown => {
                    println!("| Source | Category | Accesses | Avg Confidence |");
                    println!("| --- | --- | ---: | ---: |");
                    for entry in sources {
                        println!(
                            "| {} | {} | {} | {:.0}% |",
                            entry.name,
                            entry.category.name(),
                            entry.access_count,
                            entry.running_avg_confidence
                        );
                    }
                }
                OutputFormat::Table => {
                    let rows: Vec<Vec<String>> = sources
                        .iter()
                        .map(|entry| {
                            vec![
                                entry.name.clone(),
                                entry.category.name().to_string(),
                                entry.access_count.to_string(),
                                format!("{:.0}%", entry.running_avg_confidence),
                            ]
                        })
                        .collect();
                    render_table(&["Source", "Category", "Accesses", "Avg Confidence"], &rows);
                }
                OutputFormat::Text => {
                    for entry in sources {
                        println!(
                            "{} [{}] - {} accesses, {:.0}% avg confidence",
                            entry.name,
                            entry.category.name(),
                            entry.access_count,
                            entry.running_avg_confidence
                        );
                    }
                }
            }
            Ok(())
        }

        pub fn memory_summary(&self, summary: &ContextSummary) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(summary)?);
                }
                OutputFormat::Markdown | OutputFormat::Text => {
                    println!("Entries: {}", summary.entry_count);
                    println!(
                        "Recent topics: {}",
                        if summary.recent_topics.is_empty() {
                            "none".to_string()
                        } else {
                            summary.recent_topics.join(", ")
                        }
                    );
                    println!(
                        "Sources used: {}",
                        if summary.sources_used.is_empty() {
                            "none".to_string()
                        } else {
                            summary.sources_used.join(", ")
                        }
                    );
                    println!("Average confidence: {:.0}%", summary.average_confidence);
                }
                OutputFormat::Table => {
                    let rows = vec![
                        vec!["Entries".to_string(), summary.entry_count.to_string()],
                        vec!["Recent topics".to_string(), summary.recent_topics.join(", ")],
                        vec!["Sources used".to_string(), summary.sources_used.join(", ")],
                        vec![
                            "Average confidence".to_string(),
                            format!("{:.0}%", summary.average_confidence),
                        ],
                    ];
                    render_table(&["Property", "Value"], &rows);
                }
            }
            Ok(())
        }

        pub fn memory_pruned(&self, removed: usize) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    let payload = json!({ "event": "prune", "removed": removed });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown | OutputFormat::Text | OutputFormat::Table => {
                    println!("Pruned {removed} aged memory entries.");
                }
            }
            Ok(())
        }
    }

    fn render_table(headers: &[&str], rows: &[Vec<String>]) {
        let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
        for row in rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.len());
            }
        }

        fn render_line(columns: &[&str], widths: &[usize]) -> String {
            let mut line = String::new();
            for (idx, value) in columns.iter().enumerate() {
                let width = widths[idx];
                let _ = write!(line, "| {value:width$} ");
            }
            line.push('|');
            line
        }

        println!("{}", render_line(headers, &widths));
        let separator: String = widths
            .iter()
            .map(|width| format!("|{:-^1$}", "", width + 2))
            .collect::<Vec<_>>()
            .join("");
        println!("{separator}|");

        for row in rows {
            let cols: Vec<&str> = row.iter().map(String::as_str).collect();
            println!("{}", render_line(&cols, &widths));
        }
    }

    fn truncate(value: &str, max: usize) -> String {
        if value.len() <= max {
            value.to_string()
        } else {
            let mut truncated = value
                .chars()
                .take(max.saturating_sub(1))
                .collect::<String>();
            truncated.push('\u{2026}');
            truncated
        }
    }
}

mod progress {
    use std::time::Duration;

    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(message_enabled: bool, message: impl Into<String>) -> Option<ProgressBar> {
        if !message_enabled {
            return None;
        }
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message.into());
        progress.enable_steady_tick(Duration::from_millis(80));
        Some(progress)
    }
}
