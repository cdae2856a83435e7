use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use depviz_core::{DepvizConfig, Direction, OutputFormat};
use depviz_graph::extract::PatternExtractor;
use depviz_graph::Analysis;

#[derive(Parser)]
#[command(
    name = "depviz",
    version,
    about = "Draw a source tree's file dependencies as a Mermaid diagram",
    long_about = "depviz scans a directory, extracts imports, functions and classes with\n\
                   lightweight pattern matching, and renders the file-level dependency graph\n\
                   as a Mermaid flowchart with a topological backbone.\n\n\
                   Examples:\n  \
                     depviz diagram --path .                 Print the diagram\n  \
                     depviz diagram -o deps.md --format md   Write a fenced Markdown block\n  \
                     depviz export --output deps.svg         Render an SVG with the Mermaid CLI\n  \
                     depviz stats                            Summarize the graph"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .depviz.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "mermaid",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         mermaid   Raw Mermaid flowchart text (default)\n  \
                         markdown  Mermaid wrapped in a fenced code block\n  \
                         json      Machine-readable graph with camelCase keys"
    )]
    format: OutputFormat,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the dependency diagram
    #[command(long_about = "Generate the dependency diagram.\n\n\
        Collects eligible files, resolves relative imports, orders files with Kahn's\n\
        algorithm, and prints Mermaid text (or writes it with --output).\n\n\
        Examples:\n  depviz diagram --path src\n  depviz diagram --direction LR --max-backbone 50")]
    Diagram {
        /// Root directory to scan (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Flowchart direction: TD, LR, BT or RL
        #[arg(long)]
        direction: Option<Direction>,

        /// Maximum files in the dashed backbone chain
        #[arg(long)]
        max_backbone: Option<usize>,

        /// Maximum functions, and separately classes, shown per file
        #[arg(long)]
        max_symbols: Option<usize>,
    },
    /// Render the diagram to SVG with the Mermaid CLI
    #[command(long_about = "Render the diagram to SVG with the Mermaid CLI.\n\n\
        Writes the raw .mmd source next to the output, then tries the project's\n\
        node_modules/.bin/mmdc or mmdc on PATH, and finally npx @mermaid-js/mermaid-cli.\n\n\
        Examples:\n  depviz export --output docs/deps.svg")]
    Export {
        /// Root directory to scan (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// SVG file to write
        #[arg(long, short, default_value = "diagram.svg")]
        output: PathBuf,

        /// Renderer maxTextSize setting
        #[arg(long)]
        max_text_size: Option<usize>,
    },
    /// Print file, edge and external counts with entry and leaf files
    Stats {
        /// Root directory to scan (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Create a default .depviz.toml configuration file
    #[command(long_about = "Create a default .depviz.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .depviz.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# depviz configuration

[scan]
# Glob patterns matched against each path component; matching directories are pruned
# ignore = ["node_modules", ".git*", "dist", "build", "*.lock"]
# File extensions to collect, without the dot
# extensions = ["ts", "tsx", "js", "jsx", "py", "rs"]
# Collect files with no extension (Makefile, Dockerfile, ...)
# include_extensionless = true
# Extensions tried when resolving a relative import
# resolve_extensions = ["ts", "tsx", "js", "jsx", "mjs", "cjs", "json"]

[graph]
# Maximum functions, and separately classes, per file
# max_symbols = 8

[render]
# TD | LR | BT | RL
# direction = "TD"
# max_backbone = 200

[export]
# max_text_size = 90000
# command = "mmdc"
"#;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<DepvizConfig> {
    match path {
        Some(path) => DepvizConfig::from_file(path)
            .wrap_err_with(|| format!("loading {}", path.display())),
        None => {
            let default_path = Path::new(".depviz.toml");
            if default_path.exists() {
                Ok(DepvizConfig::from_file(default_path)?)
            } else {
                Ok(DepvizConfig::default())
            }
        }
    }
}

/// Scan `path`, printing the "nothing to do" notice when it has no files.
fn scan(path: &Path, config: &DepvizConfig) -> Result<Option<Analysis>> {
    let analysis = depviz_graph::analyze(path, config, &PatternExtractor::default())?;
    if analysis.is_none() {
        eprintln!("No eligible files found under {}", path.display());
    }
    Ok(analysis)
}

fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).into_diagnostic()?;
            }
            std::fs::write(path, text)
                .into_diagnostic()
                .wrap_err_with(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn print_stats(analysis: &Analysis, format: OutputFormat) -> Result<()> {
    let graph = &analysis.graph;
    let labels = |nodes: Vec<_>| -> Vec<String> {
        nodes.into_iter().map(|n| graph.node(n).label.clone()).collect()
    };
    let entries = labels(graph.entries());
    let leaves = labels(graph.leaves());

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "files": graph.file_count(),
                "externals": graph.externals().len(),
                "edges": graph.edge_count(),
                "cyclic": analysis.backbone.has_cycle(),
                "entries": entries,
                "leaves": leaves,
                "collisions": graph.collisions(),
            });
            println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("| Metric | Value |");
            println!("|---|---|");
            println!("| Files | {} |", graph.file_count());
            println!("| External packages | {} |", graph.externals().len());
            println!("| Import edges | {} |", graph.edge_count());
            println!("| Cyclic | {} |", analysis.backbone.has_cycle());
            println!("| Entries | {} |", entries.join(", "));
            println!("| Leaves | {} |", leaves.join(", "));
        }
        OutputFormat::Mermaid => {
            println!("files:     {}", graph.file_count());
            println!("externals: {}", graph.externals().len());
            println!("edges:     {}", graph.edge_count());
            if analysis.backbone.has_cycle() {
                println!(
                    "cycles:    {} file(s) outside the topological order",
                    analysis.backbone.order().len() - analysis.backbone.sorted_len()
                );
            }
            println!("entries:   {}", entries.join(", "));
            println!("leaves:    {}", leaves.join(", "));
            for c in graph.collisions() {
                println!("collision: {} and {} -> {}", c.existing, c.incoming, c.assigned);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        None => {
            Cli::command().print_help().into_diagnostic()?;
        }
        Some(Command::Diagram {
            ref path,
            ref output,
            direction,
            max_backbone,
            max_symbols,
        }) => {
            if let Some(direction) = direction {
                config.render.direction = direction;
            }
            if let Some(max) = max_backbone {
                if max == 0 {
                    miette::bail!("--max-backbone must be at least 1");
                }
                config.render.max_backbone = max;
            }
            if let Some(max) = max_symbols {
                config.graph.max_symbols = max;
            }

            let Some(analysis) = scan(path, &config)? else {
                return Ok(());
            };
            let text = analysis.render(cli.format, &config.render)?;
            write_output(&text, output.as_deref())?;
        }
        Some(Command::Export {
            ref path,
            ref output,
            max_text_size,
        }) => {
            if let Some(size) = max_text_size {
                if size == 0 {
                    miette::bail!("--max-text-size must be at least 1");
                }
                config.export.max_text_size = size;
            }

            let Some(analysis) = scan(path, &config)? else {
                return Ok(());
            };
            let text = analysis.render(OutputFormat::Mermaid, &config.render)?;
            let strategies = depviz_export::default_strategies(path, &config.export);

            let spinner = if std::io::stderr().is_terminal() {
                let pb = indicatif::ProgressBar::new_spinner();
                pb.set_style(
                    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                        .into_diagnostic()?,
                );
                pb.set_message("Rendering SVG...");
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };

            let result = depviz_export::export_diagram(&text, output, &strategies, &config.export);
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            let (source, used) = result?;
            eprintln!(
                "Exported {} (source: {}, renderer: {used})",
                output.display(),
                source.display()
            );
        }
        Some(Command::Stats { ref path }) => {
            let Some(analysis) = scan(path, &config)? else {
                return Ok(());
            };
            print_stats(&analysis, cli.format)?;
        }
        Some(Command::Init) => {
            let path = Path::new(".depviz.toml");
            if path.exists() {
                miette::bail!(".depviz.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .depviz.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "depviz", &mut std::io::stdout());
        }
    }

    Ok(())
}
