use clap::{Parser, Subcommand};
use sophist::compile::Compiler;
use sophist::config::{self, SiteConfig};
use sophist::host::CallHost;
use sophist::{generate, listing, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sophist", version)]
#[command(about = "Compile .sphst documents to HTML")]
#[command(long_about = "\
Compile .sphst documents to HTML

Documents are line-oriented. Directive lines start with a keyword, every
other paragraph becomes <p> text:

  html5                      # wrap the page in a full HTML shell
  metatags                   # add charset, viewport, <title>, description
  importable                 # meant for import; no output file of its own
  import header              # splice header.sphst here
  import style.css           # stylesheet link in <head>
  var author Ada Lovelace    # variable, readable from scripts
  frontmatter {\"title\": \"Home\"}
  title Welcome              # <h1>; title2 .. title6 for <h2>..<h6>
  date 2024-05-01
  image cat.png
  	alt A sleeping cat
  markdown
  	Some *markdown* text
  script
  	list(\"posts\")

Configuration is read from sophist.toml in the source root.
Run 'sophist gen-config' to generate a documented sophist.toml.")]
struct Cli {
    /// Log progress (otherwise RUST_LOG decides; warnings by default)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a document or a directory of documents into HTML files
    Build {
        /// Document or directory
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Output directory (default: output_dir from sophist.toml)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print one compiled document to stdout
    Render { file: PathBuf },
    /// Print a document's tokens as JSON
    Tokens { file: PathBuf },
    /// Print a document's nodes (imports unresolved) as JSON
    Nodes { file: PathBuf },
    /// List a directory with each document's frontmatter
    Ls {
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Aligned text instead of JSON
        #[arg(long)]
        plain: bool,
    },
    /// Print a stock sophist.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { path, output: out } => {
            let root = source_root(&path);
            let config = config::load_config(&root)?;
            init_thread_pool(&config.build);
            let output_dir = out.unwrap_or_else(|| root.join(&config.output_dir));
            let compiler = compiler(&config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_build_event(&event);
                }
            });
            let report = generate::generate(&compiler, &path, &output_dir, &config.build, Some(tx))?;
            if printer.join().is_err() {
                tracing::warn!("Progress printer panicked");
            }
            output::print_build_summary(&report);

            if report.failed() > 0 {
                return Err(format!("{} document(s) failed", report.failed()).into());
            }
        }
        Command::Render { file } => {
            let config = config::load_config(&source_root(&file))?;
            let page = compiler(&config).compile_file(&file)?;
            println!("{}", page.html);
        }
        Command::Tokens { file } => {
            let config = config::load_config(&source_root(&file))?;
            let source = std::fs::read_to_string(&file)?;
            let tokens = compiler(&config).tokenize(&source);
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Command::Nodes { file } => {
            let config = config::load_config(&source_root(&file))?;
            let source = std::fs::read_to_string(&file)?;
            let nodes = compiler(&config).parse(&source);
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        Command::Ls { dir, plain } => {
            let config = config::load_config(&dir)?;
            let entries = listing::list_directory(&dir, &config.extension)?;
            if plain {
                output::print_listing(&entries, &config.extension);
            } else {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--verbose` enables info logs; otherwise RUST_LOG, defaulting to warnings.
/// Logs go to stderr so command output stays pipeable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn compiler(config: &SiteConfig) -> Compiler {
    Compiler::from_config(config).with_host(CallHost)
}

/// Size the global rayon pool from `[build] max_workers`.
fn init_thread_pool(build: &config::BuildConfig) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(build.worker_threads())
        .build_global()
        .ok();
}

/// Directory holding `sophist.toml`: the path itself, or a file's parent.
fn source_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
