use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use ecosense::config::SecretStore;
use ecosense::export::{to_pretty_json, write_json, DEFAULT_EXPORT_FILE};
use ecosense::ingestion::{extract_json_object, PromptTemplate, DEFAULT_GEMINI_ENDPOINT};
use ecosense::session::{PageController, RunOutcome, RunSettings, SessionConfig};
use ecosense::{AnalyzeError, ModelId, SampleStore, TerminalSurface};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecosense", version, about = "Narrative incident analysis (Gemini or demo mode)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the demo samples.
    Samples {
        #[arg(long)]
        samples_dir: Option<PathBuf>,
    },
    /// Analyze a narrative and render the five report sections.
    Analyze {
        /// Sample label or key; defaults to the first sample.
        #[arg(long)]
        sample: Option<String>,
        /// Replaces the sample narrative; `-` reads stdin.
        #[arg(long, conflicts_with = "narrative_file")]
        narrative: Option<String>,
        #[arg(long)]
        narrative_file: Option<PathBuf>,
        /// Call the live model instead of loading the expected document.
        #[arg(long)]
        live: bool,
        /// Fail when live mode has no credential instead of using demo output.
        #[arg(long, requires = "live")]
        require_live: bool,
        #[arg(long, default_value = "gemini-2.0-flash")]
        model: String,
        #[arg(long)]
        secrets: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_GEMINI_ENDPOINT)]
        endpoint: String,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Write the result as JSON to this path.
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
        export: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long)]
        samples_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 80)]
        width: usize,
    },
    /// Extract the JSON object from model output (file or stdin).
    Extract {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the prompt that live mode would send.
    Prompt {
        #[arg(long)]
        sample: Option<String>,
        #[arg(long, conflicts_with = "narrative_file")]
        narrative: Option<String>,
        #[arg(long)]
        narrative_file: Option<PathBuf>,
        #[arg(long)]
        samples_dir: Option<PathBuf>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_store(samples_dir: Option<&Path>) -> anyhow::Result<SampleStore> {
    let store = match samples_dir {
        Some(dir) => SampleStore::load_dir(dir),
        None => SampleStore::bundled()?,
    };
    if store.is_empty() {
        bail!("no demo sample could be loaded");
    }
    Ok(store)
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("cannot read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("cannot read {:?}", path))
    }
}

fn narrative_override(
    text: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<Option<String>> {
    match (text, file) {
        (Some(text), _) if text == "-" => read_input(Path::new("-")).map(Some),
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => read_input(&path).map(Some),
        (None, None) => Ok(None),
    }
}

fn sample_name(store: &SampleStore, sample: Option<String>) -> anyhow::Result<String> {
    match sample {
        Some(name) => Ok(name),
        None => store
            .first()
            .map(|s| s.label.clone())
            .context("no demo sample available"),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Samples { samples_dir } => {
            let store = load_store(samples_dir.as_deref())?;
            for sample in store.iter() {
                println!("{}\t{}", sample.key, sample.label);
            }
            for (label, reason) in store.unavailable() {
                warn!(sample = %label, %reason, "unavailable");
            }
        }
        Commands::Analyze {
            sample,
            narrative,
            narrative_file,
            live,
            require_live,
            model,
            secrets,
            endpoint,
            timeout_secs,
            export,
            format,
            samples_dir,
            width,
        } => {
            let store = load_store(samples_dir.as_deref())?;
            let name = sample_name(&store, sample)?;
            let model = ModelId::from_str(&model)?;
            let secrets = SecretStore::load(secrets.as_deref())?;
            let config = SessionConfig::from_secrets(&secrets)
                .with_endpoint(endpoint)
                .with_timeout(timeout_secs.map(Duration::from_secs))
                .with_require_live(require_live);

            let mut settings = if live {
                RunSettings::live(name, model)
            } else {
                RunSettings::demo(name)
            };
            if let Some(text) = narrative_override(narrative, narrative_file)? {
                settings = settings.with_narrative(text);
            }

            let mut controller = PageController::new(config, store)?;
            let succeeded = match format {
                OutputFormat::Text => {
                    let stdout = io::stdout();
                    let mut surface = TerminalSurface::new(stdout.lock()).with_width(width);
                    matches!(
                        controller.run(&settings, &mut surface),
                        RunOutcome::Rendered(_)
                    )
                }
                OutputFormat::Json => match controller.analyze(&settings) {
                    Ok(analysis) => {
                        for notice in &analysis.notices {
                            warn!("{}", notice);
                        }
                        println!("{}", to_pretty_json(&analysis.result)?);
                        true
                    }
                    Err(err) => {
                        error!(kind = err.kind(), error = %err, "analyze failed");
                        eprintln!("Analyze failed.\n{}: {}", err.kind(), err);
                        false
                    }
                },
            };
            if !succeeded {
                return Ok(ExitCode::FAILURE);
            }

            if let Some(analysis) = controller.last_result() {
                info!(
                    sample = %analysis.sample,
                    mode = %analysis.mode,
                    model = analysis.model.map(|m| m.as_str()).unwrap_or("-"),
                    produced_at = %analysis.produced_at.to_rfc3339(),
                    "analysis complete"
                );
                if let Some(path) = export {
                    write_json(&path, &analysis.result)?;
                }
            }
        }
        Commands::Extract { input } => {
            let text = read_input(input.as_deref().unwrap_or(Path::new("-")))?;
            match extract_json_object(&text) {
                Ok(object) => println!("{}", serde_json::to_string_pretty(&object)?),
                Err(err) => {
                    let err = AnalyzeError::from(err);
                    eprintln!("{}: {}", err.kind(), err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Prompt {
            sample,
            narrative,
            narrative_file,
            samples_dir,
        } => {
            let narrative = match narrative_override(narrative, narrative_file)? {
                Some(text) => text,
                None => {
                    let store = load_store(samples_dir.as_deref())?;
                    let name = sample_name(&store, sample)?;
                    store
                        .get(&name)
                        .map(|s| s.narrative.clone())
                        .ok_or(AnalyzeError::UnknownSample(name))?
                }
            };
            println!("{}", PromptTemplate::default().build(&narrative));
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_narrative_is_accepted() {
        let cli = Cli::try_parse_from(["ecosense", "analyze", "--narrative", "Glass broke at 02:15."])
            .unwrap();
        let Commands::Analyze {
            narrative,
            narrative_file,
            ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(
            narrative_override(narrative, narrative_file).unwrap().as_deref(),
            Some("Glass broke at 02:15.")
        );
    }

    #[test]
    fn narrative_and_narrative_file_conflict() {
        let parsed = Cli::try_parse_from([
            "ecosense",
            "prompt",
            "--narrative",
            "x",
            "--narrative-file",
            "n.txt",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn narrative_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n.txt");
        std::fs::write(&path, "from file").unwrap();
        assert_eq!(
            narrative_override(None, Some(path)).unwrap().as_deref(),
            Some("from file")
        );
        assert_eq!(narrative_override(None, None).unwrap(), None);
    }
}
