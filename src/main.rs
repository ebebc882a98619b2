// reset; cargo run -- --excel-file ./data/pitchbook_export.xlsx --criteria "B2B SaaS Series A Europe" --top-n 5
// reset; cargo run -- --excel-file ./data/pitchbook_export.xlsx --criteria "fintech seed" --mode fallback --json

use clap::{Parser, ValueEnum};
use firm_screener::{
    model::ChatCompletionClient,
    utils::{
        export_results_to_csv, prompt_session_key, read_secrets_file, results_csv_filename,
        DEFAULT_SECRETS_FILE,
    },
    ERRORS_LOG_FILE,
};
use screener_lib::{
    config::API_KEY_VAR, resolve_credential, utils::write_error_to_log, RankMode, RankOutcome,
    RankingEngine, ScreenerConfig, SheetProcessor,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Expert analysis through the text generation service, keyword ranking on failure
    Expert,
    /// Keyword ranking only
    Fallback,
}

impl From<Mode> for RankMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Expert => RankMode::Expert,
            Mode::Fallback => RankMode::Fallback,
        }
    }
}

#[derive(Parser)]
#[command(name = "firm-screener")]
#[command(about = "Normalize a company export and rank the firms against investment criteria")]
#[command(version)]
struct Args {
    /// Path to the spreadsheet export (xlsx, xls, xlsb, ods or csv)
    #[arg(short, long)]
    excel_file: String,

    /// Free-text investment criteria
    #[arg(short, long)]
    criteria: String,

    /// Number of firms to show. Defaults to the configured value (10)
    #[arg(short, long)]
    top_n: Option<usize>,

    #[arg(long, value_enum, default_value_t = Mode::Expert)]
    mode: Mode,

    /// API key for this session. Environment and secrets file take precedence.
    #[arg(long)]
    api_key: Option<String>,

    /// Ask for the API key at runtime when no other source provides one
    #[arg(long)]
    prompt_api_key: bool,

    /// TOML secrets file with OPENAI_API_KEY / GEMINI_API_KEY
    #[arg(long, default_value = DEFAULT_SECRETS_FILE)]
    secrets_file: String,

    /// Model identifier, overrides AI_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Also write the shortlist to a timestamped CSV file
    #[arg(long)]
    export_csv: bool,

    /// Print the shortlist as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arguments = Args::parse();

    let secrets = read_secrets_file(&arguments.secrets_file)?;
    let session_key = match arguments.api_key.clone() {
        Some(key) => Some(key),
        None => {
            let resolved = resolve_credential(
                std::env::var(API_KEY_VAR).ok().as_deref(),
                secrets.openai_api_key.as_deref(),
                None,
            );
            if resolved.is_none() && arguments.prompt_api_key {
                prompt_session_key()?
            } else {
                None
            }
        }
    };

    let mut config =
        ScreenerConfig::from_env(secrets.openai_api_key.as_deref(), session_key.as_deref());
    if let Some(model) = arguments.model.clone() {
        config.model = model;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::debug!("configuration: {:?}", config);
    if secrets.gemini_api_key.is_some() {
        tracing::debug!("GEMINI_API_KEY present in secrets file; only the OpenAI-compatible service is used");
    }

    let processor = SheetProcessor::new(config.clone());
    let processed = match processor.process_path(&arguments.excel_file) {
        Ok(processed) => processed,
        Err(e) => {
            write_error_to_log(
                "Load Error",
                &format!("File: {}\nError: {}", arguments.excel_file, e),
            );
            eprintln!("❌ Failed to load {}: {e}", arguments.excel_file);
            eprintln!("❌ Check {} for details.", ERRORS_LOG_FILE);
            std::process::exit(1);
        }
    };

    println!(
        "✅ Loaded {} firms (header at row {})",
        processed.records.len(),
        processed.header_row + 1
    );
    for warning in &processed.warnings {
        println!("⚠️  {warning}");
    }

    let top_n = arguments.top_n.unwrap_or(config.top_n);
    let client = ChatCompletionClient::from_config(&config)?;
    let engine = RankingEngine::new(&config, client);
    let outcome = engine.rank(
        &processed.records,
        &arguments.criteria,
        top_n,
        arguments.mode.into(),
    );

    match &outcome {
        RankOutcome::Expert(_) => {
            println!("🤖 Ranked by expert analysis ({})", config.model);
        }
        RankOutcome::Fallback { reason, .. } => {
            println!("🔎 Ranked by keyword matching ({reason}); scores are less reliable");
        }
    }

    if arguments.json {
        println!("{}", serde_json::to_string_pretty(outcome.results())?);
    } else if outcome.results().is_empty() {
        println!("No firms to rank.");
    } else {
        for (index, result) in outcome.results().iter().enumerate() {
            println!("{:>2}. {} ({:.1})", index + 1, result.name, result.score);
            println!("    {}", result.reason);
        }
    }

    if arguments.export_csv {
        let csv_filename = results_csv_filename();
        export_results_to_csv(outcome.results(), &csv_filename)?;
        println!("✅ CSV file created: {csv_filename}");
    }

    Ok(())
}
