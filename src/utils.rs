use std::path::Path;

use rpassword::prompt_password;
use screener_lib::RankedResult;
use screener_lib::utils::get_local_datetime_with_format;
use serde::Deserialize;

pub const DEFAULT_SECRETS_FILE: &str = ".streamlit/secrets.toml";

/// Keys read from the secrets store. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct SecretsFile {
    #[serde(rename = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,
    #[serde(rename = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,
}

/// Parse the TOML secrets store. A missing file means no secrets.
pub fn read_secrets_file<P: AsRef<Path>>(path: P) -> Result<SecretsFile, anyhow::Error> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("no secrets file at {}", path.display());
        return Ok(SecretsFile::default());
    }

    let content = std::fs::read_to_string(path)?;
    let secrets: SecretsFile = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid secrets file {}: {}", path.display(), e))?;
    return Ok(secrets);
}

/// Ask for an API key without echoing it. An empty answer means none.
pub fn prompt_session_key() -> Result<Option<String>, anyhow::Error> {
    let key = prompt_password("OpenAI API key (leave empty for keyword ranking): ")?;
    let key = key.trim();
    if key.is_empty() {
        return Ok(None);
    }
    return Ok(Some(key.to_string()));
}

pub fn results_csv_filename() -> String {
    let timestamp = get_local_datetime_with_format("%Y-%m-%d_%H-%M-%S");
    return format!("ranked_firms_{timestamp}.csv");
}

/// Write the shortlist as `rank,name,score,reason`.
pub fn export_results_to_csv<P: AsRef<Path>>(
    results: &[RankedResult],
    csv_path: P,
) -> Result<(), anyhow::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_path(csv_path)?;

    wtr.write_record(["rank", "name", "score", "reason"])?;
    for (index, result) in results.iter().enumerate() {
        wtr.write_record([
            (index + 1).to_string(),
            result.name.clone(),
            format!("{:.1}", result.score),
            result.reason.clone(),
        ])?;
    }
    wtr.flush()?;

    return Ok(());
}
