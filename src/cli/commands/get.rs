use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use serde_json::Value;

use crate::cli::utils::print_json;
use crate::cli::OutputFormat;
use crate::middleware::API_KEY_HEADER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Profiles,
    Sessions,
    Tracks,
    Venues,
    Timeslots,
}

impl Resource {
    fn path(&self) -> &'static str {
        match self {
            Resource::Profiles => "profiles",
            Resource::Sessions => "sessions",
            Resource::Tracks => "tracks",
            Resource::Venues => "venues",
            Resource::Timeslots => "timeslots",
        }
    }
}

#[derive(Debug, Args)]
pub struct GetArgs {
    #[arg(value_enum, help = "Resource collection")]
    pub resource: Resource,
    #[arg(help = "Record ID (optional)")]
    pub id: Option<String>,
    #[arg(long, help = "Comma-separated relationships to expand")]
    pub include: Option<String>,
    #[arg(long, help = "Comma-separated session statuses")]
    pub status: Option<String>,
    #[arg(long, help = "Timeslot day, YYYY-MM-DD")]
    pub day: Option<String>,
    #[arg(long, env = "UNCONF_URL", default_value = "http://127.0.0.1:3000", help = "Server base URL")]
    pub url: String,
    #[arg(long, env = "API_SECRET_KEY", hide_env_values = true, help = "Read API key")]
    pub api_key: Option<String>,
}

impl GetArgs {
    pub fn endpoint(&self) -> String {
        let base = self.url.trim_end_matches('/');
        match &self.id {
            Some(id) => format!("{}/api/v1/{}/{}", base, self.resource.path(), id),
            None => format!("{}/api/v1/{}", base, self.resource.path()),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, &str)> {
        [
            ("include", self.include.as_deref()),
            ("status", self.status.as_deref()),
            ("day", self.day.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

/// `unconf get <resource> [id]`
pub async fn handle(args: GetArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let Some(api_key) = args.api_key.as_deref() else {
        bail!("API_SECRET_KEY is not set (pass --api-key or export it)");
    };

    let url = args.endpoint();
    tracing::debug!("GET {}", url);

    let response = reqwest::Client::new()
        .get(&url)
        .header(API_KEY_HEADER, api_key)
        .query(&args.query())
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    let status = response.status();
    let body: Value = response.json().await.context("response was not JSON")?;

    if !status.is_success() {
        let message = body["error"]["message"].as_str().unwrap_or("request failed");
        bail!("{} {}", status.as_u16(), message);
    }

    match output_format {
        OutputFormat::Json => print_json(&body),
        OutputFormat::Text => {
            if let Some(count) = body.get("count") {
                println!("{} {}", count, args.resource.path());
            }
            print_json(&body["data"])
        }
    }
}
