use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::Value;

use gateway_conf::http::{ApiResponse, CreateConfigRequest, UpdateConfigRequest};
use gateway_conf::store::codec;

#[derive(Parser)]
#[command(name = "gateway-conf-cli")]
#[command(about = "Management CLI for the gateway config service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8786")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List managed config files
    List,
    /// Print the content of one or more config files
    Get { names: Vec<String> },
    /// Create a config file from a local file
    Create { name: String, file: PathBuf },
    /// Replace a config file, provided it still matches BASE
    Update {
        name: String,
        /// Local copy of the content the edit started from
        base: PathBuf,
        /// Local file with the new content
        new: PathBuf,
    },
    /// Run the reload command so saved edits take effect
    Apply,
    /// Show apply state and whether edits are pending
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let api = format!("{}{}", cli.url.trim_end_matches('/'), gateway_conf::api::API_PREFIX);

    match cli.command {
        Commands::List => {
            let res = client.get(format!("{api}/conf/list")).send().await?;
            print_response(res).await?;
        }
        Commands::Get { names } => {
            let query: Vec<(&str, &str)> = names.iter().map(|n| ("name", n.as_str())).collect();
            let res = client.get(format!("{api}/conf")).query(&query).send().await?;
            let contents = read_envelope::<BTreeMap<String, String>>(res)
                .await?
                .unwrap_or_default();
            for (name, encoded) in contents {
                let raw = codec::decode(&encoded)?;
                println!("==> {name} <==");
                println!("{}", String::from_utf8_lossy(&raw));
            }
        }
        Commands::Create { name, file } => {
            let body = CreateConfigRequest {
                name,
                content: codec::encode(&std::fs::read(file)?),
            };
            let res = client.post(format!("{api}/conf")).json(&body).send().await?;
            print_response(res).await?;
        }
        Commands::Update { name, base, new } => {
            let body = UpdateConfigRequest {
                name,
                current_content: codec::encode(&std::fs::read(base)?),
                expected_content: codec::encode(&std::fs::read(new)?),
            };
            let res = client.put(format!("{api}/conf")).json(&body).send().await?;
            print_response(res).await?;
        }
        Commands::Apply => {
            let res = client.post(format!("{api}/apply")).send().await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = client.get(format!("{api}/apply/status")).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Decode the envelope; a non-zero business code becomes an error.
async fn read_envelope<T: DeserializeOwned + Default>(
    res: reqwest::Response,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let envelope: ApiResponse<T> = serde_json::from_str(&text)
        .map_err(|_| format!("service returned status {status}: {text}"))?;

    if !envelope.is_success() {
        return Err(format!("[{}] {}", envelope.biz_code, envelope.message).into());
    }
    Ok(envelope.data)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    match read_envelope::<Value>(res).await? {
        Some(data) => println!("{}", serde_json::to_string_pretty(&data)?),
        None => println!("ok"),
    }
    Ok(())
}
