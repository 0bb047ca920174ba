use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Management CLI for the site router admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show router status
    Status,
    /// List configured sites
    Sites,
    /// Show the cached site root paths
    RootPaths,
    /// Drop the cached site root paths
    Invalidate,
    /// Check permissions of a site user
    CheckPerm {
        #[arg(long)]
        site: u32,
        #[arg(long)]
        user: u32,
        /// Permissions in app_label.codename form
        perms: Vec<String>,
        /// Also test module access for this app label
        #[arg(long)]
        module: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Sites => {
            client.get(format!("{}/admin/sites", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::RootPaths => {
            client.get(format!("{}/admin/root-paths", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Invalidate => {
            client.post(format!("{}/admin/root-paths/invalidate", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::CheckPerm { site, user, perms, module } => {
            client.post(format!("{}/admin/permissions/check", cli.url))
                .headers(headers)
                .json(&json!({
                    "site_id": site,
                    "user_id": user,
                    "permissions": perms,
                    "module": module,
                }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("OK");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
