use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "logproxy-cli")]
#[command(about = "Ops CLI for the Remote Log Proxy control API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the persisted configuration and live probe results
    Status,
    /// Run the remote reachability test
    Test,
    /// Write the reload marker for the external supervisor
    Apply,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/config/api/status", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Test => {
            let res = client
                .post(format!("{}/config/api/test", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Apply => {
            let res = client
                .post(format!("{}/config/api/apply", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: control API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
