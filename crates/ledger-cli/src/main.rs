use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, global = true, env = "LEDGER_NODE", default_value = "http://127.0.0.1:8080")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print the full chain
    Chain,
    /// Submit an entry; the node appends it as a new block
    Submit {
        /// Signed amount, e.g. 50 or -20
        #[arg(long, allow_negative_numbers = true)]
        amount: i64,
    },
    /// Print the tip height and hash
    Head,
    /// Ask the node to audit its chain
    Verify,
}

#[derive(Serialize)]
struct Entry {
    amount: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let res = match cli.cmd {
        Command::Chain => client.get(format!("{node}/chain")).send().await?,
        Command::Submit { amount } => {
            client
                .post(format!("{node}/chain"))
                .json(&Entry { amount })
                .send()
                .await?
        }
        Command::Head => client.get(format!("{node}/chain/head")).send().await?,
        Command::Verify => client.get(format!("{node}/chain/verify")).send().await?,
    };
    let status = res.status();
    let body = res.text().await?;
    debug!(%status, bytes = body.len(), "response received");
    println!("status: {}", status);
    println!("{}", render_body(&body));
    Ok(())
}

/// Pretty-print JSON bodies; anything else is shown verbatim.
fn render_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}
