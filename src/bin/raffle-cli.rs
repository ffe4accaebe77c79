use clap::{Parser, Subcommand};
use raffle_gateway::raffle::{mist_to_sui, sui_to_mist};
use raffle_gateway::sui::Wallet;
use raffle_gateway_client::GatewayClient;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "raffle-cli")]
#[command(about = "Management CLI for the raffle gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Turnstile token sent with gated requests.
    #[arg(short, long, env = "TURNSTILE_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness and cache state
    Health,
    /// Verify a Turnstile token
    Verify { token: String },
    /// Upload an image to IPFS
    Upload {
        path: PathBuf,
        #[arg(long)]
        recaptcha_token: String,
        /// Defaults to a guess from the file extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Fetch an image through the gateway
    Retrieve {
        cid: String,
        /// Write the image here instead of printing its size
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Release a raffle with the server wallet
    Release { raffle_id: String },
    /// Show a raffle object
    Raffle { raffle_id: String },
    /// Build unsigned transaction bytes for a raffle call given as JSON
    BuildTx { sender: String, call: String },
    /// Print the address of the key in RELEASE_PRIVATE_KEY
    Address,
    /// Convert between SUI and MIST
    Convert {
        amount: String,
        /// Treat the amount as MIST and print SUI
        #[arg(long)]
        from_mist: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut client = GatewayClient::new(&cli.url);
    if let Some(token) = cli.token {
        client = client.with_turnstile_token(token);
    }

    match cli.command {
        Commands::Health => print_json(&client.health().await?)?,
        Commands::Verify { token } => print_json(&client.verify_turnstile(&token).await?)?,
        Commands::Upload { path, recaptcha_token, content_type } => {
            let bytes = std::fs::read(&path)?;
            let content_type = content_type.unwrap_or_else(|| guess_content_type(&path).to_string());
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload");
            let uploaded = client.upload(file_name, &content_type, bytes, &recaptcha_token).await?;
            print_json(&uploaded)?;
        }
        Commands::Retrieve { cid, out } => {
            let image = client.retrieve(&cid).await?;
            let source = if image.cache_hit { "cache" } else { "gateway" };
            match out {
                Some(out) => {
                    std::fs::write(&out, &image.bytes)?;
                    println!("Wrote {} bytes to {} (from {})", image.bytes.len(), out.display(), source);
                }
                None => println!(
                    "{} bytes, {} (from {})",
                    image.bytes.len(),
                    image.content_type.as_deref().unwrap_or("unknown type"),
                    source
                ),
            }
        }
        Commands::Release { raffle_id } => print_json(&client.release(&raffle_id).await?)?,
        Commands::Raffle { raffle_id } => print_json(&client.get_raffle(&raffle_id).await?)?,
        Commands::BuildTx { sender, call } => {
            let call: serde_json::Value = serde_json::from_str(&call)?;
            print_json(&client.build_tx(&sender, call).await?)?;
        }
        Commands::Address => {
            let wallet = Wallet::from_env()?;
            println!("{}", wallet.address());
        }
        Commands::Convert { amount, from_mist } => {
            if from_mist {
                println!("{} SUI", mist_to_sui(amount.trim().parse()?));
            } else {
                println!("{} MIST", sui_to_mist(&amount)?);
            }
        }
    }

    Ok(())
}

fn guess_content_type(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
