use clap::{Parser, Subcommand};
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "realty-cli")]
#[command(about = "Command-line client for the realty-auth API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and print the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the account behind a session token
    Me {
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
        Commands::Register {
            name,
            email,
            password,
        } => {
            client
                .post(format!("{}/auth/register", cli.url))
                .json(&json!({ "name": name, "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Login { email, password } => {
            client
                .post(format!("{}/auth/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?
        }
        Commands::Me { token } => {
            client
                .get(format!("{}/auth/me", cli.url))
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
