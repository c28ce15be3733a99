use alloy::primitives::hex;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the token gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Show the node's chain ID
    Chain,
    /// Check that the token contract is deployed
    Contract,
    /// Show the token name
    Name,
    /// Show the token symbol
    Symbol,
    /// Show the token decimals
    Decimals,
    /// Show the token total supply
    TotalSupply,
    /// Show the token balance of an address
    Balance { address: String },
    /// Show how much `spender` may move on behalf of `owner`
    Allowance { owner: String, spender: String },
    /// Transfer through the contract binding
    ContractTransfer { to: String },
    /// Transfer with a hand-encoded transaction
    Transfer { to: String },
}

/// A gateway route with its query parameters.
struct Route<'a> {
    path: &'static str,
    query: Vec<(&'static str, &'a str)>,
    returns_hash: bool,
}

impl<'a> Route<'a> {
    fn text(path: &'static str) -> Self {
        Self { path, query: Vec::new(), returns_hash: false }
    }

    fn with(mut self, key: &'static str, value: &'a str) -> Self {
        self.query.push((key, value));
        self
    }

    fn hash(mut self) -> Self {
        self.returns_hash = true;
        self
    }
}

impl Commands {
    fn route(&self) -> Route<'_> {
        match self {
            Commands::Health => Route::text("/health"),
            Commands::Chain => Route::text("/chain"),
            Commands::Contract => Route::text("/contract"),
            Commands::Name => Route::text("/contract/name"),
            Commands::Symbol => Route::text("/contract/symbol"),
            Commands::Decimals => Route::text("/contract/decimals"),
            Commands::TotalSupply => Route::text("/contract/total-supply"),
            Commands::Balance { address } => Route::text("/contract/balance").with("address", address),
            Commands::Allowance { owner, spender } => Route::text("/contract/allowance")
                .with("owner", owner)
                .with("spender", spender),
            Commands::ContractTransfer { to } => {
                Route::text("/contract/transfer").with("to_address", to).hash()
            }
            Commands::Transfer { to } => Route::text("/transfer").with("to_address", to).hash(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let route = cli.command.route();
    let res = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), route.path))
        .query(&route.query)
        .send()
        .await?;

    print_response(res, route.returns_hash).await
}

async fn print_response(res: reqwest::Response, returns_hash: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if returns_hash {
        let bytes = res.bytes().await?;
        println!("{}", hex::encode_prefixed(&bytes));
    } else {
        println!("{}", res.text().await?);
    }
    Ok(())
}
