//! Daily routine for one account: claim SLP, then morph every axie that is ready
//!
//! Run with: cargo run --example claim
//!
//! Requires PRIVATE_KEY environment variable; RONIN_RPC_URL and friends are
//! optional overrides

use chrono::Utc;
use ronin_axie::constants::{unscale_from_decimals, RON_DECIMALS};
use ronin_axie::{LocalSigner, NetworkConfig, Operation, RoninClient, Token};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let private_key = std::env::var("PRIVATE_KEY").expect("PRIVATE_KEY must be set");
    let force = std::env::args().any(|arg| arg == "--force");

    let config = NetworkConfig::from_env();
    let signer = LocalSigner::from_private_key(&private_key)?;
    let client = RoninClient::new(signer, config)?;

    println!("Account: {}", ronin_axie::RoninAddress::from(client.address()));
    println!("SLP balance: {}", client.balance(Token::Slp).await?);
    println!(
        "RON balance: {}",
        unscale_from_decimals(client.balance(Token::Ron).await?, RON_DECIMALS)
    );

    match client.claim().with_force(force).execute().await {
        Some(hash) => println!("Claimed: {}", client.config().explorer_link(hash)),
        None => println!("Nothing claimed"),
    }

    let ready = client.axies().find_axies_to_morph(Utc::now()).await?;
    println!("{} axies ready to morph", ready.len());
    for axie_id in ready {
        let morph = client.morph(axie_id);
        if morph.execute().await.is_none() {
            println!("{} failed", morph);
        }
    }

    Ok(())
}
