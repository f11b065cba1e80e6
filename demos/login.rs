//! Logs in to the developer portal and fetches one clan.
//!
//! ```sh
//! COC_DEV_EMAIL=you@example.com COC_DEV_PASSWORD=... cargo run --example login -- '#2PP'
//! ```

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::WrapErr};
// self
use coc_broker::client::{Client, ClientConfig};

fn main() -> Result<()> {
	color_eyre::install()?;

	let email = env::var("COC_DEV_EMAIL").wrap_err("COC_DEV_EMAIL must be set.")?;
	let password = env::var("COC_DEV_PASSWORD").wrap_err("COC_DEV_PASSWORD must be set.")?;
	let tag = env::args().nth(1).unwrap_or_else(|| "#2PP".into());
	let config = ClientConfig::new(email, password);
	let client = Client::with_default_transport(&config)?;

	client.login(&config.credential()).wrap_err("Developer portal login failed.")?;

	let prefix = client
		.token()
		.map(|secret| secret.expose().chars().take(8).collect::<String>())
		.unwrap_or_default();

	println!("Login OK. Token prefix: {prefix}");

	match client.clan(&tag) {
		Ok(clan) => println!(
			"Clan: {} ({}), level={}, members={}",
			clan["name"], clan["tag"], clan["clanLevel"], clan["members"]
		),
		Err(e) => println!("API call made, but the clan lookup for {tag} failed: {e}"),
	}

	Ok(())
}
