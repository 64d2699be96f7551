//! Generates the argon2 password digest expected by the server's
//! `admin_password_hash` setting.

use anyhow::Result;
use clap::Parser;

use media_ranker_server::server::auth::hash_password;

#[derive(Parser, Debug)]
struct CliArgs {
    /// The plaintext password to hash.
    pub password: String,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let digest = hash_password(&cli_args.password)?;
    println!("{}", digest);
    Ok(())
}
