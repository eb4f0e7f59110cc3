//! Mints a session token for local testing: `dev-token <email> [hours]`.

use jsonwebtoken::{EncodingKey, Header, encode};
use weedly_api::{config::JwtConfig, dto::auth::Claims};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = JwtConfig::from_env()?;

    let mut args = std::env::args().skip(1);
    let email = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: dev-token <email> [hours]"))?;
    let hours: u32 = match args.next() {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("hours must be a non-negative whole number, got {raw}"))?,
        None => 24,
    };

    let claims = Claims::for_email(
        &email,
        config.issuer.clone(),
        chrono::Duration::hours(i64::from(hours)),
    )
    .ok_or_else(|| anyhow::anyhow!("token lifetime of {hours} hours is out of range"))?;

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    println!("{token}");
    Ok(())
}
