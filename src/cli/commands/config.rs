use crate::cli::OutputFormat;
use crate::config;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let redacted = config::config().redacted();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&redacted)?),
        OutputFormat::Text => {
            println!("Environment:        {:?}", redacted.environment);
            println!("Port:               {}", redacted.server.port);
            println!("Storage backend:    {:?}", redacted.database.backend);
            println!(
                "Database URL:       {}",
                redacted.database.url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "Rate limiting:      {} ({} requests / {}s)",
                redacted.api.enable_rate_limiting,
                redacted.api.rate_limit_requests,
                redacted.api.rate_limit_window_secs
            );
            println!("JWT secret:         {}", redacted.security.jwt_secret);
            println!("JWT expiry (hours): {}", redacted.security.jwt_expiry_hours);
            println!("OTP expiry (min):   {}", redacted.security.otp_expiry_minutes);
            println!("CORS origins:       {}", redacted.security.cors_origins.join(", "));
            println!(
                "Partners per lead:  {}",
                redacted.matching.max_partners_per_lead
            );
        }
    }
    Ok(())
}
