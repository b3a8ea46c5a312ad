//! Panic alert command.
//!
//! The alert is fire-and-forget. The command waits for the task so the
//! process does not exit before the request leaves, then prints the same
//! confirmation whatever the backend answered. Failures only reach the log.

use console::style;
use serde_json::json;

use ub_core::error::{UbError, UbResult};
use ub_services::AppContext;

use crate::OutputFormat;

pub async fn run(ctx: &AppContext, lat: f64, lon: f64, format: OutputFormat) -> UbResult<()> {
    let line = dispatch(ctx, lat, lon, format).await?;
    println!("{line}");
    Ok(())
}

async fn dispatch(ctx: &AppContext, lat: f64, lon: f64, format: OutputFormat) -> UbResult<String> {
    let email = ctx.session.require("sending an alert")?;

    let pb = super::spinner("Sending alert...");
    ctx.alerts
        .send_panic_alert(&email, lat, lon)
        .await
        .map_err(|e| UbError::Internal(format!("alert task failed: {e}")))?;
    pb.finish_and_clear();

    Ok(confirmation(&email, lat, lon, format))
}

fn confirmation(email: &str, lat: f64, lon: f64, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "email": email,
            "latitude": lat,
            "longitude": lon,
        }))
        .unwrap_or_default(),
        OutputFormat::Text => format!(
            "  {} Alert sent for {email} at ({lat}, {lon})",
            style("OK").green().bold()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::TempDir;
    use ub_api::ApiClient;
    use ub_core::config::AppConfig;
    use ub_core::constants::prefs;
    use ub_live::MemoryCollection;
    use ub_models::{Database, Preferences};
    use ub_services::UnconfiguredIdentityProvider;

    fn signed_in_context(base_url: &str, dir: &TempDir) -> AppContext {
        let mut config = AppConfig::default();
        config.server.base_url = base_url.to_string();
        config.server.api_timeout_ms = Some(2_000);

        let database = Database::init(&dir.path().join("cli.db"), &config.storage).unwrap();
        {
            let conn = database.conn().unwrap();
            Preferences::set(&conn, prefs::NAMESPACE, prefs::ACTIVE_IDENTITY, "ana@example.com")
                .unwrap();
        }
        let api = ApiClient::new(&config.server).unwrap();

        let mut ctx = AppContext::new(
            config,
            database,
            api,
            Arc::new(UnconfiguredIdentityProvider),
            Arc::new(MemoryCollection::new()),
            dir.path().join("uploads"),
        );
        ctx.init().unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_unreachable_backend_prints_plain_confirmation() {
        console::set_colors_enabled(false);
        let dir = TempDir::new().unwrap();
        let ctx = signed_in_context("http://127.0.0.1:9", &dir);

        let line = dispatch(&ctx, 14.6349, -90.5069, OutputFormat::Text).await.unwrap();
        assert_eq!(line, "  OK Alert sent for ana@example.com at (14.6349, -90.5069)");
        assert!(!line.contains("127.0.0.1"));

        let json = dispatch(&ctx, 14.6349, -90.5069, OutputFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["email"], "ana@example.com");
        assert!(value.get("delivered").is_none());
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn test_alert_requires_sign_in() {
        let dir = TempDir::new().unwrap();
        let ctx = signed_in_context("http://127.0.0.1:9", &dir);
        ctx.session.sign_out().await.unwrap();

        let err = dispatch(&ctx, 0.0, 0.0, OutputFormat::Text).await.unwrap_err();
        assert!(matches!(err, UbError::Validation(_)));
    }
}
