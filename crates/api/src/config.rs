use std::time::Duration;

use schemagen_core::billing::BillingPolicy;
use schemagen_providers::{GeneratorConfig, ProviderKind};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`; generation calls
    /// wait on the AI gateway).
    pub request_timeout_secs: u64,
    /// Base URL of the content analyzer service.
    pub analyzer_url: String,
    /// User agent the analyzer presents to scraped sites.
    pub analyzer_user_agent: String,
    /// Upper bound on one content-analysis call, in seconds.
    pub analyze_timeout_secs: u64,
    /// Base URL of the schema validation service.
    pub validator_url: String,
    /// AI generation gateway settings (explicit provider selection).
    pub generator: GeneratorConfig,
    /// Accounts exempt from metered billing (trial/development), parsed
    /// from comma-separated `EXEMPT_ACCOUNTS`.
    pub exempt_accounts: Vec<String>,
    /// Accounts to seed into the in-memory ledger at startup, parsed from
    /// `SEED_ACCOUNTS` as `account:credits` pairs (e.g. `demo:25,qa:100`).
    pub seed_accounts: Vec<(String, i64)>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `ANALYZER_URL`         | `http://localhost:9201`    |
    /// | `ANALYZER_USER_AGENT`  | `schemagen-analyzer/0.1`   |
    /// | `ANALYZE_TIMEOUT_SECS` | `30`                       |
    /// | `VALIDATOR_URL`        | `http://localhost:9202`    |
    /// | `AI_GATEWAY_URL`       | `http://localhost:9203`    |
    /// | `AI_PROVIDER`          | `openai`                   |
    /// | `AI_MODEL`             | `gpt-4o-mini`              |
    /// | `AI_API_KEY`           | (empty)                    |
    /// | `AI_TIMEOUT_SECS`      | `60`                       |
    /// | `EXEMPT_ACCOUNTS`      | (empty)                    |
    /// | `SEED_ACCOUNTS`        | (empty)                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let analyzer_url =
            std::env::var("ANALYZER_URL").unwrap_or_else(|_| "http://localhost:9201".into());
        let analyzer_user_agent = std::env::var("ANALYZER_USER_AGENT")
            .unwrap_or_else(|_| "schemagen-analyzer/0.1".into());
        let analyze_timeout_secs: u64 = std::env::var("ANALYZE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("ANALYZE_TIMEOUT_SECS must be a valid u64");

        let validator_url =
            std::env::var("VALIDATOR_URL").unwrap_or_else(|_| "http://localhost:9202".into());

        let generator = GeneratorConfig {
            kind: ProviderKind::parse(
                &std::env::var("AI_PROVIDER").unwrap_or_else(|_| "openai".into()),
            ),
            base_url: std::env::var("AI_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:9203".into()),
            api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            timeout: Duration::from_secs(
                std::env::var("AI_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".into())
                    .parse()
                    .expect("AI_TIMEOUT_SECS must be a valid u64"),
            ),
        };

        let exempt_accounts = parse_list(&std::env::var("EXEMPT_ACCOUNTS").unwrap_or_default());
        let seed_accounts = parse_seed_accounts(&std::env::var("SEED_ACCOUNTS").unwrap_or_default());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            analyzer_url,
            analyzer_user_agent,
            analyze_timeout_secs,
            validator_url,
            generator,
            exempt_accounts,
            seed_accounts,
        }
    }

    /// Resolve the billing policy for an account. Exemption is explicit
    /// configuration, never inferred from where the server runs.
    pub fn billing_policy_for(&self, account_id: &str) -> BillingPolicy {
        if self.exempt_accounts.iter().any(|a| a == account_id) {
            BillingPolicy::Exempt
        } else {
            BillingPolicy::Metered
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `account:credits` pairs. Malformed entries are skipped.
fn parse_seed_accounts(raw: &str) -> Vec<(String, i64)> {
    raw.split(',')
        .filter_map(|pair| {
            let (account, credits) = pair.trim().split_once(':')?;
            let credits = credits.parse().ok()?;
            if account.is_empty() {
                return None;
            }
            Some((account.to_string(), credits))
        })
        .collect()
}
