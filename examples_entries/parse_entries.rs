use log_entries::{entries_from_api_repr, AnyEntry, Client, LoggerRegistry};
use serde_json::json;
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = Client::from_env();
    let log_name = format!("projects/{}/logs/requests", client.project());

    let listing = vec![
        json!({
            "logName": log_name,
            "textPayload": "GET /healthz",
            "timestamp": "2024-01-02T03:04:05.123456789Z",
            "severity": "INFO",
        }),
        json!({
            "logName": log_name,
            "jsonPayload": {"message": "upstream timeout", "attempt": 3},
            "severity": "ERROR",
            "httpRequest": {"requestMethod": "POST", "requestUrl": "https://example.com/api", "status": 504},
        }),
    ];

    let mut loggers = LoggerRegistry::new();
    match entries_from_api_repr(&listing, &client, Some(&mut loggers)) {
        Ok(entries) => {
            for entry in &entries {
                let kind = match entry {
                    AnyEntry::Text(_) => "text",
                    AnyEntry::Struct(_) => "struct",
                    AnyEntry::Protobuf(_) => "protobuf",
                };
                info!(
                    kind,
                    logger = entry.logger().name(),
                    severity = entry.options().severity.as_deref().unwrap_or("DEFAULT"),
                    "parsed entry"
                );
                println!("{}", entry.to_api_repr());
            }
            info!(loggers = loggers.len(), "distinct loggers");
        }
        Err(e) => error!(error = %e, "failed to parse entries"),
    }
}
