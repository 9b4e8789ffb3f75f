//! Inserts a batch of sample events so a fresh project has something to
//! monitor.
//!
//! ```text
//! SUPABASE_URL=... SUPABASE_ANON_KEY=... cargo run --example seed -- --count 50
//! ```

use clap::Parser;
use color_eyre::eyre::{bail, Result, WrapErr};
use serde::Deserialize;
use serde_json::{json, Value};

use busmon::domain::{EventType, Priority};

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Insert sample events into the event bus table")]
struct Args {
    #[arg(long, env = "SUPABASE_URL")]
    url: String,

    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "BUSMON_TABLE", default_value = "event_bus")]
    table: String,

    #[arg(long, default_value = "ai_agents")]
    agents_table: String,

    /// Number of events to insert
    #[arg(long, default_value = "25")]
    count: usize,
}

#[derive(Debug, Deserialize)]
struct AgentRow {
    id: Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let base = args.url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let agents = fetch_agents(&client, base, &args.agents_table, &args.api_key).await?;

    let rows: Vec<Value> = (0..args.count).map(|i| sample_row(i, &agents)).collect();

    let response = client
        .post(format!("{}/rest/v1/{}", base, args.table))
        .header("apikey", &args.api_key)
        .header("Prefer", "return=minimal")
        .bearer_auth(&args.api_key)
        .json(&rows)
        .send()
        .await
        .wrap_err("failed to insert events")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("insert rejected with {}: {}", status, body);
    }

    println!("inserted {} events into {}", rows.len(), args.table);
    Ok(())
}

/// Agent ids to attach as source/target. A rejected lookup is an error
/// rather than an empty list.
async fn fetch_agents(
    client: &reqwest::Client,
    base: &str,
    agents_table: &str,
    api_key: &str,
) -> Result<Vec<AgentRow>> {
    client
        .get(format!("{}/rest/v1/{}", base, agents_table))
        .query(&[("select", "id"), ("limit", "20")])
        .header("apikey", api_key)
        .bearer_auth(api_key)
        .send()
        .await
        .wrap_err("failed to list agents")?
        .error_for_status()
        .wrap_err("agent lookup rejected")?
        .json()
        .await
        .wrap_err("invalid agent list")
}

fn sample_row(i: usize, agents: &[AgentRow]) -> Value {
    // uuid v4 bytes double as a cheap random source
    let noise = uuid::Uuid::new_v4();
    let bytes = noise.as_bytes();

    let event_type = &EventType::KNOWN[bytes[0] as usize % EventType::KNOWN.len()];
    let priority = Priority::ALL[bytes[1] as usize % Priority::ALL.len()];
    let pick = |b: u8| agents.get(b as usize % agents.len().max(1)).map(|a| a.id.clone());

    let data = match event_type {
        EventType::MarketData => json!({ "symbol": "BTC-USD", "price": 60_000 + bytes[2] as u32 * 10 }),
        EventType::TradeSignal => json!({ "symbol": "ETH-USD", "side": if bytes[2] % 2 == 0 { "buy" } else { "sell" } }),
        EventType::OrderExecution => json!({ "order_id": noise.to_string(), "filled": bytes[2] }),
        EventType::RiskAlert => json!({ "metric": "drawdown", "value": bytes[2] as f64 / 255.0 }),
        _ => json!({ "status": "ok", "seq": i }),
    };

    json!({
        "event_type": event_type.as_str(),
        "priority": priority.as_str(),
        "source_agent_id": pick(bytes[3]),
        "target_agent_id": pick(bytes[4]),
        "event_data": data,
        "is_processed": bytes[5] % 3 == 0,
    })
}
