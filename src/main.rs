use dotenvy::dotenv;
use macrosignals::config::Config;
use macrosignals::core::http::NO_SIGNALS_MESSAGE;
use macrosignals::logging;
use macrosignals::models::{RankedSignalTable, Snapshot};
use macrosignals::services::{LiveMacroProvider, MacroDataProvider};
use macrosignals::signals::SignalEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    let provider = LiveMacroProvider::new(&config)?;
    let snapshot = provider.fetch_snapshot().await;
    let table = SignalEngine::standard().derive(&snapshot);

    print_snapshot(&snapshot);
    println!();
    print_signals(&table);
    println!();
    println!("Demo only. Signals are threshold heuristics, not investment advice.");

    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("Latest Macro Snapshot");
    if let Some(as_of) = snapshot.as_of() {
        println!("  as of {}", as_of.format("%Y-%m-%d %H:%M UTC"));
    }
    for row in snapshot.rows() {
        let value = row
            .value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a".to_string());
        println!("  {:<42} {:>12} {}", row.label, value, row.unit);
    }
}

fn print_signals(table: &RankedSignalTable) {
    println!("Signals");
    if table.is_empty() {
        println!("  {}", NO_SIGNALS_MESSAGE);
        return;
    }
    println!("  {:<8} {:<6} {:>10}  Reason", "Symbol", "Dir", "Confidence");
    for signal in table {
        println!(
            "  {:<8} {:<6} {:>10}  {}",
            signal.instrument.symbol(),
            signal.direction.to_string(),
            signal.confidence,
            signal.reason
        );
    }
}
