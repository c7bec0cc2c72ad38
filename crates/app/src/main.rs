use anyhow::Context;

use rackledger_core::Actor;
use rackledger_inventory::GridConfig;

fn main() -> anyhow::Result<()> {
    rackledger_observability::init();

    let config = GridConfig::from_env();
    let grid = config
        .validate()
        .with_context(|| format!("invalid grid configuration {config:?}"))?;
    tracing::info!(columns = grid.columns().len(), slots = grid.len(), "storage grid ready");

    let actor = Actor::new(std::env::var("RACKLEDGER_ACTOR").unwrap_or_else(|_| "system".to_string()));
    let ledger = rackledger_app::sample_ledger(grid, &actor)?;

    println!("{}", rackledger_app::render(&ledger)?);
    Ok(())
}
