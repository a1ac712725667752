use std::str::FromStr;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

use portfolio_risk_monitor::{
  risk_prevention_tips, suggest_yields, AlertSeverity, ChainBalance,
  ConsoleEventHandler, MonitorConfig, NotificationQueue, PortfolioAggregator,
  RiskMonitor, StaticPriceProvider, TelegramEventHandler, TelegramNotifier,
  YieldRisk,
};

const WEI: u128 = 1_000_000_000_000_000_000;

fn demo_balances() -> Vec<ChainBalance> {
  let balance = |chain: &str,
                 symbol: &str,
                 name: &str,
                 contract: Option<&str>,
                 raw_balance: u128,
                 decimals: u8,
                 age: Option<u32>| ChainBalance {
    chain: chain.to_string(),
    symbol: symbol.to_string(),
    name: name.to_string(),
    contract_address: contract.map(String::from),
    raw_balance,
    decimals,
    is_native: contract.is_none(),
    contract_age_days: age,
  };

  vec![
    balance("ethereum", "ETH", "Ether", None, 3 * WEI / 2, 18, None),
    balance("arbitrum", "ETH", "Ether", None, WEI / 2, 18, None),
    balance(
      "ethereum",
      "USDC",
      "USD Coin",
      Some("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
      1_250_000_000,
      6,
      Some(2200),
    ),
    balance(
      "polygon",
      "USDC",
      "USD Coin",
      Some("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
      400_000_000,
      6,
      Some(2200),
    ),
    balance(
      "ethereum",
      "SHIB",
      "Shiba Inu",
      Some("0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE"),
      50_000_000 * WEI,
      18,
      Some(1500),
    ),
    balance(
      "arbitrum",
      "ARB",
      "Arbitrum",
      Some("0x912CE59144191C1204E64559FE8253a0e49E6548"),
      800 * WEI,
      18,
      Some(60),
    ),
  ]
}

fn log_level() -> LevelFilter {
  std::env::var("LOG_LEVEL")
    .ok()
    .and_then(|level| LevelFilter::from_str(&level).ok())
    .unwrap_or(LevelFilter::INFO)
}

fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  // Initialize logging
  tracing_subscriber::fmt()
    .with_level(true)
    .with_target(false)
    .with_max_level(log_level())
    .with_file(true)
    .with_line_number(true)
    .init();

  let config = MonitorConfig::from_env()?;

  tokio::runtime::Runtime::new()?.block_on(async {
    // Wallet address to monitor
    let wallet_address = std::env::var("WALLET_ADDRESS").unwrap_or_else(|_| {
      "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".to_string()
    });

    info!("Initializing portfolio risk monitor v{}...", portfolio_risk_monitor::VERSION);
    info!("Wallet Address: {}", wallet_address);
    info!("Interval: {}ms", config.interval.as_millis());

    let aggregator =
      PortfolioAggregator::new(Arc::new(StaticPriceProvider::new()));
    let portfolio = aggregator.aggregate(&wallet_address, &demo_balances()).await;

    for suggestion in suggest_yields(&portfolio, YieldRisk::Medium).iter().take(3) {
      info!(
        "Yield idea: {} on {} ({}) at {:.1}% APY, ~${:.2}/year",
        suggestion.opportunity.asset,
        suggestion.opportunity.protocol,
        suggestion.opportunity.chain,
        suggestion.opportunity.apy,
        suggestion.estimated_annual_yield
      );
    }

    let monitor = RiskMonitor::new(config);
    monitor.subscribe(ConsoleEventHandler::new());

    // Telegram notifications go through the queue so sends never block ticks
    let notifier = TelegramNotifier::from_env();
    let telegram_queue = if notifier.is_enabled() {
      let min_severity = match std::env::var("TELEGRAM_MIN_SEVERITY") {
        Ok(value) => AlertSeverity::from_str(&value)?,
        Err(_) => AlertSeverity::Medium,
      };
      info!("Telegram notifications enabled (min severity: {})", min_severity);

      let handler = TelegramEventHandler::new(notifier, wallet_address.clone())
        .with_min_severity(min_severity);
      let queue = NotificationQueue::new(Arc::new(handler))?;
      monitor.subscribe(queue.clone());
      Some(queue)
    } else {
      warn!(
        "Telegram notifications disabled. Set TG_TOKEN and CHAT_ID in .env file to enable."
      );
      None
    };

    monitor.start_monitoring(portfolio, None)?;

    info!("Risk prevention tips:");
    for tip in risk_prevention_tips() {
      info!("  • {}", tip);
    }

    info!("Monitoring... Press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    monitor.stop_monitoring();
    if let Some(queue) = telegram_queue {
      queue.shutdown();
    }

    Ok::<_, anyhow::Error>(())
  })?;

  Ok(())
}
