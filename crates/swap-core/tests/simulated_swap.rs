//! End-to-end swap attempts against the simulated counterparty network.

use std::sync::Arc;
use std::time::Duration;

use primitive_types::U256;
use swap_core::{
    address_from_key, AtomicSwapApi, ChainId, InMemoryLedger, Preset, QuoteParams, RevealExit,
    SimulatedGateway, SimulationConfig, SwapConfig, SwapError, SwapService, SwapStatus,
};
use tokio::sync::watch;

const MAKER_KEY: [u8; 32] = [0x5A; 32];

fn config(preset: Preset) -> SwapConfig {
    SwapConfig {
        preset,
        poll_interval: Duration::from_millis(5),
        settle_delay: Duration::ZERO,
    }
}

fn params(wallet: [u8; 20]) -> QuoteParams {
    QuoteParams {
        src_chain: ChainId::Ethereum,
        dst_chain: ChainId::Polygon,
        src_token: [0xA0; 20],
        dst_token: [0x53; 20],
        amount: U256::from(1_000_000_000u64),
        wallet,
        enable_estimate: true,
    }
}

fn gateway(simulation: SimulationConfig) -> Arc<SimulatedGateway> {
    Arc::new(SimulatedGateway::new(
        simulation,
        Arc::new(InMemoryLedger::new()),
        MAKER_KEY,
    ))
}

#[tokio::test]
async fn single_secret_swap_executes() {
    let gateway = gateway(SimulationConfig::default());
    let service = SwapService::new(gateway.clone(), config(Preset::Fast));
    let wallet = address_from_key(&MAKER_KEY).unwrap();
    let (_tx, rx) = watch::channel(false);

    let outcome = service.execute(params(wallet), rx).await.unwrap();

    assert_eq!(outcome.secrets_count, 1);
    assert_eq!(outcome.report.exit, RevealExit::Terminal(SwapStatus::Executed));
    assert_eq!(outcome.report.revealed.len(), 1);
    assert_eq!(
        gateway.status_of(&outcome.order_hash),
        Some(SwapStatus::Executed)
    );
}

#[tokio::test]
async fn multi_secret_swap_reveals_every_fill() {
    let gateway = gateway(SimulationConfig::default());
    let service = SwapService::new(gateway.clone(), config(Preset::Slow));
    let (_tx, rx) = watch::channel(false);

    let outcome = service.execute(params([7u8; 20]), rx).await.unwrap();

    assert_eq!(outcome.secrets_count, 4);
    assert_eq!(outcome.report.final_status(), Some(SwapStatus::Executed));
    assert_eq!(
        outcome.report.revealed.iter().copied().collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
    assert_eq!(gateway.filled_indices(&outcome.order_hash).len(), 4);
    assert_eq!(outcome.report.release_failures, 0);
}

#[tokio::test]
async fn expired_order_stops_the_loop() {
    let simulation = SimulationConfig {
        polls_per_fill: 100,
        expire_after_polls: Some(3),
        ..SimulationConfig::default()
    };
    let gateway = gateway(simulation);
    let service = SwapService::new(gateway.clone(), config(Preset::Medium));
    let (_tx, rx) = watch::channel(false);

    let outcome = service.execute(params([7u8; 20]), rx).await.unwrap();

    assert_eq!(outcome.report.exit, RevealExit::Terminal(SwapStatus::Expired));
    assert!(outcome.report.revealed.is_empty());
}

#[tokio::test]
async fn shutdown_cancels_a_stalled_swap() {
    let simulation = SimulationConfig {
        polls_per_fill: u32::MAX,
        ..SimulationConfig::default()
    };
    let gateway = gateway(simulation);
    let service = SwapService::new(gateway, config(Preset::Fast));
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(async move { service.execute(params([7u8; 20]), rx).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop did not observe shutdown")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.report.exit, RevealExit::Cancelled);
    assert!(outcome.report.iterations > 0);
}

#[tokio::test]
async fn missing_preset_aborts_before_order() {
    let simulation = SimulationConfig {
        secrets_per_preset: [(Preset::Fast, 1)].into_iter().collect(),
        ..SimulationConfig::default()
    };
    let gateway = gateway(simulation);
    let service = SwapService::new(gateway.clone(), config(Preset::Slow));
    let (_tx, rx) = watch::channel(false);

    let result = service.execute(params([7u8; 20]), rx).await;

    assert!(matches!(result, Err(SwapError::PresetUnavailable(Preset::Slow))));
    assert_eq!(gateway.order_count(), 0);
}
