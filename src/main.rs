//! Headless demo: renders a cart into the in-memory DOM and prints it.
//!
//! Usage: `royalburger [CART_JSON_FILE]`. Without a file a sample cart is
//! used.

use anyhow::Context;
use royalburger::{
    default_config_path, init_logging_with, names, AppEvent, Cart, CartView, CartViewOptions,
    Config, Direction, MemoryDocument, StateManager, BUILD_DATE, BUILD_PROFILE, CART_ITEMS_KEY,
    CART_TOTAL_KEY, VERSION,
};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // Initialize logging
    init_logging_with(&config.logging)?;
    info!(
        "Royal Burger {} ({} build, {})",
        VERSION, BUILD_PROFILE, BUILD_DATE
    );
    info!("API endpoint: {}", config.api.endpoint("cart"));

    let cart = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading cart file {}", path))?;
            Cart::from_json_str(&raw).with_context(|| format!("loading cart file {}", path))?
        }
        None => Cart::from_api(&sample_cart()).context("normalizing sample cart")?,
    };

    let state: StateManager = StateManager::new();
    let document = MemoryDocument::new();
    let container = document.create_container(&config.ui.cart_container_id);

    let _log_events = state.event_bus().on(names::CART_UPDATED, |event: &AppEvent| {
        info!("{}", event.description());
    });
    let _log_commits = state
        .event_bus()
        .on(names::CART_QUANTITY_COMMITTED, |event: &AppEvent| {
            info!("{}", event.description());
        });

    let view = CartView::mount(
        state.clone(),
        document,
        CartViewOptions {
            container_id: config.ui.cart_container_id.clone(),
            currency_symbol: config.ui.currency_symbol.clone(),
            accelerator: config.cart.accelerator_config(),
        },
    );
    state.set(CART_ITEMS_KEY, cart.to_value()?);

    // A quick burst of "+" presses on the first line, sent as one write
    if let Some(first) = cart.items.first() {
        let start = Instant::now();
        for press in 0..5u64 {
            let at = start + Duration::from_millis(press * 100);
            view.press(&first.id, Direction::Increase, at);
        }
        for update in view.flush_all() {
            info!(
                "Line {}: {} -> {}",
                update.item_id, update.previous, update.target
            );
        }
    }

    println!("{}", container.lock().to_html());
    println!(
        "{} {}",
        CART_TOTAL_KEY,
        state.get(CART_TOTAL_KEY).unwrap_or(Value::Null)
    );

    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    match default_config_path() {
        Ok(path) => Config::load_or_default(&path)
            .with_context(|| format!("loading config {}", path.display())),
        Err(e) => {
            // Logging is not up yet
            eprintln!("No config directory ({}), using defaults", e);
            Ok(Config::default())
        }
    }
}

fn sample_cart() -> Value {
    warn!("No cart file given, using the sample cart");
    json!({
        "itens": [
            {
                "id_item": 101,
                "id_produto": 7,
                "nome_produto": "X-Bacon",
                "quantidade": 1,
                "preco_unitario": "24,90",
                "observacao": "sem cebola",
                "adicionais": [{"id_ingrediente": 3, "nome": "Cheddar", "preco": 3.5}]
            },
            {"id_item": 102, "id_produto": 12, "nome": "Batata frita", "quantidade": 2, "preco": 12.0}
        ]
    })
}
