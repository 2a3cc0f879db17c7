//! Bundle swap with a cash leg.
//!
//! Alice escrows two collectibles and a stack of semi-fungible shards
//! against a single rare item, asking the finalizer to add 500 in native
//! cash to balance the trade.

use alloy_primitives::{Address, U256};
use escrow_engine::core::asset::AssetRecord;
use escrow_engine::engine::lifecycle::EscrowEngine;
use escrow_engine::ports::memory::{InMemoryLedger, StaticMembership, StaticProbe, StaticRoles};

const UNIT_FEE: u64 = 10;
const CASH_LEG: u64 = 500;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  escrow-engine: Multi-Asset Swap Example ║");
    println!("╚══════════════════════════════════════════╝\n");

    let alice = Address::repeat_byte(0xaa);
    let bob = Address::repeat_byte(0xbb);
    let token_x = Address::repeat_byte(0x10);
    let shards = Address::repeat_byte(0x12);
    let token_y = Address::repeat_byte(0x11);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_unique(token_x, 1, alice);
    ledger.mint_unique(token_x, 2, alice);
    ledger.mint_quantity(shards, 7, alice, 300);
    ledger.mint_unique(token_y, 9, bob);

    let mut engine = EscrowEngine::new(
        Address::repeat_byte(0xec),
        Address::repeat_byte(0x7e),
        StaticProbe::permissive(),
        StaticMembership::new(U256::from(UNIT_FEE)),
        StaticRoles::new(),
        ledger,
        InMemoryLedger::new(),
    );

    let offered = vec![
        AssetRecord::unique(token_x, 1),
        AssetRecord::unique(token_x, 2),
        AssetRecord::quantity(shards, 7, 300),
    ];
    let requested = vec![AssetRecord::unique(token_y, 9)];
    let combined = (offered.len() + requested.len()) as u64;

    println!("━━━ Alice escrows a 3-asset bundle, requesting Y#9 + 500 cash ━━━\n");
    let initiated = engine
        .initiate_multi_swap(
            alice,
            U256::from(combined * UNIT_FEE),
            U256::from(CASH_LEG),
            offered,
            requested,
        )
        .expect("initiation");
    println!("Assets escrowed:   {}", initiated.offered.len());
    println!("Fee paid:          {}", initiated.fee_paid);
    println!("Cash leg declared: {}\n", initiated.cash_to_be_added);

    println!("━━━ Bob finalizes with Y#9, attaching fee + cash leg ━━━\n");
    let attached = U256::from(combined * UNIT_FEE + CASH_LEG);
    let finalized = engine
        .finalize_multi_swap(bob, alice, attached)
        .expect("finalization");
    println!("Cash forwarded to Alice: {}", finalized.cash_forwarded);
    println!(
        "Alice owns Y#9:          {}",
        engine.asset_port().owner_of(token_y, 9).unwrap() == alice
    );
    println!(
        "Bob holds the shards:    {}",
        engine.asset_port().balance_of(shards, 7, bob)
    );
    println!("Accumulated fees:        {}", engine.accumulated_fee());
}
