//! Basic single-swap example.
//!
//! Alice escrows a unique collectible and names the one she wants; Bob
//! settles the trade by supplying it. A moderator then sweeps the fees.

use alloy_primitives::{Address, U256};
use escrow_engine::core::asset::AssetRecord;
use escrow_engine::engine::lifecycle::EscrowEngine;
use escrow_engine::ports::memory::{InMemoryLedger, StaticMembership, StaticProbe, StaticRoles};

const UNIT_FEE: u64 = 10;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║   escrow-engine: Basic Swap Example      ║");
    println!("╚══════════════════════════════════════════╝\n");

    let alice = Address::repeat_byte(0xaa);
    let bob = Address::repeat_byte(0xbb);
    let moderator = Address::repeat_byte(0x0d);
    let token_x = Address::repeat_byte(0x10);
    let token_y = Address::repeat_byte(0x11);

    let mut roles = StaticRoles::new();
    roles.grant_moderator(moderator);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_unique(token_x, 1, alice);
    ledger.mint_unique(token_y, 2, bob);

    let mut engine = EscrowEngine::new(
        Address::repeat_byte(0xec),
        Address::repeat_byte(0x7e),
        StaticProbe::permissive(),
        StaticMembership::new(U256::from(UNIT_FEE)),
        roles,
        ledger,
        InMemoryLedger::new(),
    );

    // --- Alice opens the swap ---
    println!("━━━ Alice escrows X#1, requesting Y#2 ━━━\n");
    let initiated = engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(token_y, 2),
        )
        .expect("initiation");
    println!("Fee paid into custody: {}", initiated.fee_paid);
    println!(
        "X#1 now held by custodian: {}\n",
        engine.asset_port().owner_of(token_x, 1).unwrap()
    );

    // --- Bob settles it ---
    println!("━━━ Bob finalizes with Y#2 ━━━\n");
    let finalized = engine
        .finalize_single_swap(bob, alice, U256::from(2 * UNIT_FEE))
        .expect("finalization");
    println!("Finalization fee:  {}", finalized.finalization_fee);
    println!(
        "Alice now owns Y#2: {}",
        engine.asset_port().owner_of(token_y, 2).unwrap() == alice
    );
    println!(
        "Bob now owns X#1:   {}\n",
        engine.asset_port().owner_of(token_x, 1).unwrap() == bob
    );

    // --- Fees sweep to the treasury ---
    println!("━━━ Moderator collects the fees ━━━\n");
    let collected = engine.collect(moderator).expect("collection");
    println!("Swept to treasury: {}", collected.amount);
    println!(
        "Treasury balance:  {}",
        engine.cash_port().cash_balance(engine.treasury())
    );
}
