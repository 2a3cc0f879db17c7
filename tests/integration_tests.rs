use alloy_primitives::{Address, U256};
use escrow_engine::core::asset::AssetRecord;
use escrow_engine::core::error::EscrowError;
use escrow_engine::engine::lifecycle::EscrowEngine;
use escrow_engine::engine::registry::SwapKind;
use escrow_engine::ports::memory::{InMemoryLedger, StaticMembership, StaticProbe, StaticRoles};

const UNIT_FEE: u64 = 10;

fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

type Engine =
    EscrowEngine<StaticProbe, StaticMembership, StaticRoles, InMemoryLedger, InMemoryLedger>;

fn engine() -> Engine {
    let mut roles = StaticRoles::new();
    roles.grant_moderator(addr(0x0d));
    EscrowEngine::new(
        addr(0xec),
        addr(0x7e),
        StaticProbe::permissive(),
        StaticMembership::new(U256::from(UNIT_FEE)),
        roles,
        InMemoryLedger::new(),
        InMemoryLedger::new(),
    )
}

/// Full happy path: A offers X requesting Y, B finalizes with Y.
/// A ends up with Y, B with X, and both fees accrue to the counter.
#[test]
fn end_to_end_single_swap() {
    let mut engine = engine();
    let (alice, bob) = (addr(0xaa), addr(0xbb));
    let (token_x, token_y) = (addr(0x10), addr(0x11));
    engine.asset_port_mut().mint_unique(token_x, 1, alice);
    engine.asset_port_mut().mint_unique(token_y, 2, bob);

    let initiated = engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(token_y, 2),
        )
        .unwrap();
    assert_eq!(initiated.kind, SwapKind::Single);
    assert_eq!(
        engine.asset_port().owner_of(token_x, 1),
        Some(engine.custodian())
    );

    let finalized = engine
        .finalize_single_swap(bob, alice, U256::from(2 * UNIT_FEE))
        .unwrap();
    assert_eq!(finalized.finalization_fee, U256::from(2 * UNIT_FEE));
    assert_eq!(finalized.cash_forwarded, U256::ZERO);

    // Ownership swapped end to end.
    assert_eq!(engine.asset_port().owner_of(token_y, 2), Some(alice));
    assert_eq!(engine.asset_port().owner_of(token_x, 1), Some(bob));

    // Both fees accrued; the slot is cleared.
    assert_eq!(engine.accumulated_fee(), U256::from(4 * UNIT_FEE));
    assert!(!engine.registry().has_active_single(alice));
}

#[test]
fn second_initiation_blocked_until_slot_clears() {
    let mut engine = engine();
    let alice = addr(0xaa);
    let token_x = addr(0x10);
    engine.asset_port_mut().mint_unique(token_x, 1, alice);
    engine.asset_port_mut().mint_unique(token_x, 2, alice);

    engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(addr(0x11), 9),
        )
        .unwrap();

    let err = engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(token_x, 2),
            AssetRecord::unique(addr(0x11), 9),
        )
        .unwrap_err();
    assert_eq!(err, EscrowError::SingleSwapExists { account: alice });

    // Cancelling frees the slot for a fresh initiation.
    engine.cancel_single_swap(alice).unwrap();
    engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(token_x, 2),
            AssetRecord::unique(addr(0x11), 9),
        )
        .unwrap();
}

/// Cancelling returns exactly the escrowed asset and the initiation fee,
/// and leaves the fee counter untouched.
#[test]
fn cancellation_refunds_exactly() {
    let mut engine = engine();
    let alice = addr(0xaa);
    let token_x = addr(0x10);
    engine.asset_port_mut().mint_unique(token_x, 1, alice);

    engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::from(500),
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(addr(0x11), 2),
        )
        .unwrap();

    let cancelled = engine.cancel_single_swap(alice).unwrap();
    assert_eq!(cancelled.fee_refunded, U256::from(2 * UNIT_FEE));
    assert_eq!(cancelled.returned.len(), 1);

    assert_eq!(engine.asset_port().owner_of(token_x, 1), Some(alice));
    assert_eq!(engine.cash_port().cash_balance(alice), U256::from(2 * UNIT_FEE));
    assert_eq!(engine.accumulated_fee(), U256::ZERO);
    assert!(!engine.registry().has_active_single(alice));

    // Nothing left to cancel.
    assert_eq!(
        engine.cancel_single_swap(alice),
        Err(EscrowError::SwapNonExistent { account: alice })
    );
}

#[test]
fn subscriber_fee_gating() {
    let mut roles = StaticRoles::new();
    roles.grant_moderator(addr(0x0d));
    let mut membership = StaticMembership::new(U256::from(UNIT_FEE));
    membership.subscribe(addr(0xaa));
    let mut engine = EscrowEngine::new(
        addr(0xec),
        addr(0x7e),
        StaticProbe::permissive(),
        membership,
        roles,
        InMemoryLedger::new(),
        InMemoryLedger::new(),
    );
    let token_x = addr(0x10);
    engine.asset_port_mut().mint_unique(token_x, 1, addr(0xaa));

    // A subscriber supplying any nonzero fee is a caller error.
    let err = engine
        .initiate_single_swap(
            addr(0xaa),
            U256::from(1),
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(addr(0x11), 2),
        )
        .unwrap_err();
    assert!(matches!(err, EscrowError::FeeValidationFailed { .. }));

    // Zero is exactly right.
    let event = engine
        .initiate_single_swap(
            addr(0xaa),
            U256::ZERO,
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(addr(0x11), 2),
        )
        .unwrap();
    assert_eq!(event.fee_paid, U256::ZERO);
}

#[test]
fn cash_width_range_check() {
    let mut engine = engine();
    let too_high = U256::from(u128::MAX) + U256::from(1);

    let err = engine
        .initiate_single_swap(
            addr(0xaa),
            U256::from(2 * UNIT_FEE),
            too_high,
            AssetRecord::unique(addr(0x10), 1),
            AssetRecord::unique(addr(0x11), 2),
        )
        .unwrap_err();
    assert_eq!(
        err,
        EscrowError::CashToBeAddedOrValueTooHigh { supplied: too_high }
    );
    assert!(!engine.registry().has_active_single(addr(0xaa)));
}

#[test]
fn finalize_unknown_initiator_fails() {
    let mut engine = engine();
    assert_eq!(
        engine.finalize_single_swap(addr(0xbb), addr(0xaa), U256::from(2 * UNIT_FEE)),
        Err(EscrowError::SwapNonExistent { account: addr(0xaa) })
    );
}

#[test]
fn unattested_token_rejected_at_initiation() {
    let mut roles = StaticRoles::new();
    roles.grant_moderator(addr(0x0d));
    let mut probe = StaticProbe::new();
    probe.register_unique(addr(0x10));
    let mut engine = EscrowEngine::new(
        addr(0xec),
        addr(0x7e),
        probe,
        StaticMembership::new(U256::from(UNIT_FEE)),
        roles,
        InMemoryLedger::new(),
        InMemoryLedger::new(),
    );
    engine.asset_port_mut().mint_unique(addr(0x10), 1, addr(0xaa));

    // The requested token never attested to the unique-transfer protocol.
    let err = engine
        .initiate_single_swap(
            addr(0xaa),
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(addr(0x10), 1),
            AssetRecord::unique(addr(0x11), 2),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EscrowError::FailedToValidateInterfaceSupport { .. }
    ));
    assert!(!engine.registry().has_active_single(addr(0xaa)));
}

/// Bundle swap with a cash leg: two uniques and a quantity against one
/// unique, with the finalizer owing the initiator 500 on top of the fee.
#[test]
fn end_to_end_multi_swap_with_cash_leg() {
    let mut engine = engine();
    let (alice, bob) = (addr(0xaa), addr(0xbb));
    let (token_x, token_s, token_y) = (addr(0x10), addr(0x12), addr(0x11));

    engine.asset_port_mut().mint_unique(token_x, 1, alice);
    engine.asset_port_mut().mint_unique(token_x, 2, alice);
    engine.asset_port_mut().mint_quantity(token_s, 7, alice, 300);
    engine.asset_port_mut().mint_unique(token_y, 9, bob);

    let offered = vec![
        AssetRecord::unique(token_x, 1),
        AssetRecord::unique(token_x, 2),
        AssetRecord::quantity(token_s, 7, 300),
    ];
    let requested = vec![AssetRecord::unique(token_y, 9)];
    let combined = offered.len() + requested.len();

    engine
        .initiate_multi_swap(
            alice,
            U256::from(combined as u64 * UNIT_FEE),
            U256::from(500),
            offered,
            requested,
        )
        .unwrap();

    // Everything offered sits in custody.
    let custodian = engine.custodian();
    assert_eq!(engine.asset_port().owner_of(token_x, 1), Some(custodian));
    assert_eq!(engine.asset_port().owner_of(token_x, 2), Some(custodian));
    assert_eq!(engine.asset_port().balance_of(token_s, 7, custodian), 300);

    // Finalizer attaches finalization fee + cash leg.
    let attached = U256::from(combined as u64 * UNIT_FEE) + U256::from(500);
    let finalized = engine.finalize_multi_swap(bob, alice, attached).unwrap();
    assert_eq!(finalized.cash_forwarded, U256::from(500));
    assert_eq!(finalized.offered.len(), 3);
    assert_eq!(finalized.requested.len(), 1);

    // Full sets moved to their destinations; custody is empty.
    assert_eq!(engine.asset_port().owner_of(token_y, 9), Some(alice));
    assert_eq!(engine.asset_port().owner_of(token_x, 1), Some(bob));
    assert_eq!(engine.asset_port().owner_of(token_x, 2), Some(bob));
    assert_eq!(engine.asset_port().balance_of(token_s, 7, bob), 300);
    assert_eq!(engine.asset_port().balance_of(token_s, 7, custodian), 0);

    // Cash leg reached the initiator; both fees accrued.
    assert_eq!(engine.cash_port().cash_balance(alice), U256::from(500));
    assert_eq!(
        engine.accumulated_fee(),
        U256::from(2 * combined as u64 * UNIT_FEE)
    );
    assert!(!engine.registry().has_active_multi(alice));
}

#[test]
fn multi_swap_rejects_singleton_pair() {
    let mut engine = engine();
    let err = engine
        .initiate_multi_swap(
            addr(0xaa),
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            vec![AssetRecord::unique(addr(0x10), 1)],
            vec![AssetRecord::unique(addr(0x11), 2)],
        )
        .unwrap_err();
    assert_eq!(err, EscrowError::InvalidAssetsProvided);
}

#[test]
fn single_and_multi_slots_are_independent() {
    let mut engine = engine();
    let alice = addr(0xaa);
    let token_x = addr(0x10);
    for id in 1..=4 {
        engine.asset_port_mut().mint_unique(token_x, id, alice);
    }

    engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(addr(0x11), 1),
        )
        .unwrap();
    engine
        .initiate_multi_swap(
            alice,
            U256::from(3 * UNIT_FEE),
            U256::ZERO,
            vec![
                AssetRecord::unique(token_x, 2),
                AssetRecord::unique(token_x, 3),
            ],
            vec![AssetRecord::unique(addr(0x11), 2)],
        )
        .unwrap();

    assert!(engine.registry().has_active_single(alice));
    assert!(engine.registry().has_active_multi(alice));

    engine.cancel_multi_swap(alice).unwrap();
    assert!(engine.registry().has_active_single(alice));
    assert!(!engine.registry().has_active_multi(alice));
}

#[test]
fn treasury_collection_lifecycle() {
    let mut engine = engine();
    let (alice, bob) = (addr(0xaa), addr(0xbb));
    let (token_x, token_y) = (addr(0x10), addr(0x11));
    engine.asset_port_mut().mint_unique(token_x, 1, alice);
    engine.asset_port_mut().mint_unique(token_y, 2, bob);

    engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(token_y, 2),
        )
        .unwrap();
    engine
        .finalize_single_swap(bob, alice, U256::from(2 * UNIT_FEE))
        .unwrap();

    // Only moderators may sweep.
    assert_eq!(
        engine.collect(addr(0x99)),
        Err(EscrowError::OnlyModerator { account: addr(0x99) })
    );

    let collected = engine.collect(addr(0x0d)).unwrap();
    assert_eq!(collected.amount, U256::from(4 * UNIT_FEE));
    assert_eq!(engine.accumulated_fee(), U256::ZERO);
    assert_eq!(
        engine.cash_port().cash_balance(engine.treasury()),
        U256::from(4 * UNIT_FEE)
    );

    // A second sweep moves nothing.
    let collected = engine.collect(addr(0x0d)).unwrap();
    assert_eq!(collected.amount, U256::ZERO);
}

/// Conservation across a settled swap: every escrowed asset leaves custody
/// for the finalizer, every requested asset reaches the initiator, and the
/// fee counter grows by exactly both fees.
#[test]
fn finalize_conserves_assets_and_fees() {
    let mut engine = engine();
    let (alice, bob) = (addr(0xaa), addr(0xbb));
    let (token_x, token_y) = (addr(0x10), addr(0x11));
    engine.asset_port_mut().mint_quantity(token_x, 1, alice, 1_000);
    engine.asset_port_mut().mint_quantity(token_y, 1, bob, 2_000);

    engine
        .initiate_single_swap(
            alice,
            U256::from(2 * UNIT_FEE),
            U256::ZERO,
            AssetRecord::quantity(token_x, 1, 1_000),
            AssetRecord::quantity(token_y, 1, 2_000),
        )
        .unwrap();

    let fee_before = engine.accumulated_fee();
    engine
        .finalize_single_swap(bob, alice, U256::from(2 * UNIT_FEE))
        .unwrap();

    // No units created or destroyed on either token.
    assert_eq!(engine.asset_port().balance_of(token_x, 1, bob), 1_000);
    assert_eq!(engine.asset_port().balance_of(token_x, 1, alice), 0);
    assert_eq!(
        engine.asset_port().balance_of(token_x, 1, engine.custodian()),
        0
    );
    assert_eq!(engine.asset_port().balance_of(token_y, 1, alice), 2_000);
    assert_eq!(engine.asset_port().balance_of(token_y, 1, bob), 0);

    assert_eq!(
        engine.accumulated_fee() - fee_before,
        U256::from(4 * UNIT_FEE)
    );
}
