//! The swap lifecycle state machine.
//!
//! States per (account, swap kind): Absent → Active → {Settled, Cancelled}.
//! Settled and Cancelled collapse back to Absent in storage and are
//! observable only through the returned events.
//!
//! Every operation commits its registry and fee-counter changes first, then
//! executes an ordered effect plan against the transfer ports. The registry
//! slot is always cleared before any outbound transfer runs, so a reentrant
//! call observing engine state mid-settlement can never double-spend the
//! same escrowed assets.

use alloy_primitives::{Address, U256};
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::core::asset::AssetRecord;
use crate::core::cash::{fits_cash_width, CashRecord};
use crate::core::codec::{encode_asset, encode_asset_lists, pack_asset};
use crate::core::error::EscrowError;
use crate::core::event::{SwapCancelled, SwapFinalized, SwapInitiated};
use crate::engine::fees::FeePolicy;
use crate::engine::registry::{MultiSwap, SingleSwap, SwapKind, SwapRegistry};
use crate::ports::{
    acknowledgement, AssetTransferPort, CapabilityProbe, CashTransferPort, MembershipOracle,
    RoleOracle,
};

/// Assets involved in a single swap: one offered, one requested.
const SINGLE_UNIT_COUNT: usize = 2;

/// A multi swap must involve strictly more than two assets combined;
/// the one-for-one case belongs to the single-swap slot.
const MULTI_MIN_COMBINED: usize = 3;

/// An outbound value movement, executed after state is committed.
#[derive(Debug, Clone)]
enum Effect {
    MoveAsset {
        from: Address,
        to: Address,
        asset: AssetRecord,
    },
    SendCash {
        to: Address,
        amount: U256,
    },
}

/// The escrow engine: swap registry, fee counter, and the injected ports.
///
/// Custody is modelled as a dedicated `custodian` account on the asset
/// transfer port; escrowed assets sit under it between initiation and
/// settlement or cancellation.
pub struct EscrowEngine<P, M, R, A, C> {
    pub(crate) probe: P,
    pub(crate) membership: M,
    pub(crate) roles: R,
    pub(crate) assets: A,
    pub(crate) cash: C,
    pub(crate) registry: SwapRegistry,
    pub(crate) accumulated_fee: U256,
    pub(crate) custodian: Address,
    pub(crate) treasury: Address,
}

impl<P, M, R, A, C> EscrowEngine<P, M, R, A, C>
where
    P: CapabilityProbe,
    M: MembershipOracle,
    R: RoleOracle,
    A: AssetTransferPort,
    C: CashTransferPort,
{
    pub fn new(
        custodian: Address,
        treasury: Address,
        probe: P,
        membership: M,
        roles: R,
        assets: A,
        cash: C,
    ) -> Self {
        Self {
            probe,
            membership,
            roles,
            assets,
            cash,
            registry: SwapRegistry::new(),
            accumulated_fee: U256::ZERO,
            custodian,
            treasury,
        }
    }

    // --- Accessors ---

    pub fn registry(&self) -> &SwapRegistry {
        &self.registry
    }

    pub fn accumulated_fee(&self) -> U256 {
        self.accumulated_fee
    }

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn asset_port(&self) -> &A {
        &self.assets
    }

    pub fn asset_port_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    pub fn cash_port(&self) -> &C {
        &self.cash
    }

    pub fn cash_port_mut(&mut self) -> &mut C {
        &mut self.cash
    }

    // --- Initiate: Absent → Active ---

    /// Open a one-for-one swap: escrow `offered`, declare `requested`, and
    /// pay the initiation fee as the attached payment.
    pub fn initiate_single_swap(
        &mut self,
        caller: Address,
        attached: U256,
        cash_to_be_added: U256,
        offered: AssetRecord,
        requested: AssetRecord,
    ) -> Result<SwapInitiated, EscrowError> {
        check_cash_width(attached)?;
        check_cash_width(cash_to_be_added)?;
        let offered_word = encode_asset(&self.probe, &offered)?;
        let requested_word = encode_asset(&self.probe, &requested)?;
        let fee = FeePolicy::validate_fee(&self.membership, caller, SINGLE_UNIT_COUNT, attached)?;

        self.registry.put_single(
            caller,
            SingleSwap {
                cash: CashRecord::new(fee.to::<u128>(), cash_to_be_added.to::<u128>()),
                offered,
                requested,
                created_at: Utc::now(),
            },
        )?;

        let escrow = vec![Effect::MoveAsset {
            from: caller,
            to: self.custodian,
            asset: offered,
        }];
        if let Err(err) = self.run_effects(escrow) {
            let _ = self.registry.take_single(caller);
            return Err(err);
        }

        info!("single swap initiated by {caller} (fee {fee}, cash leg {cash_to_be_added})");
        Ok(SwapInitiated {
            id: Uuid::new_v4(),
            kind: SwapKind::Single,
            initiator: caller,
            offered: vec![offered_word],
            requested: vec![requested_word],
            fee_paid: fee,
            cash_to_be_added,
            at: Utc::now(),
        })
    }

    /// Open a bundle swap over more than two assets combined.
    pub fn initiate_multi_swap(
        &mut self,
        caller: Address,
        attached: U256,
        cash_to_be_added: U256,
        offered: Vec<AssetRecord>,
        requested: Vec<AssetRecord>,
    ) -> Result<SwapInitiated, EscrowError> {
        check_cash_width(attached)?;
        check_cash_width(cash_to_be_added)?;
        let combined = offered.len() + requested.len();
        if combined < MULTI_MIN_COMBINED {
            return Err(EscrowError::InvalidAssetsProvided);
        }
        let (offered_words, requested_words) =
            encode_asset_lists(&self.probe, &offered, &requested)?;
        let fee = FeePolicy::validate_fee(&self.membership, caller, combined, attached)?;

        let escrow: Vec<Effect> = offered
            .iter()
            .map(|asset| Effect::MoveAsset {
                from: caller,
                to: self.custodian,
                asset: *asset,
            })
            .collect();

        self.registry.put_multi(
            caller,
            MultiSwap {
                cash: CashRecord::new(fee.to::<u128>(), cash_to_be_added.to::<u128>()),
                offered,
                requested,
                created_at: Utc::now(),
            },
        )?;

        if let Err(err) = self.run_effects(escrow) {
            let _ = self.registry.take_multi(caller);
            return Err(err);
        }

        info!(
            "multi swap over {combined} assets initiated by {caller} \
             (fee {fee}, cash leg {cash_to_be_added})"
        );
        Ok(SwapInitiated {
            id: Uuid::new_v4(),
            kind: SwapKind::Multi,
            initiator: caller,
            offered: offered_words,
            requested: requested_words,
            fee_paid: fee,
            cash_to_be_added,
            at: Utc::now(),
        })
    }

    // --- Finalize: Active → Settled ---

    /// Settle `initiator`'s single swap. The attached payment must cover
    /// the finalization fee plus the declared cash leg exactly.
    pub fn finalize_single_swap(
        &mut self,
        caller: Address,
        initiator: Address,
        attached: U256,
    ) -> Result<SwapFinalized, EscrowError> {
        let swap = self
            .registry
            .get_single(initiator)
            .ok_or(EscrowError::SwapNonExistent { account: initiator })?;
        let cash_leg = U256::from(swap.cash.cash_to_be_added);
        let fee = self.validate_finalization_fee(caller, attached, cash_leg, SINGLE_UNIT_COUNT)?;

        // Clear the slot before any outbound transfer.
        let swap = self.registry.take_single(initiator)?;
        let fee_delta = U256::from(swap.cash.initiation_fee) + fee;
        self.accumulated_fee = self.accumulated_fee.saturating_add(fee_delta);

        let mut plan = vec![Effect::MoveAsset {
            from: caller,
            to: initiator,
            asset: swap.requested,
        }];
        if cash_leg > U256::ZERO {
            plan.push(Effect::SendCash {
                to: initiator,
                amount: cash_leg,
            });
        }
        plan.push(Effect::MoveAsset {
            from: self.custodian,
            to: caller,
            asset: swap.offered,
        });

        if let Err(err) = self.run_effects(plan) {
            self.accumulated_fee -= fee_delta;
            self.registry.restore_single(initiator, swap);
            return Err(err);
        }

        info!("single swap of {initiator} finalized by {caller} (fee {fee})");
        Ok(SwapFinalized {
            id: Uuid::new_v4(),
            kind: SwapKind::Single,
            initiator,
            finalizer: caller,
            offered: vec![pack_asset(&swap.offered)],
            requested: vec![pack_asset(&swap.requested)],
            finalization_fee: fee,
            cash_forwarded: cash_leg,
            at: Utc::now(),
        })
    }

    /// Settle `initiator`'s multi swap. Each set transfers in full to its
    /// destination; there is no index-wise pairing between the sets.
    pub fn finalize_multi_swap(
        &mut self,
        caller: Address,
        initiator: Address,
        attached: U256,
    ) -> Result<SwapFinalized, EscrowError> {
        let swap = self
            .registry
            .get_multi(initiator)
            .ok_or(EscrowError::SwapNonExistent { account: initiator })?;
        let cash_leg = U256::from(swap.cash.cash_to_be_added);
        let combined = swap.combined_len();
        let fee = self.validate_finalization_fee(caller, attached, cash_leg, combined)?;

        // Clear the slot before any outbound transfer.
        let swap = self.registry.take_multi(initiator)?;
        let fee_delta = U256::from(swap.cash.initiation_fee) + fee;
        self.accumulated_fee = self.accumulated_fee.saturating_add(fee_delta);

        let mut plan: Vec<Effect> = swap
            .requested
            .iter()
            .map(|asset| Effect::MoveAsset {
                from: caller,
                to: initiator,
                asset: *asset,
            })
            .collect();
        if cash_leg > U256::ZERO {
            plan.push(Effect::SendCash {
                to: initiator,
                amount: cash_leg,
            });
        }
        plan.extend(swap.offered.iter().map(|asset| Effect::MoveAsset {
            from: self.custodian,
            to: caller,
            asset: *asset,
        }));

        if let Err(err) = self.run_effects(plan) {
            self.accumulated_fee -= fee_delta;
            self.registry.restore_multi(initiator, swap);
            return Err(err);
        }

        info!("multi swap of {initiator} finalized by {caller} (fee {fee})");
        Ok(SwapFinalized {
            id: Uuid::new_v4(),
            kind: SwapKind::Multi,
            initiator,
            finalizer: caller,
            offered: swap.offered.iter().map(pack_asset).collect(),
            requested: swap.requested.iter().map(pack_asset).collect(),
            finalization_fee: fee,
            cash_forwarded: cash_leg,
            at: Utc::now(),
        })
    }

    // --- Cancel: Active → Cancelled ---

    /// Withdraw the caller's own single swap: refund the initiation fee and
    /// return the escrowed asset. No fee is retained.
    pub fn cancel_single_swap(&mut self, caller: Address) -> Result<SwapCancelled, EscrowError> {
        let swap = self.registry.take_single(caller)?;
        let refund = U256::from(swap.cash.initiation_fee);

        let mut plan = Vec::new();
        if refund > U256::ZERO {
            plan.push(Effect::SendCash {
                to: caller,
                amount: refund,
            });
        }
        plan.push(Effect::MoveAsset {
            from: self.custodian,
            to: caller,
            asset: swap.offered,
        });

        if let Err(err) = self.run_effects(plan) {
            self.registry.restore_single(caller, swap);
            return Err(err);
        }

        info!("single swap cancelled by {caller} (refund {refund})");
        Ok(SwapCancelled {
            id: Uuid::new_v4(),
            kind: SwapKind::Single,
            initiator: caller,
            fee_refunded: refund,
            returned: vec![pack_asset(&swap.offered)],
            at: Utc::now(),
        })
    }

    /// Withdraw the caller's own multi swap.
    pub fn cancel_multi_swap(&mut self, caller: Address) -> Result<SwapCancelled, EscrowError> {
        let swap = self.registry.take_multi(caller)?;
        let refund = U256::from(swap.cash.initiation_fee);

        let mut plan = Vec::new();
        if refund > U256::ZERO {
            plan.push(Effect::SendCash {
                to: caller,
                amount: refund,
            });
        }
        plan.extend(swap.offered.iter().map(|asset| Effect::MoveAsset {
            from: self.custodian,
            to: caller,
            asset: *asset,
        }));

        if let Err(err) = self.run_effects(plan) {
            self.registry.restore_multi(caller, swap);
            return Err(err);
        }

        info!("multi swap cancelled by {caller} (refund {refund})");
        Ok(SwapCancelled {
            id: Uuid::new_v4(),
            kind: SwapKind::Multi,
            initiator: caller,
            fee_refunded: refund,
            returned: swap.offered.iter().map(pack_asset).collect(),
            at: Utc::now(),
        })
    }

    // --- Receiver acknowledgment hooks ---

    /// Acknowledge an inbound single-unit transfer into custody.
    pub fn on_unique_received(&self, _operator: Address, _from: Address, _token_id: u32) -> [u8; 4] {
        acknowledgement::UNIQUE_RECEIVED
    }

    /// Acknowledge an inbound quantity-bearing transfer into custody.
    pub fn on_quantity_received(
        &self,
        _operator: Address,
        _from: Address,
        _token_id: u32,
        _amount: u128,
    ) -> [u8; 4] {
        acknowledgement::QUANTITY_RECEIVED
    }

    /// Acknowledge an inbound quantity-bearing batch transfer into custody.
    pub fn on_quantity_batch_received(
        &self,
        _operator: Address,
        _from: Address,
        _token_ids: &[u32],
        _amounts: &[u128],
    ) -> [u8; 4] {
        acknowledgement::QUANTITY_BATCH_RECEIVED
    }

    // --- Internals ---

    /// The attached payment must be at least the declared cash leg; the
    /// remainder must exactly match the finalization fee.
    fn validate_finalization_fee(
        &self,
        caller: Address,
        attached: U256,
        cash_leg: U256,
        unit_count: usize,
    ) -> Result<U256, EscrowError> {
        if attached < cash_leg {
            return Err(EscrowError::FeeValidationFailed {
                required: FeePolicy::required_fee(&self.membership, caller, unit_count) + cash_leg,
                supplied: attached,
            });
        }
        FeePolicy::validate_fee(&self.membership, caller, unit_count, attached - cash_leg)
    }

    fn transfer_asset(
        &mut self,
        from: Address,
        to: Address,
        asset: &AssetRecord,
    ) -> Result<(), EscrowError> {
        let outcome = if asset.is_unique() {
            self.assets.transfer_unique(from, to, asset.token, asset.token_id)
        } else {
            self.assets
                .transfer_quantity(from, to, asset.token, asset.token_id, asset.value)
        };
        outcome.map_err(|failure| EscrowError::AssetTransferFailed {
            token: asset.token,
            reason: failure.0,
        })
    }

    /// Execute an effect plan in order. If an effect fails, completed asset
    /// moves are reversed and the error surfaces; the caller restores the
    /// registry slot and fee counter it committed. Cash sends have no
    /// port-level inverse; a host running the operation inside an atomic
    /// transaction rolls them back wholesale.
    fn run_effects(&mut self, plan: Vec<Effect>) -> Result<(), EscrowError> {
        let mut completed = Vec::with_capacity(plan.len());
        for effect in plan {
            let outcome = match &effect {
                Effect::MoveAsset { from, to, asset } => self.transfer_asset(*from, *to, asset),
                Effect::SendCash { to, amount } => {
                    self.cash
                        .send(*to, *amount)
                        .map_err(|_| EscrowError::CashTransferFailed {
                            to: *to,
                            amount: *amount,
                        })
                }
            };
            match outcome {
                Ok(()) => completed.push(effect),
                Err(err) => {
                    for done in completed.into_iter().rev() {
                        if let Effect::MoveAsset { from, to, asset } = done {
                            let _ = self.transfer_asset(to, from, &asset);
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

fn check_cash_width(amount: U256) -> Result<(), EscrowError> {
    if !fits_cash_width(amount) {
        return Err(EscrowError::CashToBeAddedOrValueTooHigh { supplied: amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::memory::{InMemoryLedger, StaticMembership, StaticProbe, StaticRoles};

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    type TestEngine =
        EscrowEngine<StaticProbe, StaticMembership, StaticRoles, InMemoryLedger, InMemoryLedger>;

    fn engine(unit_fee: u64) -> TestEngine {
        EscrowEngine::new(
            addr(0xec),
            addr(0x7e),
            StaticProbe::permissive(),
            StaticMembership::new(U256::from(unit_fee)),
            StaticRoles::new(),
            InMemoryLedger::new(),
            InMemoryLedger::new(),
        )
    }

    #[test]
    fn test_initiate_escrows_the_offered_asset() {
        let mut engine = engine(10);
        let token_x = addr(0x10);
        let token_y = addr(0x11);
        engine.asset_port_mut().mint_unique(token_x, 1, addr(0xaa));

        let event = engine
            .initiate_single_swap(
                addr(0xaa),
                U256::from(20),
                U256::ZERO,
                AssetRecord::unique(token_x, 1),
                AssetRecord::unique(token_y, 2),
            )
            .unwrap();

        assert_eq!(event.kind, SwapKind::Single);
        assert_eq!(event.fee_paid, U256::from(20));
        assert_eq!(
            engine.asset_port().owner_of(token_x, 1),
            Some(engine.custodian())
        );
        assert!(engine.registry().has_active_single(addr(0xaa)));
        // Nothing accrues to the treasury counter until finalization.
        assert_eq!(engine.accumulated_fee(), U256::ZERO);
    }

    #[test]
    fn test_initiate_with_failing_escrow_leaves_no_state() {
        let mut engine = engine(10);
        let token_x = addr(0x10);
        engine.asset_port_mut().mint_unique(token_x, 1, addr(0xaa));
        engine.asset_port_mut().fail_transfers_on(token_x);

        let err = engine
            .initiate_single_swap(
                addr(0xaa),
                U256::from(20),
                U256::ZERO,
                AssetRecord::unique(token_x, 1),
                AssetRecord::unique(addr(0x11), 2),
            )
            .unwrap_err();

        assert!(matches!(err, EscrowError::AssetTransferFailed { .. }));
        assert!(!engine.registry().has_active_single(addr(0xaa)));
    }

    #[test]
    fn test_finalize_failure_restores_slot_and_counter() {
        let mut engine = engine(10);
        let token_x = addr(0x10);
        let token_y = addr(0x11);
        engine.asset_port_mut().mint_unique(token_x, 1, addr(0xaa));
        // The requested asset is never minted, so the finalizer's leg fails.

        engine
            .initiate_single_swap(
                addr(0xaa),
                U256::from(20),
                U256::ZERO,
                AssetRecord::unique(token_x, 1),
                AssetRecord::unique(token_y, 2),
            )
            .unwrap();

        let err = engine
            .finalize_single_swap(addr(0xbb), addr(0xaa), U256::from(20))
            .unwrap_err();
        assert!(matches!(err, EscrowError::AssetTransferFailed { .. }));

        // The swap is still active and no fee accrued.
        assert!(engine.registry().has_active_single(addr(0xaa)));
        assert_eq!(engine.accumulated_fee(), U256::ZERO);
        assert_eq!(
            engine.asset_port().owner_of(token_x, 1),
            Some(engine.custodian())
        );
    }

    #[test]
    fn test_finalize_underpaying_cash_leg_fails() {
        let mut engine = engine(10);
        let token_x = addr(0x10);
        let token_y = addr(0x11);
        engine.asset_port_mut().mint_unique(token_x, 1, addr(0xaa));
        engine.asset_port_mut().mint_unique(token_y, 2, addr(0xbb));

        engine
            .initiate_single_swap(
                addr(0xaa),
                U256::from(20),
                U256::from(1000),
                AssetRecord::unique(token_x, 1),
                AssetRecord::unique(token_y, 2),
            )
            .unwrap();

        // Attached below the cash leg alone.
        let err = engine
            .finalize_single_swap(addr(0xbb), addr(0xaa), U256::from(500))
            .unwrap_err();
        assert!(matches!(err, EscrowError::FeeValidationFailed { .. }));
        assert!(engine.registry().has_active_single(addr(0xaa)));
    }

    #[test]
    fn test_cancel_refund_rejected_by_initiator_keeps_swap_active() {
        let mut engine = engine(10);
        let token_x = addr(0x10);
        engine.asset_port_mut().mint_unique(token_x, 1, addr(0xaa));
        engine.cash_port_mut().reject_cash_for(addr(0xaa));

        engine
            .initiate_single_swap(
                addr(0xaa),
                U256::from(20),
                U256::ZERO,
                AssetRecord::unique(token_x, 1),
                AssetRecord::unique(addr(0x11), 2),
            )
            .unwrap();

        let err = engine.cancel_single_swap(addr(0xaa)).unwrap_err();
        assert!(matches!(err, EscrowError::CashTransferFailed { .. }));
        assert!(engine.registry().has_active_single(addr(0xaa)));
        assert_eq!(
            engine.asset_port().owner_of(token_x, 1),
            Some(engine.custodian())
        );
    }

    #[test]
    fn test_multi_swap_minimum_size() {
        let mut engine = engine(10);
        let err = engine
            .initiate_multi_swap(
                addr(0xaa),
                U256::from(20),
                U256::ZERO,
                vec![AssetRecord::unique(addr(0x10), 1)],
                vec![AssetRecord::unique(addr(0x11), 1)],
            )
            .unwrap_err();
        assert_eq!(err, EscrowError::InvalidAssetsProvided);
    }

    #[test]
    fn test_receiver_hooks_return_fixed_codes() {
        let engine = engine(10);
        assert_eq!(
            engine.on_unique_received(addr(0x01), addr(0x02), 1),
            acknowledgement::UNIQUE_RECEIVED
        );
        assert_eq!(
            engine.on_quantity_received(addr(0x01), addr(0x02), 1, 5),
            acknowledgement::QUANTITY_RECEIVED
        );
        assert_eq!(
            engine.on_quantity_batch_received(addr(0x01), addr(0x02), &[1, 2], &[5, 6]),
            acknowledgement::QUANTITY_BATCH_RECEIVED
        );
    }
}
