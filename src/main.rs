//! escrow-engine CLI
//!
//! Replay swap-lifecycle scenarios against the in-memory reference ports.
//!
//! # Usage
//!
//! ```bash
//! # Replay a scenario from a JSON file
//! escrow-engine replay --input scenario.json
//!
//! # Output per-operation results as JSON
//! escrow-engine replay --input scenario.json --format json
//!
//! # Run the built-in end-to-end demo swap
//! escrow-engine demo
//! ```

use alloy_primitives::{Address, U256};
use escrow_engine::core::asset::AssetRecord;
use escrow_engine::core::error::EscrowError;
use escrow_engine::core::event::EscrowEvent;
use escrow_engine::engine::lifecycle::EscrowEngine;
use escrow_engine::ports::memory::{InMemoryLedger, StaticMembership, StaticProbe, StaticRoles};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"escrow-engine — trust-minimized escrow for atomic asset swaps

USAGE:
    escrow-engine <COMMAND> [OPTIONS]

COMMANDS:
    replay      Replay a swap-lifecycle scenario from a JSON file
    demo        Run a built-in end-to-end swap
    help        Show this message

OPTIONS (replay):
    --input <FILE>      Path to JSON scenario file
    --format <FORMAT>   Output format: text (default) or json

EXAMPLES:
    escrow-engine replay --input scenario.json
    escrow-engine replay --input scenario.json --format json
    escrow-engine demo"#
    );
}

/// JSON schema for scenario input.
#[derive(serde::Deserialize)]
struct Scenario {
    /// Per-asset fee charged to non-subscribers.
    unit_fee: u128,
    #[serde(default)]
    subscribers: Vec<Address>,
    #[serde(default)]
    moderators: Vec<Address>,
    /// Token contracts and the transfer capabilities they attest to.
    #[serde(default)]
    tokens: Vec<TokenInput>,
    /// Initial asset holdings. `amount == 0` seeds a unique unit.
    #[serde(default)]
    holdings: Vec<HoldingInput>,
    operations: Vec<Operation>,
}

#[derive(serde::Deserialize)]
struct TokenInput {
    address: Address,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    quantity: bool,
}

#[derive(serde::Deserialize)]
struct HoldingInput {
    owner: Address,
    token: Address,
    token_id: u32,
    #[serde(default)]
    amount: u128,
}

#[derive(serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Operation {
    InitiateSingle {
        caller: Address,
        attached: u128,
        #[serde(default)]
        cash_to_be_added: u128,
        offered: AssetRecord,
        requested: AssetRecord,
    },
    InitiateMulti {
        caller: Address,
        attached: u128,
        #[serde(default)]
        cash_to_be_added: u128,
        offered: Vec<AssetRecord>,
        requested: Vec<AssetRecord>,
    },
    FinalizeSingle {
        caller: Address,
        initiator: Address,
        attached: u128,
    },
    FinalizeMulti {
        caller: Address,
        initiator: Address,
        attached: u128,
    },
    CancelSingle {
        caller: Address,
    },
    CancelMulti {
        caller: Address,
    },
    Collect {
        caller: Address,
    },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::InitiateSingle { .. } => "initiate_single",
            Operation::InitiateMulti { .. } => "initiate_multi",
            Operation::FinalizeSingle { .. } => "finalize_single",
            Operation::FinalizeMulti { .. } => "finalize_multi",
            Operation::CancelSingle { .. } => "cancel_single",
            Operation::CancelMulti { .. } => "cancel_multi",
            Operation::Collect { .. } => "collect",
        }
    }
}

#[derive(serde::Serialize)]
struct OperationOutput {
    index: usize,
    op: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<EscrowEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(serde::Serialize)]
struct ReplayOutput {
    operations: Vec<OperationOutput>,
    active_single_swaps: usize,
    active_multi_swaps: usize,
    accumulated_fee: String,
}

type CliEngine =
    EscrowEngine<StaticProbe, StaticMembership, StaticRoles, InMemoryLedger, InMemoryLedger>;

/// The custody and treasury accounts used by every replayed scenario.
const CUSTODIAN: Address = Address::repeat_byte(0xec);
const TREASURY: Address = Address::repeat_byte(0x7e);

fn build_engine(scenario: &Scenario) -> CliEngine {
    let mut membership = StaticMembership::new(U256::from(scenario.unit_fee));
    for account in &scenario.subscribers {
        membership.subscribe(*account);
    }

    let mut roles = StaticRoles::new();
    for account in &scenario.moderators {
        roles.grant_moderator(*account);
    }

    let mut probe = StaticProbe::new();
    for token in &scenario.tokens {
        if token.unique {
            probe.register_unique(token.address);
        }
        if token.quantity {
            probe.register_quantity(token.address);
        }
    }

    let mut ledger = InMemoryLedger::new();
    for holding in &scenario.holdings {
        if holding.amount == 0 {
            ledger.mint_unique(holding.token, holding.token_id, holding.owner);
        } else {
            ledger.mint_quantity(
                holding.token,
                holding.token_id,
                holding.owner,
                holding.amount,
            );
        }
    }

    EscrowEngine::new(
        CUSTODIAN,
        TREASURY,
        probe,
        membership,
        roles,
        ledger,
        InMemoryLedger::new(),
    )
}

fn apply(engine: &mut CliEngine, op: &Operation) -> Result<EscrowEvent, EscrowError> {
    match op {
        Operation::InitiateSingle {
            caller,
            attached,
            cash_to_be_added,
            offered,
            requested,
        } => engine
            .initiate_single_swap(
                *caller,
                U256::from(*attached),
                U256::from(*cash_to_be_added),
                *offered,
                *requested,
            )
            .map(EscrowEvent::SwapInitiated),
        Operation::InitiateMulti {
            caller,
            attached,
            cash_to_be_added,
            offered,
            requested,
        } => engine
            .initiate_multi_swap(
                *caller,
                U256::from(*attached),
                U256::from(*cash_to_be_added),
                offered.clone(),
                requested.clone(),
            )
            .map(EscrowEvent::SwapInitiated),
        Operation::FinalizeSingle {
            caller,
            initiator,
            attached,
        } => engine
            .finalize_single_swap(*caller, *initiator, U256::from(*attached))
            .map(EscrowEvent::SwapFinalized),
        Operation::FinalizeMulti {
            caller,
            initiator,
            attached,
        } => engine
            .finalize_multi_swap(*caller, *initiator, U256::from(*attached))
            .map(EscrowEvent::SwapFinalized),
        Operation::CancelSingle { caller } => engine
            .cancel_single_swap(*caller)
            .map(EscrowEvent::SwapCancelled),
        Operation::CancelMulti { caller } => engine
            .cancel_multi_swap(*caller)
            .map(EscrowEvent::SwapCancelled),
        Operation::Collect { caller } => engine.collect(*caller).map(EscrowEvent::FeesCollected),
    }
}

fn load_scenario(path: &str) -> Scenario {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "unit_fee": 10,
  "moderators": ["0x0d0d...0d0d"],
  "tokens": [ {{ "address": "0x1010...1010", "unique": true }} ],
  "holdings": [ {{ "owner": "0xaaaa...aaaa", "token": "0x1010...1010", "token_id": 1 }} ],
  "operations": [
    {{ "op": "initiate_single", "caller": "0xaaaa...aaaa", "attached": 20,
       "offered": {{ "token": "0x1010...1010", "token_id": 1, "value": 0 }},
       "requested": {{ "token": "0x1111...1111", "token_id": 2, "value": 0 }} }}
  ]
}}"#
        );
        process::exit(1);
    })
}

fn cmd_replay(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let scenario = load_scenario(&path);
    let mut engine = build_engine(&scenario);

    let mut outputs = Vec::new();
    for (index, op) in scenario.operations.iter().enumerate() {
        let outcome = apply(&mut engine, op);
        outputs.push(match outcome {
            Ok(event) => OperationOutput {
                index,
                op: op.name().to_string(),
                status: "ok".to_string(),
                event: Some(event),
                error: None,
            },
            Err(err) => OperationOutput {
                index,
                op: op.name().to_string(),
                status: "error".to_string(),
                event: None,
                error: Some(err.to_string()),
            },
        });
    }

    if format == "json" {
        let output = ReplayOutput {
            operations: outputs,
            active_single_swaps: engine.registry().active_single_count(),
            active_multi_swaps: engine.registry().active_multi_count(),
            accumulated_fee: engine.accumulated_fee().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        for output in &outputs {
            match &output.error {
                None => println!("[{}] {} ok", output.index, output.op),
                Some(err) => println!("[{}] {} failed: {}", output.index, output.op, err),
            }
        }
        println!();
        println!("Active single swaps: {}", engine.registry().active_single_count());
        println!("Active multi swaps:  {}", engine.registry().active_multi_count());
        println!("Accumulated fee:     {}", engine.accumulated_fee());
    }
}

fn cmd_demo() {
    let alice = Address::repeat_byte(0xaa);
    let bob = Address::repeat_byte(0xbb);
    let moderator = Address::repeat_byte(0x0d);
    let token_x = Address::repeat_byte(0x10);
    let token_y = Address::repeat_byte(0x11);

    let membership = StaticMembership::new(U256::from(10));
    let mut roles = StaticRoles::new();
    roles.grant_moderator(moderator);
    let mut probe = StaticProbe::new();
    probe.register_unique(token_x);
    probe.register_unique(token_y);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_unique(token_x, 1, alice);
    ledger.mint_unique(token_y, 2, bob);

    let mut engine = EscrowEngine::new(
        CUSTODIAN,
        TREASURY,
        probe,
        membership,
        roles,
        ledger,
        InMemoryLedger::new(),
    );

    let initiated = engine
        .initiate_single_swap(
            alice,
            U256::from(20),
            U256::ZERO,
            AssetRecord::unique(token_x, 1),
            AssetRecord::unique(token_y, 2),
        )
        .expect("demo initiation");
    println!("{}", serde_json::to_string_pretty(&initiated).unwrap());

    let finalized = engine
        .finalize_single_swap(bob, alice, U256::from(20))
        .expect("demo finalization");
    println!("{}", serde_json::to_string_pretty(&finalized).unwrap());

    let collected = engine.collect(moderator).expect("demo collection");
    println!("{}", serde_json::to_string_pretty(&collected).unwrap());

    println!(
        "token X now owned by {}, token Y by {}",
        engine.asset_port().owner_of(token_x, 1).unwrap(),
        engine.asset_port().owner_of(token_y, 2).unwrap(),
    );
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "replay" => cmd_replay(rest),
        "demo" => cmd_demo(),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
