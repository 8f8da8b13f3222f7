//! End-to-end tests: select, build, sign, verify.
//!
//! Each test builds its own boxes and keys from fixed seeds, so results are
//! reproducible and tests share no state.

use ergo_tx_protocol::chain::{
    Address, BoxValue, Contract, ErgoBox, ErgoBoxCandidate, ErgoBoxCandidateBuilder,
    ErgoStateContext, NetworkPrefix, Token, TokenAmount, TokenId,
};
use ergo_tx_protocol::crypto::SecretKey;
use ergo_tx_protocol::logging::{init_logging, LogFormat};
use ergo_tx_protocol::prover::{Ed25519Backend, ProverError};
use ergo_tx_protocol::script::{AlwaysProvable, ErgoTree, Interpreter};
use ergo_tx_protocol::transaction::{
    verify_transaction, BoxSelection, BoxSelector, DataInput, SelectAll, SigningError,
    Transaction, TransactionError, TxBuilder, TxBuilderError, TxId, UnsignedTransaction,
};
use ergo_tx_protocol::wallet::Wallet;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn key(seed: u8) -> SecretKey {
    SecretKey::from_bytes(&[seed; 32])
}

fn value(v: u64) -> BoxValue {
    BoxValue::new(v).unwrap()
}

fn address_of(sk: &SecretKey) -> Address {
    Address::P2PK(sk.public_key())
}

/// An unspent box guarded by `tree`, as if created by some earlier transaction.
fn utxo(tree: ErgoTree, v: u64, tokens: &[Token], index: u16) -> ErgoBox {
    let mut b = ErgoBoxCandidateBuilder::new(value(v), tree, 900);
    for t in tokens {
        b.add_token(*t);
    }
    ErgoBox::from_box_candidate(b.build().unwrap(), TxId::from_bytes([0xE0; 32]), index)
}

fn pay_to(sk: &SecretKey, v: u64, height: u32) -> ErgoBoxCandidate {
    let contract = Contract::pay_to_address(&address_of(sk));
    ErgoBoxCandidateBuilder::new(value(v), contract.ergo_tree(), height)
        .build()
        .unwrap()
}

fn sum_values(outputs: &[ErgoBoxCandidate]) -> u64 {
    outputs.iter().map(|c| c.value.as_u64()).sum()
}

fn build(
    inputs: Vec<ErgoBox>,
    outputs: Vec<ErgoBoxCandidate>,
    fee: u64,
    change_to: &SecretKey,
    min_change: BoxValue,
) -> Result<UnsignedTransaction, TxBuilderError> {
    TxBuilder::new(
        BoxSelection::new(inputs, vec![]),
        outputs,
        ErgoStateContext::dummy().height(),
        value(fee),
        address_of(change_to),
        min_change,
    )
    .build()
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[test]
fn example_payment_scenario() {
    let _ = init_logging("warn", LogFormat::Pretty);
    let alice = key(1);
    let bob = key(2);
    let ctx = ErgoStateContext::dummy();

    let input = utxo(ErgoTree::p2pk(alice.public_key()), 67_500_000_000, &[], 0);
    let selection = SelectAll
        .select(vec![input], value(11_000_000), &[])
        .unwrap();
    let tx = TxBuilder::new(
        selection,
        vec![pay_to(&bob, 10_000_000, ctx.height())],
        ctx.height(),
        value(1_000_000),
        address_of(&alice),
        BoxValue::SAFE_USER_MIN,
    )
    .build()
    .unwrap();

    let outputs = tx.output_candidates();
    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].value.as_u64(), 10_000_000);
    assert_eq!(outputs[0].ergo_tree, ErgoTree::p2pk(bob.public_key()));
    assert_eq!(outputs[1].value.as_u64(), 67_489_000_000);
    assert_eq!(outputs[1].ergo_tree, ErgoTree::p2pk(alice.public_key()));
    assert_eq!(outputs[2].value.as_u64(), 1_000_000);
    assert_eq!(outputs[2].ergo_tree, ErgoTree::MinerFee);
    assert_eq!(sum_values(outputs), 67_500_000_000);
}

#[test]
fn change_threshold_boundaries() {
    let alice = key(1);
    let input = || utxo(ErgoTree::p2pk(alice.public_key()), 10_000_000, &[], 0);
    // 10_000_000 - 7_000_000 - 1_000_000 = 2_000_000 change.
    let outputs = || vec![pay_to(&key(2), 7_000_000, 1000)];

    let at = build(vec![input()], outputs(), 1_000_000, &alice, value(2_000_000)).unwrap();
    assert_eq!(at.output_candidates().len(), 3);
    assert_eq!(at.output_candidates()[1].value.as_u64(), 2_000_000);

    let below = build(vec![input()], outputs(), 1_000_000, &alice, value(2_000_001)).unwrap();
    assert_eq!(below.output_candidates().len(), 2);
    assert_eq!(below.output_candidates()[1].ergo_tree, ErgoTree::MinerFee);
    assert_eq!(below.output_candidates()[1].value.as_u64(), 3_000_000);
}

#[test]
fn insufficient_funds_returns_no_transaction() {
    let alice = key(1);
    let input = utxo(ErgoTree::p2pk(alice.public_key()), 5_000_000, &[], 0);
    let result = build(
        vec![input],
        vec![pay_to(&key(2), 5_000_000, 1000)],
        1_000_000,
        &alice,
        BoxValue::SAFE_USER_MIN,
    );
    assert_eq!(
        result,
        Err(TxBuilderError::NotEnoughFunds {
            needed: 6_000_000,
            available: 5_000_000
        })
    );
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

#[test]
fn build_sign_verify_round_trip() {
    let alice = key(1);
    let ctx = ErgoStateContext::dummy();
    let inputs = vec![
        utxo(ErgoTree::p2pk(alice.public_key()), 3_000_000_000, &[], 0),
        utxo(ErgoTree::p2pk(alice.public_key()), 2_000_000_000, &[], 1),
    ];
    let unsigned = build(
        inputs.clone(),
        vec![pay_to(&key(2), 1_000_000_000, ctx.height())],
        TxBuilder::suggested_tx_fee().as_u64(),
        &alice,
        BoxValue::SAFE_USER_MIN,
    )
    .unwrap();

    let wallet = Wallet::from_secrets(vec![alice]);
    let signed = wallet.sign_transaction(&ctx, &unsigned, &inputs, &[]).unwrap();

    assert_eq!(signed.id(), unsigned.id());
    assert_eq!(signed.inputs().len(), unsigned.inputs().len());
    for (s, u) in signed.inputs().iter().zip(unsigned.inputs()) {
        assert_eq!(s.box_id, u.box_id);
        assert_eq!(s.spending_proof.proof.signature_count(), 1);
    }
    assert_eq!(signed.output_candidates(), unsigned.output_candidates());
    assert_eq!(signed.data_inputs(), unsigned.data_inputs());
    assert_eq!(signed.outputs(), unsigned.outputs());

    verify_transaction(&signed, &ctx, &inputs, &[], &Interpreter, &Ed25519Backend).unwrap();

    let json = serde_json::to_string(&signed).unwrap();
    let decoded: Transaction = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, signed);
}

#[test]
fn two_inputs_one_key_signs_nothing() {
    let alice = key(1);
    let carol = key(3);
    let ctx = ErgoStateContext::dummy();
    let inputs = vec![
        utxo(ErgoTree::p2pk(alice.public_key()), 5_000_000, &[], 0),
        utxo(ErgoTree::p2pk(carol.public_key()), 5_000_000, &[], 1),
    ];
    let unsigned = build(
        inputs.clone(),
        vec![pay_to(&key(2), 2_000_000, ctx.height())],
        1_000_000,
        &alice,
        BoxValue::SAFE_USER_MIN,
    )
    .unwrap();

    let wallet = Wallet::from_secrets(vec![alice]);
    let result = wallet.sign_transaction(&ctx, &unsigned, &inputs, &[]);
    assert_eq!(
        result,
        Err(SigningError::ProofGenerationFailed {
            index: 1,
            source: ProverError::MissingSecret(carol.public_key())
        })
    );
}

#[test]
fn missing_input_box_fails_signing() {
    let alice = key(1);
    let ctx = ErgoStateContext::dummy();
    let inputs = vec![
        utxo(ErgoTree::p2pk(alice.public_key()), 5_000_000, &[], 0),
        utxo(ErgoTree::p2pk(alice.public_key()), 5_000_000, &[], 1),
    ];
    let unsigned = build(inputs.clone(), vec![], 1_000_000, &alice, BoxValue::SAFE_USER_MIN).unwrap();
    let wallet = Wallet::from_secrets(vec![alice]);
    assert_eq!(
        wallet.sign_transaction(&ctx, &unsigned, &inputs[1..], &[]),
        Err(SigningError::MissingInputBox(inputs[0].box_id()))
    );
}

#[test]
fn threshold_guard_with_two_of_three_keys() {
    let (a, b, c) = (key(10), key(11), key(12));
    let ctx = ErgoStateContext::dummy();
    let guard = ErgoTree::AtLeast {
        bound: 2,
        children: vec![
            ErgoTree::p2pk(a.public_key()),
            ErgoTree::p2pk(b.public_key()),
            ErgoTree::p2pk(c.public_key()),
        ],
    };
    let inputs = vec![utxo(guard, 50_000_000, &[], 0)];
    let unsigned = build(
        inputs.clone(),
        vec![pay_to(&key(2), 20_000_000, ctx.height())],
        1_000_000,
        &a,
        BoxValue::SAFE_USER_MIN,
    )
    .unwrap();

    let one = Wallet::from_secrets(vec![b.clone()]);
    assert!(matches!(
        one.sign_transaction(&ctx, &unsigned, &inputs, &[]),
        Err(SigningError::ProofGenerationFailed { index: 0, .. })
    ));

    let two = Wallet::from_secrets(vec![a, c]);
    let signed = two.sign_transaction(&ctx, &unsigned, &inputs, &[]).unwrap();
    assert_eq!(signed.inputs()[0].spending_proof.proof.signature_count(), 2);
    verify_transaction(&signed, &ctx, &inputs, &[], &Interpreter, &Ed25519Backend).unwrap();
}

#[test]
fn height_locked_box_needs_context_height() {
    let alice = key(1);
    let ctx = ErgoStateContext::dummy();
    let locked = |h| {
        ErgoTree::And(vec![
            ErgoTree::p2pk(alice.public_key()),
            ErgoTree::HeightGreaterThan(h),
        ])
    };

    for (lock, spendable) in [(ctx.height() - 1, true), (ctx.height(), false)] {
        let inputs = vec![utxo(locked(lock), 5_000_000, &[], 0)];
        let unsigned = build(inputs.clone(), vec![], 1_000_000, &alice, BoxValue::SAFE_USER_MIN).unwrap();
        let wallet = Wallet::from_secrets(vec![alice.clone()]);
        let result = wallet.sign_transaction(&ctx, &unsigned, &inputs, &[]);
        assert_eq!(result.is_ok(), spendable, "lock at {lock}");
    }
}

#[test]
fn data_input_guard_reads_data_boxes() {
    let alice = key(1);
    let ctx = ErgoStateContext::dummy();
    let oracle = utxo(ErgoTree::FalseProp, 1_000_000, &[], 7);
    let inputs = vec![utxo(ErgoTree::DataInputPresent(oracle.box_id()), 5_000_000, &[], 0)];

    let mut builder = TxBuilder::new(
        BoxSelection::new(inputs.clone(), vec![]),
        vec![],
        ctx.height(),
        value(1_000_000),
        address_of(&alice),
        BoxValue::SAFE_USER_MIN,
    );
    builder.set_data_inputs(vec![DataInput::from(oracle.box_id())]);
    let unsigned = builder.build().unwrap();

    let wallet = Wallet::from_secrets(vec![]);
    let signed = wallet
        .sign_transaction(&ctx, &unsigned, &inputs, std::slice::from_ref(&oracle))
        .unwrap();
    verify_transaction(&signed, &ctx, &inputs, &[oracle], &Interpreter, &Ed25519Backend).unwrap();
}

#[test]
fn only_the_block_miner_can_claim_the_fee_box() {
    let alice = key(1);
    let ctx = ErgoStateContext::dummy();
    let inputs = vec![utxo(ErgoTree::p2pk(alice.public_key()), 10_000_000, &[], 0)];
    let paying = build(inputs.clone(), vec![], 2_000_000, &alice, BoxValue::SAFE_USER_MIN).unwrap();
    let fee_box = paying.outputs().pop().unwrap();
    assert_eq!(fee_box.ergo_tree(), &ErgoTree::MinerFee);

    let miner = key(0x4D);
    assert_eq!(miner.public_key(), ctx.pre_header().miner_pk);
    let claim = build(vec![fee_box.clone()], vec![], 1_000_000, &miner, BoxValue::SAFE_USER_MIN).unwrap();

    let outsider = Wallet::from_secrets(vec![alice]);
    assert!(outsider
        .sign_transaction(&ctx, &claim, std::slice::from_ref(&fee_box), &[])
        .is_err());
    let miner_wallet = Wallet::from_secrets(vec![miner]);
    assert!(miner_wallet
        .sign_transaction(&ctx, &claim, std::slice::from_ref(&fee_box), &[])
        .is_ok());
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[test]
fn mint_then_transfer_tokens() {
    let alice = key(1);
    let bob = key(2);
    let ctx = ErgoStateContext::dummy();
    let funding = utxo(ErgoTree::p2pk(alice.public_key()), 100_000_000, &[], 0);

    // Mint: the token id is the id of the first input.
    let token_id = TokenId::from_box_id(funding.box_id());
    let mut issue = ErgoBoxCandidateBuilder::new(
        value(10_000_000),
        ErgoTree::p2pk(alice.public_key()),
        ctx.height(),
    );
    issue.mint_token(
        Token::new(token_id, TokenAmount::new(1_000).unwrap()),
        "NANO",
        "test issue",
        0,
    );
    let mint_tx = build(
        vec![funding.clone()],
        vec![issue.build().unwrap()],
        1_000_000,
        &alice,
        BoxValue::SAFE_USER_MIN,
    )
    .unwrap();
    let alice_wallet = Wallet::from_secrets(vec![alice.clone()]);
    let minted = alice_wallet
        .sign_transaction(&ctx, &mint_tx, std::slice::from_ref(&funding), &[])
        .unwrap();
    verify_transaction(&minted, &ctx, &[funding], &[], &Interpreter, &Ed25519Backend).unwrap();

    // Transfer part of the issue; the remainder must come back as change.
    let token_box = minted.outputs().remove(0);
    assert_eq!(token_box.tokens().amount_of(&token_id).unwrap().as_u64(), 1_000);
    let mut to_bob = ErgoBoxCandidateBuilder::new(
        BoxValue::SAFE_USER_MIN,
        ErgoTree::p2pk(bob.public_key()),
        ctx.height(),
    );
    to_bob.add_token(Token::new(token_id, TokenAmount::new(400).unwrap()));
    let transfer = build(
        vec![token_box.clone()],
        vec![to_bob.build().unwrap()],
        1_000_000,
        &alice,
        BoxValue::SAFE_USER_MIN,
    )
    .unwrap();
    let change = &transfer.output_candidates()[1];
    assert_eq!(change.tokens.amount_of(&token_id).unwrap().as_u64(), 600);

    let signed = alice_wallet
        .sign_transaction(&ctx, &transfer, std::slice::from_ref(&token_box), &[])
        .unwrap();
    verify_transaction(&signed, &ctx, &[token_box], &[], &Interpreter, &Ed25519Backend).unwrap();
}

#[test]
fn spending_unowned_tokens_fails() {
    let alice = key(1);
    let stranger = TokenId::from_bytes([0x99; 32]);
    let input = utxo(ErgoTree::p2pk(alice.public_key()), 10_000_000, &[], 0);
    let mut out = ErgoBoxCandidateBuilder::new(BoxValue::SAFE_USER_MIN, ErgoTree::TrueProp, 1000);
    out.add_token(Token::new(stranger, TokenAmount::new(1).unwrap()));
    let result = build(vec![input], vec![out.build().unwrap()], 1_000_000, &alice, BoxValue::SAFE_USER_MIN);
    assert_eq!(
        result,
        Err(TxBuilderError::NotEnoughTokens {
            token_id: stranger,
            needed: 1,
            available: 0
        })
    );
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[test]
fn verification_rejects_altered_outputs() {
    let alice = key(1);
    let ctx = ErgoStateContext::dummy();
    let inputs = vec![utxo(ErgoTree::p2pk(alice.public_key()), 10_000_000, &[], 0)];
    let unsigned = build(
        inputs.clone(),
        vec![pay_to(&key(2), 4_000_000, ctx.height())],
        1_000_000,
        &alice,
        BoxValue::SAFE_USER_MIN,
    )
    .unwrap();
    let signed = Wallet::from_secrets(vec![alice])
        .sign_transaction(&ctx, &unsigned, &inputs, &[])
        .unwrap();

    // Redirect the payment to someone else while keeping the proofs.
    let mut outputs = signed.output_candidates().to_vec();
    outputs[0].ergo_tree = ErgoTree::p2pk(key(66).public_key());
    let forged = Transaction::new(signed.inputs().to_vec(), vec![], outputs).unwrap();
    assert_eq!(
        verify_transaction(&forged, &ctx, &inputs, &[], &Interpreter, &Ed25519Backend),
        Err(TransactionError::InvalidProof { index: 0 })
    );

    // Drop the fee box: value no longer balances.
    let mut unbalanced = signed.output_candidates().to_vec();
    unbalanced.pop();
    let short = Transaction::new(signed.inputs().to_vec(), vec![], unbalanced).unwrap();
    assert_eq!(
        verify_transaction(&short, &ctx, &inputs, &[], &Interpreter, &Ed25519Backend),
        Err(TransactionError::ValueImbalance {
            inputs: 10_000_000,
            outputs: 9_000_000
        })
    );
}

#[test]
fn always_provable_evaluator_skips_keys() {
    let ctx = ErgoStateContext::dummy();
    let inputs = vec![utxo(ErgoTree::p2pk(key(5).public_key()), 5_000_000, &[], 0)];
    let unsigned = build(inputs.clone(), vec![], 1_000_000, &key(1), BoxValue::SAFE_USER_MIN).unwrap();
    let wallet = Wallet::with_components(vec![], AlwaysProvable, Ed25519Backend);
    let signed = wallet.sign_transaction(&ctx, &unsigned, &inputs, &[]).unwrap();
    assert!(signed.inputs()[0].spending_proof.proof.is_empty());
}

#[test]
fn change_address_round_trips_through_base58() {
    let alice = key(1);
    let encoded = address_of(&alice).to_base58(NetworkPrefix::Testnet);
    let parsed = Address::parse_for_network(&encoded, NetworkPrefix::Testnet).unwrap();
    let input = utxo(ErgoTree::p2pk(alice.public_key()), 10_000_000, &[], 0);
    let tx = TxBuilder::new(
        BoxSelection::new(vec![input], vec![]),
        vec![],
        1000,
        value(1_000_000),
        parsed,
        BoxValue::SAFE_USER_MIN,
    )
    .build()
    .unwrap();
    assert_eq!(tx.output_candidates()[0].ergo_tree, ErgoTree::p2pk(alice.public_key()));
}
