//! # Tokens
//!
//! Boxes carry, besides their nanoERG value, an ordered list of
//! `(TokenId, TokenAmount)` pairs. A token id is the id of the box that
//! minted it: the first input of the minting transaction.
//!
//! [`Tokens`] is the per-box collection. It merges duplicate ids and caps
//! the number of distinct tokens at [`MAX_TOKENS_PER_BOX`].

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::ergo_box::BoxId;
use crate::config::{MAX_TOKENS_PER_BOX, MAX_TOKEN_AMOUNT, MIN_TOKEN_AMOUNT};
use crate::crypto::Digest32;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while constructing token amounts and collections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Amount outside `1..=i64::MAX`.
    #[error("invalid token amount {0}")]
    InvalidAmount(i128),

    /// Summing two amounts exceeded the ceiling.
    #[error("token amount overflow for token {0}")]
    Overflow(TokenId),

    /// More distinct tokens than a box may carry.
    #[error("too many tokens in a box: {count} (max 255)")]
    TooManyTokens { count: usize },
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Token identifier: the id of the box the token was minted from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Digest32);

impl TokenId {
    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Digest32::from_bytes(bytes))
    }

    /// A newly minted token takes the id of the first input box.
    pub fn from_box_id(box_id: BoxId) -> Self {
        Self(box_id.digest())
    }

    /// Raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Hex-encoded token id.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({:?})", self.0)
    }
}

impl FromStr for TokenId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest32::from_hex(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// TokenAmount
// ---------------------------------------------------------------------------

/// A positive token amount, bounded by `i64::MAX`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Creates a token amount with bounds check.
    pub fn new(amount: u64) -> Result<Self, TokenError> {
        if !(MIN_TOKEN_AMOUNT..=MAX_TOKEN_AMOUNT).contains(&amount) {
            return Err(TokenError::InvalidAmount(amount as i128));
        }
        Ok(Self(amount))
    }

    /// Creates a token amount from the signed wire representation.
    pub fn from_i64(amount: i64) -> Result<Self, TokenError> {
        if amount < 0 {
            return Err(TokenError::InvalidAmount(amount as i128));
        }
        Self::new(amount as u64)
    }

    /// Raw amount.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Signed amount; always fits.
    pub fn as_i64(&self) -> i64 {
        self.0 as i64
    }

    /// `None` if the sum exceeds the ceiling.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .filter(|s| *s <= MAX_TOKEN_AMOUNT)
            .map(Self)
    }

    /// `None` if the difference is zero or negative.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).filter(|d| *d > 0).map(Self)
    }
}

impl TryFrom<u64> for TokenAmount {
    type Error = TokenError;

    fn try_from(amount: u64) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenAmount({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A single `(id, amount)` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "tokenId")]
    pub token_id: TokenId,
    pub amount: TokenAmount,
}

impl Token {
    pub fn new(token_id: TokenId, amount: TokenAmount) -> Self {
        Self { token_id, amount }
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Ordered collection of tokens held by one box.
///
/// Insertion order is preserved (it is part of the box bytes). Adding an id
/// that is already present merges the amounts instead of creating a second
/// entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tokens(Vec<Token>);

impl Tokens {
    /// Empty collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a collection, merging duplicate ids.
    pub fn from_vec(tokens: Vec<Token>) -> Result<Self, TokenError> {
        let mut out = Self::new();
        for token in tokens {
            out.add(token)?;
        }
        Ok(out)
    }

    /// Appends a token, merging with an existing entry of the same id.
    pub fn add(&mut self, token: Token) -> Result<(), TokenError> {
        if let Some(existing) = self.0.iter_mut().find(|t| t.token_id == token.token_id) {
            existing.amount = existing
                .amount
                .checked_add(token.amount)
                .ok_or(TokenError::Overflow(token.token_id))?;
            return Ok(());
        }
        if self.0.len() >= MAX_TOKENS_PER_BOX {
            return Err(TokenError::TooManyTokens {
                count: self.0.len() + 1,
            });
        }
        self.0.push(token);
        Ok(())
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Token at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.0.get(index)
    }

    /// Amount held for `token_id`, if any.
    pub fn amount_of(&self, token_id: &TokenId) -> Option<TokenAmount> {
        self.0
            .iter()
            .find(|t| &t.token_id == token_id)
            .map(|t| t.amount)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Tokens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<Token>::deserialize(deserializer)?;
        Self::from_vec(raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Token arithmetic over many boxes
// ---------------------------------------------------------------------------

/// Per-token running totals, summed across boxes with overflow detection.
///
/// Totals are kept as `u128` so that sums across many boxes never wrap;
/// a total only needs to fit `i64::MAX` once it lands in a single box.
pub type TokenTotals = BTreeMap<TokenId, u128>;

/// Adds every token of `tokens` into `totals`.
pub fn accumulate_tokens<'a, I>(totals: &mut TokenTotals, tokens: I) -> Result<(), TokenError>
where
    I: IntoIterator<Item = &'a Token>,
{
    for token in tokens {
        let entry = totals.entry(token.token_id).or_insert(0);
        *entry = entry
            .checked_add(token.amount.as_u64() as u128)
            .ok_or(TokenError::Overflow(token.token_id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(b: u8) -> TokenId {
        TokenId::from_bytes([b; 32])
    }

    #[test]
    fn amount_arithmetic_stays_in_range() {
        let one = TokenAmount::new(1).unwrap();
        let max = TokenAmount::new(MAX_TOKEN_AMOUNT).unwrap();
        assert_eq!(one.checked_add(one), Some(TokenAmount::new(2).unwrap()));
        assert_eq!(max.checked_add(one), None);
        assert_eq!(max.checked_sub(one).map(|a| a.as_u64()), Some(MAX_TOKEN_AMOUNT - 1));
        assert_eq!(one.checked_sub(one), None);
    }

    fn amt(a: u64) -> TokenAmount {
        TokenAmount::new(a).unwrap()
    }

    #[test]
    fn amount_bounds() {
        assert_eq!(TokenAmount::new(0), Err(TokenError::InvalidAmount(0)));
        assert!(TokenAmount::new(MAX_TOKEN_AMOUNT).is_ok());
        assert!(TokenAmount::new(MAX_TOKEN_AMOUNT + 1).is_err());
        assert_eq!(TokenAmount::from_i64(-1), Err(TokenError::InvalidAmount(-1)));
    }

    #[test]
    fn add_merges_duplicate_ids() {
        let mut tokens = Tokens::new();
        tokens.add(Token::new(tid(1), amt(5))).unwrap();
        tokens.add(Token::new(tid(2), amt(1))).unwrap();
        tokens.add(Token::new(tid(1), amt(7))).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.amount_of(&tid(1)), Some(amt(12)));
        // Insertion order survives the merge.
        assert_eq!(tokens.get(0).unwrap().token_id, tid(1));
    }

    #[test]
    fn merge_overflow_is_reported() {
        let mut tokens = Tokens::new();
        tokens.add(Token::new(tid(1), amt(MAX_TOKEN_AMOUNT))).unwrap();
        assert_eq!(
            tokens.add(Token::new(tid(1), amt(1))),
            Err(TokenError::Overflow(tid(1)))
        );
    }

    #[test]
    fn capacity_is_capped() {
        let mut tokens = Tokens::new();
        for i in 0..MAX_TOKENS_PER_BOX {
            let mut bytes = [0u8; 32];
            bytes[0] = (i % 256) as u8;
            bytes[1] = (i / 256) as u8;
            tokens.add(Token::new(TokenId::from_bytes(bytes), amt(1))).unwrap();
        }
        let err = tokens.add(Token::new(TokenId::from_bytes([0xFF; 32]), amt(1)));
        assert!(matches!(err, Err(TokenError::TooManyTokens { count: 256 })));
    }

    #[test]
    fn token_id_from_box_id_keeps_bytes() {
        let box_id = BoxId::from_bytes([9u8; 32]);
        assert_eq!(TokenId::from_box_id(box_id).as_bytes(), &[9u8; 32]);
    }

    #[test]
    fn token_id_parses_hex() {
        let id: TokenId = "ab".repeat(32).parse().unwrap();
        assert_eq!(id, tid(0xAB));
        assert!("xyz".parse::<TokenId>().is_err());
    }

    #[test]
    fn totals_accumulate_across_boxes() {
        let a = Tokens::from_vec(vec![Token::new(tid(1), amt(3))]).unwrap();
        let b = Tokens::from_vec(vec![
            Token::new(tid(1), amt(4)),
            Token::new(tid(2), amt(9)),
        ])
        .unwrap();
        let mut totals = TokenTotals::new();
        accumulate_tokens(&mut totals, &a).unwrap();
        accumulate_tokens(&mut totals, &b).unwrap();
        assert_eq!(totals[&tid(1)], 7);
        assert_eq!(totals[&tid(2)], 9);
    }

    #[test]
    fn json_schema_uses_token_id_field() {
        let token = Token::new(tid(1), amt(10));
        let json = serde_json::to_value(token).unwrap();
        assert_eq!(json["tokenId"], "01".repeat(32));
        assert_eq!(json["amount"], 10);
    }
}
