use std::error::Error;
use std::fmt::Display;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::VisitorAnswers;

const MAX_TOKEN_LEN: usize = 64 * 1024;

/// Everything needed to resume a quiz session.
///
/// It travels with the visitor as an opaque token, nothing is stored on the
/// server side.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizState {
    /// Seed of the question order for this session.
    pub seed: u32,
    /// Index of the next question to ask.
    pub q_idx: usize,
    pub answers: VisitorAnswers,
}

impl QuizState {
    pub fn new(seed: u32) -> QuizState {
        QuizState {
            seed,
            q_idx: 0,
            answers: VisitorAnswers::new(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TokenError {
    TooLong(usize),
    InvalidBase64(String),
    InvalidPayload(String),
}

impl Error for TokenError {}

impl Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::TooLong(len) => write!(f, "token too long: {} bytes", len),
            TokenError::InvalidBase64(msg) => write!(f, "token base64 decode failed: {}", msg),
            TokenError::InvalidPayload(msg) => write!(f, "token payload decode failed: {}", msg),
        }
    }
}

/// Serializes a quiz state into a URL-safe token.
///
/// The answers are kept in a sorted map, so the same state always gives the
/// same token.
pub fn encode(state: &QuizState) -> String {
    // Serializing a struct of strings and integers into JSON cannot fail.
    let bytes = serde_json::to_vec(state).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn try_decode(token: &str) -> Result<QuizState, TokenError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(TokenError::TooLong(token.len()));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| TokenError::InvalidBase64(e.to_string()))?;
    serde_json::from_slice::<QuizState>(&bytes).map_err(|e| TokenError::InvalidPayload(e.to_string()))
}

/// Reads back a token produced by `encode`.
///
/// A token that cannot be read gives back a fresh state: the visitor starts
/// over instead of getting an error.
pub fn decode(token: &str) -> QuizState {
    match try_decode(token) {
        Ok(state) => state,
        Err(e) => {
            debug!("decode: discarding token: {}", e);
            QuizState::default()
        }
    }
}
