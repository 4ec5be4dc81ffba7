use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const STARTING_ELO: i32 = 1200;

const API_KEY_PREFIX: &str = "gambit_";
const CLAIM_TOKEN_PREFIX: &str = "gambit_claim_";

/// Whether the agent's human has claimed it. Unclaimed agents can play
/// challenges and queue games but are skipped by the auto-match sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Claimed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub api_key: String,
    pub description: Option<String>,
    pub callback_url: Option<String>,
    pub elo: i32,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub claim_status: ClaimStatus,
    pub claim_token: String,
    pub verification_code: String,
    pub owner_handle: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(name: &str, description: Option<String>, callback_url: Option<String>) -> Self {
        Agent {
            name: name.to_string(),
            api_key: generate_api_key(),
            description,
            callback_url,
            elo: STARTING_ELO,
            games_played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            claim_status: ClaimStatus::Pending,
            claim_token: generate_claim_token(),
            verification_code: generate_verification_code(),
            owner_handle: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claim_status == ClaimStatus::Claimed
    }

    pub fn tier(&self) -> &'static str {
        match self.elo {
            e if e >= 2000 => "Summit",
            e if e >= 1600 => "Mountain",
            e if e >= 1200 => "Forest",
            e if e >= 800 => "Cabin",
            _ => "Wood",
        }
    }
}

fn generate_api_key() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    format!("{}{}", API_KEY_PREFIX, token)
}

fn generate_claim_token() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("{}{}", CLAIM_TOKEN_PREFIX, token)
}

/// Human-readable code the owner posts publicly, e.g. "knight-A1B2".
fn generate_verification_code() -> String {
    const WORDS: [&str; 9] = [
        "chess", "rook", "knight", "bishop", "queen", "king", "pawn", "check", "mate",
    ];
    // No 0/O/1/I to keep the code unambiguous when typed out.
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    let mut rng = rand::thread_rng();
    let word = WORDS.choose(&mut rng).unwrap_or(&"chess");
    let code: String = (0..4)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{}-{}", word, code)
}
