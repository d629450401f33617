// Generator data uji: users, pasangan, dan messages lewat fan-out asli
use std::collections::HashSet;

use anyhow::Context;
use chat_service::config::{AppConfig, AppState};
use chat_service::domain::SendMessageRequest;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const WORDS: &[&str] = &[
    "halo", "apa", "kabar", "besok", "jadi", "ketemu", "jam", "berapa", "oke", "siap",
    "nanti", "aku", "kabari", "lagi", "di", "jalan", "makasih", "ya", "sampai", "jumpa",
];

struct SeedConfig {
    users: usize,
    pairs: usize,
    max_messages: usize,
}

fn env_usize(key: &str, default: usize) -> anyhow::Result<usize> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("{key} tidak valid: {raw}")),
        Err(_) => Ok(default),
    }
}

impl SeedConfig {
    fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            users: env_usize("SEED_USERS", 50)?,
            pairs: env_usize("SEED_PAIRS", 100)?,
            max_messages: env_usize("SEED_MAX_MESSAGES", 30)?,
        };
        anyhow::ensure!(config.users >= 2, "SEED_USERS minimal 2");
        Ok(config)
    }

    // Jumlah pasangan unik tidak bisa melebihi n*(n-1)/2
    fn pair_count(&self) -> usize {
        self.pairs.min(self.users * (self.users - 1) / 2)
    }
}

fn random_content(rng: &mut impl Rng) -> String {
    let len = rng.random_range(1..=12);
    (0..len)
        .filter_map(|_| WORDS.choose(&mut *rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn random_pairs(users: &[Uuid], count: usize, rng: &mut impl Rng) -> Vec<(Uuid, Uuid)> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::with_capacity(count);

    while pairs.len() < count {
        let a = users[rng.random_range(0..users.len())];
        let b = users[rng.random_range(0..users.len())];
        if a == b {
            continue;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        if seen.insert(key) {
            pairs.push((a, b));
        }
    }

    pairs
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,chat_service=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let seed = SeedConfig::from_env()?;
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let state = AppState::new(config).await?;

    let mut rng = rand::rng();
    let users: Vec<Uuid> = (0..seed.users).map(|_| Uuid::new_v4()).collect();
    let pairs = random_pairs(&users, seed.pair_count(), &mut rng);
    tracing::info!("Seeding {} users, {} pairs", users.len(), pairs.len());

    let mut written = 0usize;
    let mut failed = 0usize;
    for (index, (a, b)) in pairs.iter().enumerate() {
        let count = rng.random_range(0..=seed.max_messages);
        for _ in 0..count {
            // Sender bergantian secara acak di dalam pasangan
            let (sender, receiver) = if rng.random_bool(0.5) { (a, b) } else { (b, a) };
            let request = SendMessageRequest {
                sender_id: sender.to_string(),
                receiver_id: receiver.to_string(),
                content: random_content(&mut rng),
                message_id: None,
            };

            match state.chat.writer.send_message(&request).await {
                Ok(_) => written += 1,
                Err(err) => {
                    failed += 1;
                    tracing::warn!("Seed message gagal: {}", err);
                }
            }
        }

        if (index + 1) % 10 == 0 {
            tracing::info!("Progress: {}/{} pairs, {} messages", index + 1, pairs.len(), written);
        }
    }

    tracing::info!("Seed selesai: {} messages ditulis, {} gagal", written, failed);
    state.chat.close().await;

    Ok(())
}
