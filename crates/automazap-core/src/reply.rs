//! Synthetic reply generation.
//!
//! Replies are picked from a fixed template pool per personality. Selection
//! is a pure function of `(personality, seed)`; the seed comes from a
//! [`ReplySource`] so tests can pin it.

use std::sync::atomic::{AtomicU64, Ordering};

use automazap_types::bot::Personality;
use rand::Rng;

/// Message content that opens a conversation. The reply to it is the bot's
/// welcome message instead of a template.
pub const START_CONVERSATION: &str = "start_conversation";

const FORMAL_REPLIES: &[&str] = &[
    "Agradeço o seu contato. Poderia fornecer mais detalhes para que eu possa auxiliá-lo adequadamente?",
    "Compreendo a sua solicitação. Estou verificando as informações disponíveis.",
    "Prezado cliente, sua mensagem foi recebida e será tratada com prioridade.",
    "Certamente. Permita-me esclarecer os pontos relevantes sobre o assunto.",
];

const FRIENDLY_REPLIES: &[&str] = &[
    "Oi! Que bom falar com você! Como posso ajudar hoje?",
    "Entendi! Vou te ajudar com isso, pode deixar.",
    "Ótima pergunta! Deixa eu ver o que posso fazer por você.",
    "Claro! Estou aqui pra isso. Me conta um pouco mais?",
];

const PLAYFUL_REPLIES: &[&str] = &[
    "Opa! Chegou mensagem nova por aqui! Bora resolver isso?",
    "Hmm, deixa eu consultar minha bola de cristal... pronto, tenho uma ideia!",
    "Uau, que pergunta incrível! Segura que lá vem resposta!",
    "Aqui é o seu bot favorito! Manda ver que eu te ajudo!",
];

/// Template pool for a personality. Never empty.
pub fn pool(personality: Personality) -> &'static [&'static str] {
    match personality {
        Personality::Formal => FORMAL_REPLIES,
        Personality::Friendly => FRIENDLY_REPLIES,
        Personality::Playful => PLAYFUL_REPLIES,
    }
}

/// Pick the template at `seed` (modulo pool size) for `personality`.
pub fn select_reply(personality: Personality, seed: u64) -> &'static str {
    let pool = pool(personality);
    pool[(seed % pool.len() as u64) as usize]
}

/// Source of selection seeds.
pub trait ReplySource: Send + Sync {
    fn next_seed(&self) -> u64;
}

/// Seeds from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomReplies;

impl ReplySource for RandomReplies {
    fn next_seed(&self) -> u64 {
        rand::rng().random()
    }
}

/// Deterministic seeds: `start`, `start + 1`, ...
#[derive(Debug, Default)]
pub struct SequentialReplies {
    next: AtomicU64,
}

impl SequentialReplies {
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl ReplySource for SequentialReplies {
    fn next_seed(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
