//! Interactive CLI chat with a bot.
//!
//! The loop sends each line through the store and prints the bot's reply
//! when it arrives on the event bus. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
