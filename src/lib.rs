pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;
pub mod tts;

use agent::InterviewAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("History Store Type: {}", args.history_type);
    info!("History Store Host: {}", args.history_host);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Scripts Path: {}", args.scripts_path);
    info!("TTS Provider: {}", args.tts_provider);
    info!("-------------------------");

    let agent = Arc::new(InterviewAgent::new(args.clone()).await?);
    let addr = args.server_addr.clone();
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
