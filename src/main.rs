mod agent;
mod cli;
mod config;
mod context;
mod error;
mod format;
mod history;
mod llm;
mod models;
mod server;
mod tts;

use agent::InterviewAgent;
use clap::Parser;
use cli::Args;
use dotenv::dotenv;
use server::Server;
use std::error::Error;
use std::sync::Arc;
use log::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

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
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
