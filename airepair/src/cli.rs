//! Command-line surface. Values given here override the config file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the AI code repair service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the repair service
    #[arg(long, env = "AIREPAIR_BASE_URL")]
    pub base_url: Option<String>,

    /// Color theme [dark|catppuccin-mocha]
    #[arg(long)]
    pub theme: Option<String>,

    /// Default source language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Pre-load this file into the code input
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Analyze, review the plan, repair, then iterate with feedback (default)
    #[default]
    Review,
    /// Paste code and get a fixed version back as a chat reply
    Chat,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or_default()
    }
}
