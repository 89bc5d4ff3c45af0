// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! MindMapr CLI entrypoint.
//!
//! Without a subcommand this opens the terminal editor on the account's workspace. The other
//! subcommands manage stored diagrams without a terminal UI.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use tracing::info;

use mindmapr::format::to_json_pretty;
use mindmapr::interact::NullPresenter;
use mindmapr::logging::{init_logging, LogFormat, LogTarget};
use mindmapr::model::{AccountId, DiagramId, LoadReport};
use mindmapr::session::EditSession;
use mindmapr::store::{DocumentStore, WriteDurability, TIMESTAMP_FORMAT};

const DEFAULT_ACCOUNT: &str = "default";

/// MindMapr - edit mind maps in the terminal
#[derive(Debug, Parser)]
#[command(name = "mindmapr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Root directory holding one workspace per account
    #[arg(long, env = "MINDMAPR_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Account whose workspace is used (defaults to $USER)
    #[arg(long, env = "MINDMAPR_ACCOUNT", global = true)]
    account: Option<String>,

    /// fsync every write and its parent directory
    #[arg(long, global = true)]
    durable_writes: bool,

    /// Log level or filter directive (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format
    #[arg(
        long,
        global = true,
        value_parser = PossibleValuesParser::new(LogFormat::variants().iter().copied())
    )]
    log_format: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the editor, optionally on a stored diagram
    Edit {
        diagram_id: Option<String>,
    },
    /// List the account's diagrams, most recently modified first
    List,
    /// Store a new, empty diagram
    New {
        title: String,
    },
    /// Delete a stored diagram
    Delete {
        diagram_id: String,
    },
    /// Import a diagram file; its file stem becomes the diagram id
    Import {
        path: PathBuf,
    },
    /// Print a stored diagram as JSON
    Show {
        diagram_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Edit { diagram_id: None });

    let target = match command {
        Command::Edit { .. } => {
            fs::create_dir_all(&cli.data_dir).with_context(|| {
                format!("cannot create data directory {}", cli.data_dir.display())
            })?;
            LogTarget::file_in(&cli.data_dir)
        }
        _ => LogTarget::Stderr,
    };
    init_logging(cli.log_level.as_deref(), cli.log_format.as_deref(), &target)?;

    let account = resolve_account(cli.account)?;
    let durability = if cli.durable_writes {
        WriteDurability::Durable
    } else {
        WriteDurability::BestEffort
    };
    let store = DocumentStore::new(&cli.data_dir).with_durability(durability);
    let mut session = EditSession::new(store, account)?;

    match command {
        Command::Edit { diagram_id } => {
            let diagram_id = diagram_id.map(parse_diagram_id).transpose()?;
            info!(account = %session.account(), "starting editor");
            mindmapr::tui::run(session, diagram_id.as_ref()).context("terminal UI failed")?;
        }
        Command::List => {
            for meta in session.list()? {
                println!(
                    "{}\t{}\t{}",
                    meta.diagram_id,
                    meta.modified.format(TIMESTAMP_FORMAT),
                    meta.title
                );
            }
        }
        Command::New { title } => {
            let meta = session.new_diagram(&title, &mut NullPresenter)?;
            println!("{}", meta.diagram_id);
        }
        Command::Delete { diagram_id } => {
            let diagram_id = parse_diagram_id(diagram_id)?;
            if !session.delete(&diagram_id, &mut NullPresenter)? {
                anyhow::bail!("no diagram {diagram_id} for account {}", session.account());
            }
        }
        Command::Import { path } => {
            let (meta, report) = session.import(&path, &mut NullPresenter)?;
            print_report(&path, &report);
            println!("{}", meta.diagram_id);
        }
        Command::Show { diagram_id } => {
            let diagram_id = parse_diagram_id(diagram_id)?;
            let report = session.open(&diagram_id, &mut NullPresenter)?;
            print_report(&session.store().body_path(session.account(), &diagram_id), &report);
            println!("{}", to_json_pretty(&session.editor().diagram().to_document())?);
        }
    }

    Ok(())
}

fn resolve_account(flag: Option<String>) -> Result<AccountId> {
    let name = flag
        .or_else(|| std::env::var("USER").ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ACCOUNT.to_owned());
    AccountId::new(name.clone()).with_context(|| format!("invalid account name {name:?}"))
}

fn parse_diagram_id(raw: String) -> Result<DiagramId> {
    DiagramId::new(raw.clone()).with_context(|| format!("invalid diagram id {raw:?}"))
}

fn print_report(path: &Path, report: &LoadReport) {
    for dropped in &report.dropped {
        eprintln!(
            "{}: dropped {:?} {}: {}",
            path.display(),
            dropped.kind,
            dropped.id.as_deref().unwrap_or("<no id>"),
            dropped.reason
        );
    }
}
