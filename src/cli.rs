//! Command definitions and dispatch

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::debug;

use locator_synth::{GenerationResult, ResultSink, SynthError, Synthesizer};
use tree_adapter::{NodeId, TreeAdapter, VirtualTree, XPathOracle};

#[derive(Parser)]
#[command(name = "locsynth", version, about = "Locator synthesis over virtual documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Synthesize a locator for one element of a document
    Generate {
        /// Path to a virtual document in JSON form
        #[arg(long)]
        tree: PathBuf,

        /// id attribute of the target element
        #[arg(long)]
        id: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check an expression against an expected element
    Validate {
        /// Path to a virtual document in JSON form
        #[arg(long)]
        tree: PathBuf,

        /// Expression to evaluate
        #[arg(long)]
        expression: String,

        /// id attribute of the expected element
        #[arg(long)]
        id: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Sink that prints each delivered result to stdout
struct StdoutSink {
    pretty: bool,
}

#[async_trait]
impl ResultSink for StdoutSink {
    async fn deliver(&self, result: &GenerationResult) -> Result<(), SynthError> {
        let rendered = render(result, self.pretty).map_err(|e| SynthError::Internal(e.to_string()))?;
        println!("{rendered}");
        Ok(())
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate { tree, id, pretty } => {
            let document = load_tree(&tree)?;
            let target = target_by_id(&document, &id)?;
            let oracle = XPathOracle::new(&document);
            let synthesizer = Synthesizer::new();
            let sink = StdoutSink { pretty };
            let result = synthesizer
                .generate_and_deliver(&document, &oracle, target, &sink)
                .await;
            debug!(success = result.success, "generation finished");
            if !result.success {
                bail!(
                    "generation failed: {}",
                    result.error.as_deref().unwrap_or("unknown")
                );
            }
            Ok(())
        }
        Command::Validate {
            tree,
            expression,
            id,
            pretty,
        } => {
            let document = load_tree(&tree)?;
            let target = target_by_id(&document, &id)?;
            let oracle = XPathOracle::new(&document);
            let synthesizer = Synthesizer::new();
            let report = synthesizer.validate(&oracle, document.root(), &expression, target);
            println!("{}", render(&report, pretty)?);
            if !report.valid {
                bail!(
                    "validation failed: {}",
                    report.message.as_deref().unwrap_or("expression does not resolve to the target")
                );
            }
            Ok(())
        }
    }
}

fn load_tree(path: &Path) -> Result<VirtualTree> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    VirtualTree::from_json(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn target_by_id(document: &VirtualTree, id: &str) -> Result<NodeId> {
    document
        .node_by_id(id)
        .with_context(|| format!("no element with id '{id}' in the document"))
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}
