use crate::rules::default_rules;
use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use markweave_parser::{ParseOptions, QuoteStyle, SerializeOptions};
use markweave_store::RecordStore;
use markweave_transform::{RunConfig, RunOutcome, TaskStatus, Transform};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Quote {
    Double,
    Single,
}

impl From<Quote> for QuoteStyle {
    fn from(quote: Quote) -> Self {
        match quote {
            Quote::Double => QuoteStyle::Double,
            Quote::Single => QuoteStyle::Single,
        }
    }
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Markup file to transform
    pub input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Fail on unterminated input instead of keeping the truncated tree
    #[arg(long)]
    pub strict: bool,

    /// Attribute quoting style
    #[arg(long, value_enum, default_value_t = Quote::Double)]
    pub quote: Quote,

    /// Render empty elements as self-closing tags
    #[arg(long)]
    pub self_close: bool,

    /// Append the run outcome to this audit log
    #[arg(long)]
    pub audit_log: Option<PathBuf>,
}

pub async fn transform(args: TransformArgs) -> Result<()> {
    let markup = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let tr = Transform::new();
    let rules = tr.rules()?;
    let (active, blocking) = default_rules();
    rules.add_rules(active);
    rules.add_unable_rules(blocking);

    let config = RunConfig {
        parse_options: ParseOptions {
            strict: args.strict,
        },
        ..Default::default()
    };
    let options = SerializeOptions {
        quote: args.quote.into(),
        self_close_empty: args.self_close,
    };

    let outcome = tr.transform(&markup, config, options).await?;

    if let Some(path) = &args.audit_log {
        audit(path, &args.input, &outcome);
    }

    match outcome {
        RunOutcome::Fulfilled { content } => {
            match &args.out {
                Some(path) => {
                    fs::write(path, &content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("{} wrote {}", "✓".green(), path.display());
                }
                None => println!("{content}"),
            }
            Ok(())
        }
        RunOutcome::Unsupported => {
            eprintln!(
                "{} document contains blocked constructs; nothing was transformed",
                "✗".red()
            );
            bail!("unsupported document");
        }
        RunOutcome::Failed { tasks } => {
            let failed = tasks.iter().filter(|task| task.failed()).count();
            eprintln!(
                "{} {} of {} handlers failed",
                "✗".red(),
                failed,
                tasks.len()
            );
            for task in tasks.iter().filter(|task| task.failed()) {
                let reason = match &task.status {
                    TaskStatus::Rejected(message) => message.clone(),
                    TaskStatus::Fulfilled(_) => "handler reported failure".to_string(),
                };
                eprintln!("  {} {} - {}", "✗".red(), task.rule, reason.red());
            }
            bail!("transformation failed");
        }
    }
}

/// Fire-and-forget: a broken audit log never fails the transformation.
fn audit(path: &Path, input: &Path, outcome: &RunOutcome) {
    let result = RecordStore::open(path).and_then(|mut store| {
        store.add(
            "transform",
            json!({
                "input": input.display().to_string(),
                "outcome": outcome,
            }),
        )
    });
    if let Err(err) = result {
        warn!(error = %err, "audit log append failed");
    }
}
