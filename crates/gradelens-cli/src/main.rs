//! gradelens CLI
//!
//! Terminal front end for the answer-sheet evaluation service: dashboard
//! statistics, evaluation history with explainability detail, model answer
//! management, and upload-and-evaluate.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use gradelens_client::ResultsClient;
use gradelens_core::{ModelAnswerDraft, aggregate};
use tracing_subscriber::{EnvFilter, fmt};

mod display;

use display::{DashboardView, EvaluationView, HistoryView, ModelAnswersView, ResultDetailView};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Review scored answer sheets from the terminal.
#[derive(Parser)]
#[command(name = "gradelens", version, propagate_version = true)]
struct Cli {
    /// Base URL of the evaluation service
    #[arg(long, env = "GRADELENS_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Verbosity level (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summary statistics, score trend, and recent evaluations
    Dashboard,
    /// Evaluation history
    Results {
        #[command(subcommand)]
        action: ResultsCommand,
    },
    /// Model answer management
    Answers {
        #[command(subcommand)]
        action: AnswersCommand,
    },
    /// Upload an answer sheet and score it against a model answer
    Evaluate {
        /// Answer sheet (pdf, png, jpg, jpeg; max 10 MB)
        #[arg(long)]
        file: PathBuf,
        /// Id of the model answer to score against
        #[arg(long)]
        answer: i64,
    },
}

#[derive(Subcommand)]
enum ResultsCommand {
    /// List every evaluation
    List,
    /// Show one evaluation with its explainability breakdown
    Show { id: i64 },
    /// Delete an evaluation and list what remains
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AnswersCommand {
    /// List model answers
    List,
    /// Create a model answer
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// Replace the title and text of a model answer
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// Delete a model answer
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("gradelens v{}", env!("CARGO_PKG_VERSION"));

    let client = ResultsClient::new(cli.api_url);
    match cli.command {
        Command::Dashboard => dashboard(&client).await,
        Command::Results { action } => results(&client, action).await,
        Command::Answers { action } => answers(&client, action).await,
        Command::Evaluate { file, answer } => {
            let output = client
                .upload_and_evaluate(&file, answer)
                .await
                .context("Evaluation failed")?;
            print!("{}", EvaluationView { output: &output });
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dashboard(client: &ResultsClient) -> anyhow::Result<()> {
    let records = client.list_results_or_empty().await;
    let stats = aggregate(&records);
    print!(
        "{}",
        DashboardView {
            stats: &stats,
            refreshed_at: chrono::Utc::now(),
        }
    );
    Ok(())
}

async fn results(client: &ResultsClient, action: ResultsCommand) -> anyhow::Result<()> {
    match action {
        ResultsCommand::List => {
            let records = client
                .list_results()
                .await
                .context("Failed to load results")?;
            print!("{}", HistoryView { records: &records });
        }
        ResultsCommand::Show { id } => {
            let records = client
                .list_results()
                .await
                .context("Failed to load results")?;
            let Some(record) = records.iter().find(|r| r.id == Some(id)) else {
                bail!("no evaluation result with id {id}");
            };
            print!("{}", ResultDetailView { record });
        }
        ResultsCommand::Delete { id } => {
            client
                .delete_result(id)
                .await
                .context("Failed to delete")?;
            println!("Deleted result {id}.");
            println!();
            let records = client
                .list_results()
                .await
                .context("Failed to load results")?;
            print!("{}", HistoryView { records: &records });
        }
    }
    Ok(())
}

async fn answers(client: &ResultsClient, action: AnswersCommand) -> anyhow::Result<()> {
    match action {
        AnswersCommand::List => {}
        AnswersCommand::Create { title, text } => {
            let draft = ModelAnswerDraft::new(&title, &text)?;
            let created = client
                .create_model_answer(&draft)
                .await
                .context("Failed to create model answer")?;
            println!("Created model answer {}.", created.id);
            println!();
        }
        AnswersCommand::Update { id, title, text } => {
            let draft = ModelAnswerDraft::new(&title, &text)?;
            client
                .update_model_answer(id, &draft)
                .await
                .context("Failed to update model answer")?;
            println!("Updated model answer {id}.");
            println!();
        }
        AnswersCommand::Delete { id, yes } => {
            let prompt = format!("Delete model answer {id}?");
            if !yes && !confirm(&prompt, io::stdin().lock(), io::stdout())? {
                println!("Cancelled.");
                return Ok(());
            }
            client
                .delete_model_answer(id)
                .await
                .context("Failed to delete model answer")?;
            println!("Deleted model answer {id}.");
            println!();
        }
    }

    let answers = client
        .list_model_answers()
        .await
        .context("Failed to load model answers")?;
    print!("{}", ModelAnswersView { answers: &answers });
    Ok(())
}

/// Ask a yes/no question; only `y` or `yes` (any case) confirms.
fn confirm(prompt: &str, mut input: impl BufRead, mut output: impl Write) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_evaluate_with_defaults() {
        let cli = Cli::try_parse_from([
            "gradelens",
            "evaluate",
            "--file",
            "sheet.png",
            "--answer",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Command::Evaluate { file, answer } => {
                assert_eq!(file, PathBuf::from("sheet.png"));
                assert_eq!(answer, 3);
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn evaluate_requires_model_answer() {
        assert!(Cli::try_parse_from(["gradelens", "evaluate", "--file", "sheet.png"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gradelens",
            "results",
            "show",
            "12",
            "--api-url",
            "http://grader:9000",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "http://grader:9000");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Results {
                action: ResultsCommand::Show { id: 12 }
            }
        ));
    }

    #[test]
    fn answer_delete_confirms_unless_yes() {
        let cli = Cli::try_parse_from(["gradelens", "answers", "delete", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Answers {
                action: AnswersCommand::Delete { id: 4, yes: false }
            }
        ));

        let cli = Cli::try_parse_from(["gradelens", "answers", "delete", "4", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Answers {
                action: AnswersCommand::Delete { id: 4, yes: true }
            }
        ));
    }

    #[test]
    fn confirm_accepts_only_yes() {
        for (reply, expected) in [
            ("y\n", true),
            ("YES\n", true),
            ("  yes  \n", true),
            ("n\n", false),
            ("\n", false),
            ("", false),
            ("yep\n", false),
        ] {
            let mut out = Vec::new();
            let got = confirm("Delete model answer 4?", reply.as_bytes(), &mut out).unwrap();
            assert_eq!(got, expected, "reply {reply:?}");
            assert_eq!(String::from_utf8(out).unwrap(), "Delete model answer 4? [y/N] ");
        }
    }
}
