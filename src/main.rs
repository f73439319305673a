// ABOUTME: CLI entry point for the wireframe-to-code converter
// ABOUTME: Drives submission, the progress display, and outcome reporting

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod artifact;
mod error;
mod input;
mod progress;
mod remote;

use progress::{OutcomeSlot, ProgressReporter};
use remote::client::interpret_value;
use remote::{JobOutcome, JobRequest, WorkflowClient, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(
    name = "wireframe2code",
    version,
    about = "Converts a wireframe image into frontend code through a remote AI workflow"
)]
struct Args {
    /// Wireframe image to convert (png, jpg, jpeg, gif, webp)
    image: PathBuf,

    /// Free-text instructions for the code generation models
    #[arg(short, long, default_value = "")]
    prompt: String,

    /// Canned instruction preset appended to the prompt
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Workflow webhook URL
    #[arg(long, default_value = "http://localhost:5678/webhook/wireframe2code")]
    webhook_url: String,

    /// Workflow REST API base URL, used for detached status checks
    #[arg(long, default_value = "http://localhost:5678/api/v1")]
    api_url: String,

    /// Seconds to wait for the workflow before giving up
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Where the generated HTML is written
    #[arg(short, long, default_value = "generated-page.html")]
    output: PathBuf,

    /// Also write a JSON package with the html and capture timestamp
    #[arg(long)]
    package: Option<PathBuf>,

    /// Start the workflow and poll for completion instead of blocking
    #[arg(long)]
    detached: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    DarkMode,
    CardLayout,
    Minimal,
    Colorful,
}

impl Preset {
    fn instruction(self) -> &'static str {
        match self {
            Preset::DarkMode => {
                "Make it modern with dark mode, use dark backgrounds and light text"
            }
            Preset::CardLayout => "Use card-based layout with shadows and rounded corners",
            Preset::Minimal => "Keep it minimal and clean, lots of whitespace, simple colors",
            Preset::Colorful => "Use vibrant colors, gradients, and modern UI trends",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let prompt = compose_prompt(&args.prompt, args.preset);
    let request = input::load_wireframe(&args.image, prompt)?;
    info!(
        image = %request.image_name,
        bytes = request.image_bytes.len(),
        endpoint = %args.webhook_url,
        "submitting wireframe"
    );

    let client = WorkflowClient::new(args.webhook_url, args.api_url, args.timeout)?;

    let outcome = if args.detached {
        run_detached(&client, &request).await?
    } else {
        run_blocking(client, request).await
    };

    present(outcome, &args.output, args.package.as_deref())
}

fn compose_prompt(prompt: &str, preset: Option<Preset>) -> String {
    match preset {
        None => prompt.to_string(),
        Some(preset) if prompt.is_empty() => preset.instruction().to_string(),
        Some(preset) => format!("{}\n{}", prompt, preset.instruction()),
    }
}

/// Primary flow: one spawned task blocks on the network call while the
/// foreground walks the simulated progress sequence.
async fn run_blocking(client: WorkflowClient, request: JobRequest) -> JobOutcome {
    let slot = Arc::new(OutcomeSlot::new());

    let submit_slot = slot.clone();
    let submission = tokio::spawn(async move {
        let outcome = client.submit(&request).await;
        submit_slot.complete(outcome);
    });

    let bar = progress_bar();
    ProgressReporter::default()
        .run(&slot, |state| {
            bar.set_position((state.fraction_complete * 100.0) as u64);
            bar.set_message(state.stage_label.clone());
        })
        .await;
    bar.finish_with_message("Processing complete");

    // The reporter only returns after the slot was completed.
    let _ = submission.await;
    slot.take().unwrap_or_else(|| JobOutcome::TransportError {
        message: "submission task ended without an outcome".to_string(),
    })
}

/// Detached flow: fire-and-return submission, then status polling against
/// the workflow REST API.
async fn run_detached(client: &WorkflowClient, request: &JobRequest) -> Result<JobOutcome> {
    let execution_id = client.submit_detached(request).await?;
    info!(execution_id = %execution_id, "workflow started; polling for completion");

    let finished = client
        .poll_until_complete(&execution_id, |status| {
            if !status.finished {
                info!("workflow still running");
            }
        })
        .await?;

    Ok(match finished.data.and_then(|data| data.result_data) {
        Some(value) => interpret_value(value),
        None => JobOutcome::MalformedResponse {
            message: "execution finished without result data".to_string(),
        },
    })
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}") {
        bar.set_style(style);
    }
    bar
}

fn present(outcome: JobOutcome, output: &Path, package: Option<&Path>) -> Result<()> {
    match outcome {
        JobOutcome::Success { html, captured_at } => {
            // Bare-text successes carry no timestamp; stamp at save time.
            let captured_at = captured_at.unwrap_or_else(artifact::current_timestamp);
            fs::write(output, &html)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                chars = html.len(),
                path = %output.display(),
                captured_at = %captured_at,
                "generated code written"
            );
            if let Some(package_path) = package {
                write_package(package_path, &html, &captured_at)?;
                info!(path = %package_path.display(), "package written");
            }
            Ok(())
        }
        JobOutcome::IncompleteResult {
            html_length,
            react_length,
            tailwind_key_count,
            validation_info,
            raw_html_prefix,
        } => {
            warn!(
                html_length,
                react_length,
                tailwind_key_count,
                validation = %validation_info,
                "workflow responded but the HTML is incomplete"
            );
            if !raw_html_prefix.is_empty() {
                warn!("first chars of html: {}", raw_html_prefix);
            }
            warn!("the upstream workflow may still be running; check its execution logs");
            Ok(())
        }
        JobOutcome::TransportError { message } => {
            bail!("workflow request failed: {}", message)
        }
        JobOutcome::MalformedResponse { message } => {
            bail!("workflow response unusable: {}", message)
        }
    }
}

fn write_package(path: &Path, html: &str, captured_at: &str) -> Result<()> {
    let package = serde_json::json!({
        "html": html,
        "timestamp": captured_at,
    });
    let body = serde_json::to_string_pretty(&package).context("Failed to serialize package")?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_prompt_with_preset_only() {
        let prompt = compose_prompt("", Some(Preset::Minimal));
        assert!(prompt.contains("minimal"));
    }

    #[test]
    fn test_compose_prompt_appends_preset() {
        let prompt = compose_prompt("two columns", Some(Preset::DarkMode));
        assert!(prompt.starts_with("two columns\n"));
        assert!(prompt.contains("dark mode"));
    }

    #[test]
    fn test_compose_prompt_without_preset() {
        assert_eq!(compose_prompt("as is", None), "as is");
    }

    #[test]
    fn test_package_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        write_package(&path, "<html></html>", "2026-08-30 12:00:00").unwrap();

        let body = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["html"], "<html></html>");
        assert_eq!(parsed["timestamp"], "2026-08-30 12:00:00");
    }

    #[test]
    fn test_present_writes_success_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("page.html");
        let outcome = JobOutcome::Success {
            html: "<html>done</html>".to_string(),
            captured_at: None,
        };

        present(outcome, &output, None).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "<html>done</html>");
    }

    #[test]
    fn test_present_fails_on_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = JobOutcome::TransportError {
            message: "endpoint unreachable".to_string(),
        };

        let err = present(outcome, &dir.path().join("page.html"), None).unwrap_err();
        assert!(err.to_string().contains("endpoint unreachable"));
    }

    #[test]
    fn test_present_treats_incomplete_as_non_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("page.html");
        let outcome = JobOutcome::IncompleteResult {
            html_length: 12,
            react_length: 0,
            tailwind_key_count: 0,
            validation_info: serde_json::json!({}),
            raw_html_prefix: "<html></html".to_string(),
        };

        present(outcome, &output, None).unwrap();
        assert!(!output.exists());
    }
}
