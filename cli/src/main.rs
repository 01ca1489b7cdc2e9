//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    ConnectorPort, ConversationLogger, CouncilConfig, GenerateTitleUseCase, LlmGateway,
    NoConversationLogger, NoProgress, OptimizePromptUseCase, PrepareContextUseCase,
    ProgressNotifier, RunCouncilInput, RunCouncilUseCase, ToolExecutorPort,
};
use council_domain::{
    ConnectorRequest, ImageAttachment, PipelineEvent, PipelineRun, PipelineState, PreviousIteration,
};
use council_infrastructure::{
    ConfigLoader, FileConfig, HttpConnectors, JsonlConversationLogger, LocalFileContextLoader,
    LocalToolExecutor, RoutingGateway,
};
use council_presentation::{
    Cli, ConsoleFormatter, OutputFormat, OutputFormatter, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting llm-council");
    if cli.is_info_command() && cli.question.is_some() {
        warn!("Question ignored by --show-config, --list-tools and --pricing");
    }

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&cli, &mut config);

    if cli.pricing {
        print!("{}", ConsoleFormatter::format_pricing(&config.pricing_table()));
        return Ok(());
    }

    // === Dependency Injection ===
    let tool_executor = build_tool_executor(&config);
    let connectors = Arc::new(HttpConnectors::new());

    if cli.list_tools {
        print!(
            "{}",
            ConsoleFormatter::format_tools(tool_executor.tool_spec().all(), &connectors.available())
        );
        return Ok(());
    }

    let question = match &cli.question {
        Some(q) if !q.trim().is_empty() => q.clone(),
        _ => bail!("A question is required. Run with --help for usage."),
    };

    let issues = config.validate();
    if !issues.is_empty() {
        let messages: Vec<String> = issues.iter().map(|i| format!("  - {}", i)).collect();
        bail!("Invalid configuration:\n{}", messages.join("\n"));
    }

    let council_config = config.to_council_config()?;
    let gateway: Arc<dyn LlmGateway> = Arc::new(
        RoutingGateway::from_config(&config.providers).context("Failed to build providers")?,
    );
    let logger: Arc<dyn ConversationLogger> = match &config.logging.conversation_log {
        Some(path) => Arc::new(
            JsonlConversationLogger::open(path)
                .with_context(|| format!("Cannot open conversation log {}", path.display()))?,
        ),
        None => Arc::new(NoConversationLogger),
    };

    let use_case = RunCouncilUseCase::new(
        gateway.clone(),
        tool_executor.clone(),
        council_config.execution().clone(),
    )
    .with_conversation_logger(logger)
    .with_pricing(council_config.pricing().clone());

    if cli.title {
        let title = GenerateTitleUseCase::new(
            gateway.clone(),
            council_config.title_model().clone(),
            council_config.execution().title_timeout,
        )
        .execute(&question)
        .await;
        println!("Title: {}", title);
    }

    let mut query = question;
    let mut system_prompt = cli.system_prompt.clone();

    if cli.optimize {
        let optimized = OptimizePromptUseCase::new(
            gateway.clone(),
            council_config.council().chairman().clone(),
        )
        .execute(system_prompt.as_deref(), &query)
        .await;
        if optimized.optimized && !cli.quiet {
            eprintln!("Optimized query: {}", optimized.query);
        }
        query = optimized.query;
        system_prompt = optimized.system_prompt;
    }

    // Context from connectors and attachments, prepared once for all iterations
    let requests = parse_connectors(&cli.connectors, &query)?;
    let context = PrepareContextUseCase::new(connectors)
        .with_files(Arc::new(LocalFileContextLoader::new(config.files.root.clone())))
        .execute(cli.conversation.as_deref(), &requests)
        .await;
    let file_text = (!context.text.trim().is_empty()).then(|| context.text.clone());

    let mut previous = match &cli.previous {
        Some(path) => Some(load_previous(path)?),
        None => None,
    };

    let cancellation = CancellationToken::new();
    {
        let token = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; stopping after the current stage");
                token.cancel();
            }
        });
    }

    let tools = if cli.tools.is_empty() {
        council_config.default_tools().to_vec()
    } else {
        cli.tools.clone()
    };

    let iterations = cli.iterations.max(1);
    let mut last_run: Option<PipelineRun> = None;

    for iteration in 1..=iterations {
        if iterations > 1 && !cli.quiet {
            eprintln!("\n=== Iteration {}/{} ===", iteration, iterations);
        }

        let input = build_input(
            &council_config,
            &query,
            system_prompt.clone(),
            file_text.clone(),
            &context.images,
            tools.clone(),
            previous.clone(),
            cli.share_context,
        )
        .with_cancellation(cancellation.clone());

        let run = run_once(&use_case, input, &cli).await?;
        print_run(&run, cli.output);

        if run.state() == PipelineState::Failed {
            last_run = Some(run);
            break;
        }

        // Next iteration follows the reflection's suggestions
        if let Some(reflection) = run.reflection() {
            if !reflection.suggested_query.trim().is_empty() {
                query = reflection.suggested_query.clone();
            }
            if !reflection.suggested_system_prompt.trim().is_empty() {
                system_prompt = Some(reflection.suggested_system_prompt.clone());
            }
        }
        previous = run.to_previous_iteration().or(previous);
        last_run = Some(run);
    }

    if let Some(path) = &cli.save_iteration {
        match last_run.as_ref().and_then(PipelineRun::to_previous_iteration) {
            Some(bundle) => {
                let json = serde_json::to_string_pretty(&bundle)?;
                std::fs::write(path, json)
                    .with_context(|| format!("Cannot write {}", path.display()))?;
                info!("Saved iteration to {}", path.display());
            }
            None => warn!("No synthesis to save; {} not written", path.display()),
        }
    }

    if let Some(failure) = last_run.as_ref().and_then(PipelineRun::failure)
        && last_run.as_ref().map(PipelineRun::state) == Some(PipelineState::Failed)
    {
        bail!("Council run failed at stage {}: {}", failure.stage.number(), failure.message);
    }

    Ok(())
}

/// `-v` picks the level, `RUST_LOG` overrides it, `--log-file` adds a
/// non-blocking file writer.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match &cli.log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    if !cli.model.is_empty() {
        config.council.models = cli.model.clone();
    }
    if let Some(chairman) = &cli.chairman {
        config.council.chairman = Some(chairman.clone());
    }
}

fn build_tool_executor(config: &FileConfig) -> Arc<dyn ToolExecutorPort> {
    let executor = LocalToolExecutor::new();
    if config.tools.code_execution {
        Arc::new(executor.with_code_execution(Duration::from_secs(config.tools.code_timeout_secs)))
    } else {
        Arc::new(executor)
    }
}

/// `--connector` values; a `web_search` without a query searches for the question.
fn parse_connectors(raw: &[String], question: &str) -> Result<Vec<ConnectorRequest>> {
    raw.iter()
        .map(|spec| {
            let mut request: ConnectorRequest =
                spec.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            if request.name == "web_search"
                && request.config_str("query").is_none()
                && let Some(config) = request.config.as_object_mut()
            {
                config.insert("query".to_string(), serde_json::Value::from(question));
            }
            Ok(request)
        })
        .collect()
}

fn load_previous(path: &Path) -> Result<PreviousIteration> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a saved iteration", path.display()))
}

#[allow(clippy::too_many_arguments)]
fn build_input(
    config: &CouncilConfig,
    query: &str,
    system_prompt: Option<String>,
    file_text: Option<String>,
    images: &[ImageAttachment],
    tools: Vec<String>,
    previous: Option<PreviousIteration>,
    share: bool,
) -> RunCouncilInput {
    config
        .to_run_input(query)
        .with_system_prompt(system_prompt)
        .with_file_context(file_text, images.to_vec())
        .with_tools(tools)
        .with_previous_iteration(previous, share)
}

/// Run once, rendering the event stream as it arrives.
async fn run_once(use_case: &RunCouncilUseCase, input: RunCouncilInput, cli: &Cli) -> Result<PipelineRun> {
    let show_progress = !cli.quiet && cli.output != OutputFormat::Events;
    let (notifier, report): (Arc<dyn ProgressNotifier>, Box<dyn Fn(&PipelineEvent)>) =
        if !show_progress {
            (Arc::new(NoProgress) as Arc<dyn ProgressNotifier>, Box::new(|_: &PipelineEvent| {}))
        } else if std::io::stderr().is_terminal() {
            let reporter = Arc::new(ProgressReporter::new());
            let sink = reporter.clone();
            (reporter as Arc<dyn ProgressNotifier>, Box::new(move |event: &PipelineEvent| sink.report_event(event)))
        } else {
            let simple = Arc::new(SimpleProgress);
            let sink = simple.clone();
            (simple as Arc<dyn ProgressNotifier>, Box::new(move |event: &PipelineEvent| sink.report_event(event)))
        };

    let (mut events, handle) = use_case.spawn(input, notifier);
    while let Some(event) = events.recv().await {
        if cli.output == OutputFormat::Events {
            println!("{}", ConsoleFormatter::format_event(&event));
        } else {
            report(&event);
        }
    }

    let run = handle.await.context("Council task panicked")??;
    Ok(run)
}

fn print_run(run: &PipelineRun, format: OutputFormat) {
    let formatter: &dyn OutputFormatter = &ConsoleFormatter;
    let output = match format {
        OutputFormat::Full => formatter.format(run),
        OutputFormat::Synthesis => formatter.format_synthesis_only(run),
        OutputFormat::Json => formatter.format_json(run),
        OutputFormat::Events => return,
    };
    println!("{}", output);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_search_connector_defaults_to_question() {
        let raw = vec![
            "web_search".to_string(),
            r#"url_content:{"url":"https://example.com"}"#.to_string(),
        ];
        let requests = parse_connectors(&raw, "rust borrow checker").unwrap();
        assert_eq!(requests[0].config_str("query"), Some("rust borrow checker"));
        assert_eq!(requests[1].config_str("query"), None);
    }

    #[test]
    fn test_explicit_search_query_is_kept() {
        let raw = vec![r#"web_search:{"query":"tokio"}"#.to_string()];
        let requests = parse_connectors(&raw, "other").unwrap();
        assert_eq!(requests[0].config_str("query"), Some("tokio"));
    }

    #[test]
    fn test_cli_overrides_council() {
        let cli = Cli::try_parse_from(["llm-council", "-m", "a", "-m", "b", "--chairman", "c", "q"])
            .unwrap();
        let mut config = FileConfig::default();
        apply_cli_overrides(&cli, &mut config);
        assert_eq!(config.council.models, vec!["a", "b"]);
        assert_eq!(config.council.chairman.as_deref(), Some("c"));
    }

    #[test]
    fn test_load_previous_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prev.json");
        std::fs::write(
            &path,
            r#"{"query":"q","stage3_response":"a","critique":"c"}"#,
        )
        .unwrap();
        let prev = load_previous(&path).unwrap();
        assert_eq!(prev.query, "q");
        assert!(load_previous(&dir.path().join("missing.json")).is_err());
    }
}
