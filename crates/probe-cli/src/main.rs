//! probe - LLM-driven end-to-end browser test runner

mod config;
mod prompt;
mod testfile;
mod ui;
mod verdict;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use clap::Parser;

use probe_agent::{
    LoopConfig, ProviderTransport, RunOutcome, SamplingLoop, SharedTool, ToolRegistry,
};
use probe_ai::{ApiProvider, ModelClient};
use probe_browser::{ComputerConfig, ComputerTool, Driver, SessionConfig, WebDriverSession};

/// probe - run natural-language end-to-end tests against a live web app.
///
/// Exit codes: 0 = all tests passed, 1 = at least one test failed,
/// 2 = inconclusive (a run aborted before reaching a verdict).
#[derive(Parser, Debug)]
#[command(name = "probe")]
#[command(author, version, about)]
struct Args {
    /// Website under test (required for --test and --interactive,
    /// overrides the suite's website)
    #[arg(short, long)]
    url: Option<String>,

    /// A single test description to run against --url
    #[arg(short, long)]
    test: Option<String>,

    /// YAML test suite (website + tests list)
    #[arg(short = 'f', long)]
    test_file: Option<PathBuf>,

    /// Single test case file (website + description)
    #[arg(long)]
    case_file: Option<PathBuf>,

    /// Read test commands from stdin until 'exit'
    #[arg(short, long)]
    interactive: bool,

    /// Model to use (default depends on provider)
    #[arg(short, long)]
    model: Option<String>,

    /// Provider (anthropic, bedrock)
    #[arg(short, long)]
    provider: Option<String>,

    /// chromedriver endpoint
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    no_headless: bool,

    /// Max output tokens per model call
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Safety bound on model turns per test
    #[arg(long, default_value_t = 50)]
    max_turns: u32,

    /// Where screenshots are written
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,

    /// Skip the follow-up screenshot after each action
    #[arg(long)]
    no_audit_screenshots: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_provider(s: &str) -> anyhow::Result<ApiProvider> {
    match s.to_lowercase().as_str() {
        "anthropic" => Ok(ApiProvider::Anthropic),
        "bedrock" => Ok(ApiProvider::Bedrock),
        other => Err(anyhow!("unknown provider '{other}' (expected anthropic or bedrock)")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestStatus {
    Pass,
    Fail,
    Inconclusive,
}

/// One resolved test ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedTest {
    name: Option<String>,
    description: String,
    expected_response: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("probe=debug")
            .init();
    }

    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // CLI takes precedence over config file
    let provider = parse_provider(
        args.provider
            .as_deref()
            .or(cfg.provider.as_deref())
            .unwrap_or("anthropic"),
    )?;
    let model = args
        .model
        .clone()
        .or(cfg.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());
    let api_key = cfg.get_api_key(provider).ok_or_else(|| {
        anyhow!(
            "no API key for {provider:?}: set {} or add it to {}",
            provider.api_key_env_var(),
            config::Config::config_path().display()
        )
    })?;

    // Work out what to run before touching the browser.
    let (website, tests) = resolve_tests(&args)?;

    let session_config = SessionConfig {
        webdriver_url: args
            .webdriver_url
            .or(cfg.webdriver_url)
            .unwrap_or_else(|| "http://localhost:9515".to_string()),
        headless: !args.no_headless && cfg.headless.unwrap_or(true),
        window_size: (1280, 800),
    };
    let session = Arc::new(WebDriverSession::connect(&session_config).await?);

    let computer_config = ComputerConfig {
        screenshot_dir: args
            .screenshot_dir
            .or(cfg.screenshot_dir.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("screenshots")),
        audit_screenshots: !args.no_audit_screenshots && cfg.audit_screenshots.unwrap_or(true),
        ..ComputerConfig::default()
    };
    let tool = match ComputerTool::new(session.clone(), computer_config).await {
        Ok(tool) => tool,
        Err(e) => {
            let _ = session.close().await;
            return Err(e.into());
        }
    };
    let tools: Vec<SharedTool> = vec![Arc::new(tool)];
    let registry = ToolRegistry::new(tools)?;

    let client = ModelClient::new(provider, api_key).with_model(model);
    let transport = Arc::new(ProviderTransport::new(client));
    let loop_config = LoopConfig {
        system_prompt: prompt::system_prompt(),
        max_tokens: args.max_tokens.or(cfg.max_tokens).unwrap_or(4096),
        max_turns: args.max_turns,
    };
    let sampling_loop = SamplingLoop::new(transport, registry, loop_config);

    let statuses = run_and_close(
        &sampling_loop,
        session.as_ref(),
        &website,
        &tests,
        args.interactive,
    )
    .await?;

    let code = if statuses.contains(&TestStatus::Fail) {
        1
    } else if statuses.contains(&TestStatus::Inconclusive) {
        2
    } else {
        0
    };
    std::process::exit(code);
}

/// Resolve the website and test list from args and config
fn resolve_tests(args: &Args) -> anyhow::Result<(String, Vec<PlannedTest>)> {
    if let Some(path) = &args.case_file {
        let case = testfile::load_single(path)?;
        let website = args.url.clone().unwrap_or(case.website);
        return Ok((
            website,
            vec![PlannedTest {
                name: None,
                description: case.description,
                expected_response: None,
            }],
        ));
    }

    if let Some(path) = &args.test_file {
        let suite = testfile::load_suite(path)?;
        let website = args
            .url
            .clone()
            .or(suite.website)
            .ok_or_else(|| anyhow!("test file has no website; pass --url"))?;
        let tests = suite
            .tests
            .into_iter()
            .map(|t| PlannedTest {
                name: Some(t.name),
                description: t.prompt,
                expected_response: t.expected_response,
            })
            .collect();
        return Ok((website, tests));
    }

    let website = args
        .url
        .clone()
        .ok_or_else(|| anyhow!("pass --url with --test or --interactive"))?;

    if args.interactive {
        return Ok((website, vec![]));
    }
    match &args.test {
        Some(description) => Ok((
            website,
            vec![PlannedTest {
                name: None,
                description: description.clone(),
                expected_response: None,
            }],
        )),
        None => bail!("nothing to run: pass --test, --test-file, --case-file, or --interactive"),
    }
}

/// Run every test, then close the browser session.
///
/// The close happens even when a run path errors, so chromedriver is
/// never left with a dangling session.
async fn run_and_close(
    sampling_loop: &SamplingLoop,
    session: &dyn Driver,
    website: &str,
    tests: &[PlannedTest],
    interactive: bool,
) -> anyhow::Result<Vec<TestStatus>> {
    let run_result = if interactive {
        run_interactive(sampling_loop, session, website).await
    } else {
        run_suite(sampling_loop, session, website, tests).await
    };
    let close_result = session.close().await;

    let statuses = run_result?;
    close_result?;
    Ok(statuses)
}

/// Run a resolved list of tests against one site
async fn run_suite(
    sampling_loop: &SamplingLoop,
    session: &dyn Driver,
    website: &str,
    tests: &[PlannedTest],
) -> anyhow::Result<Vec<TestStatus>> {
    let mut statuses = Vec::with_capacity(tests.len());
    for test in tests {
        // Fresh page per test; conversations never carry over.
        session.navigate(website).await?;
        statuses.push(run_one(sampling_loop, test).await);
    }
    Ok(statuses)
}

/// Drive one test to a verdict and print it
async fn run_one(sampling_loop: &SamplingLoop, test: &PlannedTest) -> TestStatus {
    if let Some(name) = &test.name {
        println!("Running test: '{}'", name);
    }

    let mut events = sampling_loop.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            ui::print_event(&event);
        }
    });

    let outcome = sampling_loop.run(&test.description).await;

    // Let the printer drain before tearing it down.
    tokio::time::sleep(Duration::from_millis(100)).await;
    printer.abort();

    match outcome {
        RunOutcome::Verdict { message, .. } => {
            let passed = verdict::is_pass(&message);
            ui::print_verdict(passed);
            if let Some(expected) = &test.expected_response {
                println!("Expected response: {}", expected);
            }
            if passed {
                TestStatus::Pass
            } else {
                TestStatus::Fail
            }
        }
        RunOutcome::Inconclusive { error, .. } => {
            eprintln!("Run inconclusive (no verdict): {}", error);
            TestStatus::Inconclusive
        }
    }
}

/// Read test commands from stdin until 'exit'
async fn run_interactive(
    sampling_loop: &SamplingLoop,
    session: &dyn Driver,
    website: &str,
) -> anyhow::Result<Vec<TestStatus>> {
    let mut statuses = Vec::new();
    loop {
        print!("Enter test commands (or 'exit' to quit): ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.is_empty() {
            println!("Please enter some text or type 'exit' to quit.");
            continue;
        }

        session.navigate(website).await?;
        let test = PlannedTest {
            name: None,
            description: input.to_string(),
            expected_response: None,
        };
        statuses.push(run_one(sampling_loop, &test).await);
    }
    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use probe_agent::Transport;
    use probe_ai::{Message, ModelResponse, ToolSpec};
    use probe_browser::MouseButton;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Driver whose navigation always fails; records whether the
    /// session was closed.
    #[derive(Default)]
    struct BrokenDriver {
        closed: AtomicBool,
    }

    #[async_trait]
    impl Driver for BrokenDriver {
        async fn navigate(&self, url: &str) -> probe_browser::Result<()> {
            Err(probe_browser::Error::Script(format!("cannot load {url}")))
        }
        async fn move_pointer_by(&self, _dx: i64, _dy: i64) -> probe_browser::Result<()> {
            Ok(())
        }
        async fn click(&self, _button: MouseButton) -> probe_browser::Result<()> {
            Ok(())
        }
        async fn double_click(&self) -> probe_browser::Result<()> {
            Ok(())
        }
        async fn click_element_at(&self, _x: u32, _y: u32) -> probe_browser::Result<()> {
            Ok(())
        }
        async fn send_keys_to_active(&self, _text: &str) -> probe_browser::Result<()> {
            Ok(())
        }
        async fn clear_active(&self) -> probe_browser::Result<()> {
            Ok(())
        }
        async fn active_element_accepts_text(&self) -> probe_browser::Result<bool> {
            Ok(false)
        }
        async fn tracked_pointer_position(&self) -> probe_browser::Result<(i64, i64)> {
            Ok((0, 0))
        }
        async fn screenshot_png(&self) -> probe_browser::Result<Vec<u8>> {
            Ok(vec![])
        }
        async fn viewport_size(&self) -> probe_browser::Result<(u32, u32)> {
            Ok((1280, 800))
        }
        async fn close(&self) -> probe_browser::Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Transport that must never be reached
    struct UnreachableTransport;

    #[async_trait]
    impl Transport for UnreachableTransport {
        async fn complete(
            &self,
            _system_prompt: &str,
            _messages: &[Message],
            _tools: &[ToolSpec],
            _max_tokens: u32,
        ) -> probe_ai::Result<ModelResponse> {
            Err(probe_ai::Error::api("test", "transport should not be called"))
        }
    }

    fn make_loop() -> SamplingLoop {
        let registry = ToolRegistry::new(vec![]).unwrap();
        SamplingLoop::new(
            Arc::new(UnreachableTransport),
            registry,
            LoopConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_session_closed_when_navigation_fails() {
        let driver = BrokenDriver::default();
        let sampling_loop = make_loop();
        let tests = vec![PlannedTest {
            name: None,
            description: "click the button".to_string(),
            expected_response: None,
        }];

        let result = run_and_close(&sampling_loop, &driver, "http://down", &tests, false).await;
        assert!(result.is_err());
        assert!(driver.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_suite_expected_response_carried_through() {
        let dir = std::env::temp_dir().join(format!("probe-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("suite.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "website: http://localhost:3000\n\
             tests:\n\
             - name: login\n  \
               prompt: Click Sign In.\n  \
               expected_response: Success\n"
        )
        .unwrap();

        let args = Args::parse_from(["probe", "-f", path.to_str().unwrap()]);
        let (website, tests) = resolve_tests(&args).unwrap();
        assert_eq!(website, "http://localhost:3000");
        assert_eq!(tests[0].name.as_deref(), Some("login"));
        assert_eq!(tests[0].expected_response.as_deref(), Some("Success"));
    }
}
