//! CLI command handling
//!
//! Resolves configuration, environment and flags into a suite run and
//! prints the results.

use std::time::Duration;

use colored::Colorize;

use crate::cases;
use crate::commands::{Commands, RunArgs};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::harness::{self, execution_order, run_suite, select, CaseReport, CaseSettings, Target};
use crate::webdriver::{CapabilityOptions, DriverProcess, WebDriverClient, WebDriverFactory};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run(args) => run(args, config).await,
        Commands::List => {
            list();
            Ok(())
        }
        Commands::Status { webdriver, browser } => status(webdriver, browser, config).await,
    }
}

/// Connect to the configured endpoint, or launch a local driver
async fn connect(
    url: Option<String>,
    target: &Target,
    config: &Config,
    driver_path: Option<std::path::PathBuf>,
) -> Result<(Option<DriverProcess>, WebDriverClient)> {
    let request_timeout = Duration::from_secs(config.webdriver.request_timeout_secs);

    match url.or_else(|| config.webdriver.url.clone()) {
        Some(url) => {
            tracing::info!(%url, "Using remote WebDriver");
            Ok((None, WebDriverClient::new(&url, request_timeout)?))
        }
        None => {
            let explicit = driver_path.or_else(|| config.webdriver.driver_path.clone());
            let (process, client) = DriverProcess::launch(
                target.browser,
                explicit.as_deref(),
                Duration::from_secs(config.webdriver.startup_timeout_secs),
                request_timeout,
            )
            .await?;
            Ok((Some(process), client))
        }
    }
}

async fn run(args: RunArgs, config: Config) -> Result<()> {
    let target = Target::resolve(args.browser, config.suite.browser)?;

    let mut page = config.page.clone();
    if let Some(path) = args.page {
        page.path = path;
        page.url = None;
    }
    if let Some(url) = args.page_url {
        page.url = Some(url);
    }
    let page_url = page.resolve_url(&std::env::current_dir()?);

    let cases = select(cases::all(), &args.only);
    if cases.is_empty() {
        return Err(Error::Config(format!(
            "No case matches {:?}; use 'shim-e2e list' to see case names",
            args.only
        )));
    }

    let (mut driver, client) = connect(args.webdriver, &target, &config, args.driver_path).await?;

    let options = CapabilityOptions {
        headless: config.webdriver.headless && !args.headed,
        browser_binary: config
            .webdriver
            .browser_binary
            .as_ref()
            .map(|p| p.display().to_string()),
    };
    let page_load = Duration::from_millis(page.load_timeout_ms);
    let factory = WebDriverFactory::new(
        client,
        target.browser,
        options,
        config.timeouts.script(),
        page_load,
    );

    let settings = CaseSettings {
        target,
        page_url,
        page_load,
        timeouts: config.timeouts.clone(),
    };
    let jobs = args.jobs.unwrap_or(config.suite.jobs);

    let mut reporter = harness::report::reporter(args.format, Box::new(std::io::stdout()));
    reporter.suite_started(&target.browser.to_string(), cases.len());
    let report = run_suite(&factory, &cases, &settings, jobs, &mut |case: &CaseReport| {
        reporter.case_finished(case)
    })
    .await;
    reporter.suite_finished(&report);

    if let Some(driver) = driver.as_mut() {
        driver.shutdown().await;
    }

    if report.passed() {
        Ok(())
    } else {
        Err(Error::SuiteFailed {
            failed: report.failed_assertions(),
            total: report.total_assertions(),
        })
    }
}

fn list() {
    let cases = cases::all();
    for (i, case) in execution_order(&cases).into_iter().enumerate() {
        let plan = case
            .plan()
            .map(|n| format!("{} assertions", n))
            .unwrap_or_else(|| "unplanned".to_string());
        let mut notes = vec![plan];
        if let Some(rule) = case.static_skip() {
            let browsers: Vec<String> = rule.browsers.iter().map(|b| b.to_string()).collect();
            notes.push(format!("skipped on {}", browsers.join(", ")));
        }
        if case.runs_last() {
            notes.push("runs last".to_string());
        }
        println!("{:>2}. {} {}", i + 1, case.name().white().bold(), format!("({})", notes.join("; ")).dimmed());
    }
}

async fn status(webdriver: Option<String>, browser: Option<crate::webdriver::BrowserKind>, config: Config) -> Result<()> {
    let target = Target::resolve(browser, config.suite.browser)?;
    let (mut driver, client) = connect(webdriver, &target, &config, None).await?;

    let result = client.status().await;
    if let Some(driver) = driver.as_mut() {
        driver.shutdown().await;
    }
    let status = result?;

    if status.ready {
        println!("{} {} is ready {}", "✓".green(), client.base_url(), status.message.dimmed());
        Ok(())
    } else {
        println!("{} {} is not ready {}", "✗".red(), client.base_url(), status.message.dimmed());
        Err(Error::SessionCreateFailed(format!(
            "WebDriver at {} does not accept sessions",
            client.base_url()
        )))
    }
}
