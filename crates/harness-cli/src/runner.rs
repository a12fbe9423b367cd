//! Command execution

use crate::commands::{ApiSmokeArgs, Cli, Commands, ConfigArgs, FixtureKind, FixturesArgs, LoginCheckArgs};
use crate::config::{CliConfig, Verbosity};
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use chrono::{Local, NaiveDate};
use dms_harness::api::{assert_response_time, assert_status};
use dms_harness::{fixtures, AssertionError, DmsApiClient, HarnessConfig, ResponseLike};
use std::time::{Duration, Instant};
use tracing::debug;

/// Parse-independent entry point used by `main`
pub fn run(cli: Cli) -> CliResult<()> {
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into());
    dms_harness::logging::init_stderr_tracing(config.verbosity.is_verbose());
    let reporter = Reporter::new(&config);

    match cli.command {
        Commands::Config(args) => run_config(&reporter, &args),
        Commands::ApiSmoke(args) => run_api_smoke(&reporter, &args),
        Commands::Fixtures(args) => run_fixtures(&reporter, &args, Local::now().date_naive()),
        Commands::LoginCheck(args) => run_login_check(&reporter, &args),
    }
}

fn run_config(reporter: &Reporter, args: &ConfigArgs) -> CliResult<()> {
    let harness = HarnessConfig::from_env()?;
    let summary = harness.summary();
    if args.json {
        let object: serde_json::Map<String, serde_json::Value> = summary
            .into_iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
            .collect();
        reporter.line(&serde_json::to_string_pretty(&object)?);
    } else {
        reporter.header("DMS harness configuration");
        reporter.table(&summary);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum SmokeCall {
    ValidateToken,
    ListRepairOrders,
}

fn run_api_smoke(reporter: &Reporter, args: &ApiSmokeArgs) -> CliResult<()> {
    let harness = HarnessConfig::from_env()?;
    harness.api_token()?;
    let budget = Duration::from_millis(args.max_latency_ms);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(api_smoke(&harness, reporter, budget))
}

async fn api_smoke(harness: &HarnessConfig, reporter: &Reporter, budget: Duration) -> CliResult<()> {
    let mut client = DmsApiClient::new(harness);
    client.init()?;
    reporter.header(&format!("API smoke: {}", client.base_url()));
    let outcome = smoke_calls(&client, reporter, budget).await;
    client.dispose();
    outcome
}

async fn smoke_calls(client: &DmsApiClient, reporter: &Reporter, budget: Duration) -> CliResult<()> {
    let mut first_failure: Option<AssertionError> = None;
    for call in [SmokeCall::ValidateToken, SmokeCall::ListRepairOrders] {
        let start = Instant::now();
        let response = match call {
            SmokeCall::ValidateToken => client.validate_token().await?,
            SmokeCall::ListRepairOrders => client.get_repair_orders().await?,
        };
        let line = format!(
            "{} {} -> {} in {}ms",
            response.method(),
            response.path(),
            response.status(),
            response.elapsed().as_millis()
        );
        match assert_status(&response, 200).and_then(|()| assert_response_time(start, budget)) {
            Ok(()) => reporter.success(&line),
            Err(e) => {
                reporter.failure(&format!("{line}: {e}"));
                first_failure.get_or_insert(e);
            }
        }
    }
    first_failure.map_or(Ok(()), |e| Err(e.into()))
}

fn run_fixtures(reporter: &Reporter, args: &FixturesArgs, today: NaiveDate) -> CliResult<()> {
    for value in generate_fixtures(args, today)? {
        reporter.line(&value);
    }
    Ok(())
}

fn generate_fixtures(args: &FixturesArgs, today: NaiveDate) -> CliResult<Vec<String>> {
    if args.count == 0 {
        return Err(CliError::invalid_argument("--count must be at least 1"));
    }
    let mut date = match args.from.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| CliError::invalid_argument(format!("--from {raw}: {e}")))?,
        None => today,
    };
    debug!(kind = ?args.kind, count = args.count, "generating fixtures");

    let values = (0..args.count)
        .map(|_| match args.kind {
            FixtureKind::OrderNumber => fixtures::generate_order_number(),
            FixtureKind::Vin => fixtures::generate_vin(),
            FixtureKind::NextBusinessDay => {
                date = fixtures::next_business_day(date);
                date.format("%Y-%m-%d").to_string()
            }
        })
        .collect();
    Ok(values)
}

#[cfg(feature = "browser")]
fn run_login_check(reporter: &Reporter, args: &LoginCheckArgs) -> CliResult<()> {
    let mut harness = HarnessConfig::from_env()?;
    if args.headed {
        harness.headless = false;
    }
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(login_check(harness, reporter, args.snapshot))
}

#[cfg(feature = "browser")]
async fn login_check(harness: HarnessConfig, reporter: &Reporter, snapshot: bool) -> CliResult<()> {
    use dms_harness::{Browser, BrowserConfig};

    let credentials = harness.credentials()?;
    let browser = Browser::launch(BrowserConfig::from_harness(&harness)).await?;
    let outcome = login_steps(&browser, harness, reporter, snapshot, &credentials).await;
    let rejection = first_failure(outcome, browser.close().await)?;

    match rejection {
        None => {
            reporter.success(&format!("logged in as {}", credentials.username));
            Ok(())
        }
        Some(message) => {
            reporter.failure(&format!("login rejected: {message}"));
            Err(AssertionError::PageState {
                what: "logout control after login".to_string(),
                expected: "visible".to_string(),
                actual: "absent".to_string(),
            }
            .into())
        }
    }
}

/// Log in on a fresh tab. Returns the rejection message when login failed.
#[cfg(feature = "browser")]
async fn login_steps(
    browser: &dms_harness::Browser,
    harness: HarnessConfig,
    reporter: &Reporter,
    snapshot: bool,
    credentials: &dms_harness::model::Credentials,
) -> CliResult<Option<String>> {
    use dms_harness::pages::LoginPage;
    use dms_harness::{BasePage, PageObject};
    use std::sync::Arc;

    let driver = browser.new_page().await?;
    let page = LoginPage::new(BasePage::new(Arc::new(driver), harness));

    page.navigate().await?;
    page.login_with(credentials).await?;
    let rejection = if page.is_logged_in().await? {
        None
    } else {
        Some(page.error_message().await?)
    };
    if snapshot {
        let path = page.base().snapshot("login-check").await?;
        reporter.line(&path.display().to_string());
    }
    Ok(rejection)
}

/// Combine a session's outcome with its teardown. The session's own error
/// wins; a teardown failure only surfaces when the session succeeded.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn first_failure<T>(outcome: CliResult<T>, teardown: dms_harness::HarnessResult<()>) -> CliResult<T> {
    match (outcome, teardown) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => {
            debug!(error = %e, "teardown failed");
            Err(e.into())
        }
        (Err(e), teardown) => {
            if let Err(close) = teardown {
                debug!(error = %close, "teardown failed after an earlier error");
            }
            Err(e)
        }
    }
}

#[cfg(not(feature = "browser"))]
fn run_login_check(_reporter: &Reporter, _args: &LoginCheckArgs) -> CliResult<()> {
    Err(CliError::unsupported(
        "login-check needs a browser. Rebuild with --features browser",
    ))
}
