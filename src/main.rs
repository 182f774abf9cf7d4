use std::env;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use docflow::client::{ApiClient, HttpTransport, Resource};
use docflow::entity::document::{DocumentTab, IncomingDocument, OutgoingDocument};
use docflow::entity::schedule::Schedule;
use docflow::entity::work_plan::WorkPlan;
use docflow::filter::{status_counts, DepartmentFilter, FilterOutcome, ListQuery};
use docflow::status::{Classified, SimpleStatus};
use docflow::{AppState, Config};

const DEFAULT_CONFIG: &str = "./etc/docflow.toml";

/// Flags that take a value
const VALUE_FLAGS: [&str; 5] = ["-config", "-department", "-status", "-search", "-tab"];

struct Options {
    config_path: String,
    command: Option<String>,
    department: DepartmentFilter,
    status: Option<SimpleStatus>,
    search: String,
    tab: DocumentTab,
}

fn print_usage() {
    println!("Usage: docflow [OPTIONS] <COMMAND>");
    println!("Commands:");
    println!("  departments        Departments visible to the current user");
    println!("  scope              Current user, visibility scope and capabilities");
    println!("  users              Users in scope");
    println!("  work-plans         Work plans in scope");
    println!("  schedules          Schedules in scope");
    println!("  incoming           Incoming documents in scope");
    println!("  outgoing           Outgoing documents in scope");
    println!("Options:");
    println!("  -config <path>     Path to configuration file (default: {})", DEFAULT_CONFIG);
    println!("  -department <id>   Only this department and its sub-departments");
    println!("  -status <status>   not_started, in_progress or done");
    println!("  -search <text>     Free-text filter");
    println!("  -tab <tab>         all, unread or read (documents only)");
    println!("  -help, --help      Print this help message");
}

fn option_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .skip_while(|arg| arg.as_str() != name)
        .nth(1)
        .map(|s| s.to_string())
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let command = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|&(i, arg)| !arg.starts_with('-') && !VALUE_FLAGS.contains(&args[i - 1].as_str()))
        .map(|(_, arg)| arg.clone());

    let department = match option_value(args, "-department") {
        Some(value) => value.parse()?,
        None => DepartmentFilter::All,
    };
    let status = match option_value(args, "-status") {
        Some(value) => Some(
            SimpleStatus::parse(&value)
                .ok_or_else(|| anyhow::anyhow!("Unknown status: {}", value))?,
        ),
        None => None,
    };
    let tab = match option_value(args, "-tab").as_deref() {
        None | Some("all") => DocumentTab::All,
        Some("unread") => DocumentTab::Unread,
        Some("read") => DocumentTab::Read,
        Some(other) => anyhow::bail!("Unknown tab: {}", other),
    };

    Ok(Options {
        config_path: option_value(args, "-config").unwrap_or_else(|| DEFAULT_CONFIG.to_string()),
        command,
        department,
        status,
        search: option_value(args, "-search").unwrap_or_default(),
        tab,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-help" || arg == "--help") {
        print_usage();
        return Ok(());
    }
    let options = parse_args(&args)?;

    // Load configuration first (before logging init)
    let config = Config::load(&options.config_path)
        .unwrap_or_else(|e| {
            eprintln!("Could not load config file: {}, using defaults", e);
            Config::default()
        })
        .with_env();

    // Initialize logging
    // Priority: RUST_LOG env var > config file > default "info"
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    fmt::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let Some(command) = options.command.clone() else {
        print_usage();
        return Ok(());
    };

    info!("Loading configuration from: {}", options.config_path);
    info!("Backend: {}", config.api.base_url);

    let transport = HttpTransport::new(&config.api)?;
    let api = ApiClient::new(transport, config.api.page_size);
    let actor = api.current_user().await.map_err(|e| {
        tracing::error!("Could not fetch current user: {}", e);
        anyhow::anyhow!("Could not fetch current user: {}", e)
    })?;

    let state = AppState::start(actor, api, config).await?;
    let mut notifications = state.subscribe();

    let result = run(&state, &command, &options).await;
    state.end().await;

    while let Ok(notification) = notifications.try_recv() {
        eprintln!("[{:?}] {}", notification.level, notification.message);
    }
    result
}

async fn run(state: &AppState<HttpTransport>, command: &str, options: &Options) -> anyhow::Result<()> {
    let session = state.snapshot().await?;
    let department = options
        .department
        .restrict_to(&session.forest, &session.scope)?;

    match command {
        "departments" => {
            for node in session.scope.selectable_departments(&session.forest) {
                let abbreviation = node
                    .abbreviation
                    .as_deref()
                    .map(|a| format!(" ({})", a))
                    .unwrap_or_default();
                println!("{}{} [{}]{}", "  ".repeat(node.level), node.name, node.id, abbreviation);
            }
        }
        "scope" => {
            let view = serde_json::json!({
                "actor": session.actor,
                "scope": &*session.scope,
                "capabilities": session.capabilities,
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        "users" => {
            let loader = state.loader("users");
            loader
                .load(&state.cancellation(), state.api().all_users(None))
                .await;
            let users = loader.snapshot().await;
            let query = ListQuery::new()
                .search(options.search.clone())
                .department(department);
            let outcome = query.apply(users.as_slice(), &session.forest, &session.scope);
            for user in &outcome.items {
                println!(
                    "{:>6}  {:<30} {}",
                    user.id,
                    user.display_name(),
                    user.department_name.as_deref().unwrap_or("-")
                );
            }
            println!("{} user(s)", outcome.items.len());
        }
        "work-plans" => {
            let rows = load_rows::<WorkPlan>(state).await;
            let outcome = classified_query(options, department).apply(rows.as_slice(), &session.forest, &session.scope);
            print_classified(&outcome, |plan| {
                format!("{:>6}  {:>3}%  {}", plan.id, plan.overall_progress(), plan.title)
            });
        }
        "schedules" => {
            let rows = load_rows::<Schedule>(state).await;
            let outcome = classified_query(options, department).apply(rows.as_slice(), &session.forest, &session.scope);
            print_classified(&outcome, |schedule| {
                let start = schedule
                    .start_time
                    .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
                    .unwrap_or_default();
                format!("{:>6}  {:<16}  {}", schedule.id, start, schedule.title)
            });
        }
        "incoming" => {
            let rows = load_rows::<IncomingDocument>(state).await;
            let tab = options.tab;
            let query = ListQuery::new()
                .tab(move |doc: &IncomingDocument| tab.matches(doc.is_read))
                .search(options.search.clone())
                .department(department);
            let outcome = query.apply(rows.as_slice(), &session.forest, &session.scope);
            for doc in &outcome.items {
                println!(
                    "{:>6}  {} {:<12} {}",
                    doc.id,
                    if doc.is_read { ' ' } else { '*' },
                    doc.document_number.as_deref().unwrap_or("-"),
                    doc.title
                );
            }
            println!("{} document(s)", outcome.items.len());
        }
        "outgoing" => {
            let rows = load_rows::<OutgoingDocument>(state).await;
            let tab = options.tab;
            let outcome = classified_query(options, department)
                .tab(move |doc: &OutgoingDocument| tab.matches(doc.is_read))
                .apply(rows.as_slice(), &session.forest, &session.scope);
            print_classified(&outcome, |doc| {
                format!(
                    "{:>6}  {:<12} {}",
                    doc.id,
                    doc.document_number.as_deref().unwrap_or("-"),
                    doc.title
                )
            });
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

async fn load_rows<R: Resource>(state: &AppState<HttpTransport>) -> Arc<Vec<R>> {
    let loader = state.loader::<R>(R::PATH);
    state.load_all(&loader).await;
    loader.snapshot().await
}

fn classified_query<'q, T: Classified + 'q>(options: &Options, department: DepartmentFilter) -> ListQuery<'q, T> {
    let query = ListQuery::new()
        .search(options.search.clone())
        .department(department);
    match options.status {
        Some(status) => query.simple_status(status),
        None => query,
    }
}

fn print_classified<T: Classified>(outcome: &FilterOutcome<'_, T>, describe: impl Fn(&T) -> String) {
    for row in &outcome.items {
        println!("{:<12} {}", row.simple_status().as_str(), describe(row));
    }
    let counts = status_counts(outcome.items.iter().copied());
    println!(
        "{} row(s): {} not started, {} in progress, {} done",
        counts.total(),
        counts.not_started,
        counts.in_progress,
        counts.done
    );
}
