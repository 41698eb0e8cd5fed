//! Command-line admin for coffee orders.
//!
//! # Responsibility
//! - Route add/edit commands through the registered admin so every write
//!   is validated before it is saved.
//! - Print validation failures per field and exit with code 2.

use clap::{Args, Parser, Subcommand};
use coffee_admin_core::admin::setup;
use coffee_admin_core::db::open_db;
use coffee_admin_core::{
    default_log_level, init_logging, AdminRequest, AdminSite, CoffeeOrder, FormData, ListQuery,
    Model, ModelStore, SqliteCoffeeOrderRepository, SubmitOutcome,
};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_REJECTED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "coffee-admin")]
#[command(about = "Administer coffee orders with full validation on every save", version)]
struct Cli {
    /// SQLite database file; created and migrated on first use.
    #[arg(long, env = "COFFEE_ADMIN_DB", default_value = "coffee_orders.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Acting user recorded with each admin event.
    #[arg(long, env = "USER", default_value = "admin")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit an add form for a new order.
    Add(FormArgs),
    /// Submit a change form for an existing order.
    Edit {
        id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Print one order as JSON.
    Show { id: String },
    /// List orders, most recently updated first.
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// Delete one order.
    Delete { id: String },
    /// Print registered admin models.
    Models,
}

#[derive(Debug, Args)]
struct FormArgs {
    /// Field assignment, e.g. `--field beverage=latte`. Repeatable.
    #[arg(long = "field", short = 'f', value_parser = parse_field)]
    fields: Vec<(String, String)>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    FormData::parse_assignment(raw).ok_or_else(|| format!("expected `field=value`, got `{raw}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    let conn = open_db(&cli.db)?;
    let mut site = AdminSite::new();
    setup(&mut site, &conn)?;
    let request = AdminRequest::new(cli.user);

    match cli.command {
        Command::Add(form) => submit(&site, &request, form, None),
        Command::Edit { id, form } => submit(&site, &request, form, Some(&id)),
        Command::Show { id } => {
            let repo = SqliteCoffeeOrderRepository::try_new(&conn)?;
            let order = repo
                .get(id.trim().parse()?)?
                .ok_or_else(|| format!("{} `{id}` does not exist", CoffeeOrder::MODEL_NAME))?;
            println!("{}", serde_json::to_string_pretty(&order)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::List { limit, offset } => {
            let repo = SqliteCoffeeOrderRepository::try_new(&conn)?;
            for order in repo.list(&ListQuery { limit, offset })? {
                println!("{}", summary_line(&order));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Delete { id } => {
            site.delete(CoffeeOrder::MODEL_NAME, &request, &id)?;
            println!("deleted {id}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Models => {
            for name in site.registered_models() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn submit(
    site: &AdminSite<'_>,
    request: &AdminRequest,
    form: FormArgs,
    object_id: Option<&str>,
) -> Result<ExitCode, Box<dyn Error>> {
    let form = FormData::from_pairs(form.fields);
    let outcome = site.submit(CoffeeOrder::MODEL_NAME, request, &form, object_id)?;
    let code = report_outcome(&outcome, &mut io::stdout().lock(), &mut io::stderr().lock())?;
    Ok(code)
}

/// Saved outcomes go to `out`; rejected forms list one `field: message`
/// line per violation on `err` and map to exit code 2.
fn report_outcome(
    outcome: &SubmitOutcome,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<ExitCode> {
    match outcome {
        SubmitOutcome::Saved { object_id, change } => {
            let verb = if *change { "changed" } else { "added" };
            writeln!(out, "{verb} {object_id}")?;
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Redisplay { errors, .. } => {
            writeln!(err, "order not saved; fix the following fields:")?;
            for (field, messages) in errors.iter() {
                for message in messages {
                    writeln!(err, "  {field}: {message}")?;
                }
            }
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}

fn summary_line(order: &CoffeeOrder) -> String {
    let milk = order.milk.map_or("-", |milk| milk.as_str());
    format!(
        "{}  {}  {:<20}  {}x {} {} milk={}",
        order.id,
        order.reference,
        order.customer_name,
        order.quantity,
        order.size.as_str(),
        order.beverage.as_str(),
        milk
    )
}
