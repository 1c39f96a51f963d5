//! Terminal front end for the record API.
//!
//! Lists, adds, edits and deletes records on a running `sheetdb-server`.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use sheetdb_client::views::{Choice, DeleteConfirm, FormDialog};
use sheetdb_client::{ApiClient, Controller, Notifier};
use sheetdb_core::RowIndex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the record server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every record
    List,
    /// Append a record; missing fields are prompted for
    Add(Fields),
    /// Overwrite the record at INDEX; missing fields keep their value
    Edit {
        index: RowIndex,
        #[command(flatten)]
        fields: Fields,
    },
    /// Delete the record at INDEX
    Delete {
        index: RowIndex,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct Fields {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

/// Alerts go to stderr; details are in the log.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn loading(&self, active: bool) {
        if active {
            eprintln!("Loading data...");
        }
    }
}

fn prompt(label: &str, current: &str) -> anyhow::Result<String> {
    let mut stdout = io::stdout();
    if current.is_empty() {
        write!(stdout, "{}: ", label)?;
    } else {
        write!(stdout, "{} [{}]: ", label, current)?;
    }
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    let answer = line.trim();
    Ok(if answer.is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    })
}

/// Fills the form from flags, prompting for anything not given.
fn fill_form(form: &mut FormDialog, fields: Fields) -> anyhow::Result<()> {
    println!("{}", form.title());
    form.first_name = match fields.first_name {
        Some(v) => v,
        None => prompt("First Name", &form.first_name)?,
    };
    form.last_name = match fields.last_name {
        Some(v) => v,
        None => prompt("Last Name", &form.last_name)?,
    };
    form.email = match fields.email {
        Some(v) => v,
        None => prompt("Email", &form.email)?,
    };
    Ok(())
}

fn confirm() -> anyhow::Result<Choice> {
    let stdin = io::stdin();
    loop {
        print!("{}", DeleteConfirm::render());
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(Choice::Cancel);
        }
        if let Some(choice) = DeleteConfirm::parse_answer(&line) {
            return Ok(choice);
        }
    }
}

async fn submit(controller: &mut Controller<ApiClient, StderrNotifier>) -> anyhow::Result<()> {
    if let Some(form) = controller.form() {
        print!("{}", form.render());
    }
    let message = controller.submit_form().await?;
    println!("{}", message);
    print!("{}", controller.table().render());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut controller = Controller::mount(ApiClient::new(&cli.url), StderrNotifier)
        .await
        .with_context(|| format!("Failed to load records from {}", cli.url))?;

    match cli.command {
        Command::List => {
            print!("{}", controller.table().render());
        }
        Command::Add(fields) => {
            controller.open_create();
            if let Some(form) = controller.form_mut() {
                fill_form(form, fields)?;
            }
            submit(&mut controller).await?;
        }
        Command::Edit { index, fields } => {
            let (record, index) = controller
                .table()
                .row(index)
                .map(|row| row.edit_action())
                .with_context(|| format!("No row at index {}", index))?;
            println!("Editing {} <{}>", record.full_name(), record.email);
            controller.open_edit(index)?;
            if let Some(form) = controller.form_mut() {
                fill_form(form, fields)?;
            }
            submit(&mut controller).await?;
        }
        Command::Delete { index, yes } => {
            let target = match controller.table().row(index) {
                Some(row) => {
                    println!(
                        "Row {}: {} <{}>",
                        index,
                        row.record.full_name(),
                        row.record.email
                    );
                    row.delete_action()
                }
                None => {
                    println!("Row {} is not in the current list", index);
                    index
                }
            };
            controller.request_delete(target);

            let choice = if yes { Choice::Confirm } else { confirm()? };
            match choice {
                Choice::Confirm => {
                    controller.confirm_delete().await?;
                    println!("Row deleted successfully");
                    print!("{}", controller.table().render());
                }
                Choice::Cancel => {
                    controller.cancel_delete();
                    println!("Cancelled");
                }
            }
        }
    }

    Ok(())
}
