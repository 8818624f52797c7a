//! entra-export - export Microsoft Entra ID users to a JSON document
//!
//! Reads app-registration credentials from the environment (or a `.env`
//! file), asks which optional user fields to include, fetches every user
//! from Microsoft Graph and writes `users_output_<timestamp>.json`.

mod error;
mod logging;
mod prompt;

use std::path::PathBuf;

use clap::Parser;
use entra_user_export::{
    parse_selection, ExportConfig, ExportSummary, JsonFileSink, Selection, SelectionOutcome,
    UserExporter, UserField, EXIT_MENU_KEY,
};
use error::CliResult;
use tracing::{debug, info, warn};

const ABORT_MESSAGE: &str = "Bro why even open this then.";

#[derive(Parser, Debug)]
#[command(name = "entra-export")]
#[command(author, version, about = "Export Microsoft Entra ID users to JSON", long_about = None)]
struct Cli {
    /// Fields to export: menu numbers ("2,4,6"), field names, or "all".
    /// Skips the interactive menu.
    #[arg(short, long)]
    select: Option<String>,

    /// Directory for the output document (overrides EXPORT_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the selectable fields and exit
    #[arg(long)]
    list_fields: bool,

    /// Emit debug diagnostics on stderr (same as EXPORT_DEBUG=true)
    #[arg(long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.print();
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    if cli.list_fields {
        print!("{}", field_catalog());
        return Ok(());
    }

    let mut config = ExportConfig::from_env()?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    logging::init_logging(cli.debug || config.debug);

    let outcome = export(&config, resolve_selection(cli.select.as_deref())?).await?;
    println!("{}", outcome.message());
    Ok(())
}

/// How a run ended.
#[derive(Debug)]
enum RunOutcome {
    Aborted,
    Exported { summary: ExportSummary, path: PathBuf },
}

impl RunOutcome {
    /// Line printed on stdout when the run ends.
    fn message(&self) -> String {
        match self {
            RunOutcome::Aborted => ABORT_MESSAGE.to_string(),
            RunOutcome::Exported { summary, path } => {
                format!("\nSaved {} users to {}", summary.total, path.display())
            }
        }
    }
}

/// Exports with the resolved selection. Aborting touches nothing.
async fn export(config: &ExportConfig, selection: SelectionOutcome) -> CliResult<RunOutcome> {
    let selection = match selection {
        SelectionOutcome::Fields(selection) => selection,
        SelectionOutcome::Abort => return Ok(RunOutcome::Aborted),
    };
    debug!(selection = %selection, "Field selection resolved");

    let exporter = UserExporter::new(config)?;
    let mut sink = JsonFileSink::timestamped(&config.output_dir);
    let summary = exporter.run(&selection, &mut sink).await?;

    if summary.failed > 0 {
        warn!(
            failed = summary.failed,
            "Some users could not be processed; see their \"error\" entries"
        );
    }
    Ok(RunOutcome::Exported {
        summary,
        path: sink.path().to_path_buf(),
    })
}

/// Selection from the flag, the interactive menu, or core fields only when
/// there is no terminal to ask on.
fn resolve_selection(flag: Option<&str>) -> CliResult<SelectionOutcome> {
    match flag {
        Some(input) => Ok(parse_selection(input)?),
        None if prompt::is_interactive_terminal() => prompt::ask_selection(),
        None => {
            info!("No terminal attached and --select not given; exporting core fields only");
            Ok(SelectionOutcome::Fields(Selection::empty()))
        }
    }
}

fn field_catalog() -> String {
    let mut out = String::new();
    for field in UserField::ALL {
        out.push_str(&format!(
            "{:>2}  {:<28} {}\n",
            field.menu_key(),
            field.key(),
            field.description()
        ));
    }
    out.push_str(&format!("{:>2}  {:<28} Exit without exporting\n", EXIT_MENU_KEY, "exit"));
    out
}
