#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use std::{borrow::Cow, env, fs, path::Path, process};

use bootstrap::{CliConfig, init_logging};
use patungan_application::{ReceiptDocument, SplitSession};
use patungan_domain::Item;
use patungan_infrastructure::{
    CommandReceiptParser, PersonSplitDto, PngSummaryRenderer, SplitRequestDto,
};
use patungan_presentation::{
    SplitSummaryPresenter, format_ledger_error, format_reconciliation_warning,
    format_session_error,
};

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "Usage:\n  patungan parse <receipt.pdf>\n  patungan split <request.json> [--png]";

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let config = CliConfig::from_env().map_err(|err| err.to_string())?;
    let args: Vec<String> = env::args().skip(1).collect();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["parse", path] => parse_receipt(&config, path),
        ["split", path] => split(&config, path, false),
        ["split", path, "--png"] | ["split", "--png", path] => split(&config, path, true),
        _ => Err(USAGE.into()),
    }
}

/// Prints a split request skeleton for the receipt, ready to be filled with claims.
fn parse_receipt(config: &CliConfig, path: &str) -> CliResult<()> {
    let command = config
        .parser_command
        .as_deref()
        .ok_or("PATUNGAN_PARSER_COMMAND is not set")?;
    let parser = CommandReceiptParser::from_command_line(command)
        .ok_or("PATUNGAN_PARSER_COMMAND is blank")?;

    let bytes = fs::read(path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    let filename = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path);
    let document = ReceiptDocument::new(&bytes).with_filename(filename);

    let mut session = SplitSession::new(config.context);
    let parsed = session
        .load_receipt(&parser, &document)
        .map_err(|err| format_session_error(&err, &[]))?
        .clone();
    let request = SplitRequestDto::from_parsed(session.id(), &parsed);

    let json = serde_json::to_string_pretty(&request)
        .map_err(|err| format!("Failed to encode request: {err}"))?;
    println!("{json}");
    Ok(())
}

fn split(config: &CliConfig, path: &str, png: bool) -> CliResult<()> {
    let source =
        fs::read_to_string(path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    let request: SplitRequestDto =
        serde_json::from_str(&source).map_err(|err| format!("Invalid split request: {err}"))?;

    let items: Vec<Item> = request.items.iter().cloned().map(Item::from).collect();
    let mut session = request
        .into_session(config.context)
        .map_err(|err| format_ledger_error(&err, &items))?;

    let outcome = session
        .calculate()
        .map_err(|err| format_session_error(&err, session.bill().list_items()))?;
    if let Some(mismatch) = outcome.warning() {
        eprintln!("{}", format_reconciliation_warning(&mismatch));
    }

    println!(
        "{}",
        SplitSummaryPresenter::render_text(&outcome.splits, session.bill().list_items())
    );
    let body: Vec<PersonSplitDto> = outcome.splits.iter().map(PersonSplitDto::from).collect();
    let json = serde_json::to_string_pretty(&body)
        .map_err(|err| format!("Failed to encode splits: {err}"))?;
    println!("{json}");

    if png {
        write_summary(config, &session)?;
    }
    Ok(())
}

fn write_summary(config: &CliConfig, session: &SplitSession) -> CliResult<()> {
    let renderer = PngSummaryRenderer;
    let bytes = session
        .render_summary(&renderer)
        .map_err(|err| format_session_error(&err, session.bill().list_items()))?;

    fs::create_dir_all(&config.output_dir).map_err(|err| {
        format!(
            "Failed to create '{}': {err}",
            config.output_dir.display()
        )
    })?;
    let target = config.output_dir.join(session.summary_file_name(&renderer));
    fs::write(&target, bytes)
        .map_err(|err| format!("Failed to write '{}': {err}", target.display()))?;

    tracing::info!(path = %target.display(), "Summary written");
    Ok(())
}
