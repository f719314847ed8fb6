//! Command-line front end for tablecast.
//!
//! Usage:
//!   tablecast detect [path]                      - Report whether the text holds a Markdown table
//!   tablecast convert [path] [--output <file>]   - Print (or save) the first table as CSV
//!   tablecast paraphrase <message> [--tone <t>]  - Ask the model for tone-varied paraphrases
//!   tablecast email <message> [--tone <tone>]    - Ask the model for an email draft
//!   tablecast chat [--export-dir <dir>]          - Chat line by line, saving tables from replies
//!
//! Text is read from stdin when no path is given. The model is reached with
//! the key in `API_KEY`; logging is controlled with `RUST_LOG`.
use std::{
    fs,
    io::{self, BufRead, Read, Write},
    path::Path,
    process,
};

use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::info;
use tablecast::{
    service::{
        ALL_TONES, chat::ChatSession, filter_by_tone, generate_email_draft,
        generate_paraphrased_options, gemini::GeminiClientBuilder, prompts::DEFAULT_EMAIL_TONE,
        tone_filters,
    },
    table::{chat_export_filename, convert_first_table_to_csv, detect_table, trigger_download},
    tasklet::download::{FileSaver, FilesystemSaver, CSV_MIME_TYPE},
};

fn main() {
    env_logger::init();

    let matches = Command::new("tablecast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Markdown table to CSV export for generative-text replies")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("detect")
                .about("Report whether the text holds a Markdown table")
                .arg(Arg::new("path").help("Input file (stdin when omitted)").index(1)),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert the first Markdown table to CSV")
                .arg(Arg::new("path").help("Input file (stdin when omitted)").index(1))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write the CSV to this file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("paraphrase")
                .about("Paraphrase a message in several tones")
                .arg(Arg::new("message").required(true).index(1))
                .arg(
                    Arg::new("tone")
                        .long("tone")
                        .short('t')
                        .help("Only print options in this tone")
                        .default_value(ALL_TONES),
                ),
        )
        .subcommand(
            Command::new("email")
                .about("Draft an email around a key message")
                .arg(Arg::new("message").required(true).index(1))
                .arg(
                    Arg::new("tone")
                        .long("tone")
                        .short('t')
                        .default_value(DEFAULT_EMAIL_TONE),
                ),
        )
        .subcommand(
            Command::new("chat")
                .about("Chat with the model, one message per input line")
                .arg(
                    Arg::new("export-dir")
                        .long("export-dir")
                        .help("Directory where tables found in replies are saved as CSV"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("detect", m)) => handle_detect_command(m.get_one::<String>("path")),
        Some(("convert", m)) => handle_convert_command(
            m.get_one::<String>("path"),
            m.get_one::<String>("output"),
        ),
        Some(("paraphrase", m)) => handle_paraphrase_command(
            m.get_one::<String>("message").map_or("", String::as_str),
            m.get_one::<String>("tone").map_or(ALL_TONES, String::as_str),
        ),
        Some(("email", m)) => handle_email_command(
            m.get_one::<String>("message").map_or("", String::as_str),
            m.get_one::<String>("tone").map_or(DEFAULT_EMAIL_TONE, String::as_str),
        ),
        Some(("chat", m)) => handle_chat_command(m.get_one::<String>("export-dir")),
        _ => unreachable!(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn read_input(path: Option<&String>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Unable to read {}", path))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Unable to read stdin")?;
            Ok(text)
        }
    }
}

/// Handle the detect command
fn handle_detect_command(path: Option<&String>) -> Result<()> {
    let text = read_input(path)?;
    println!("{}", detect_table(&text));
    Ok(())
}

/// Handle the convert command
fn handle_convert_command(path: Option<&String>, output: Option<&String>) -> Result<()> {
    let text = read_input(path)?;

    let Some(csv) = convert_first_table_to_csv(&text) else {
        anyhow::bail!("No Markdown table found");
    };

    match output {
        Some(output) => {
            let output = Path::new(output);
            let directory = output
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let filename = output
                .file_name()
                .and_then(|name| name.to_str())
                .context("Output must name a file")?;

            FilesystemSaver::new(directory)
                .save(csv.as_bytes(), filename, CSV_MIME_TYPE)
                .with_context(|| format!("Unable to save {}", output.display()))?;
            info!("CSV written to {}", output.display());
        }
        None => println!("{}", csv),
    }
    Ok(())
}

/// Handle the paraphrase command
fn handle_paraphrase_command(message: &str, tone: &str) -> Result<()> {
    let client = GeminiClientBuilder::from_env().build()?;
    let options = generate_paraphrased_options(&client, message)?;

    let selected = filter_by_tone(&options, tone);
    if selected.is_empty() && !options.is_empty() {
        anyhow::bail!(
            "No option in tone {:?}; available: {}",
            tone,
            tone_filters(&options).join(", ")
        );
    }

    for option in selected {
        println!("{}: {}", option.tone, option.message);
    }
    Ok(())
}

/// Handle the email command
fn handle_email_command(message: &str, tone: &str) -> Result<()> {
    let client = GeminiClientBuilder::from_env().build()?;

    let draft = generate_email_draft(&client, message, tone)?;
    println!("Subject: {}\n\n{}", draft.subject, draft.body);
    Ok(())
}

/// Handle the chat command
fn handle_chat_command(export_dir: Option<&String>) -> Result<()> {
    let client = GeminiClientBuilder::from_env().build()?;
    let saver = export_dir.map(FilesystemSaver::new);
    let mut session = ChatSession::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("Unable to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = session.ask(&client, &line);
        writeln!(stdout, "{}\n", reply.text)?;

        if let Some(saver) = &saver {
            if detect_table(&reply.text) {
                if let Some(csv) = convert_first_table_to_csv(&reply.text) {
                    let filename = chat_export_filename(&reply.id);
                    trigger_download(&csv, &filename, saver);
                    writeln!(stdout, "[table exported to {}]\n", filename)?;
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}
