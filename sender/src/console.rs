use crate::samples::catalog;
use crate::session::{SendResult, Session};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  url <url>          set the target URL
  key <api-key>      set the API key
  random             generate a full random payload
  minimal            generate a minimal payload
  samples            list sample payloads
  sample <name|#>    load a sample payload
  payload <json>     replace the payload text
  load <file>        replace the payload text with a file's contents
  show               print configuration and payload
  send               send the payload once
  batch              send 10 freshly generated payloads
  results            print the result log
  clear              clear the result log
  help               show this help
  quit               exit";

#[derive(Debug, PartialEq)]
pub enum Command {
    Url(String),
    Key(String),
    Random,
    Minimal,
    Samples,
    Sample(String),
    Payload(String),
    Load(PathBuf),
    Show,
    Send,
    Batch,
    Results,
    Clear,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let needs_arg = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {} <{}>", word, what))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "url" => Command::Url(needs_arg("url")?),
        "key" => Command::Key(needs_arg("api-key")?),
        "random" => Command::Random,
        "minimal" => Command::Minimal,
        "samples" => Command::Samples,
        "sample" => Command::Sample(needs_arg("name")?),
        "payload" => Command::Payload(needs_arg("json")?),
        "load" => Command::Load(PathBuf::from(needs_arg("file")?)),
        "show" => Command::Show,
        "send" => Command::Send,
        "batch" => Command::Batch,
        "results" => Command::Results,
        "clear" => Command::Clear,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {} (try `help`)", other)),
    };
    Ok(command)
}

/// Accepts a sample's exact name or its 1-based position in the list.
pub fn resolve_sample(arg: &str) -> Option<&'static str> {
    let samples = catalog();
    if let Ok(index) = arg.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| samples.get(i))
            .map(|s| s.name);
    }
    samples.iter().find(|s| s.name == arg).map(|s| s.name)
}

pub fn render_samples(selected: Option<&str>) -> String {
    catalog()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let marker = if Some(s.name) == selected { '*' } else { ' ' };
            format!("{} {:>2}. {}", marker, i + 1, s.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_result(result: &SendResult) -> String {
    let status = if result.success { "ok  " } else { "FAIL" };
    format!("[{}] {}  {}", status, result.timestamp, result.message)
}

pub fn render_results(results: &[SendResult]) -> String {
    if results.is_empty() {
        return "(no results)".to_string();
    }
    results
        .iter()
        .map(render_result)
        .collect::<Vec<_>>()
        .join("\n")
}

fn alert(message: impl std::fmt::Display) {
    println!("! {}", message);
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run(session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Mock Tive Sender. Type `help` for commands.");
    println!("Target: {}", session.target_url());

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                alert(e);
                continue;
            }
        };

        match command {
            Command::Empty => {}
            Command::Url(url) => session.set_target_url(url),
            Command::Key(key) => session.set_api_key(key),
            Command::Random => {
                session.generate_random();
                println!("{}", session.payload());
            }
            Command::Minimal => {
                session.generate_minimal();
                println!("{}", session.payload());
            }
            Command::Samples => println!("{}", render_samples(session.selected_sample())),
            Command::Sample(arg) => match resolve_sample(&arg) {
                Some(name) => {
                    session.select_sample(name);
                    println!("{}", session.payload());
                }
                None => alert(format!("no sample named {:?}", arg)),
            },
            Command::Payload(text) => session.set_payload(text),
            Command::Load(path) => match tokio::fs::read_to_string(&path).await {
                Ok(text) => session.set_payload(text),
                Err(e) => alert(format!("cannot read {}: {}", path.display(), e)),
            },
            Command::Show => {
                println!("URL:     {}", session.target_url());
                println!("API key: {}", session.masked_api_key());
                if let Some(name) = session.selected_sample() {
                    println!("Sample:  {}", name);
                }
                println!("{}", session.payload());
            }
            Command::Send => {
                println!("Sending...");
                match session.send().await {
                    Ok(result) => println!("{}", render_result(result)),
                    Err(e) => alert(e),
                }
            }
            Command::Batch => {
                println!("Sending...");
                match session.send_batch().await {
                    Ok(batch) => println!("{}", render_results(batch)),
                    Err(e) => alert(e),
                }
            }
            Command::Results => println!("{}", render_results(session.results())),
            Command::Clear => session.clear_results(),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}
