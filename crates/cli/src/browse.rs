use crate::{error::CliError, output};
use engine_runtime::{
    error::ViewError,
    view::{Applied, TableSession},
};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const HELP: &str = "commands: next, prev, page N, filter TEXT, clear, sort COL, unsort, \
more, reload, columns, help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Page(usize),
    Filter(String),
    Clear,
    Sort(String),
    Unsort,
    More,
    Reload,
    Columns,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word.to_lowercase().as_str() {
            "next" | "n" => BrowseCommand::Next,
            "prev" | "p" => BrowseCommand::Prev,
            "page" => {
                let page = rest
                    .parse::<usize>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| format!("page needs a number from 1, got '{rest}'"))?;
                BrowseCommand::Page(page)
            }
            "filter" | "f" => BrowseCommand::Filter(rest.to_string()),
            "clear" => BrowseCommand::Clear,
            "sort" | "s" if !rest.is_empty() => BrowseCommand::Sort(rest.to_string()),
            "sort" | "s" => return Err("sort needs a column name".into()),
            "unsort" => BrowseCommand::Unsort,
            "more" | "m" => BrowseCommand::More,
            "reload" | "r" => BrowseCommand::Reload,
            "columns" => BrowseCommand::Columns,
            "help" | "?" => BrowseCommand::Help,
            "quit" | "q" | "exit" => BrowseCommand::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}

enum Refresh {
    Frame,
    Text(String),
}

async fn apply(session: &mut TableSession, command: BrowseCommand) -> Result<Refresh, ViewError> {
    match command {
        BrowseCommand::Next => session.next_page(),
        BrowseCommand::Prev => session.prev_page(),
        BrowseCommand::Page(page) => session.go_to(page),
        BrowseCommand::Filter(text) => session.set_filter(&text),
        BrowseCommand::Clear => session.set_filter(""),
        BrowseCommand::Sort(column) => session.toggle_sort(&column),
        BrowseCommand::Unsort => session.clear_sort(),
        BrowseCommand::More => {
            if session.more().await? == Applied::Unchanged {
                return Ok(Refresh::Text("Nothing more to load".into()));
            }
        }
        BrowseCommand::Reload => {
            session.reload().await?;
        }
        BrowseCommand::Columns => {
            return Ok(Refresh::Text(output::render_columns(&session.columns())));
        }
        BrowseCommand::Help | BrowseCommand::Quit => return Ok(Refresh::Text(HELP.into())),
    }
    Ok(Refresh::Frame)
}

fn frame(session: &TableSession) -> String {
    let mut out = output::render_table(&session.snapshot());
    if let Some(error) = session.status().error() {
        out.push_str(&format!("\n[{}]", session.status()));
        debug!(error, "Frame rendered with an error status");
    }
    out
}

/// Reads commands line by line until `quit`, end of input or cancellation.
pub async fn run<R>(
    session: &mut TableSession,
    input: R,
    cancel: CancellationToken,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    let mut lines = input.lines();

    stdout
        .write_all(format!("{}\n{HELP}\n", frame(session)).as_bytes())
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CliError::ShutdownRequested),
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<BrowseCommand>() {
            Ok(BrowseCommand::Quit) => break,
            Ok(command) => command,
            Err(err) => {
                stdout.write_all(format!("{err}\n").as_bytes()).await?;
                continue;
            }
        };

        let text = match apply(session, command).await {
            Ok(Refresh::Frame) => frame(session),
            Ok(Refresh::Text(text)) => text,
            Err(err) => err.to_string(),
        };
        if cancel.is_cancelled() {
            return Err(CliError::ShutdownRequested);
        }
        stdout.write_all(format!("{text}\n").as_bytes()).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("next".parse(), Ok(BrowseCommand::Next));
        assert_eq!(" P ".parse(), Ok(BrowseCommand::Prev));
        assert_eq!("page 3".parse(), Ok(BrowseCommand::Page(3)));
        assert_eq!(
            "filter  New York ".parse(),
            Ok(BrowseCommand::Filter("New York".into()))
        );
        assert_eq!("filter".parse(), Ok(BrowseCommand::Filter(String::new())));
        assert_eq!("sort Age".parse(), Ok(BrowseCommand::Sort("Age".into())));
        assert_eq!("q".parse(), Ok(BrowseCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("page 0".parse::<BrowseCommand>().is_err());
        assert!("page x".parse::<BrowseCommand>().is_err());
        assert!("sort".parse::<BrowseCommand>().is_err());
        assert!("launch".parse::<BrowseCommand>().is_err());
    }
}
