use crate::engine::Engine;
use crate::executor::CommandExecutor;
use crate::context::Preference;
use crate::formatter;
use crate::intent::builtin::search::SearchEngine;
use crate::intent::params;
use std::error::Error;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Actions shown by `/history`.
const HISTORY_TAIL: usize = 20;

const HELP: &str = "\
/context          show the conversation context
/tasks            list scheduled tasks
/results <id>     show recent results of a task
/run <id>         run a task now
/toggle <id>      pause or resume a task
/delete <id>      delete a task
/history          show recent browser actions
/browser          show browser settings
/prefer <engine>  set the default search engine (google, bing, duckduckgo)
/favorite <url>   add a favorite site
/unfavorite <url> remove a favorite site
/reset            start a new session
/clear            forget everything";

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
    /// Streams response words; no newline is added.
    pub reveal: fn(&str),
}

pub struct FileOptions {
    pub stop_on_error: bool,
}

pub struct ReplOptions<'a> {
    pub banner_lines: &'a [&'a str],
    pub prompt: &'a str,
    pub exit_commands: &'a [&'a str],
    /// Ctrl-C cancels the running command, or exits at the prompt.
    pub handle_ctrl_c: bool,
    pub ctrl_c_message: Option<&'a str>,
}

async fn execute_line(
    engine: &mut Engine,
    executor: &CommandExecutor,
    line: &str,
    output: OutputHandlers,
    handle_ctrl_c: bool,
) -> Result<String, String> {
    if let Some(meta) = line.strip_prefix('/') {
        return run_meta_command(engine, meta);
    }

    let cancel = CancellationToken::new();
    let run = executor.execute_line(engine, line, &cancel, output.reveal);
    let result = if handle_ctrl_c {
        tokio::pin!(run);
        loop {
            tokio::select! {
                result = &mut run => break result,
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => cancel.cancel(),
            }
        }
    } else {
        run.await
    };
    (output.reveal)("\n");

    match result {
        Ok(result) => Ok(formatter::format_outcome(&result.outcome)),
        Err(e) => Err(format!("{}", e)),
    }
}

/// Handle a `/command` typed at the prompt (without the slash).
pub fn run_meta_command(engine: &mut Engine, input: &str) -> Result<String, String> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();
    let scheduler = engine.scheduler().clone();

    let require_id = || arg.ok_or_else(|| format!("Usage: /{} <task id>", command));
    let unknown_task = |id: &str| format!("No task with id {}", id);

    match command {
        "help" => Ok(HELP.to_string()),
        "context" => Ok(formatter::format_context(engine.context().context())),
        "tasks" => Ok(formatter::format_tasks(&scheduler.list())),
        "results" => {
            let id = require_id()?;
            match scheduler.get(id) {
                Some(_) => Ok(formatter::format_results(&scheduler.results(id))),
                None => Err(unknown_task(id)),
            }
        }
        "run" => {
            let id = require_id()?;
            let result = scheduler.execute(id).ok_or_else(|| unknown_task(id))?;
            Ok(result.message)
        }
        "toggle" => {
            let id = require_id()?;
            let task = scheduler.toggle(id).ok_or_else(|| unknown_task(id))?;
            Ok(format!(
                "Task \"{}\" is now {}.",
                task.name,
                task.state().as_str()
            ))
        }
        "delete" => {
            let id = require_id()?;
            if scheduler.delete(id) {
                Ok(format!("Deleted task {}.", id))
            } else {
                Err(unknown_task(id))
            }
        }
        "history" => Ok(formatter::format_history(&engine.history().tail(HISTORY_TAIL))),
        "browser" => Ok(formatter::format_browser(engine.browser())),
        "prefer" => {
            let name = arg.ok_or("Usage: /prefer <google|bing|duckduckgo>")?;
            let search = SearchEngine::parse(name)
                .ok_or_else(|| format!("Unknown search engine: {}", name))?;
            engine
                .context_mut()
                .update_preference(Preference::DefaultSearchEngine(search.name().to_string()));
            Ok(format!("Default search engine is now {}.", search.label()))
        }
        "favorite" => {
            let url = site_arg(command, arg)?;
            engine.context_mut().add_favorite_site(url.clone());
            Ok(format!("Added {} to favorites.", url))
        }
        "unfavorite" => {
            let url = site_arg(command, arg)?;
            if !engine.context().context().preferences.favorite_sites.contains(&url) {
                return Err(format!("{} is not a favorite", url));
            }
            engine.context_mut().remove_favorite_site(&url);
            Ok(format!("Removed {} from favorites.", url))
        }
        "reset" => {
            engine.context_mut().reset_session();
            Ok("Started a new session.".to_string())
        }
        "clear" => {
            engine.context_mut().clear_all();
            Ok("Cleared all conversation data.".to_string())
        }
        other => Err(format!("Unknown command: /{} (try /help)", other)),
    }
}

fn site_arg(command: &str, arg: Option<&str>) -> Result<String, String> {
    let target = arg.ok_or_else(|| format!("Usage: /{} <url>", command))?;
    params::normalize_url(target).ok_or_else(|| format!("Not a URL: {}", target))
}

pub async fn run_file(
    engine: &mut Engine,
    executor: &CommandExecutor,
    output: OutputHandlers,
    path: &str,
    options: FileOptions,
) -> Result<(), Box<dyn Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match execute_line(engine, executor, trimmed, output, false).await {
            Ok(result) => print_nonempty(output, &result),
            Err(err) => {
                (output.err)(&format!("Error executing line '{}': {}", trimmed, err));
                if options.stop_on_error {
                    return Err(io::Error::other(err).into());
                }
            }
        }
    }
    Ok(())
}

fn print_nonempty(output: OutputHandlers, text: &str) {
    if !text.is_empty() {
        (output.out)(text);
    }
}

/// Possible outcomes from reading a single REPL line.
enum ReadLineResult {
    /// A non-empty input line to process.
    Input(String),
    /// Empty line or no input yet -- skip and re-prompt.
    Skip,
    /// EOF or exit command -- terminate the loop.
    Exit,
    /// I/O error while reading.
    Error(io::Error),
}

async fn read_line(
    reader: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    exit_commands: &[&str],
    handle_ctrl_c: bool,
    ctrl_c_message: Option<&str>,
    output: OutputHandlers,
) -> ReadLineResult {
    if handle_ctrl_c {
        tokio::select! {
            line = reader.next_line() => {
                classify_line(line, exit_commands)
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(message) = ctrl_c_message {
                    (output.out)(message);
                }
                ReadLineResult::Exit
            }
        }
    } else {
        classify_line(reader.next_line().await, exit_commands)
    }
}

fn classify_line(
    result: Result<Option<String>, io::Error>,
    exit_commands: &[&str],
) -> ReadLineResult {
    match result {
        Ok(Some(input)) => {
            let trimmed = input.trim().to_string();
            if trimmed.is_empty() {
                ReadLineResult::Skip
            } else if exit_commands
                .iter()
                .any(|exit| exit.eq_ignore_ascii_case(&trimmed))
            {
                ReadLineResult::Exit
            } else {
                ReadLineResult::Input(trimmed)
            }
        }
        Ok(None) => ReadLineResult::Exit,
        Err(e) => ReadLineResult::Error(e),
    }
}

pub async fn run_repl(
    engine: &mut Engine,
    executor: &CommandExecutor,
    output: OutputHandlers,
    options: ReplOptions<'_>,
) -> Result<(), Box<dyn Error>> {
    for line in options.banner_lines {
        (output.out)(line);
    }

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();

    loop {
        print!("{}", options.prompt);
        stdout.flush()?;

        match read_line(
            &mut reader,
            options.exit_commands,
            options.handle_ctrl_c,
            options.ctrl_c_message,
            output,
        )
        .await
        {
            ReadLineResult::Input(line) => {
                match execute_line(engine, executor, &line, output, options.handle_ctrl_c).await {
                    Ok(result) => print_nonempty(output, &result),
                    Err(err) => (output.err)(&format!("Error: {}", err)),
                }
            }
            ReadLineResult::Skip => continue,
            ReadLineResult::Exit => break,
            ReadLineResult::Error(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use helm_common::platform::Platform;
    use std::sync::Arc;

    fn engine() -> Engine {
        Engine::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(ManualClock::starting_now()),
            Platform::Linux,
        )
    }

    #[test]
    fn test_classify_line() {
        let exits = ["exit", "quit"];
        assert!(matches!(classify_line(Ok(Some("  ".into())), &exits), ReadLineResult::Skip));
        assert!(matches!(classify_line(Ok(Some("QUIT".into())), &exits), ReadLineResult::Exit));
        assert!(matches!(classify_line(Ok(None), &exits), ReadLineResult::Exit));
        assert!(matches!(
            classify_line(Ok(Some(" weather ".into())), &exits),
            ReadLineResult::Input(line) if line == "weather"
        ));
    }

    #[test]
    fn test_task_meta_commands() {
        let mut engine = engine();
        engine.resolve_and_apply("schedule \"News\" to search Google for news every 10 minutes");
        let id = engine.scheduler().list()[0].id.clone();

        let listing = run_meta_command(&mut engine, "tasks").unwrap();
        assert!(listing.contains("\"News\" every 10 min, active"));

        let toggled = run_meta_command(&mut engine, &format!("toggle {}", id)).unwrap();
        assert_eq!(toggled, "Task \"News\" is now paused.");

        let ran = run_meta_command(&mut engine, &format!("run {}", id)).unwrap();
        assert_eq!(ran, "Task \"News\" executed successfully");
        let results = run_meta_command(&mut engine, &format!("results {}", id)).unwrap();
        assert!(results.contains("ok Task \"News\" executed successfully"));

        assert!(run_meta_command(&mut engine, &format!("delete {}", id)).is_ok());
        assert!(run_meta_command(&mut engine, &format!("delete {}", id)).is_err());
        assert_eq!(
            run_meta_command(&mut engine, "results").unwrap_err(),
            "Usage: /results <task id>"
        );
    }

    #[test]
    fn test_context_meta_commands() {
        let mut engine = engine();
        engine.resolve_and_apply("go to example.com");
        let context = run_meta_command(&mut engine, "context").unwrap();
        assert!(context.contains("\"currentSite\": \"https://example.com\""));

        run_meta_command(&mut engine, "reset").unwrap();
        assert!(engine.context().current_site().is_none());
        assert_eq!(engine.context().context().previous_commands.len(), 1);

        run_meta_command(&mut engine, "clear").unwrap();
        assert!(engine.context().context().previous_commands.is_empty());

        assert!(run_meta_command(&mut engine, "bogus").is_err());
    }

    #[test]
    fn test_prefer_changes_default_search_engine() {
        let mut engine = engine();
        assert_eq!(
            run_meta_command(&mut engine, "prefer DuckDuckGo").unwrap(),
            "Default search engine is now DuckDuckGo."
        );
        assert_eq!(engine.context().context().preferences.default_search_engine, "duckduckgo");

        let outcome = engine.resolve_and_apply("search for rust async");
        assert_eq!(outcome.new_url.as_deref(), Some("https://duckduckgo.com/?q=rust%20async"));

        assert_eq!(
            run_meta_command(&mut engine, "prefer altavista").unwrap_err(),
            "Unknown search engine: altavista"
        );
        assert!(run_meta_command(&mut engine, "prefer").is_err());
        assert_eq!(engine.context().context().preferences.default_search_engine, "duckduckgo");
    }

    #[test]
    fn test_favorite_meta_commands() {
        let mut engine = engine();
        assert_eq!(
            run_meta_command(&mut engine, "favorite docs.rs").unwrap(),
            "Added https://docs.rs to favorites."
        );
        run_meta_command(&mut engine, "favorite github").unwrap();
        assert_eq!(
            engine.context().context().preferences.favorite_sites,
            vec!["https://docs.rs", "https://github.com"]
        );

        run_meta_command(&mut engine, "unfavorite https://docs.rs").unwrap();
        assert_eq!(
            run_meta_command(&mut engine, "unfavorite docs.rs").unwrap_err(),
            "https://docs.rs is not a favorite"
        );
        assert_eq!(
            run_meta_command(&mut engine, "favorite nonsense").unwrap_err(),
            "Not a URL: nonsense"
        );
        assert_eq!(
            engine.context().context().preferences.favorite_sites,
            vec!["https://github.com"]
        );
    }

    #[test]
    fn test_browser_meta_command() {
        let mut engine = engine();
        engine.resolve_and_apply("set proxy to 127.0.0.1:8080");
        let text = run_meta_command(&mut engine, "browser").unwrap();
        assert!(text.contains("Platform: Linux"));
        assert!(text.contains("Proxy: 127.0.0.1:8080"));
    }

    #[tokio::test]
    async fn test_run_file_executes_each_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("commands.txt");
        std::fs::write(&script, "# comment\n\ngo to example.com\nextract links\n/tasks\n").unwrap();

        let mut engine = engine();
        let executor = CommandExecutor::new(crate::executor::ExecutorOptions::instant());
        let output = OutputHandlers {
            out: |_| {},
            err: |msg| panic!("unexpected error: {}", msg),
            reveal: |_| {},
        };
        run_file(
            &mut engine,
            &executor,
            output,
            script.to_str().unwrap(),
            FileOptions { stop_on_error: true },
        )
        .await
        .unwrap();

        let commands = &engine.context().context().previous_commands;
        assert_eq!(commands, &vec!["extract links".to_string(), "go to example.com".to_string()]);
        assert!(engine.context().extracted_data().get("latestExtraction").is_some());
    }
}
