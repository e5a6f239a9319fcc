use crate::intent::params;
use crate::intent::{Effect, Intent, IntentInput, IntentReply, IntentRule, Utterance};
use crate::scheduler::task::DEFAULT_INTERVAL_MINUTES;
use crate::scheduler::{NewTask, ScheduledTask, interval_spec};
use helm_common::protocol::{BrowserAction, DataKind, ExtractedData};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

const DEFAULT_NAME: &str = "Automated Task";
const DEFAULT_COMMAND: &str = "search Google";
const SCHEDULER_PAGE: &str = "helm://scheduler";

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:to|run)\s+(.+?)(?:\s+every\b.*)?$").unwrap());
static LISTING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:list|show|view|display|see)\b.*\btasks?\b|\bmy\s+(?:scheduled\s+|recurring\s+)?tasks\b",
    )
    .unwrap()
});

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::ScheduleTask,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.has_any_word(&["schedule", "scheduled", "schedules", "scheduler", "recurring"])
        || params::every_minutes(u.lower()).is_some()
        || (u.has_any_word(&["task", "tasks"]) && is_listing(u))
}

/// A request to see tasks rather than create one. Only the part before any
/// quoted name or `to <command>` clause is considered.
fn is_listing(u: &Utterance) -> bool {
    let head = request_head(u.raw());
    LISTING_RE.is_match(&head)
        && !Utterance::new(&head).has_any_word(&["create", "add", "new", "every"])
}

fn request_head(raw: &str) -> String {
    let text = params::without_quoted(raw);
    match COMMAND_RE.find(&text) {
        Some(clause) => text[..clause.start()].to_string(),
        None => text,
    }
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    if is_listing(input.utterance) {
        list(input)
    } else {
        create(input)
    }
}

fn create(input: &IntentInput<'_>) -> IntentReply {
    let raw = input.utterance.raw();
    let name = params::quoted(raw).unwrap_or_else(|| DEFAULT_NAME.to_string());
    let command = COMMAND_RE
        .captures(&params::without_quoted(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| params::clean(m.as_str()).to_string())
        .filter(|command| !command.is_empty())
        .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
    let minutes = params::every_minutes(raw).unwrap_or(DEFAULT_INTERVAL_MINUTES);
    let interval = interval_spec(minutes);

    let task = NewTask {
        name: name.clone(),
        description: format!("Created from chat: {}", raw),
        interval: interval.clone(),
        command: command.clone(),
    };

    IntentReply::new(format!(
        "I've scheduled \"{}\" to run \"{}\" every {} minute{}. You can pause or delete it from the task scheduler.",
        name,
        command,
        minutes,
        if minutes == 1 { "" } else { "s" }
    ))
    .action(BrowserAction::navigate("Open task scheduler", input.now).with_details(SCHEDULER_PAGE))
    .action(
        BrowserAction::input("Enter task details", input.now)
            .with_details(format!("{} | {} | {}", name, interval, command)),
    )
    .action(BrowserAction::click("Click \"Create Task\" button", input.now))
    .effect(Effect::CreateTask(task))
}

fn list(input: &IntentInput<'_>) -> IntentReply {
    let tasks = input.tasks;
    let response = if tasks.is_empty() {
        "You don't have any scheduled tasks yet.".to_string()
    } else {
        let summary: Vec<String> = tasks.iter().map(describe).collect();
        format!(
            "You have {} scheduled task{}: {}.",
            tasks.len(),
            if tasks.len() == 1 { "" } else { "s" },
            summary.join("; ")
        )
    };

    let mut rows = vec![json!(["Name", "Command", "Interval", "Status", "Next run"])];
    rows.extend(tasks.iter().map(row));
    let table = ExtractedData::new(DataKind::Table, Value::Array(rows), SCHEDULER_PAGE, input.now);

    IntentReply::new(response)
        .action(BrowserAction::navigate("Open task scheduler", input.now).with_details(SCHEDULER_PAGE))
        .action(BrowserAction::extract("Extract scheduled task list", input.now))
        .extracted_as("taskList", table)
}

fn describe(task: &ScheduledTask) -> String {
    format!(
        "\"{}\" every {} min ({})",
        task.name,
        task.interval_minutes(),
        if task.is_active { "active" } else { "paused" }
    )
}

fn row(task: &ScheduledTask) -> Value {
    json!([
        task.name,
        task.command,
        task.interval,
        if task.is_active { "active" } else { "paused" },
        task.next_run.map(|at| at.to_rfc3339()),
    ])
}
