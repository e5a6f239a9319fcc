use crate::browser_config::BrowserConfigStore;
use crate::context::ConversationContext;
use crate::scheduler::{ScheduledTask, TaskExecutionResult};
use chrono::SecondsFormat;
use helm_common::protocol::{ActionKind, ActionStatus, BrowserAction, CommandOutcome};

/// Everything about an outcome except the response text.
pub fn format_outcome(outcome: &CommandOutcome) -> String {
    let mut lines: Vec<String> = outcome.actions.iter().map(format_action).collect();

    if let Some(url) = &outcome.new_url {
        lines.push(format!("URL: {}", url));
    }
    for data in &outcome.extracted_data {
        let count = data.entry_count();
        lines.push(format!(
            "Extracted {} from {} ({} entr{})",
            data.kind.as_str(),
            data.source,
            count,
            if count == 1 { "y" } else { "ies" }
        ));
    }
    lines.join("\n")
}

pub fn format_action(action: &BrowserAction) -> String {
    let kind = match action.kind {
        ActionKind::Navigate => "navigate",
        ActionKind::Click => "click",
        ActionKind::Input => "input",
        ActionKind::Extract => "extract",
    };
    let mut line = format!("- [{}] {}", kind, action.description);
    if let Some(details) = &action.details {
        line.push_str(&format!(" ({})", details));
    }
    if action.status == ActionStatus::Error {
        line.push_str(" [failed]");
    }
    line
}

pub fn format_tasks(tasks: &[ScheduledTask]) -> String {
    if tasks.is_empty() {
        return "No scheduled tasks.".to_string();
    }
    let mut output = format!("{} scheduled task(s):", tasks.len());
    for task in tasks {
        output.push_str(&format!(
            "\n- {} \"{}\" every {} min, {}: {}",
            task.id,
            task.name,
            task.interval_minutes(),
            task.state().as_str(),
            task.command
        ));
        if let Some(next) = task.next_run
            && task.is_active
        {
            output.push_str(&format!(
                " (next run {})",
                next.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
    }
    output
}

pub fn format_results(results: &[TaskExecutionResult]) -> String {
    if results.is_empty() {
        return "No results recorded.".to_string();
    }
    results
        .iter()
        .map(|result| {
            format!(
                "- {} {} {}",
                result.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                if result.success { "ok" } else { "failed" },
                result.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_history(actions: &[BrowserAction]) -> String {
    if actions.is_empty() {
        return "No actions yet.".to_string();
    }
    actions.iter().map(format_action).collect::<Vec<_>>().join("\n")
}

pub fn format_browser(browser: &BrowserConfigStore) -> String {
    let platform = browser.platform();
    let config = browser.config();
    let extensions = if config.extensions.is_empty() {
        "none".to_string()
    } else {
        config.extensions.join(", ")
    };
    [
        format!("Platform: {}", platform),
        format!(
            "Browser: {}",
            platform.default_browser_path().unwrap_or("not found")
        ),
        format!("User agent: {}", config.user_agent),
        format!("Proxy: {}", config.proxy.as_deref().unwrap_or("none")),
        format!("Extensions: {}", extensions),
    ]
    .join("\n")
}

pub fn format_context(context: &ConversationContext) -> String {
    match serde_json::to_string_pretty(context) {
        Ok(json) => json,
        Err(e) => format!("Error: {}", e),
    }
}
