//! Rule-based intent resolution.
//!
//! A command is matched against an ordered list of rules; the first rule
//! whose predicate accepts it handles it. Handlers are pure: they describe
//! the state changes they want as [`Effect`]s and leave applying them to
//! the caller.

pub mod builtin;
pub mod params;
pub mod registry;
pub mod resolver;
pub mod utterance;

pub use registry::{IntentRegistry, IntentRule};
pub use resolver::{IntentResolver, Resolution, ResolverView};
pub use utterance::Utterance;

use crate::browser_config::BrowserConfig;
use crate::context::ConversationContext;
use crate::scheduler::{NewTask, ScheduledTask};
use chrono::{DateTime, Utc};
use helm_common::protocol::{BrowserAction, ExtractedData};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    ScheduleTask,
    ConfigureProxy,
    InstallExtension,
    Search,
    Navigate,
    Login,
    Extract,
    Weather,
    PreviousResults,
    Fallback,
}

impl Intent {
    /// Topic recorded in the conversation context when this intent runs.
    pub fn topic(self) -> &'static str {
        match self {
            Self::ScheduleTask => "task scheduling",
            Self::ConfigureProxy => "proxy configuration",
            Self::InstallExtension => "browser extensions",
            Self::Search => "web search",
            Self::Navigate => "navigation",
            Self::Login => "authentication",
            Self::Extract => "data extraction",
            Self::Weather => "weather",
            Self::PreviousResults => "previous results",
            Self::Fallback => "general",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ScheduleTask => "schedule_task",
            Self::ConfigureProxy => "configure_proxy",
            Self::InstallExtension => "install_extension",
            Self::Search => "search",
            Self::Navigate => "navigate",
            Self::Login => "login",
            Self::Extract => "extract",
            Self::Weather => "weather",
            Self::PreviousResults => "previous_results",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A state change requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AddTopic(String),
    SetCurrentSite(String),
    StoreExtracted { key: String, value: Value },
    CreateTask(NewTask),
    SetProxy(Option<String>),
    InstallExtension(String),
    RemoveExtension(String),
}

/// Everything a handler may look at. All of it is a read-only snapshot.
pub struct IntentInput<'a> {
    pub utterance: &'a Utterance,
    pub context: &'a ConversationContext,
    pub browser: &'a BrowserConfig,
    pub tasks: &'a [ScheduledTask],
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentReply {
    pub response: String,
    pub actions: Vec<BrowserAction>,
    pub new_url: Option<String>,
    pub extracted: Vec<ExtractedData>,
    pub effects: Vec<Effect>,
}

impl IntentReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }

    pub fn action(mut self, action: BrowserAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn navigate_to(mut self, url: impl Into<String>) -> Self {
        self.new_url = Some(url.into());
        self
    }

    /// Emit an extracted payload and cache it under `key`.
    pub fn extracted_as(mut self, key: impl Into<String>, data: ExtractedData) -> Self {
        self.effects.push(Effect::StoreExtracted {
            key: key.into(),
            value: data.to_value(),
        });
        self.extracted.push(data);
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;
    use crate::scheduler::interval_spec;
    use helm_common::platform::Platform;
    use helm_common::protocol::new_id;

    /// Read-only state for exercising a single rule.
    pub struct Fixture {
        pub context: ConversationContext,
        pub browser: BrowserConfig,
        pub tasks: Vec<ScheduledTask>,
        pub now: DateTime<Utc>,
    }

    impl Fixture {
        pub fn new() -> Self {
            let now = Utc::now();
            Self {
                context: ConversationContext::new(now),
                browser: BrowserConfig::for_platform(Platform::Linux),
                tasks: Vec::new(),
                now,
            }
        }

        pub fn with_site(mut self, site: &str) -> Self {
            self.context.session.current_site = Some(site.to_string());
            self
        }

        pub fn add_task(&mut self, name: &str, minutes: i64, active: bool) {
            self.tasks.push(ScheduledTask {
                id: new_id(),
                name: name.to_string(),
                description: String::new(),
                interval: interval_spec(minutes),
                command: "search Google".to_string(),
                is_active: active,
                last_run: None,
                next_run: active.then(|| self.now + chrono::TimeDelta::minutes(minutes)),
                created_at: self.now,
            });
        }

        /// Run `rule` on `text`, asserting that the rule claims it.
        pub fn run(&self, rule: IntentRule, text: &str) -> IntentReply {
            let utterance = Utterance::new(text);
            assert!((rule.matches)(&utterance), "{} did not match {:?}", rule.intent, text);
            let input = IntentInput {
                utterance: &utterance,
                context: &self.context,
                browser: &self.browser,
                tasks: &self.tasks,
                now: self.now,
            };
            (rule.handle)(&input)
        }
    }
}
