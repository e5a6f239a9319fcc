use super::{Effect, Intent, IntentInput, IntentRegistry, Utterance};
use crate::browser_config::BrowserConfig;
use crate::context::ConversationContext;
use crate::rewriter::{ContextualRewriter, Rewrite};
use crate::scheduler::ScheduledTask;
use chrono::{DateTime, Utc};
use helm_common::protocol::CommandOutcome;
use tracing::debug;

/// Snapshot of the state a command is resolved against.
pub struct ResolverView<'a> {
    pub context: &'a ConversationContext,
    pub browser: &'a BrowserConfig,
    pub tasks: &'a [ScheduledTask],
    pub now: DateTime<Utc>,
}

/// A planned command: what to show and what to change.
///
/// Nothing has been applied yet; the effects are applied in order by the
/// engine once the command is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub intent: Intent,
    pub rewrite: Rewrite,
    pub outcome: CommandOutcome,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default)]
pub struct IntentResolver {
    registry: IntentRegistry,
}

impl IntentResolver {
    /// Rewrite, classify and handle a command without touching any state.
    pub fn plan(&self, command: &str, view: &ResolverView<'_>) -> Resolution {
        let rewrite = ContextualRewriter::rewrite(command, view.context);
        let utterance = Utterance::new(&rewrite.text);
        let rule = self.registry.classify(&utterance);
        debug!(intent = %rule.intent, contextual = rewrite.contextual, "Resolved command");

        let input = IntentInput {
            utterance: &utterance,
            context: view.context,
            browser: view.browser,
            tasks: view.tasks,
            now: view.now,
        };
        let reply = (rule.handle)(&input);

        let mut effects = Vec::with_capacity(reply.effects.len() + 2);
        effects.push(Effect::AddTopic(rule.intent.topic().to_string()));
        if let Some(url) = &reply.new_url {
            effects.push(Effect::SetCurrentSite(url.clone()));
        }
        effects.extend(reply.effects);

        let response = if reply.response.trim().is_empty() {
            "Done.".to_string()
        } else {
            reply.response
        };

        Resolution {
            intent: rule.intent,
            outcome: CommandOutcome {
                response: rewrite.decorate(&response),
                actions: reply.actions,
                new_url: reply.new_url,
                extracted_data: reply.extracted,
            },
            rewrite,
            effects,
        }
    }
}
