use crate::browser_config::BrowserConfigStore;
use crate::clock::Clock;
use crate::context::ContextStore;
use crate::history::ActionLog;
use crate::intent::{Effect, IntentResolver, Resolution, ResolverView};
use crate::scheduler::{SharedScheduler, TaskScheduler};
use crate::storage::Storage;
use helm_common::platform::Platform;
use helm_common::protocol::CommandOutcome;
use std::sync::Arc;
use tracing::{debug, info};

/// The stateful half of command processing.
///
/// Owns the conversation context and browser settings, shares the
/// scheduler and action history with the timer runtime.
pub struct Engine {
    context: ContextStore,
    browser: BrowserConfigStore,
    scheduler: SharedScheduler,
    history: ActionLog,
    resolver: IntentResolver,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Load all three namespaces from `storage`.
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, platform: Platform) -> Self {
        let history = ActionLog::new();
        let context = ContextStore::load(storage.clone(), clock.clone());
        let browser = BrowserConfigStore::load(storage.clone(), platform);
        let scheduler = SharedScheduler::new(TaskScheduler::load(storage, clock.clone(), history.clone()));
        info!(platform = %platform, "Engine ready");

        Self {
            context,
            browser,
            scheduler,
            history,
            resolver: IntentResolver::default(),
            clock,
        }
    }

    /// Work out what a command would do. No state changes.
    pub fn plan(&self, command: &str) -> Resolution {
        let tasks = self.scheduler.list();
        let view = ResolverView {
            context: self.context.context(),
            browser: self.browser.config(),
            tasks: &tasks,
            now: self.clock.now(),
        };
        self.resolver.plan(command, &view)
    }

    /// Record the command and apply a planned resolution.
    pub fn commit(&mut self, command: &str, resolution: &Resolution) {
        self.context.add_command(command);
        for effect in &resolution.effects {
            self.apply(effect);
        }
        self.history.append(&resolution.outcome.actions);
    }

    /// Plan and commit in one step.
    pub fn resolve_and_apply(&mut self, command: &str) -> CommandOutcome {
        let resolution = self.plan(command);
        self.commit(command, &resolution);
        resolution.outcome
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::AddTopic(topic) => self.context.add_topic(topic.clone()),
            Effect::SetCurrentSite(url) => self.context.update_current_site(Some(url.clone())),
            Effect::StoreExtracted { key, value } => {
                self.context.add_extracted_data(key.clone(), value.clone())
            }
            Effect::CreateTask(new) => {
                let task = self.scheduler.create(new.clone());
                debug!(task = %task.id, "Created task from command");
            }
            Effect::SetProxy(proxy) => self.browser.set_proxy(proxy.clone()),
            Effect::InstallExtension(name) => {
                self.browser.install_extension(name);
            }
            Effect::RemoveExtension(name) => {
                self.browser.remove_extension(name);
            }
        }
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextStore {
        &mut self.context
    }

    pub fn browser(&self) -> &BrowserConfigStore {
        &self.browser
    }

    pub fn scheduler(&self) -> &SharedScheduler {
        &self.scheduler
    }

    pub fn history(&self) -> &ActionLog {
        &self.history
    }
}
