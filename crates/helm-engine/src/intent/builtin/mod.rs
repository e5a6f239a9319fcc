use super::registry::IntentRegistry;

pub mod extension;
pub mod extract;
pub mod fallback;
pub mod login;
pub mod navigate;
pub mod previous;
pub mod proxy;
pub mod schedule;
pub mod search;
pub mod weather;

/// Register all built-in intents in priority order.
pub fn register_all(registry: &mut IntentRegistry) {
    registry.register(schedule::rule());
    registry.register(proxy::rule());
    registry.register(extension::rule());
    registry.register(search::rule());
    registry.register(navigate::rule());
    registry.register(login::rule());
    registry.register(extract::rule());
    registry.register(weather::rule());
    registry.register(previous::rule());
}
