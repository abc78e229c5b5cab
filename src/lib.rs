#[cfg(test)]
mod build_info;
pub mod cache;
pub mod commands;
pub mod http;
pub mod markup;
pub mod runtime;
pub mod settings;
pub mod updater;
pub mod weather;

/// Version of this build, from `git describe` when available.
pub const VERSION: &str = env!("WEATHER_COMPACT_VERSION");

/// User-Agent sent with every outgoing request.
pub fn user_agent() -> String {
    format!("weather-compact/{}", VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_the_plugin_and_version() {
        let agent = user_agent();
        assert!(agent.starts_with("weather-compact/"));
        assert!(agent.ends_with(VERSION));
        assert!(!VERSION.is_empty());
    }
}
