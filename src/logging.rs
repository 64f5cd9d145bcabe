//! Log filter selection

/// Filter used when neither `RUST_LOG` nor `LOG_LEVEL` is set.
pub const DEFAULT_FILTER: &str = "llama_launch=info";

/// Pick the tracing filter directive.
///
/// `RUST_LOG` is taken verbatim. `LOG_LEVEL` accepts a bare level, which is
/// scoped to this crate, or any full directive.
pub fn filter_directive(rust_log: Option<String>, log_level: Option<String>) -> String {
    if let Some(directive) = rust_log.filter(|s| !s.is_empty()) {
        return directive;
    }
    match log_level.filter(|s| !s.is_empty()) {
        Some(level) => match level.to_ascii_lowercase().as_str() {
            lvl @ ("trace" | "debug" | "info" | "warn" | "error") => format!("llama_launch={lvl}"),
            "warning" => "llama_launch=warn".to_string(),
            _ => level,
        },
        None => DEFAULT_FILTER.to_string(),
    }
}
