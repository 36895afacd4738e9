use env_logger::{Builder, Env, Target};

/// Environment toggle enabling debug tracing of every backend call.
pub const DEBUG_ENV: &str = "CHECK_IMAGE_UPDATES_DEBUG";

pub fn init(verbose: bool) {
    let level = if verbose || toggle_enabled(std::env::var(DEBUG_ENV).ok().as_deref()) {
        "debug"
    } else {
        "info"
    };

    Builder::from_env(Env::default().default_filter_or(level))
        .target(Target::Stderr)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn toggle_enabled(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}
