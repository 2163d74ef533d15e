//! Launcher binary: assembles the runtime command line and execs the
//! server process. Flags, environment and the operator config file are
//! described in `launcher::args::usage`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::exit;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appshell::launcher::{LaunchSettings, Launcher, LauncherError};

/// Default operator config file, relative to the working directory.
const DEFAULT_CONFIG_FILE: &str = "conf/application.ini";

/// Classpath handed to the runtime unless overridden.
const DEFAULT_CLASSPATH: &str = "lib/*";

/// Main class launched unless `-main` or the environment overrides it.
const DEFAULT_MAIN_CLASS: &str = "play.core.server.ProdServerStart";

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appshell=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env: HashMap<String, String> = std::env::vars().collect();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut settings = LaunchSettings::new(
        env.get("APPSHELL_CLASSPATH").cloned().unwrap_or_else(|| DEFAULT_CLASSPATH.to_string()),
        env.get("APPSHELL_MAIN_CLASS").cloned().unwrap_or_else(|| DEFAULT_MAIN_CLASS.to_string()),
    );
    settings.echo_command = !env.contains_key("APPSHELL_LAUNCH_QUIET");

    let config_path = env
        .get("APPSHELL_LAUNCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config_contents = std::fs::read_to_string(&config_path).ok();
    if config_contents.is_some() {
        tracing::debug!(path = %config_path.display(), "loaded launch config file");
    }

    let launcher = Launcher::new(settings);
    match launcher.launch(argv, &env, config_contents.as_deref()) {
        // Spawn path: propagate the child's exit code unchanged.
        Ok(code) => exit(code),
        Err(err) => {
            let code = match &err {
                LauncherError::MissingArgument { .. } | LauncherError::MalformedArgument { .. } => 2,
                LauncherError::TargetNotFound { .. } | LauncherError::Io(_) => 1,
            };
            eprintln!("appshell-launch: {err}");
            exit(code);
        }
    }
}
