//! Command assembly and execution.
//!
//! # Responsibilities
//! - Merge config file, CLI args, environment and memory plan into one argv
//! - Echo the final command line for operator visibility
//! - Hand control to the runtime: exec on Unix, spawn-and-wait elsewhere
//!
//! # Data Flow
//! ```text
//! config file tokens ++ argv
//!     → scan (args.rs) → LaunchConfig
//!     → post-process hook on residual args
//!     → resolve runtime (runtime.rs) → version probe → MemoryPlan
//!     → [JAVA_OPTS] [plan flags] [extra args] -classpath <cp> <main> <app args> <residuals>
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::launcher::args::{self, LaunchConfig, Parsed};
use crate::launcher::error::LauncherError;
use crate::launcher::memory::MemoryPlan;
use crate::launcher::runtime;

/// Hook rewriting residual args before they are forwarded, supplied by an
/// embedding caller that wants to reinterpret leftover arguments.
pub type PostProcess = Box<dyn Fn(Vec<String>) -> Vec<String>>;

/// Static launch parameters, fixed at packaging time rather than scanned
/// from the command line.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    /// Classpath handed to the runtime via `-classpath`.
    pub classpath: String,
    /// Main class launched unless `-main` overrides it.
    pub main_class: String,
    /// Application-level args always placed before the residual args.
    pub app_args: Vec<String>,
    /// Echo the final command line before executing it.
    pub echo_command: bool,
}

impl LaunchSettings {
    pub fn new(classpath: impl Into<String>, main_class: impl Into<String>) -> Self {
        Self {
            classpath: classpath.into(),
            main_class: main_class.into(),
            app_args: Vec::new(),
            echo_command: true,
        }
    }
}

/// Fully-resolved command, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    echo: bool,
}

impl LaunchCommand {
    /// The command line as a display string, for the pre-exec echo.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }

    /// Hand control to the resolved command.
    ///
    /// On Unix the current process is replaced and this returns only on
    /// failure. Elsewhere the child is spawned and its exit code is
    /// propagated unchanged.
    pub fn execute(self) -> Result<i32, LauncherError> {
        if self.echo {
            println!("{}", self.command_line());
        }

        self.hand_off()
    }

    #[cfg(unix)]
    fn hand_off(self) -> Result<i32, LauncherError> {
        use std::os::unix::process::CommandExt;

        let err = Command::new(&self.program).args(&self.args).exec();
        // exec only returns on failure.
        if err.kind() == std::io::ErrorKind::NotFound {
            return Err(LauncherError::TargetNotFound { path: self.program });
        }
        Err(LauncherError::Io(err))
    }

    #[cfg(not(unix))]
    fn hand_off(self) -> Result<i32, LauncherError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    LauncherError::TargetNotFound { path: self.program.clone() }
                } else {
                    LauncherError::Io(err)
                }
            })?;
        restore_terminal();
        Ok(status.code().unwrap_or(1))
    }
}

/// Interactive shells on the emulated-terminal platforms are left with
/// echo disabled when the child dies mid-read; put the terminal back.
/// Best effort only.
#[cfg(not(unix))]
fn restore_terminal() {
    let _ = Command::new("stty").args(["icanon", "echo"]).status();
}

/// Outcome of [`Launcher::build_command`].
#[derive(Debug)]
pub enum Launch {
    Command(LaunchCommand),
    /// `-h`/`-help` was requested; print usage and exit non-zero.
    Help,
}

/// Turns argv + environment + optional config-file contents into the
/// command that runs the server process. Built once per process start,
/// used once.
pub struct Launcher {
    settings: LaunchSettings,
    post_process: Option<PostProcess>,
}

impl Launcher {
    pub fn new(settings: LaunchSettings) -> Self {
        Self {
            settings,
            post_process: None,
        }
    }

    /// Install a residual-argument rewriting hook.
    pub fn with_post_process(mut self, hook: impl Fn(Vec<String>) -> Vec<String> + 'static) -> Self {
        self.post_process = Some(Box::new(hook));
        self
    }

    /// Build the final command without executing it.
    pub fn build_command(
        &self,
        argv: Vec<String>,
        env: &HashMap<String, String>,
        config_file: Option<&str>,
    ) -> Result<Launch, LauncherError> {
        let merged = args::with_config_file(config_file, argv);
        let config = match args::parse(merged)? {
            Parsed::HelpRequested => return Ok(Launch::Help),
            Parsed::Config(config) => config,
        };

        Ok(Launch::Command(self.assemble(config, env)?))
    }

    fn assemble(
        &self,
        config: LaunchConfig,
        env: &HashMap<String, String>,
    ) -> Result<LaunchCommand, LauncherError> {
        let LaunchConfig {
            java_home,
            extra_runtime_args,
            memory_mb,
            main_class_override,
            no_version_check,
            verbose,
            residual_args,
            ..
        } = config;

        let residual_args = match &self.post_process {
            Some(hook) => hook(residual_args),
            None => residual_args,
        };

        if verbose {
            tracing::info!(
                memory_mb,
                residual = residual_args.len(),
                "launch options scanned"
            );
        }

        let program = runtime::resolve(java_home.as_deref(), env)?;

        let env_opts: Vec<String> = env
            .get(runtime::ENV_RUNTIME_OPTS)
            .map(|opts| opts.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        // The plan must see every memory flag the caller supplied, wherever
        // it came from.
        let mut caller_flags = env_opts.clone();
        caller_flags.extend(extra_runtime_args.iter().cloned());

        let version = if no_version_check {
            None
        } else {
            runtime::probe_version(&program)
        };
        let plan = MemoryPlan::compute(memory_mb, &caller_flags, version);

        let mut launch_args = env_opts;
        launch_args.extend(plan.to_flags());
        launch_args.extend(extra_runtime_args);
        launch_args.push("-classpath".to_string());
        launch_args.push(self.settings.classpath.clone());
        launch_args.push(main_class_override.unwrap_or_else(|| self.settings.main_class.clone()));
        launch_args.extend(self.settings.app_args.iter().cloned());
        launch_args.extend(residual_args);

        Ok(LaunchCommand {
            program,
            args: launch_args,
            echo: self.settings.echo_command,
        })
    }

    /// Build and execute in one step: the embedding binary's entry point.
    ///
    /// Returns the child's exit code on the spawn path; on the exec path
    /// a successful hand-off never returns. `Ok(1)` with usage printed on
    /// stderr is the `-help` outcome.
    pub fn launch(
        &self,
        argv: Vec<String>,
        env: &HashMap<String, String>,
        config_file: Option<&str>,
    ) -> Result<i32, LauncherError> {
        match self.build_command(argv, env, config_file)? {
            Launch::Help => {
                eprint!("{}", args::usage("appshell-launch"));
                Ok(1)
            }
            Launch::Command(command) => {
                tracing::debug!(program = %command.program.display(), "launching runtime");
                command.execute()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    fn fake_runtime(dir: &std::path::Path) -> (PathBuf, HashMap<String, String>) {
        use std::os::unix::fs::PermissionsExt;

        let bin = dir.join("jdk").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let java = bin.join("java");
        std::fs::write(&java, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&java, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut env = HashMap::new();
        env.insert(
            crate::launcher::runtime::ENV_RUNTIME_HOME.to_string(),
            dir.join("jdk").display().to_string(),
        );
        (java, env)
    }

    #[cfg(unix)]
    fn build(launcher: &Launcher, argv: &[&str], env: &HashMap<String, String>) -> LaunchCommand {
        match launcher.build_command(strings(argv), env, None).unwrap() {
            Launch::Command(command) => command,
            Launch::Help => panic!("unexpected help request"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_argv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let (java, mut env) = fake_runtime(dir.path());
        env.insert("JAVA_OPTS".to_string(), "-Dfrom=env".to_string());

        let mut settings = LaunchSettings::new("lib/*", "demo.Main");
        settings.app_args = strings(&["--app-fixed"]);
        let launcher = Launcher::new(settings);

        let command = build(
            &launcher,
            &["-no-version-check", "-mem", "512", "-Dcli=1", "extra"],
            &env,
        );
        assert_eq!(command.program, java);
        assert_eq!(
            command.args,
            strings(&[
                "-Dfrom=env",
                "-Xms512m",
                "-Xmx512m",
                "-XX:MaxPermSize=256m",
                "-XX:ReservedCodeCacheSize=128m",
                "-Dcli=1",
                "-classpath",
                "lib/*",
                "demo.Main",
                "--app-fixed",
                "extra",
            ])
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_env_opts_heap_marker_suppresses_plan() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut env) = fake_runtime(dir.path());
        env.insert("JAVA_OPTS".to_string(), "-Xmx2g".to_string());

        let launcher = Launcher::new(LaunchSettings::new("lib/*", "demo.Main"));
        let command = build(&launcher, &["-no-version-check", "-mem", "512"], &env);
        assert!(!command.args.iter().any(|a| a.starts_with("-Xms")));
        assert_eq!(command.args[0], "-Xmx2g");
    }

    #[cfg(unix)]
    #[test]
    fn test_main_override_and_post_process() {
        let dir = tempfile::tempdir().unwrap();
        let (_, env) = fake_runtime(dir.path());

        let launcher = Launcher::new(LaunchSettings::new("lib/*", "demo.Main"))
            .with_post_process(|args| args.into_iter().filter(|a| a != "drop-me").collect());
        let command = build(
            &launcher,
            &["-no-version-check", "-main", "demo.Other", "keep", "drop-me"],
            &env,
        );
        assert!(command.args.contains(&"demo.Other".to_string()));
        assert!(!command.args.contains(&"demo.Main".to_string()));
        assert!(command.args.contains(&"keep".to_string()));
        assert!(!command.args.contains(&"drop-me".to_string()));
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let command = LaunchCommand {
            program: PathBuf::from("/usr/bin/java"),
            args: strings(&["-Dname=two words", "Main"]),
            echo: true,
        };
        assert_eq!(
            command.command_line(),
            "/usr/bin/java \"-Dname=two words\" Main"
        );
    }

    #[test]
    fn test_help_short_circuits() {
        let launcher = Launcher::new(LaunchSettings::new("lib/*", "demo.Main"));
        let outcome = launcher
            .build_command(strings(&["-help"]), &HashMap::new(), None)
            .unwrap();
        assert!(matches!(outcome, Launch::Help));
    }
}
