//! Launcher argument scanning.
//!
//! # Responsibilities
//! - Prepend tokens from the operator config file to the CLI argv
//! - Scan arguments left-to-right into a `LaunchConfig`
//! - Collect unrecognized tokens as residual args for the launched program
//!
//! # Design Decisions
//! - Single pass over an explicit struct, no global accumulator state
//! - `--` is a hard stop: everything after it is residual, uninterpreted
//! - The single-dash grammar (`-mem`, `-jvm-debug`, ...) is a compatibility
//!   surface and is scanned by hand rather than through a flag library

use std::path::PathBuf;

use crate::launcher::error::{LauncherError, ValueKind};

/// Default heap size in megabytes when `-mem` is not given.
pub const DEFAULT_MEMORY_MB: u64 = 1024;

/// Options accumulated by the argument scan.
///
/// Created empty, populated once, consumed once by command assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Runtime home override from `-java-home`.
    pub java_home: Option<PathBuf>,
    /// Runtime args collected from `-D*`, `-agentlib*`, `-J*` and `-jvm-debug`.
    pub extra_runtime_args: Vec<String>,
    /// Heap size in megabytes.
    pub memory_mb: u64,
    /// Remote debugger port from `-jvm-debug`.
    pub debug_port: Option<u16>,
    /// Main class override from `-main`.
    pub main_class_override: Option<String>,
    /// Skip the runtime version probe when choosing memory flags.
    pub no_version_check: bool,
    pub verbose: bool,
    pub debug: bool,
    /// Tokens the launcher does not recognize, forwarded verbatim.
    pub residual_args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            java_home: None,
            extra_runtime_args: Vec::new(),
            memory_mb: DEFAULT_MEMORY_MB,
            debug_port: None,
            main_class_override: None,
            no_version_check: false,
            verbose: false,
            debug: false,
            residual_args: Vec::new(),
        }
    }
}

/// Outcome of the argument scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Scan completed; proceed to command assembly.
    Config(LaunchConfig),
    /// `-h`/`-help` was seen; print usage and exit non-zero.
    HelpRequested,
}

/// Scan `argv` left-to-right into a [`LaunchConfig`].
pub fn parse<I>(argv: I) -> Result<Parsed, LauncherError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = LaunchConfig::default();
    let mut it = argv.into_iter();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "-help" => return Ok(Parsed::HelpRequested),
            "-v" | "-verbose" => config.verbose = true,
            "-d" | "-debug" => config.debug = true,
            "-no-version-check" => config.no_version_check = true,
            "-mem" => {
                let value = require_value("-mem", ValueKind::Integer, it.next())?;
                let mem: u64 = value.parse().map_err(|_| malformed("-mem", ValueKind::Integer, &value))?;
                if mem == 0 {
                    return Err(malformed("-mem", ValueKind::Integer, &value));
                }
                config.memory_mb = mem;
            }
            "-jvm-debug" => {
                let value = require_value("-jvm-debug", ValueKind::Port, it.next())?;
                let port: u16 = value.parse().map_err(|_| malformed("-jvm-debug", ValueKind::Port, &value))?;
                if port == 0 {
                    return Err(malformed("-jvm-debug", ValueKind::Port, &value));
                }
                config.debug_port = Some(port);
                config.extra_runtime_args.push("-Xdebug".to_string());
                config.extra_runtime_args.push(format!(
                    "-Xrunjdwp:transport=dt_socket,server=y,suspend=n,address={port}"
                ));
            }
            "-main" => {
                let value = require_value("-main", ValueKind::ClassName, it.next())?;
                config.main_class_override = Some(value);
            }
            "-java-home" => {
                let value = require_value("-java-home", ValueKind::Path, it.next())?;
                config.java_home = Some(PathBuf::from(value));
            }
            "--" => {
                config.residual_args.extend(it);
                break;
            }
            s if s.starts_with("-D") || s.starts_with("-agentlib") => {
                config.extra_runtime_args.push(arg);
            }
            s if s.starts_with("-J") => {
                config.extra_runtime_args.push(s["-J".len()..].to_string());
            }
            _ => config.residual_args.push(arg),
        }
    }

    Ok(Parsed::Config(config))
}

/// Tokenize operator config-file contents.
///
/// Lines whose first non-blank character is `#` are dropped; remaining
/// lines are split on ASCII whitespace. No quoting is recognized.
pub fn tokenize_config_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

/// Prepend config-file tokens to the CLI argv, so file-supplied options
/// stay overridable by the real CLI args that follow them.
pub fn with_config_file(contents: Option<&str>, argv: Vec<String>) -> Vec<String> {
    match contents {
        Some(contents) => {
            let mut merged = tokenize_config_file(contents);
            merged.extend(argv);
            merged
        }
        None => argv,
    }
}

/// Usage text for `-h`/`-help`.
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [options] [residual args...]\n\
         \n\
         Options:\n\
         \x20 -h | -help          print this message\n\
         \x20 -v | -verbose       this runner is chattier\n\
         \x20 -d | -debug         set the launched program in debug mode\n\
         \x20 -no-version-check   don't probe the runtime version when choosing memory flags\n\
         \x20 -mem <integer>      set heap size in MB (default: {DEFAULT_MEMORY_MB})\n\
         \x20 -jvm-debug <port>   turn on JVM debugging, open at the given port\n\
         \x20 -main <classname>   run the given main class instead of the default\n\
         \x20 -java-home <path>   alternate JAVA_HOME\n\
         \x20 -Dkey=val           pass -Dkey=val directly to the runtime\n\
         \x20 -agentlib:...       pass the agent option directly to the runtime\n\
         \x20 -J-X                pass option -X directly to the runtime\n\
         \x20 --                  stop option parsing; forward the rest verbatim\n"
    )
}

fn require_value(option: &str, kind: ValueKind, value: Option<String>) -> Result<String, LauncherError> {
    match value {
        Some(v) if v.starts_with('-') => Err(malformed(option, kind, &v)),
        Some(v) => Ok(v),
        None => Err(LauncherError::MissingArgument {
            option: option.to_string(),
            kind,
        }),
    }
}

fn malformed(option: &str, kind: ValueKind, value: &str) -> LauncherError {
    LauncherError::MalformedArgument {
        option: option.to_string(),
        kind,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse_config(list: &[&str]) -> LaunchConfig {
        match parse(args(list)).unwrap() {
            Parsed::Config(c) => c,
            Parsed::HelpRequested => panic!("unexpected help request"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = parse_config(&[]);
        assert_eq!(config.memory_mb, DEFAULT_MEMORY_MB);
        assert!(!config.debug);
        assert!(config.residual_args.is_empty());
    }

    #[test]
    fn test_mem_debug_and_residuals() {
        let config = parse_config(&["-mem", "512", "-d", "--", "-mem", "999"]);
        assert_eq!(config.memory_mb, 512);
        assert!(config.debug);
        assert_eq!(config.residual_args, args(&["-mem", "999"]));
    }

    #[test]
    fn test_double_dash_stops_option_parsing() {
        let config = parse_config(&["--", "-d"]);
        assert!(!config.debug);
        assert_eq!(config.residual_args, args(&["-d"]));
    }

    #[test]
    fn test_passthrough_runtime_args() {
        let config = parse_config(&["-J-Xmx2g", "-Dfoo=bar", "-agentlib:jdwp=x"]);
        assert_eq!(
            config.extra_runtime_args,
            args(&["-Xmx2g", "-Dfoo=bar", "-agentlib:jdwp=x"])
        );
    }

    #[test]
    fn test_jvm_debug_adds_runtime_args() {
        let config = parse_config(&["-jvm-debug", "5005"]);
        assert_eq!(config.debug_port, Some(5005));
        assert_eq!(config.extra_runtime_args[0], "-Xdebug");
        assert!(config.extra_runtime_args[1].contains("address=5005"));
    }

    #[test]
    fn test_missing_values() {
        let err = parse(args(&["-jvm-debug"])).unwrap_err();
        assert!(err.to_string().contains("port"));

        let err = parse(args(&["-mem"])).unwrap_err();
        assert!(err.to_string().contains("integer"));

        let err = parse(args(&["-java-home"])).unwrap_err();
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_value_looking_like_option() {
        let err = parse(args(&["-mem", "-v"])).unwrap_err();
        assert!(matches!(err, LauncherError::MalformedArgument { .. }));
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_zero_mem_rejected() {
        let err = parse(args(&["-mem", "0"])).unwrap_err();
        assert!(matches!(err, LauncherError::MalformedArgument { .. }));
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(args(&["-help"])).unwrap(), Parsed::HelpRequested);
        assert_eq!(parse(args(&["-h", "-mem"])).unwrap(), Parsed::HelpRequested);
    }

    #[test]
    fn test_main_and_java_home() {
        let config = parse_config(&["-main", "demo.Main", "-java-home", "/opt/jdk"]);
        assert_eq!(config.main_class_override.as_deref(), Some("demo.Main"));
        assert_eq!(config.java_home.as_deref(), Some(std::path::Path::new("/opt/jdk")));
    }

    #[test]
    fn test_config_file_tokens() {
        let contents = "# memory tuning\n-mem 2048\n\n  # comment with leading blanks\n-Dplay.http.secret=x -v\n";
        let tokens = tokenize_config_file(contents);
        assert_eq!(tokens, args(&["-mem", "2048", "-Dplay.http.secret=x", "-v"]));
    }

    #[test]
    fn test_config_file_overridable_by_cli() {
        let merged = with_config_file(Some("-mem 2048\n"), args(&["-mem", "512"]));
        let config = match parse(merged).unwrap() {
            Parsed::Config(c) => c,
            _ => unreachable!(),
        };
        // CLI wins because it scans after the file tokens.
        assert_eq!(config.memory_mb, 512);
    }
}
