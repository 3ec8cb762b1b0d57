use std::path::PathBuf;

use parkade::{DEFAULT_LEVEL, LevelId, PolicyKind};

pub const USAGE: &str = "\
Usage: parkade [--level <n>] [--policy nearest|farthest] [<input_file>]

Arguments:
  <input_file>       Batch file with one command per line [default: interactive]

Options:
  --level <n>        Parking level commands apply to [default: 1]
  --policy <name>    Slot allocation policy: nearest or farthest [default: nearest]
  -h, --help         Print this help

Environment:
  PARKADE_LOG        debug, info, warn or error [default: info]
  RUST_LOG           Full tracing filter, overrides PARKADE_LOG
  LOG_FORMAT         Set to 'json' for JSON diagnostics on stderr";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub level: LevelId,
    pub policy: PolicyKind,
    /// Batch input; `None` runs interactively.
    pub input: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            policy: PolicyKind::default(),
            input: None,
        }
    }
}

/// Parse `argv`. An empty error string means help was requested.
pub fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--level" => {
                i += 1;
                let value = args.get(i).ok_or("--level requires a value")?;
                config.level = value
                    .parse()
                    .map_err(|_| format!("invalid level '{value}'"))?;
            }
            "--policy" => {
                i += 1;
                let value = args.get(i).ok_or("--policy requires a value")?;
                config.policy = value.parse().map_err(|e| format!("{e}"))?;
            }
            "--help" | "-h" => return Err(String::new()),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            arg => {
                if config.input.is_some() {
                    return Err(format!("unexpected argument: {arg}"));
                }
                config.input = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(config)
}
