use std::path::PathBuf;

pub const USAGE: &str = "\
usage: launch-orchestrator [options] <command>

commands:
  up                 reconcile networks and bring up every service in plan order
  networks           reconcile core and agent networks only
  scan               list external networks declared by agent manifests
  plan               print the launch plan in execution order
  endpoint <id>...   print the gateway URL for each agent id

options:
  --root <dir>       launch root (overrides LAUNCH_ROOT)
  --plan <file>      plan file (default: <root>/.launch-plan.yaml)
  --log-file <file>  write logs to a file instead of stderr
  --json             print machine-readable output
  --debug            log at debug level
  -h, --help         show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Up,
    Networks,
    Scan,
    Plan,
    Endpoint(Vec<String>),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub root: Option<PathBuf>,
    pub plan: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub json: bool,
    pub debug: bool,
}

/// Parse arguments (without the program name).
pub fn parse_args<I, S>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut command: Option<String> = None;
    let mut positional = Vec::new();
    let mut parsed = CliArgs {
        command: Command::Help,
        root: None,
        plan: None,
        log_file: None,
        json: false,
        debug: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(parsed),
            "--json" => parsed.json = true,
            "--debug" => parsed.debug = true,
            "--root" | "--plan" | "--log-file" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("{arg} requires a value"))?;
                let value = Some(PathBuf::from(value));
                match arg.as_str() {
                    "--root" => parsed.root = value,
                    "--plan" => parsed.plan = value,
                    _ => parsed.log_file = value,
                }
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ if command.is_none() => command = Some(arg),
            _ => positional.push(arg),
        }
    }

    parsed.command = match command.as_deref() {
        None | Some("help") => Command::Help,
        Some("up") => Command::Up,
        Some("networks") => Command::Networks,
        Some("scan") => Command::Scan,
        Some("plan") => Command::Plan,
        Some("endpoint") => {
            if positional.is_empty() {
                return Err("endpoint requires at least one agent id".into());
            }
            Command::Endpoint(std::mem::take(&mut positional))
        }
        Some(other) => return Err(format!("unknown command {other}")),
    };

    if !positional.is_empty() {
        return Err(format!("unexpected argument {}", positional[0]));
    }
    Ok(parsed)
}
