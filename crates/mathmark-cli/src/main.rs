use anyhow::{Context, Result, bail};
use mathmark_config::Config;
use mathmark_engine::render_markdown;
use std::{
    env,
    io::{self, Read, Write},
    path::PathBuf,
    process,
};

#[derive(Debug, Default, PartialEq)]
struct Args {
    config_path: Option<PathBuf>,
    /// `None` reads stdin.
    input: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().context("--config needs a path")?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "-" => parsed.input = None,
            flag if flag.starts_with('-') => bail!("Unknown option: {flag}"),
            path => {
                if parsed.input.is_some() {
                    bail!("Only one input file may be given");
                }
                parsed.input = Some(PathBuf::from(path));
            }
        }
    }

    Ok(parsed)
}

fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    let loaded = match config_path {
        Some(path) => {
            let config = Config::load_from_path(path)?;
            if config.is_none() {
                bail!("Config file not found: {}", path.display());
            }
            config
        }
        None => Config::load()?,
    };

    match &loaded {
        Some(_) => log::debug!("Loaded configuration"),
        None => log::debug!("No config file, using default delimiters"),
    }
    Ok(loaded.unwrap_or_default())
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config_path.as_ref())?;
    let matcher = config.matcher()?;
    let markdown = read_input(args.input.as_ref())?;

    let html = render_markdown(&matcher, &markdown, &config.katex);

    let mut stdout = io::stdout().lock();
    stdout.write_all(html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: mathmark [--config <path>] [input.md | -]");
            process::exit(2);
        }
    };

    if let Err(e) = run(&parsed) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
