use clap::Parser;
use coloring_page::{
    logger, AppConfig, DetailLevel, Error, FileSessionStore, ImageTransformClient, InputImage,
    LineThickness, StyleOptions, Studio,
};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "coloring-page")]
#[command(version, about = "Turn a photo into a printable coloring page", long_about = None)]
#[command(
    after_help = "Environment: GEMINI_API_KEY, GEMINI_MODEL, COLORING_SESSION_PATH, COLORING_OUTPUT_DIR"
)]
struct Cli {
    /// Photo to convert
    #[arg(
        required_unless_present_any = ["last", "reset"],
        conflicts_with_all = ["last", "reset"]
    )]
    input: Option<PathBuf>,

    /// Line thickness
    #[arg(short, long, value_enum, default_value_t)]
    thickness: LineThickness,

    /// Level of detail
    #[arg(short, long, value_enum, default_value_t)]
    detail: DetailLevel,

    /// Where to save the page
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the last generated page again
    #[arg(long, conflicts_with = "reset")]
    last: bool,

    /// Forget the cached upload and result
    #[arg(long)]
    reset: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Generate {
        input: PathBuf,
        options: StyleOptions,
        output: Option<PathBuf>,
    },
    Last {
        output: Option<PathBuf>,
    },
    Reset,
}

impl Cli {
    fn to_command(&self) -> Command {
        if self.reset {
            return Command::Reset;
        }
        match &self.input {
            Some(input) if !self.last => Command::Generate {
                input: input.clone(),
                options: StyleOptions::new(self.thickness, self.detail),
                output: self.output.clone(),
            },
            _ => Command::Last {
                output: self.output.clone(),
            },
        }
    }
}

fn default_output(dir: &Path, extension: &str) -> PathBuf {
    dir.join(format!(
        "coloring-page-{}.{}",
        chrono::Utc::now().format("%Y%m%d-%H%M%S"),
        extension
    ))
}

async fn run(command: Command, config: AppConfig) -> coloring_page::Result<()> {
    let store = Arc::new(FileSessionStore::new(&config.session_path));
    let client = ImageTransformClient::new(config.gemini.clone())?;
    let studio = Studio::new(client, store);

    match command {
        Command::Reset => {
            studio.reset().await?;
            println!("{}", "Session cache cleared.".green());
        }
        Command::Last { output } => {
            studio.restore().await?;
            let result = studio.result().ok_or(Error::NoResult)?;
            let path = output.unwrap_or_else(|| default_output(&config.output_dir, result.extension()));
            studio.download(&path).await?;
            println!("{} {}", "Saved".green().bold(), path.display());
        }
        Command::Generate {
            input,
            options,
            output,
        } => {
            studio.upload(InputImage::from_path(&input).await?).await;
            studio.set_options(options).await;

            println!(
                "{} {} ({} lines, {} detail)...",
                "Drawing".cyan().bold(),
                input.display(),
                options.thickness,
                options.detail
            );
            let page = studio.generate().await?;

            let path = output.unwrap_or_else(|| default_output(&config.output_dir, page.extension()));
            studio.download(&path).await?;
            println!("{} {}", "Saved".green().bold(), path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let logger_config = if cli.verbose {
        logger::LoggerConfig::development()
    } else {
        logger::LoggerConfig::default().with_level(log::LevelFilter::Warn)
    };
    if let Err(e) = logger::init_with_config(logger_config) {
        eprintln!("{}", e);
    }

    let config = AppConfig::from_env();
    logger::log_config_info(&config);

    if let Err(e) = run(cli.to_command(), config).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("coloring-page").chain(list.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_with_options() {
        let cli = parse(&["cat.jpg", "-t", "bold", "--detail", "low", "-o", "page.png"]).unwrap();
        assert_eq!(
            cli.to_command(),
            Command::Generate {
                input: PathBuf::from("cat.jpg"),
                options: StyleOptions::new(LineThickness::Bold, DetailLevel::Low),
                output: Some(PathBuf::from("page.png")),
            }
        );
        assert!(!cli.verbose);
    }

    #[test]
    fn test_options_default_to_medium() {
        let cli = parse(&["cat.jpg"]).unwrap();
        assert_eq!(
            cli.to_command(),
            Command::Generate {
                input: PathBuf::from("cat.jpg"),
                options: StyleOptions::default(),
                output: None,
            }
        );
    }

    #[test]
    fn test_last_and_reset() {
        let cli = parse(&["--last", "-v"]).unwrap();
        assert_eq!(cli.to_command(), Command::Last { output: None });
        assert!(cli.verbose);

        assert_eq!(parse(&["--reset"]).unwrap().to_command(), Command::Reset);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["cat.jpg", "-t", "huge"]).is_err());
        assert!(parse(&["cat.jpg", "-d"]).is_err());
        assert!(parse(&["a.jpg", "b.jpg"]).is_err());
        assert!(parse(&["--colour"]).is_err());
        assert!(parse(&["cat.jpg", "--last"]).is_err());
        assert!(parse(&["--last", "--reset"]).is_err());
    }

    #[test]
    fn test_default_output_uses_extension() {
        let path = default_output(Path::new("out"), "png");
        assert!(path.starts_with("out"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }
}
