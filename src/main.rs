use clap::{Args, Parser, Subcommand};
use isis_score::constants::SILENT_FLAG;
use isis_score::{parse, validate, Score};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "isis-score", version, about = "Sing YAML scores with ISiS")]
struct Cli {
    /// Log debug output (rest merges, fallbacks)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the ISiS score file (stdout if no output is given)
    Score {
        #[command(flatten)]
        input: InputArgs,
        output: Option<PathBuf>,
    },
    /// Write the score file and render it to audio with ISiS
    Render {
        #[command(flatten)]
        input: InputArgs,
        output: PathBuf,
        /// ISiS executable, overrides the source's isis-path
        #[arg(long)]
        isis: Option<PathBuf>,
        /// Remove the score file after rendering
        #[arg(long)]
        remove_score_file: bool,
        /// Don't fail when ISiS exits unsuccessfully
        #[arg(long)]
        ignore_exit_status: bool,
        /// Pass --quiet to ISiS
        #[arg(short, long)]
        quiet: bool,
        /// Extra flags for ISiS
        #[arg(last = true)]
        flags: Vec<String>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// YAML score source
    input: PathBuf,
    /// Skip validation
    #[arg(long)]
    no_validate: bool,
    /// Tempo in BPM, overrides the source
    #[arg(long)]
    tempo: Option<f64>,
    /// Global transposition in semitones, overrides the source
    #[arg(long, allow_negative_numbers = true)]
    transposition: Option<i32>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Score { input, output } => {
            let score = load(&input);
            let text = match score.score_converter().to_score_file(&score.event) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Conversion error: {}", e);
                    process::exit(1);
                }
            };

            match output {
                Some(path) => {
                    if let Err(e) = fs::write(&path, &text) {
                        eprintln!("Error writing to '{}': {}", path.display(), e);
                        process::exit(1);
                    }
                    eprintln!("Wrote ISiS score to {}", path.display());
                }
                None => print!("{}", text),
            }
        }
        Command::Render {
            input,
            output,
            isis,
            remove_score_file,
            ignore_exit_status,
            quiet,
            flags,
        } => {
            let mut score = load(&input);
            if isis.is_some() {
                score.render.isis_path = isis;
            }
            score.render.remove_score_file |= remove_score_file;
            score.render.ignore_exit_status |= ignore_exit_status;
            if quiet {
                score.render.flags.push(SILENT_FLAG.to_string());
            }
            score.render.flags.extend(flags);

            if let Err(e) = score.converter().convert(&score.event, &output) {
                eprintln!("Render error: {}", e);
                process::exit(1);
            }
            eprintln!("Rendered {}", output.display());
        }
    }
}

/// Read, parse and (unless disabled) validate the input, applying overrides
fn load(args: &InputArgs) -> Score {
    let source = match fs::read_to_string(&args.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let mut score = match parse(&source) {
        Ok(score) => score,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            process::exit(1);
        }
    };

    if let Some(tempo) = args.tempo {
        score.settings.tempo = tempo;
    }
    if let Some(transposition) = args.transposition {
        score.settings.global_transposition = transposition;
    }

    if !args.no_validate {
        if let Err(e) = validate(&score) {
            eprintln!("Validation error: {}", e);
            process::exit(1);
        }
    }

    score
}
