use clap::Parser;
use env_logger::Env;
use log::debug;
use serde::Serialize;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tmsim::{
    Configuration, Definition, ExecutionStatus, Machine, ProgramLoader, ProgramManager,
    TuringMachineError, Window, DEFAULT_MAX_STEPS,
};

/// The built-in machine used when neither a file nor a built-in name is given.
const DEFAULT_PROGRAM: &str = "Equal zeros then ones";

/// Runs a single-tape Turing machine on an input string and reports the verdict.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim --input 0011
  tmsim --builtin \"Binary palindrome\" --input 0110 --trace
  echo 0101 | tmsim --program programs/equal-zeros-ones.tm --json")]
struct Cli {
    /// A machine definition file (.tm or .json)
    #[clap(short, long, conflicts_with = "builtin")]
    program: Option<PathBuf>,

    /// The name of a built-in machine
    #[clap(short, long)]
    builtin: Option<String>,

    /// List the built-in machines and exit
    #[clap(short, long)]
    list: bool,

    /// The input string; read from stdin when omitted
    #[clap(short, long)]
    input: Option<String>,

    /// Print each configuration and wait for Enter before every step
    #[clap(short, long)]
    trace: bool,

    /// Steps to run before reporting a probable loop
    #[clap(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Tape cells shown on each side of the head
    #[clap(long, default_value_t = Window::default().radius)]
    radius: usize,

    /// Blank cells shown beyond the written part of the tape
    #[clap(long, default_value_t = Window::default().margin)]
    margin: usize,

    /// Print the report as JSON
    #[clap(long)]
    json: bool,
}

/// The outcome of a run, as printed with `--json`.
#[derive(Serialize)]
struct Report<'a> {
    machine: &'a str,
    input: &'a str,
    verdict: ExecutionStatus,
    steps: usize,
    configurations: usize,
    final_configuration: Option<&'a Configuration>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if cli.list {
        list_programs();
        return ExitCode::SUCCESS;
    }

    let definition = match load_definition(&cli) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut machine = match Machine::from_definition(&definition) {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    machine.set_window(Window {
        radius: cli.radius,
        margin: cli.margin,
    });

    let blank = machine.signature().blank;
    let input = match cli.input.clone().map_or_else(|| read_input(blank), Ok) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: failed to read input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = machine.load_input(&input) {
        eprintln!("Error: {}", e);
        let alphabet: String = machine.signature().input_alphabet.iter().collect();
        eprintln!("The input alphabet of '{}' is {{{}}}", definition.name, alphabet);
        // Bad input symbols are a usage error; every verdict below is a success.
        return ExitCode::from(2);
    }

    let result = if cli.trace {
        let interactive = atty::is(atty::Stream::Stdin);
        let mut pause = |step: usize, configuration: &Configuration| {
            println!("Step {}: {}", step, configuration);
            if interactive {
                wait_for_enter();
            }
        };
        machine.run(cli.max_steps, Some(&mut pause))
    } else {
        machine.run(cli.max_steps, None)
    };

    let (status, history) = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!("Recorded {} configurations", history.len());

    let report = Report {
        machine: &definition.name,
        input: &input,
        verdict: status,
        steps: machine.step_count(),
        configurations: history.len(),
        final_configuration: history.last(),
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&report);
    }

    ExitCode::SUCCESS
}

/// Loads the definition named on the command line, or the default built-in.
fn load_definition(cli: &Cli) -> Result<Definition, TuringMachineError> {
    match (&cli.program, &cli.builtin) {
        (Some(path), _) => ProgramLoader::load_definition(path),
        (None, Some(name)) => ProgramManager::get_program_by_name(name),
        (None, None) => ProgramManager::get_program_by_name(DEFAULT_PROGRAM),
    }
}

/// Reads the input string from stdin, prompting when stdin is a terminal.
fn read_input(blank: char) -> io::Result<String> {
    let mut line = String::new();

    if atty::is(atty::Stream::Stdin) {
        print!("Input string: ");
        io::stdout().flush()?;
        io::stdin().lock().read_line(&mut line)?;
    } else {
        io::stdin().read_to_string(&mut line)?;
    }

    Ok(clean_input(line.lines().next().unwrap_or_default(), blank))
}

/// Strips surrounding whitespace from a typed line, except the blank symbol itself.
fn clean_input(line: &str, blank: char) -> String {
    line.trim_matches(|c: char| c.is_whitespace() && c != blank)
        .to_string()
}

/// Blocks until the user presses Enter.
fn wait_for_enter() {
    print!("Press Enter to continue...");
    // A failed prompt only means the run proceeds without pausing.
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

fn print_report(report: &Report<'_>) {
    println!("\nResult: {}", report.verdict.to_string().to_uppercase());
    if report.verdict == ExecutionStatus::StepLimitExceeded {
        println!("Possible infinite loop: the step limit was reached.");
    }
    println!("Total steps: {}", report.steps);

    if let Some(configuration) = report.final_configuration {
        println!("Final configuration:");
        println!("State: {}", configuration.state);
        println!("Tape: {}", configuration.tape);
        println!("Head: {}", configuration.head);
    }
}

fn list_programs() {
    for index in 0..ProgramManager::get_program_count() {
        if let Ok(info) = ProgramManager::get_program_info(index) {
            println!(
                "{}. {} (input alphabet {{{}}}, {} states, {} transitions)",
                info.index, info.name, info.input_alphabet, info.state_count, info.transition_count
            );
        }
    }
}
