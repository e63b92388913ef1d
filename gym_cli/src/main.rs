use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use gym_core::routine::parse_entry;
use gym_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(about = "Personal workout log with routines and progress tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the password and start a session
    Setup {
        #[arg(long, env = "GYMLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Replace an existing password
        #[arg(long)]
        force: bool,
    },

    /// Start a session
    Login {
        #[arg(long, env = "GYMLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show whether a password is set and a session is active
    Status,

    /// Log a workout
    Log {
        /// Start from a saved routine
        #[arg(long)]
        routine: Option<String>,

        /// Exercise as NAME=REPSxWEIGHT,REPS,...[;NOTES]
        #[arg(long = "exercise", short = 'e')]
        exercises: Vec<String>,
    },

    /// Show past workouts, newest first
    History {
        /// Number of workouts to show
        #[arg(long, conflicts_with = "all")]
        limit: Option<usize>,

        /// Show every workout
        #[arg(long)]
        all: bool,
    },

    /// Show every logged set of one exercise, oldest first
    Progress {
        exercise: String,
    },

    /// Show totals, most frequent exercises and recent activity
    Stats,

    /// Manage routines
    #[command(subcommand)]
    Routine(RoutineCommand),

    /// Export every logged set as CSV
    Export {
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum RoutineCommand {
    /// Create or replace a routine
    Save {
        name: String,

        /// Entries as NAME or NAME:SETSxREPS@WEIGHT
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// List saved routines
    List,

    /// Delete a routine
    Delete {
        name: String,
    },
}

struct Context {
    config: Config,
    kv: FileKvStore,
}

impl Context {
    fn gate(&self) -> CredentialGate<FileKvStore> {
        CredentialGate::new(self.kv.clone())
            .with_session_ttl(chrono::Duration::days(self.config.auth.session_expiry_days))
            .with_min_password_length(self.config.auth.min_password_length)
    }

    /// Open the store, refusing unless a live session exists
    fn open_store(&self) -> Result<Store<FileKvStore>> {
        let gate = self.gate();
        match gate.authorize()? {
            Some(access) => Store::open(self.kv.clone(), &access),
            None if !gate.is_password_set()? => Err(Error::Other(
                "No password set. Run `gymlog setup` first.".into(),
            )),
            None => Err(Error::Other(
                "Not logged in. Run `gymlog login` first.".into(),
            )),
        }
    }
}

fn main() -> ExitCode {
    // Initialize logging
    gym_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Rejected input leaves stored data untouched; report it apart from failures
        Err(e) if e.is_validation() => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let ctx = Context {
        kv: FileKvStore::new(data_dir),
        config,
    };

    match cli.command {
        Commands::Setup { password, force } => cmd_setup(&ctx, password, force),
        Commands::Login { password } => cmd_login(&ctx, password),
        Commands::Logout => {
            ctx.gate().logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Status => cmd_status(&ctx),
        Commands::Log {
            routine,
            exercises,
        } => cmd_log(&ctx, routine, exercises),
        Commands::History { limit, all } => cmd_history(&ctx, limit, all),
        Commands::Progress { exercise } => cmd_progress(&ctx, &exercise),
        Commands::Stats => cmd_stats(&ctx),
        Commands::Routine(command) => cmd_routine(&ctx, command),
        Commands::Export { output } => {
            let store = ctx.open_store()?;
            let rows = gym_core::export::export_csv(store.data(), &output)?;
            println!("✓ Exported {} sets to {}", rows, output.display());
            Ok(())
        }
    }
}

fn cmd_setup(ctx: &Context, password: Option<String>, force: bool) -> Result<()> {
    let gate = ctx.gate();
    if gate.is_password_set()? && !force {
        return Err(Error::Other(
            "A password is already set. Use `gymlog login`, or --force to replace it.".into(),
        ));
    }

    let password = match password {
        Some(p) => p,
        None => {
            let first = prompt("New password: ")?;
            let confirm = prompt("Confirm password: ")?;
            if first != confirm {
                return Err(Error::Other("Passwords do not match".into()));
            }
            first
        }
    };

    gate.setup_password(&password)?;
    gate.create_session(Utc::now())?;
    println!("✓ Password set. You are logged in.");
    Ok(())
}

fn cmd_login(ctx: &Context, password: Option<String>) -> Result<()> {
    let gate = ctx.gate();
    if !gate.is_password_set()? {
        return Err(Error::Other(
            "No password set. Run `gymlog setup` first.".into(),
        ));
    }

    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    if gate.login(&password)? {
        println!("✓ Logged in.");
        Ok(())
    } else {
        Err(Error::Other("Incorrect password".into()))
    }
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let gate = ctx.gate();
    if !gate.is_password_set()? {
        println!("No password set.");
    } else if gate.is_authenticated()? {
        println!("Logged in.");
    } else {
        println!("Logged out.");
    }
    Ok(())
}

fn cmd_log(ctx: &Context, routine: Option<String>, exercises: Vec<String>) -> Result<()> {
    let mut store = ctx.open_store()?;

    let mut draft = match routine {
        Some(name) => store
            .draft_from_routine(&name)
            .ok_or_else(|| Error::Other(format!("No routine named '{}'", name)))?,
        None => WorkoutDraft::new(),
    };

    for spec in &exercises {
        draft.fill_exercise(parse_exercise(spec));
    }

    let workout = store.save_workout(&draft, Utc::now())?;
    println!(
        "✓ Workout saved! Logged {} exercises ({} sets)",
        workout.exercises.len(),
        workout.set_count()
    );
    Ok(())
}

/// Parse `NAME=SET,SET,...[;NOTES]` where each set is `REPS` or `REPSxWEIGHT`.
///
/// Values are kept as typed; the draft validation decides what is usable.
fn parse_exercise(spec: &str) -> DraftExercise {
    let (name, rest) = spec.split_once('=').unwrap_or((spec, ""));
    let (sets, notes) = rest.split_once(';').unwrap_or((rest, ""));

    let sets = sets
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| match s.split_once(['x', 'X']) {
            Some((reps, weight)) => DraftSet::new(reps.trim(), weight.trim()),
            None => DraftSet::new(s.trim(), ""),
        })
        .collect::<Vec<_>>();

    let mut exercise = if sets.is_empty() {
        DraftExercise::new(name)
    } else {
        DraftExercise::with_sets(name, sets)
    };
    exercise.notes = notes.to_string();
    exercise
}

fn cmd_history(ctx: &Context, limit: Option<usize>, all: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let limit = if all {
        None
    } else {
        Some(limit.unwrap_or(ctx.config.display.history_limit))
    };

    let workouts = gym_core::progress::history(store.data(), limit);
    if workouts.is_empty() {
        println!("No workout history yet.");
        return Ok(());
    }

    for workout in workouts {
        println!("\n📅 {}", format_date(workout.date));
        println!("{}", "-".repeat(40));
        for exercise in &workout.exercises {
            println!("{}", exercise.name);
            for (i, set) in exercise.sets.iter().enumerate() {
                println!(
                    "  Set {}: {}",
                    i + 1,
                    format_set(set, &ctx.config.display.weight_unit)
                );
            }
            if let Some(notes) = &exercise.notes {
                println!("  📝 {}", notes);
            }
        }
    }
    Ok(())
}

fn cmd_progress(ctx: &Context, exercise: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let exercise = exercise.trim();
    if exercise.is_empty() {
        return Err(Error::Other("Please enter an exercise name".into()));
    }

    let entries = store.progress(exercise);
    if entries.is_empty() {
        println!("No history found for \"{}\"", exercise);
        let known = gym_core::progress::exercise_names(store.data());
        if !known.is_empty() {
            println!("Logged exercises: {}", known.join(", "));
        }
        return Ok(());
    }

    println!("Progress for: {}", exercise);
    for entry in entries {
        println!(
            "\n📅 {}  ({} reps, top {})",
            format_date(entry.date),
            entry.total_reps(),
            format_weight(entry.top_weight(), &ctx.config.display.weight_unit)
        );
        for (i, set) in entry.sets.iter().enumerate() {
            println!(
                "  Set {}: {}",
                i + 1,
                format_set(set, &ctx.config.display.weight_unit)
            );
        }
    }
    Ok(())
}

fn cmd_stats(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let stats = store.stats();
    let display = &ctx.config.display;

    println!("=== Your Gym Stats ===");
    println!("Total Workouts: {}", stats.total_workouts);
    println!("Total Exercises Logged: {}", stats.total_exercises);
    println!("Total Sets Completed: {}", stats.total_sets);
    println!("Saved Routines: {}", stats.total_routines);

    let top = gym_core::stats::top_frequent(store.data(), display.top_frequent);
    if !top.is_empty() {
        println!("\nMost Frequent Exercises:");
        for entry in top {
            println!("  • {}: {} times", entry.name, entry.count);
        }
    }

    let recent = gym_core::stats::recent_activity(store.data(), display.recent_activity);
    if !recent.is_empty() {
        println!("\nRecent Activity:");
        for workout in recent {
            println!("  {}  {}", format_date(workout.date), workout.summary());
        }
    }
    Ok(())
}

fn cmd_routine(ctx: &Context, command: RoutineCommand) -> Result<()> {
    let mut store = ctx.open_store()?;

    match command {
        RoutineCommand::Save { name, entries } => {
            let entries = entries
                .iter()
                .map(|e| parse_entry(e))
                .collect::<Result<Vec<_>>>()?;
            let name = store.save_routine(&name, entries)?;
            let count = store.routine(&name).map(|r| r.len()).unwrap_or(0);
            println!("✓ Routine \"{}\" saved with {} exercises!", name, count);
        }
        RoutineCommand::List => {
            let mut any = false;
            for (name, routine) in store.routines() {
                any = true;
                println!("\n{}:", name);
                for (i, entry) in routine.entries.iter().enumerate() {
                    println!("  {}. {}", i + 1, entry);
                }
            }
            if !any {
                println!("No routines saved yet.");
            }
        }
        RoutineCommand::Delete { name } => {
            if store.delete_routine(&name)? {
                println!("✓ Deleted routine \"{}\"", name);
            } else {
                return Err(Error::Other(format!("No routine named '{}'", name)));
            }
        }
    }
    Ok(())
}

fn format_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%b %-d, %Y %H:%M")
        .to_string()
}

fn format_set(set: &WorkoutSet, unit: &str) -> String {
    format!("{} reps @ {}", set.reps, format_weight(set.weight, unit))
}

fn format_weight(weight: f64, unit: &str) -> String {
    if weight > 0.0 {
        format!("{} {}", weight, unit)
    } else {
        "bodyweight".to_string()
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
