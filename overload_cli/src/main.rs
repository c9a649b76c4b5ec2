use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use overload_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "overload")]
#[command(about = "Rotation-based progressive overload tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a rotation using the configured default rules and growth
    Init {
        #[arg(long, default_value = "My Rotation")]
        name: String,

        /// Replace an existing rotation
        #[arg(long)]
        force: bool,
    },

    /// Show the rotation and the current day (default)
    Show,

    /// Complete the current day's workout and progress its exercises
    Complete {
        /// Show what would change without saving or logging
        #[arg(long)]
        dry_run: bool,

        /// Notes attached to every logged exercise
        #[arg(long)]
        notes: Option<String>,
    },

    /// Choose which day comes next (days are numbered from 1)
    SelectDay { day: usize },

    /// Toggle an exercise's completed flag
    Toggle {
        day: usize,
        /// Exercise number or name
        exercise: String,
    },

    /// Add or remove rotation days
    Day {
        #[command(subcommand)]
        action: DayAction,
    },

    /// Add, change or remove exercises in a day
    Exercise {
        #[command(subcommand)]
        action: ExerciseAction,
    },

    /// Show or update the rotation's priority rules
    Rules(RulesArgs),

    /// Show or update the rotation's growth settings
    Growth(GrowthArgs),

    /// Show what one exercise would get at its next progression
    Recommend {
        day: usize,
        /// Exercise number or name
        exercise: String,
    },

    /// Log an ad-hoc workout outside the rotation
    Log {
        /// One exercise as NAME=WEIGHTxREPSxSETS[+PARTIAL], repeatable
        #[arg(long = "entry", required = true)]
        entries: Vec<LogEntry>,

        /// Session label shown in history
        #[arg(long, default_value = "Ad-hoc")]
        name: String,

        /// Session date as YYYY-MM-DD (defaults to now)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show recent workout sessions
    History {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Roll up WAL workout logs to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum DayAction {
    Add { name: String },
    Remove { day: usize },
}

#[derive(Subcommand)]
enum ExerciseAction {
    Add {
        day: usize,
        name: String,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        sets: u32,
        #[arg(long, default_value_t = 0)]
        partial: u32,
    },
    Set {
        day: usize,
        /// Exercise number or name
        exercise: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        reps: Option<u32>,
        #[arg(long)]
        sets: Option<u32>,
        #[arg(long)]
        partial: Option<u32>,
    },
    Remove {
        day: usize,
        /// Exercise number or name
        exercise: String,
    },
}

#[derive(Args)]
struct RulesArgs {
    #[arg(long)]
    rep_priority: Option<u8>,
    #[arg(long)]
    set_priority: Option<u8>,
    #[arg(long)]
    weight_priority: Option<u8>,
    #[arg(long)]
    rep_min: Option<u32>,
    #[arg(long)]
    rep_max: Option<u32>,
    #[arg(long)]
    set_min: Option<u32>,
    #[arg(long)]
    set_max: Option<u32>,
    #[arg(long)]
    reps_to_sets_multiplier: Option<f64>,
    #[arg(long)]
    weight_increment: Option<f64>,
    #[arg(long)]
    weight_range: Option<f64>,
    #[arg(long)]
    over_estimate_tolerance: Option<f64>,
}

#[derive(Args)]
struct GrowthArgs {
    #[arg(long = "type", value_parser = ["linear", "percent", "sigmoid"])]
    growth_type: Option<String>,
    #[arg(long)]
    amount: Option<f64>,
    #[arg(long, value_parser = ["day", "rotation", "week"])]
    frequency: Option<String>,
    #[arg(long)]
    decay_rate: Option<f64>,
    /// Restart sigmoid decay from the first iteration
    #[arg(long)]
    reset_iterations: bool,
}

/// Files under the data directory
struct Paths {
    rotation: PathBuf,
    wal_dir: PathBuf,
    wal: PathBuf,
    csv: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            rotation: data_dir.join("rotation.json"),
            wal: wal_dir.join("workout_logs.wal"),
            wal_dir,
            csv: data_dir.join("workout_logs.csv"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    overload_core::logging::init_with_level(overload_core::logging::default_level(cli.verbose));

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Init { name, force }) => cmd_init(&paths, name, force, &config),
        Some(Commands::Show) | None => cmd_show(&paths, &config),
        Some(Commands::Complete { dry_run, notes }) => {
            cmd_complete(&paths, dry_run, notes, &config)
        }
        Some(Commands::SelectDay { day }) => {
            let index = day_index(day)?;
            Rotation::update(&paths.rotation, |rotation| rotation.select_day(index))?;
            println!("✓ Day {} is next", day);
            Ok(())
        }
        Some(Commands::Toggle { day, exercise }) => {
            let index = day_index(day)?;
            let done = Rotation::update(&paths.rotation, |rotation| {
                let exercise = exercise_index(rotation, index, &exercise)?;
                rotation.toggle_exercise(index, exercise)
            })?;
            println!("✓ Marked {}", if done { "done" } else { "not done" });
            Ok(())
        }
        Some(Commands::Day { action }) => cmd_day(&paths, action),
        Some(Commands::Exercise { action }) => cmd_exercise(&paths, action),
        Some(Commands::Rules(args)) => cmd_rules(&paths, args),
        Some(Commands::Growth(args)) => cmd_growth(&paths, args),
        Some(Commands::Recommend { day, exercise }) => {
            cmd_recommend(&paths, day, &exercise, &config)
        }
        Some(Commands::Log {
            entries,
            name,
            date,
            notes,
        }) => cmd_log(&paths, entries, name, date, notes),
        Some(Commands::History { days }) => cmd_history(&paths, days),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
    }
}

fn load_rotation(path: &Path) -> Result<Rotation> {
    Rotation::load(path)?.ok_or_else(|| {
        Error::NotFound("rotation (run `overload init` to create one)".into())
    })
}

/// Convert a 1-based day number from the command line
fn day_index(day: usize) -> Result<usize> {
    day.checked_sub(1)
        .ok_or_else(|| Error::NotFound("day 0 (days are numbered from 1)".into()))
}

/// Resolve an exercise given by 1-based number or by name
fn exercise_index(rotation: &Rotation, day: usize, exercise: &str) -> Result<usize> {
    let day = rotation
        .days
        .get(day)
        .ok_or_else(|| Error::NotFound(format!("day {}", day + 1)))?;

    if let Ok(number) = exercise.parse::<usize>() {
        return number
            .checked_sub(1)
            .ok_or_else(|| Error::NotFound("exercise 0 (exercises are numbered from 1)".into()));
    }

    day.find_exercise(exercise)
        .ok_or_else(|| Error::NotFound(format!("exercise '{}' in '{}'", exercise, day.name)))
}

fn cmd_init(paths: &Paths, name: String, force: bool, config: &Config) -> Result<()> {
    if !force && paths.rotation.exists() && Rotation::load(&paths.rotation)?.is_some() {
        return Err(Error::Rotation(
            "a rotation already exists (use --force to replace it)".into(),
        ));
    }

    let rotation = Rotation::new(
        name,
        config.defaults.priority.clone(),
        config.defaults.growth.clone(),
    );
    rotation.save(&paths.rotation)?;

    println!("✓ Created rotation '{}'", rotation.name);
    println!("  Add days with `overload day add <name>`");
    Ok(())
}

fn cmd_show(paths: &Paths, config: &Config) -> Result<()> {
    let Some(rotation) = Rotation::load(&paths.rotation)? else {
        println!("No rotation found. Create one with `overload init`.");
        return Ok(());
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", rotation.name);
    println!("╰─────────────────────────────────────────╯");
    println!(
        "  Growth: {} {} per {} ({} strategy)",
        rotation.growth_settings.growth_type,
        format_weight(rotation.growth_settings.amount),
        rotation.growth_settings.frequency,
        config.progression.strategy
    );
    if let Some(last) = rotation.last_workout_date {
        println!("  Last workout: {}", last.format("%Y-%m-%d %H:%M"));
    }

    if rotation.days.is_empty() {
        println!("\n  No days yet. Add one with `overload day add <name>`.");
        return Ok(());
    }

    let current = rotation.current_index();
    for (i, day) in rotation.days.iter().enumerate() {
        let marker = if i == current { "→" } else { " " };
        println!("\n{} Day {}: {}", marker, i + 1, day.name);
        if day.exercises.is_empty() {
            println!("    (no exercises)");
        }
        for (j, exercise) in day.exercises.iter().enumerate() {
            let check = if exercise.completed { "x" } else { " " };
            println!(
                "    {}. [{}] {}: {} (load {})",
                j + 1,
                check,
                exercise.name,
                exercise,
                format_weight(exercise.total_load())
            );
        }
    }
    println!();
    Ok(())
}

fn cmd_complete(
    paths: &Paths,
    dry_run: bool,
    notes: Option<String>,
    config: &Config,
) -> Result<()> {
    let strategy = config.progression.strategy;
    let mut rotation = load_rotation(&paths.rotation)?;
    let now = Utc::now();

    if dry_run {
        let day = rotation
            .current_day()
            .ok_or_else(|| Error::Rotation("rotation has no days".into()))?;
        let would_progress = should_progress(
            rotation.last_workout_date,
            now,
            rotation.current_index(),
            rotation.days.len(),
            rotation.growth_settings.frequency,
        );

        println!("\nCompleting '{}' would:", day.name);
        if would_progress {
            display_changes(&rotation.preview(strategy));
        } else {
            println!(
                "  keep current prescriptions (progression is per {})",
                rotation.growth_settings.frequency
            );
        }
        println!("\n[Dry run - nothing saved]");
        return Ok(());
    }

    let outcome = rotation.complete_workout(strategy, now)?;

    let logs = session_logs(now, &outcome.performed.name, &outcome.performed.exercises, notes);

    // Log before saving the rotation so a failed append leaves the plan untouched
    let mut sink = JsonlSink::new(&paths.wal);
    sink.append_all(&logs)?;
    tracing::debug!("Logged {} exercises to {:?}", logs.len(), paths.wal);
    rotation.save(&paths.rotation)?;

    println!(
        "\n✓ Completed '{}' (day {} of {})",
        outcome.performed.name,
        outcome.completed_day_index + 1,
        rotation.days.len()
    );
    if outcome.progressed {
        display_changes(&outcome.changes);
    } else {
        println!(
            "  No progression this time (progression is per {})",
            rotation.growth_settings.frequency
        );
    }
    if let Some(next) = rotation.days.get(outcome.next_day_index) {
        println!("  Next: {} (day {})", next.name, outcome.next_day_index + 1);
    }
    Ok(())
}

fn display_changes(changes: &[ExerciseChange]) {
    if changes.is_empty() {
        println!("  (no exercises to progress)");
    }
    for change in changes {
        let lever = change
            .lever
            .map(|l| format!(" [{}]", l))
            .unwrap_or_default();
        println!(
            "  {}: {} → {}{}",
            change.before.name, change.before, change.after, lever
        );
    }
}

fn cmd_day(paths: &Paths, action: DayAction) -> Result<()> {
    match action {
        DayAction::Add { name } => {
            let index = Rotation::update(&paths.rotation, |rotation| {
                Ok(rotation.add_day(name.clone()))
            })?;
            println!("✓ Added day {}: {}", index + 1, name);
        }
        DayAction::Remove { day } => {
            let index = day_index(day)?;
            let removed =
                Rotation::update(&paths.rotation, |rotation| rotation.remove_day(index))?;
            println!("✓ Removed day {}: {}", day, removed.name);
        }
    }
    Ok(())
}

fn cmd_exercise(paths: &Paths, action: ExerciseAction) -> Result<()> {
    match action {
        ExerciseAction::Add {
            day,
            name,
            weight,
            reps,
            sets,
            partial,
        } => {
            let index = day_index(day)?;
            let exercise = DayExercise::new(name, weight, reps, sets).with_partial_reps(partial);
            let summary = format!("{}: {}", exercise.name, exercise);
            Rotation::update(&paths.rotation, |rotation| {
                rotation.add_exercise(index, exercise)
            })?;
            println!("✓ Added {}", summary);
        }
        ExerciseAction::Set {
            day,
            exercise,
            name,
            weight,
            reps,
            sets,
            partial,
        } => {
            let index = day_index(day)?;
            let update = ExerciseUpdate {
                name,
                weight,
                reps,
                sets,
                partial_reps: partial,
            };
            let summary = Rotation::update(&paths.rotation, |rotation| {
                let exercise = exercise_index(rotation, index, &exercise)?;
                let updated = rotation.update_exercise(index, exercise, update)?;
                Ok(format!("{}: {}", updated.name, updated))
            })?;
            println!("✓ Updated {}", summary);
        }
        ExerciseAction::Remove { day, exercise } => {
            let index = day_index(day)?;
            let removed = Rotation::update(&paths.rotation, |rotation| {
                let exercise = exercise_index(rotation, index, &exercise)?;
                rotation.remove_exercise(index, exercise)
            })?;
            println!("✓ Removed {}", removed.name);
        }
    }
    Ok(())
}

fn cmd_rules(paths: &Paths, args: RulesArgs) -> Result<()> {
    let rules = Rotation::update(&paths.rotation, |rotation| {
        let mut rules = rotation.priority_rules.clone();
        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(value) = args.$field { rules.$field = value; })*
            };
        }
        apply!(
            rep_priority,
            set_priority,
            weight_priority,
            rep_min,
            rep_max,
            set_min,
            set_max,
            reps_to_sets_multiplier,
            weight_increment,
            weight_range,
            over_estimate_tolerance
        );
        rotation.set_priority_rules(rules.clone());
        Ok(rules)
    })?;

    for problem in rules.validate() {
        eprintln!("Warning: {}", problem);
    }

    let order: Vec<String> = rules.lever_order().iter().map(|l| l.to_string()).collect();
    println!("Priority rules");
    println!("  Lever order: {}", order.join(" → "));
    println!("  Reps: {}-{}", rules.rep_min, rules.rep_max);
    println!("  Sets: {}-{}", rules.set_min, rules.set_max);
    println!(
        "  Reps must exceed {} × sets",
        format_weight(rules.reps_to_sets_multiplier)
    );
    println!(
        "  Weight: {} lb increments, at most {} lb per step",
        format_weight(rules.weight_increment),
        format_weight(rules.weight_range)
    );
    println!(
        "  Over-estimate tolerance: {}",
        rules.over_estimate_tolerance
    );
    Ok(())
}

fn cmd_growth(paths: &Paths, args: GrowthArgs) -> Result<()> {
    let growth_type = args
        .growth_type
        .as_deref()
        .map(str::parse::<GrowthType>)
        .transpose()?;

    let settings = Rotation::update(&paths.rotation, |rotation| {
        let mut settings = rotation.growth_settings.clone();
        if let Some(growth_type) = growth_type {
            settings.growth_type = growth_type;
        }
        if let Some(amount) = args.amount {
            settings.amount = amount;
        }
        if let Some(frequency) = args.frequency.as_deref() {
            settings.frequency = Frequency::from(frequency);
        }
        if let Some(decay_rate) = args.decay_rate {
            settings.decay_rate = decay_rate;
        }
        rotation.set_growth_settings(settings, args.reset_iterations);
        Ok(rotation.growth_settings.clone())
    })?;

    println!("Growth settings");
    println!("  Type: {}", settings.growth_type);
    println!("  Amount: {}", settings.amount);
    println!("  Frequency: {}", settings.frequency);
    if settings.growth_type == GrowthType::Sigmoid {
        println!(
            "  Decay: {} per iteration, iteration {} (now {}%)",
            settings.decay_rate,
            settings.iteration_count,
            overload_core::growth::effective_percent(&settings)
        );
    }
    Ok(())
}

fn cmd_recommend(paths: &Paths, day: usize, exercise: &str, config: &Config) -> Result<()> {
    let rotation = load_rotation(&paths.rotation)?;
    let index = day_index(day)?;
    let exercise = exercise_index(&rotation, index, exercise)?;
    let strategy = config.progression.strategy;
    let rec = rotation.recommend(index, exercise, strategy, Utc::now())?;

    println!("\n{}: {}", rec.current.name, rec.current);
    let lever = rec
        .next
        .lever
        .map(|l| format!(" [{}]", l))
        .unwrap_or_default();
    println!("  Next ({}): {}{}", strategy, rec.next.exercise, lever);
    println!(
        "  One growth step: {} lb → {} lb",
        format_weight(rec.current.weight),
        format_weight(rec.next_weight)
    );
    if rec.due {
        println!("  Progression is due when day {} is completed", day);
    } else {
        println!(
            "  Not due yet (progression is per {})",
            rotation.growth_settings.frequency
        );
    }
    Ok(())
}

fn cmd_log(
    paths: &Paths,
    entries: Vec<LogEntry>,
    name: String,
    date: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let performed_at = match date.as_deref() {
        Some(date) => parse_session_date(date)?,
        None => Utc::now(),
    };
    let exercises: Vec<DayExercise> = entries.into_iter().map(DayExercise::from).collect();
    let logs = session_logs(performed_at, &name, &exercises, notes);

    let mut sink = JsonlSink::new(&paths.wal);
    sink.append_all(&logs)?;

    println!(
        "✓ Logged '{}' on {} ({} exercises)",
        name,
        performed_at.format("%Y-%m-%d"),
        logs.len()
    );
    for exercise in &exercises {
        println!("  {}: {}", exercise.name, exercise);
    }
    Ok(())
}

fn cmd_history(paths: &Paths, days: i64) -> Result<()> {
    let logs = load_recent_logs(&paths.wal, &paths.csv, days)?;
    let sessions = group_sessions(&logs);

    if sessions.is_empty() {
        println!("No workouts in the last {} days.", days);
        return Ok(());
    }

    for session in &sessions {
        println!(
            "\n{} {} (total load {})",
            session.performed_at.format("%Y-%m-%d"),
            session.day_name,
            format_weight(session.total_load())
        );
        for log in &session.logs {
            let exercise = DayExercise {
                id: log.id,
                name: log.exercise_name.clone(),
                weight: log.weight,
                reps: log.reps,
                sets: log.sets,
                partial_reps: log.partial_reps,
                completed: log.completed,
            };
            println!("  {}: {}", log.exercise_name, exercise);
        }
    }
    println!();
    Ok(())
}

fn cmd_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = overload_core::csv_rollup::wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} workout logs to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = overload_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}
