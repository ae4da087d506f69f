// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use corduroy::config::{default_config_path, Config};
use corduroy::exchange::{export_chords, export_jams, import_chords_file, import_jams_file, today_iso};
use corduroy::library::reference::browse;
use corduroy::library::{ChordDraft, ChordLibrary, FretValue, JamBook, VoicingKind, Workspace};
use corduroy::logging;
use corduroy::music::fretboard::{chart_cells, StringCells, Tuning, FRET_COUNT, STRING_COUNT};
use corduroy::music::keys::KEYS;
use corduroy::music::{
    catalog, chords_in_key, keys_containing, transpose_progression, CapoChart, DiatonicKey,
    PitchClass, ScaleChart, ScaleRegistry,
};
use corduroy::store::Store;

fn print_usage() {
    println!("Corduroy - guitar chord and scale toolkit");
    println!();
    println!("Usage: corduroy [--config <FILE>] [--verbose] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  transpose <N> <CHORDS...>   Move a progression by N semitones");
    println!("  capo [FRET] <CHORDS...>     Shapes to finger for a sounding progression");
    println!("  keys                        List every key and its diatonic chords");
    println!("  key <NAME>                  Show a key's degrees and matching library chords");
    println!("  which <CHORD>               List the keys a chord belongs to");
    println!("  scales [TERM]               List the scale charts and scale types");
    println!("  scale <NUMBER|NAME> [POS]   Draw a scale chart position on the fretboard");
    println!("  scale <ROOT> <TYPE> [POS]   Draw a box position of any scale (built-in or custom)");
    println!("  reference [TERM] [--type K] Browse the reference chords (open, barre, power, octave)");
    println!("  chords [TERM] [--type K]    List (or search) the chord library");
    println!("  chord add <NAME> <ROOT> <QUALITY> <VOICING> <FRETS> [POSITION]");
    println!("                              Add a chord; FRETS low to high, e.g. x,3,2,0,1,0");
    println!("  chord copy <REFERENCE>      Copy a reference voicing into the library");
    println!("  chord delete <ID>           Remove a chord from the library");
    println!("  workspace [add <ID>|move <FROM> <TO>|remove <ID>|clear]");
    println!("                              Show or edit the jam workspace");
    println!("  jams                        List saved jams");
    println!("  jam save <NAME> [CAPO]      Save the workspace as a jam");
    println!("  jam load <ID>               Replace the workspace with a saved jam");
    println!("  jam delete <ID>             Remove a saved jam");
    println!("  dark-mode [on|off]          Show or set the dark mode preference");
    println!("  export [chords|jams]        Export collections as dated JSON files");
    println!("  import <chords|jams> <FILE> Merge records from a JSON export");
    println!("  watch [SECONDS]             Report edits made to the data directory (default 30s)");
    println!("  help                        Show this help message");
}

struct Cli {
    config_path: Option<PathBuf>,
    verbose: bool,
    command: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut cli = Cli {
        config_path: None,
        verbose: false,
        command: Vec::new(),
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                cli.config_path = Some(PathBuf::from(path));
            }
            "--verbose" | "-v" => cli.verbose = true,
            _ => cli.command.push(arg.clone()),
        }
    }
    Ok(cli)
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config_path {
        Some(path) => Config::load(path),
        None => match default_config_path() {
            Some(path) => Config::load_or_default(path),
            None => Ok(Config::default()),
        },
    }
}

fn open_store(config: &Config) -> Result<Store> {
    let dir = config.resolved_data_dir();
    Store::open_dir(&dir).with_context(|| format!("Failed to open data directory: {:?}", dir))
}

fn parse_semitones(text: &str) -> Result<i32> {
    text.parse()
        .map_err(|_| anyhow!("Invalid semitone count: {}", text))
}

fn cmd_transpose(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        bail!("transpose requires a semitone count and a progression");
    }
    let semitones = parse_semitones(&args[0])?;
    println!("{}", transpose_progression(&args[1..].join(" "), semitones));
    Ok(())
}

fn cmd_capo(args: &[String], config: &Config) -> Result<()> {
    let (capo, chords) = match args.first().map(|a| a.parse::<u8>()) {
        Some(Ok(fret)) => (fret, &args[1..]),
        _ => (config.default_capo, args),
    };
    if chords.is_empty() {
        bail!("capo requires a progression");
    }
    let chart = CapoChart::new(chords.join(" "), capo)?;
    println!("{}", chart);
    Ok(())
}

fn print_key(key: &DiatonicKey) {
    let degrees: Vec<String> = key
        .numerals()
        .iter()
        .zip(key.degree_chords.iter())
        .map(|(numeral, chord)| format!("{}:{}", numeral, chord))
        .collect();
    println!("{:<4} {}", key.name, degrees.join("  "));
}

fn cmd_keys() {
    for key in KEYS.iter() {
        print_key(key);
    }
}

fn cmd_key(args: &[String], store: &Store) -> Result<()> {
    let name = args.first().ok_or_else(|| anyhow!("key requires a key name"))?;
    let key = DiatonicKey::find(name).ok_or_else(|| anyhow!("Unknown key: {}", name))?;
    print_key(key);
    println!("Relative: {}", key.relative().name);
    println!();

    let library = ChordLibrary::new(store).list()?;
    let degrees = chords_in_key(&library, key.name).unwrap_or_default();
    for degree in degrees {
        let names: Vec<&str> = degree.matches.iter().map(|c| c.name.as_str()).collect();
        let shown = if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        };
        println!("{:>5} {:<6} {}", degree.numeral, degree.chord, shown);
    }
    Ok(())
}

fn cmd_which(args: &[String]) -> Result<()> {
    let chord = args.first().ok_or_else(|| anyhow!("which requires a chord name"))?;
    let keys = keys_containing(chord.as_str());
    if keys.is_empty() {
        println!("{} is not diatonic to any key", chord);
    }
    for (key, degree) in keys {
        println!("{:<4} {} ({})", key.name, key.numerals()[degree - 1], key.degree_chords[degree - 1]);
    }
    Ok(())
}

fn cmd_scales(args: &[String], registry: &ScaleRegistry) {
    let term = args.join(" ").to_lowercase();
    for (i, chart) in catalog().iter().enumerate() {
        if term.is_empty() || chart.name().to_lowercase().contains(&term) {
            println!(
                "{:>2}. {} ({}, {} positions)",
                i + 1,
                chart.name(),
                chart.scale().step_pattern(),
                chart.positions().len()
            );
        }
    }
    println!();
    println!("Scale types: {}", registry.available_scales().join(", "));
}

fn find_chart(selector: &str) -> Option<ScaleChart> {
    let charts = catalog();
    if let Ok(number) = selector.parse::<usize>() {
        return charts.into_iter().nth(number.checked_sub(1)?);
    }
    let selector = selector.to_lowercase();
    charts
        .into_iter()
        .find(|c| c.name().to_lowercase().contains(&selector))
}

fn render_position(cells: &[StringCells], tuning: &Tuning) -> Vec<String> {
    let names = tuning.string_names();
    let mut lines = Vec::new();
    let header: String = (0..=FRET_COUNT).map(|f| format!("{:>3}", f)).collect();
    lines.push(format!("  {}", header));
    for string in cells.iter().rev() {
        let row: String = (0..=FRET_COUNT)
            .map(|fret| match string.cells.iter().find(|c| c.fret == fret) {
                Some(cell) if cell.is_root => "  R".to_string(),
                Some(cell) => format!("{:>3}", cell.note.label()),
                None => "  -".to_string(),
            })
            .collect();
        lines.push(format!("{:<2}{}", names[string.string], row));
    }
    lines
}

/// A root plus a registry scale name gives box positions for that scale;
/// anything else selects a catalog chart. Returns the chart and the
/// remaining arguments.
fn resolve_chart<'a>(
    args: &'a [String],
    registry: &ScaleRegistry,
) -> Result<(ScaleChart, &'a [String])> {
    let selector = args
        .first()
        .ok_or_else(|| anyhow!("scale requires a chart, or a root and a scale type"))?;
    if let (Some(root), Some(name)) = (PitchClass::from_label(selector), args.get(1)) {
        if let Some(scale) = registry.get_scale(root, name) {
            let title = format!("{} {}", root, name);
            let lowest = Tuning::STANDARD.strings[0];
            return Ok((ScaleChart::boxes(title, scale, lowest), &args[2..]));
        }
    }
    let chart =
        find_chart(selector).ok_or_else(|| anyhow!("No scale chart matches: {}", selector))?;
    Ok((chart, &args[1..]))
}

fn cmd_scale(args: &[String], registry: &ScaleRegistry) -> Result<()> {
    let (chart, rest) = resolve_chart(args, registry)?;
    let position: u8 = match rest.first() {
        Some(p) => p.parse().map_err(|_| anyhow!("Invalid position: {}", p))?,
        None => 1,
    };
    let cells = chart_cells(&chart, position).ok_or_else(|| {
        anyhow!(
            "{} has no position {} (1-{})",
            chart.name(),
            position,
            chart.positions().len()
        )
    })?;

    println!("{}: {} ({})", chart.name(), chart.scale(), chart.scale().step_pattern());
    if let Some(p) = chart.position(position) {
        println!(
            "Position {} of {} (frets {}-{})",
            p.number,
            chart.positions().len(),
            p.start_fret,
            p.end_fret
        );
    }
    for line in render_position(&cells, &Tuning::STANDARD) {
        println!("{}", line);
    }
    Ok(())
}

/// `[TERM...] [--type KIND]`
fn parse_browse_args(args: &[String]) -> Result<(String, Option<VoicingKind>)> {
    let mut terms = Vec::new();
    let mut kind = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--type" || arg == "-t" {
            let label = iter.next().ok_or_else(|| anyhow!("--type requires a voicing type"))?;
            let parsed = VoicingKind::parse(label)
                .ok_or_else(|| anyhow!("Unknown voicing type: {}", label))?;
            kind = Some(parsed);
        } else {
            terms.push(arg.as_str());
        }
    }
    Ok((terms.join(" "), kind))
}

fn format_frets(frets: &[FretValue]) -> String {
    frets.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(" ")
}

fn cmd_reference(args: &[String]) -> Result<()> {
    let (term, kind) = parse_browse_args(args)?;
    let found = browse(&term, kind);
    if found.is_empty() {
        println!("No reference chords match.");
    }
    for entry in found {
        println!("{}", entry.chord.name);
        for voicing in entry.voicings {
            println!(
                "  {:<20} {:<7} {:<18} fingers {}",
                voicing.name,
                voicing.kind.label(),
                format_frets(&voicing.frets),
                format_frets(&voicing.fingering)
            );
        }
    }
    Ok(())
}

fn cmd_chords(args: &[String], store: &Store) -> Result<()> {
    let (term, kind) = parse_browse_args(args)?;
    let mut chords = ChordLibrary::new(store).search(&term)?;
    if let Some(kind) = kind {
        chords.retain(|c| c.chord_voicing == kind);
    }
    if chords.is_empty() {
        println!("No chords.");
    }
    for chord in chords {
        println!(
            "{:<16} {:<4} {:<12} {:<7} {}  (id {})",
            chord.name,
            chord.root_note,
            chord.chord_quality,
            chord.chord_voicing.label(),
            format_frets(&chord.frets),
            chord.id
        );
    }
    Ok(())
}

/// Six fret values, low string first: "x,3,2,0,1,0", "x-3-2-0-1-0" or "x32010"
fn parse_shape(text: &str) -> Result<[FretValue; STRING_COUNT]> {
    let mut tokens: Vec<String> = text
        .split(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tokens.len() == 1 && tokens[0].chars().count() == STRING_COUNT {
        tokens = tokens[0].chars().map(String::from).collect();
    }
    if tokens.len() != STRING_COUNT {
        bail!("expected {} fret values, got {}: {}", STRING_COUNT, tokens.len(), text);
    }
    let mut shape = [FretValue::Muted; STRING_COUNT];
    for (slot, token) in shape.iter_mut().zip(&tokens) {
        *slot = token.parse()?;
    }
    Ok(shape)
}

fn cmd_chord(args: &[String], store: &Store) -> Result<()> {
    let library = ChordLibrary::new(store);
    match args.first().map(String::as_str) {
        Some("add") => {
            if args.len() < 6 {
                bail!("chord add requires a name, root, quality, voicing and frets");
            }
            let mut draft = ChordDraft::new();
            draft.name = args[1].clone();
            let root = PitchClass::from_label(&args[2])
                .ok_or_else(|| anyhow!("Unknown root note: {}", args[2]))?;
            let voicing = VoicingKind::parse(&args[4])
                .ok_or_else(|| anyhow!("Unknown voicing type: {}", args[4]))?;
            draft.root = Some(root);
            draft.quality = Some(args[3].clone());
            draft.voicing = Some(voicing);
            draft.set_shape(&parse_shape(&args[5])?)?;
            if let Some(position) = args.get(6) {
                let position = position
                    .parse()
                    .map_err(|_| anyhow!("Invalid position: {}", position))?;
                draft.set_position(position)?;
            }
            let chord = library.add_draft(&draft)?;
            println!("Added {} (id {})", chord.name, chord.id);
        }
        Some("copy") => {
            let name = args[1..].join(" ");
            if name.is_empty() {
                bail!("chord copy requires a reference voicing name");
            }
            let chord = library.copy_reference(&name)?;
            println!("Added {} (id {})", chord.name, chord.id);
        }
        Some("delete") => {
            let id = args.get(1).ok_or_else(|| anyhow!("chord delete requires an id"))?;
            let chord = library.delete(id)?;
            println!("Deleted {}", chord.name);
        }
        Some(other) => bail!("Unknown chord action: {}", other),
        None => bail!("chord requires an action: add, copy or delete"),
    }
    Ok(())
}

/// 1-based slot number to an index
fn parse_slot(text: &str) -> Result<usize> {
    text.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| anyhow!("Invalid slot number: {}", text))
}

fn cmd_workspace(args: &[String], store: &Store) -> Result<()> {
    let workspace = Workspace::new(store);
    match args.first().map(String::as_str) {
        None => {}
        Some("add") => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow!("workspace add requires a library chord id"))?;
            workspace.add_from_library(id)?;
        }
        Some("move") => {
            if args.len() < 3 {
                bail!("workspace move requires two slot numbers");
            }
            workspace.move_chord(parse_slot(&args[1])?, parse_slot(&args[2])?)?;
        }
        Some("remove") => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow!("workspace remove requires a workspace id"))?;
            workspace.remove(id)?;
        }
        Some("clear") => workspace.clear()?,
        Some(other) => bail!("Unknown workspace action: {}", other),
    }

    let chords = workspace.chords()?;
    if chords.is_empty() {
        println!("Workspace is empty.");
    }
    for (slot, chord) in chords.iter().enumerate() {
        println!(
            "{:>2}. {:<16} {}  (id {})",
            slot + 1,
            chord.name,
            format_frets(&chord.frets),
            chord.id
        );
    }
    if !chords.is_empty() {
        println!("Progression: {}", workspace.progression()?);
    }
    Ok(())
}

fn cmd_jams(store: &Store) -> Result<()> {
    let jams = JamBook::new(store).list()?;
    if jams.is_empty() {
        println!("No saved jams.");
    }
    for jam in jams {
        println!("{} (capo {}, id {})", jam.name, jam.capo_fret, jam.id);
        println!("  sounds:  {}", jam.progression());
        if jam.capo_fret > 0 {
            println!("  fingers: {}", jam.fingered_progression());
        }
    }
    Ok(())
}

fn cmd_jam(args: &[String], store: &Store, config: &Config) -> Result<()> {
    let jams = JamBook::new(store);
    match args.first().map(String::as_str) {
        Some("save") => {
            let name = args.get(1).ok_or_else(|| anyhow!("jam save requires a name"))?;
            let capo = match args.get(2) {
                Some(c) => c.parse().map_err(|_| anyhow!("Invalid capo fret: {}", c))?,
                None => config.default_capo,
            };
            let jam = jams.save_workspace(name, capo)?;
            println!("Saved {} with {} chords (id {})", jam.name, jam.chords.len(), jam.id);
        }
        Some("load") => {
            let id = args.get(1).ok_or_else(|| anyhow!("jam load requires an id"))?;
            let capo = jams.load_into_workspace(id)?;
            println!("Loaded jam {} into the workspace (capo {})", id, capo);
        }
        Some("delete") => {
            let id = args.get(1).ok_or_else(|| anyhow!("jam delete requires an id"))?;
            let jam = jams.delete(id)?;
            println!("Deleted {}", jam.name);
        }
        Some(other) => bail!("Unknown jam action: {}", other),
        None => cmd_jams(store)?,
    }
    Ok(())
}

fn cmd_dark_mode(args: &[String], store: &Store) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("on") => store.set_dark_mode(true)?,
        Some("off") => store.set_dark_mode(false)?,
        Some(other) => bail!("dark-mode takes on or off, not {}", other),
        None => {}
    }
    println!("Dark mode is {}", if store.dark_mode()? { "on" } else { "off" });
    Ok(())
}

fn cmd_export(args: &[String], store: &Store, config: &Config) -> Result<()> {
    let dir = config.resolved_export_dir();
    let date = today_iso();
    let which = args.first().map(String::as_str).unwrap_or("all");
    if !matches!(which, "chords" | "jams" | "all") {
        bail!("export takes chords, jams or nothing");
    }
    if matches!(which, "chords" | "all") {
        println!("Wrote {}", export_chords(store, &dir, &date)?.display());
    }
    if matches!(which, "jams" | "all") {
        println!("Wrote {}", export_jams(store, &dir, &date)?.display());
    }
    Ok(())
}

fn cmd_import(args: &[String], store: &Store) -> Result<()> {
    if args.len() < 2 {
        bail!("import requires a kind (chords or jams) and a file");
    }
    let path = PathBuf::from(&args[1]);
    let report = match args[0].as_str() {
        "chords" => import_chords_file(store, &path)?,
        "jams" => import_jams_file(store, &path)?,
        other => bail!("Unknown import kind: {}", other),
    };
    println!(
        "Imported {} new, {} already present, {} rejected",
        report.added, report.skipped_existing, report.rejected
    );
    Ok(())
}

fn cmd_watch(args: &[String], store: &Store, config: &Config) -> Result<()> {
    let seconds: u64 = match args.first() {
        Some(s) => s.parse().map_err(|_| anyhow!("Invalid duration: {}", s))?,
        None => 30,
    };
    let watcher = store.watch(Some(config.watch_debounce_ms))?;
    println!(
        "Watching {} for {}s (press Ctrl+C to stop)...",
        watcher.watched_path().display(),
        seconds
    );

    let start_time = Instant::now();
    let run_duration = Duration::from_secs(seconds);
    while start_time.elapsed() < run_duration {
        if let Some(event) = watcher.recv_timeout(Duration::from_millis(100)) {
            println!("{} changed", event.collection);
        }
    }

    println!("Watch complete!");
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    if cli.command.is_empty() {
        println!("Corduroy - guitar chord and scale toolkit");
        println!("Run with help for usage information");
        return Ok(());
    }

    let config = load_config(&cli)?;
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.level()
    };
    logging::init(level);

    let command = cli.command[0].as_str();
    let rest = &cli.command[1..];
    match command {
        "transpose" => cmd_transpose(rest)?,
        "capo" => cmd_capo(rest, &config)?,
        "keys" => cmd_keys(),
        "key" => cmd_key(rest, &open_store(&config)?)?,
        "which" => cmd_which(rest)?,
        "scales" => cmd_scales(rest, &config.scale_registry()),
        "scale" => cmd_scale(rest, &config.scale_registry())?,
        "reference" => cmd_reference(rest)?,
        "chords" => cmd_chords(rest, &open_store(&config)?)?,
        "chord" => cmd_chord(rest, &open_store(&config)?)?,
        "workspace" => cmd_workspace(rest, &open_store(&config)?)?,
        "jams" => cmd_jams(&open_store(&config)?)?,
        "jam" => cmd_jam(rest, &open_store(&config)?, &config)?,
        "dark-mode" => cmd_dark_mode(rest, &open_store(&config)?)?,
        "export" => cmd_export(rest, &open_store(&config)?, &config)?,
        "import" => cmd_import(rest, &open_store(&config)?)?,
        "watch" => cmd_watch(rest, &open_store(&config)?, &config)?,
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
