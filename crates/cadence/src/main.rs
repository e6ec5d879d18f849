use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cadence_core::{
    import_user_track, seed_demo_tracks, ConfigManager, LibraryStore, Settings, StorageLayout,
    TrackRecord,
};
use clap::{Parser, Subcommand};

/// Local track library for the Cadence music visualizer.
#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(about = "Cadence track library")]
struct Args {
    /// Path to config.json (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage root to use instead of the configured one
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all tracks in library order
    List,
    /// Import an audio file into UserTracks
    Import {
        /// Audio file to copy into the library
        file: PathBuf,
    },
    /// Remove a track from the library by id
    Remove { id: String },
    /// Copy bundled demo tracks into an empty library
    SeedDemo {
        /// Demo content directory (defaults to demo_source_dir from config)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Print the audio file path of a track
    Locate { id: String },
    /// Print the storage layout paths
    Paths,
    /// Describe the configuration options and their current values
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigManager::new(args.config.clone());
    let loaded = config.load();
    let settings = loaded.as_ref().cloned().unwrap_or_default();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log_level))
        .init();

    if let Err(e) = loaded {
        log::warn!(
            "Failed to load config from {:?}, using defaults: {}",
            config.config_path(),
            e
        );
    }

    let stdout = io::stdout();
    run(args, &settings, &mut stdout.lock())
}

fn run<W: Write>(args: Args, settings: &Settings, out: &mut W) -> Result<()> {
    let root = match args.root {
        Some(root) => root,
        None => StorageLayout::root_from_settings(settings)?,
    };

    let layout = StorageLayout::open(&root)
        .with_context(|| format!("Failed to prepare storage root {:?}", root))?;

    let mut store = LibraryStore::new(layout);
    store.subscribe(|| log::debug!("Library changed"));
    store.load();

    let seeding_on_demand = matches!(args.command, Command::SeedDemo { .. });
    if settings.seed_demo_on_start && !seeding_on_demand {
        if let Some(source) = &settings.demo_source_dir {
            seed_demo_tracks(&mut store, source).context("Demo seeding failed")?;
        }
    }

    match args.command {
        Command::List => {
            for track in store.all_tracks() {
                writeln!(out, "{}", format_track(&track))?;
            }
        }
        Command::Import { file } => {
            let track = import_user_track(&mut store, &file)
                .with_context(|| format!("Failed to import {:?}", file))?;
            writeln!(out, "{}", format_track(&track))?;
        }
        Command::Remove { id } => {
            let removed = store.remove_track(&id)?;
            if removed == 0 {
                log::warn!("No track with id {}", id);
            }
            writeln!(out, "removed {}", removed)?;
        }
        Command::SeedDemo { source } => {
            let source = source
                .or_else(|| settings.demo_source_dir.clone())
                .context("No demo source given and demo_source_dir is not configured")?;
            let report = seed_demo_tracks(&mut store, &source)?;
            for track in &report.imported {
                writeln!(out, "{}", format_track(track))?;
            }
            for skipped in &report.skipped {
                writeln!(out, "skipped {}: {}", skipped.name, skipped.reason)?;
            }
        }
        Command::Locate { id } => {
            let track = store
                .get_track(&id)
                .with_context(|| format!("No track with id {}", id))?;
            let path = store
                .layout()
                .original_audio_path(&track)
                .with_context(|| format!("Audio file missing for track {}", id))?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Paths => {
            let layout = store.layout();
            writeln!(out, "root:    {}", layout.root().display())?;
            writeln!(out, "demo:    {}", layout.demo_tracks_dir().display())?;
            writeln!(out, "user:    {}", layout.user_tracks_dir().display())?;
            writeln!(out, "library: {}", layout.library_file().display())?;
        }
        Command::Config => {
            for line in ConfigManager::schema().describe() {
                writeln!(out, "{}", line)?;
            }
            writeln!(out)?;
            writeln!(out, "app_folder_name = {}", settings.app_folder_name)?;
            writeln!(out, "seed_demo_on_start = {}", settings.seed_demo_on_start)?;
            writeln!(out, "log_level = {}", settings.log_level)?;
        }
    }

    Ok(())
}

fn format_track(track: &TrackRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        track.id,
        track.display_title(),
        track.display_artist(),
        if track.is_bundled { "bundled" } else { "user" },
        track.folder_path
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn run_with(temp_dir: &TempDir, settings: &Settings, argv: &[&str]) -> Result<String> {
        let root = temp_dir.path().join("root");
        let mut full = vec!["cadence", "--root", root.to_str().unwrap()];
        full.extend_from_slice(argv);

        let args = Args::try_parse_from(full)?;
        let mut out = Vec::new();
        run(args, settings, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn no_seed() -> Settings {
        Settings {
            seed_demo_on_start: false,
            ..Settings::default()
        }
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["cadence", "import", "song.mp3"]).unwrap();
        assert!(matches!(args.command, Command::Import { .. }));

        let args =
            Args::try_parse_from(["cadence", "seed-demo", "--source", "/tmp/demo"]).unwrap();
        match args.command {
            Command::SeedDemo { source } => assert_eq!(source, Some(PathBuf::from("/tmp/demo"))),
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Args::try_parse_from(["cadence"]).is_err());
    }

    #[test]
    fn test_import_list_locate_remove() {
        let temp_dir = TempDir::new().unwrap();
        let settings = no_seed();
        let source = temp_dir.path().join("mytrack.mp3");
        fs::write(&source, b"audio").unwrap();

        let imported = run_with(&temp_dir, &settings, &["import", source.to_str().unwrap()]).unwrap();
        let id = imported.split('\t').next().unwrap().to_string();
        assert!(imported.contains("mytrack\tUnknown\tuser\tUserTracks/"));

        let listed = run_with(&temp_dir, &settings, &["list"]).unwrap();
        assert_eq!(listed, imported);

        let located = run_with(&temp_dir, &settings, &["locate", &id]).unwrap();
        assert!(located.trim_end().ends_with("original.mp3"));

        let removed = run_with(&temp_dir, &settings, &["remove", &id]).unwrap();
        assert_eq!(removed, "removed 1\n");
        assert_eq!(run_with(&temp_dir, &settings, &["list"]).unwrap(), "");
    }

    #[test]
    fn test_startup_seeds_configured_demo_content() {
        let temp_dir = TempDir::new().unwrap();
        let demo = temp_dir.path().join("demo");
        fs::create_dir_all(&demo).unwrap();
        fs::write(demo.join("song1.mp3"), b"one").unwrap();

        let settings = Settings {
            demo_source_dir: Some(demo),
            ..Settings::default()
        };

        let listed = run_with(&temp_dir, &settings, &["list"]).unwrap();
        assert_eq!(listed.lines().count(), 1);
        assert!(listed.contains("song1\tDemo\tbundled\tDemoTracks/"));

        // Restarting with content present does not seed again.
        let listed = run_with(&temp_dir, &settings, &["list"]).unwrap();
        assert_eq!(listed.lines().count(), 1);
    }

    #[test]
    fn test_seed_demo_requires_a_source() {
        let temp_dir = TempDir::new().unwrap();
        assert!(run_with(&temp_dir, &no_seed(), &["seed-demo"]).is_err());
    }

    #[test]
    fn test_config_lists_options_and_values() {
        let temp_dir = TempDir::new().unwrap();
        let out = run_with(&temp_dir, &no_seed(), &["config"]).unwrap();

        assert!(out.starts_with("app_folder_name (default \"Cadence\""));
        assert!(out.contains("\nseed_demo_on_start = false\n"));
        assert!(out.ends_with("log_level = info\n"));
    }

    #[test]
    fn test_locate_unknown_track_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(run_with(&temp_dir, &no_seed(), &["locate", "missing"]).is_err());
    }
}
