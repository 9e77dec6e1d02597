//! sv4d - 4D seismic map viewer core
//!
//! Resolves map selections and prints the layers of a map panel as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Check a deployment configuration and its data paths
//! sv4d --config viewer_config.toml check-config
//!
//! # Resolve a selection to its map file
//! sv4d resolve --map-type observed --attribute max --name draupne_fm_1 \
//!     --iteration iter-0 --realization --- --interval 2020-10-01-2019-10-01
//!
//! # Full panel payload; unset fields come from the panel defaults
//! sv4d panel --panel 1 --interval 2020-10-01-2019-10-01
//! ```
//!
//! # Environment Variables
//!
//! - `SV4D_CONFIG`: Path to the viewer configuration (when `--config` is not given)
//! - `RUST_LOG`: Logging level (default: info)

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use surface_viewer_4d::config::validation;
use surface_viewer_4d::polygons;
use surface_viewer_4d::types::Fluid;
use surface_viewer_4d::{
    composer, MapSelection, MapType, PanelId, SessionState, Viewer, ViewerConfig, ViewerData, WellSelection,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "sv4d")]
#[command(about = "4D seismic map selection and layer assembly")]
#[command(version)]
struct CliArgs {
    /// Viewer configuration file (default: $SV4D_CONFIG, then ./viewer_config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Print the map file a selection resolves to
    Resolve {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Also print the catalog rows describing the file
        #[arg(long)]
        metadata: bool,
    },

    /// List available intervals, incremental ones first
    Intervals {
        /// Restrict to one map type
        #[arg(long, value_parser = parse_map_type)]
        map_type: Option<MapType>,
    },

    /// Print one well layer as JSON
    WellLayer {
        /// Layer key, e.g. `injection_start` or `drilled_wells`
        #[arg(long, value_parser = parse_well_selection)]
        selection: WellSelection,
        /// 4D interval; empty for basic layers
        #[arg(long, default_value = "")]
        interval: String,
        /// Layer name; for `planned`, the planned-well group
        #[arg(long)]
        label: Option<String>,
        /// Fluids to include (default: all fluids of the direction)
        #[arg(long = "fluid", value_parser = parse_fluid)]
        fluids: Vec<Fluid>,
    },

    /// Print polygon layers as JSON
    Polygons {
        /// Only the zone layer whose polygons are named NAME
        #[arg(long)]
        zone: Option<String>,
    },

    /// Print a full map panel as JSON
    Panel {
        /// Panel index
        #[arg(long, default_value = "0")]
        panel: PanelId,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Validate the configuration and the data it points at
    CheckConfig,
}

#[derive(clap::Args, Debug)]
struct SelectionArgs {
    #[arg(long, value_parser = parse_map_type)]
    map_type: Option<MapType>,
    #[arg(long)]
    attribute: Option<String>,
    /// Zone / surface name
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    iteration: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    realization: Option<String>,
    #[arg(long)]
    interval: Option<String>,
}

impl SelectionArgs {
    /// Fill unset fields from `defaults`; every field must end up set.
    fn into_selection(self, defaults: Option<MapSelection>) -> Result<MapSelection> {
        fn field<T>(given: Option<T>, default: Option<T>, name: &str) -> Result<T> {
            match given.or(default) {
                Some(v) => Ok(v),
                None => bail!("--{name} is required (no panel default available)"),
            }
        }
        let d = defaults.as_ref();
        Ok(MapSelection {
            map_type: field(self.map_type, d.map(|d| d.map_type), "map-type")?,
            attribute: field(self.attribute, d.map(|d| d.attribute.clone()), "attribute")?,
            name: field(self.name, d.map(|d| d.name.clone()), "name")?,
            iteration: field(self.iteration, d.map(|d| d.iteration.clone()), "iteration")?,
            realization: field(self.realization, d.map(|d| d.realization.clone()), "realization")?,
            interval: field(self.interval, d.map(|d| d.interval.clone()), "interval")?,
        })
    }
}

fn parse_map_type(s: &str) -> std::result::Result<MapType, String> {
    MapType::parse(s).ok_or_else(|| format!("unknown map type '{s}' (observed|simulated)"))
}

fn parse_well_selection(s: &str) -> std::result::Result<WellSelection, String> {
    WellSelection::parse(s).ok_or_else(|| format!("unknown well layer '{s}'"))
}

fn parse_fluid(s: &str) -> std::result::Result<Fluid, String> {
    Fluid::parse(s).ok_or_else(|| format!("unknown fluid '{s}' (oil|gas|water)"))
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<ViewerConfig> {
    match path {
        Some(p) => ViewerConfig::load_from_file(p)
            .with_context(|| format!("Failed to load viewer config {}", p.display())),
        None => Ok(ViewerConfig::load()),
    }
}

fn load_viewer(config: ViewerConfig) -> Result<Viewer> {
    let data = ViewerData::load(config).context("Failed to load viewer data")?;
    Ok(Viewer::new(data))
}

fn print_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    writeln!(out, "{json}")?;
    Ok(())
}

fn check_config(config: &ViewerConfig, out: &mut impl Write) -> Result<()> {
    let (errors, warnings) = validation::validate_data_paths(config);
    for w in &warnings {
        warn!("{}", w);
    }
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("error: {e}");
        }
        bail!("{} configuration error(s)", errors.len());
    }
    info!(warnings = warnings.len(), "Configuration OK");
    writeln!(out, "{}", config.to_toml().context("Failed to render configuration")?)?;
    Ok(())
}

/// Execute one subcommand, writing its output to `out`.
fn run(args: CliArgs, out: &mut impl Write) -> Result<()> {
    let config = load_config(args.config.as_ref())?;

    match args.command {
        SubCommand::CheckConfig => check_config(&config, out),

        SubCommand::Resolve { selection, metadata } => {
            let viewer = load_viewer(config)?;
            let selection = selection.into_selection(None)?;
            let path = viewer
                .data()
                .catalog
                .resolve_map_path(&selection, viewer.config().interval_mode)?;
            writeln!(out, "{}", viewer.config().resolve_path(&path).display())?;
            if metadata {
                print_json(out, &viewer.data().catalog.rows_for_file(&path.to_string_lossy()))?;
            }
            Ok(())
        }

        SubCommand::Intervals { map_type } => {
            let viewer = load_viewer(config)?;
            let mode = viewer.config().interval_mode;
            let catalog = &viewer.data().catalog;
            let intervals = match map_type {
                Some(t) => catalog.intervals_for(t, mode),
                None => catalog.intervals(mode),
            };
            print_json(out, &intervals)
        }

        SubCommand::WellLayer {
            selection,
            interval,
            label,
            fluids,
        } => {
            let viewer = load_viewer(config)?;
            let label = label.unwrap_or_else(|| selection.key().to_string());
            print_json(out, &viewer.well_layer(selection, &interval, &label, &fluids))
        }

        SubCommand::Polygons { zone } => {
            let viewer = load_viewer(config)?;
            let layers = viewer.polygon_layers();
            match zone {
                Some(zone) => match polygons::zone_layer(&layers, &zone) {
                    Some(layer) => print_json(out, layer),
                    None => bail!("No polygon layer for zone '{zone}'"),
                },
                None => print_json(out, &layers),
            }
        }

        SubCommand::Panel { panel, selection } => {
            let viewer = load_viewer(config)?;
            let defaults = viewer.default_selections().into_iter().nth(panel);
            let selection = selection.into_selection(defaults)?;
            let mut session = SessionState::new();
            let map_panel = viewer.build_panel(&mut session, panel, &selection);
            writeln!(out, "{}", composer::panel_json(&map_panel).context("Failed to serialize panel")?)?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    run(args, &mut std::io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use surface_viewer_4d::surface::SurfaceGrid;

    const CONFIG: &str = r#"
interval_mode = "reverse"

[data]
surface_metadata_file = "surface_metadata.csv"
well_data = "well_data"
production_data = "production_data"
polygon_data = "polygons"

[additional_polygon_layers.owc]
tagname = "owc_outline"
label = "Initial OWC"
format = "csv"
"#;

    const CATALOG: &str = "\
fmu_id.realization,fmu_id.iteration,map_type,data.name,data.attribute,data.time.t1,data.time.t2,filename
---,iter-0,observed,draupne_fm_1,max,2019-10-01,2020-10-01,maps/observed.gri
";

    const WELLBORE_INFO: &str = "\
wellbore.name,wellbore.short_name,wellbore.type,wellbore.pdm_name,wellbore.top_res_md,wellbore.fluids,layer_name,file_name
NO 1/1-A-1,A-1,injection,A-1,1500,gas,Drilled wells,A-1.rmswell
";

    const GAS_INJECTION: &str = "\
PDM well name,Production type,Fluid,Start date,Last date,2019-01-01-2019-10-01,2019-01-01-2020-10-01,Total
A-1,injection,gas,2019-01-01,,150.0,300.0,300.0
";

    const TRAJECTORY: &str = "1.0\nUnknown\nNO_1/1-A-1 461000.0 5934000.0 25.0\n1\nMD UNK lin\n\
        461000.0 5934000.0 -25.0 0.0\n\
        461000.0 5934000.0 975.0 1000.0\n\
        461000.0 5934100.0 1950.0 2000.0\n\
        461000.0 5934200.0 2440.0 2500.0\n";

    const OWC: &str = "X,Y,Z,ID\n461500,5934000,1800,0\n461500,5934500,1800,0\n";

    fn write(root: &Path, relative: &str, contents: impl AsRef<[u8]>) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    fn deployment() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let grid = SurfaceGrid {
            nx: 2,
            ny: 2,
            xori: 460000.0,
            yori: 5933000.0,
            xinc: 25.0,
            yinc: 25.0,
            rotation: 0.0,
            values: vec![0.1, 0.2, -0.1, 0.3],
        };
        write(root, "viewer_config.toml", CONFIG);
        write(root, "surface_metadata.csv", CATALOG);
        write(root, "maps/observed.gri", grid.encode());
        write(root, "well_data/wellbore_info.csv", WELLBORE_INFO);
        write(root, "well_data/A-1.rmswell", TRAJECTORY);
        write(root, "production_data/BORE_GI_VOL.csv", GAS_INJECTION);
        write(root, "polygons/additional_layers/owc_outline.csv", OWC);
        dir
    }

    /// Run `sv4d --config <deployment> <args>` and capture stdout.
    fn sv4d(dir: &tempfile::TempDir, args: &[&str]) -> Result<String> {
        let config = dir.path().join("viewer_config.toml");
        let mut argv = vec!["sv4d".to_string(), "--config".to_string(), config.display().to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        let mut out = Vec::new();
        run(CliArgs::try_parse_from(argv)?, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    const OBSERVED: [&str; 12] = [
        "--map-type",
        "observed",
        "--attribute",
        "max",
        "--name",
        "draupne_fm_1",
        "--iteration",
        "iter-0",
        "--realization",
        "---",
        "--interval",
        "2020-10-01-2019-10-01",
    ];

    #[test]
    fn check_config_prints_effective_config() {
        let dir = deployment();
        let out = sv4d(&dir, &["check-config"]).unwrap();
        assert!(out.contains("interval_mode = \"reverse\""), "{out}");
    }

    #[test]
    fn check_config_fails_on_missing_catalog() {
        let dir = deployment();
        std::fs::remove_file(dir.path().join("surface_metadata.csv")).unwrap();
        let err = sv4d(&dir, &["check-config"]).unwrap_err();
        assert!(err.to_string().contains("configuration error"), "{err}");
    }

    #[test]
    fn resolve_prints_map_path_and_metadata() {
        let dir = deployment();
        let out = sv4d(&dir, &[&["resolve"][..], &OBSERVED[..]].concat()).unwrap();
        assert_eq!(out.trim(), dir.path().join("maps/observed.gri").display().to_string());

        let out = sv4d(&dir, &[&["resolve", "--metadata"][..], &OBSERVED[..]].concat()).unwrap();
        let json = out.split_once('\n').map(|(_, rest)| rest).unwrap();
        let rows: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0]["t1"], "2019-10-01");
        assert_eq!(rows[0]["attribute"], "max");
    }

    #[test]
    fn resolve_needs_every_field() {
        let dir = deployment();
        let err = sv4d(&dir, &["resolve", "--map-type", "observed"]).unwrap_err();
        assert!(err.to_string().contains("--attribute is required"), "{err}");
    }

    #[test]
    fn intervals_follow_interval_mode() {
        let dir = deployment();
        let out = sv4d(&dir, &["intervals", "--map-type", "observed"]).unwrap();
        let intervals: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(intervals["all"][0], "2020-10-01-2019-10-01");
    }

    #[test]
    fn well_layer_prints_named_layer() {
        let dir = deployment();
        let out = sv4d(
            &dir,
            &["well-layer", "--selection", "injection", "--interval", "2020-10-01-2019-10-01", "--label", "Injectors"],
        )
        .unwrap();
        let layer: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(layer["name"], "Injectors");
        assert_eq!(layer["data"][0]["tooltip"], "A-1: inj (gas 150 [MSm3] Start: 2019 Last: ---)");

        assert!(sv4d(&dir, &["well-layer", "--selection", "bogus"]).is_err());
    }

    #[test]
    fn polygons_lists_layers_and_rejects_unknown_zone() {
        let dir = deployment();
        let out = sv4d(&dir, &["polygons"]).unwrap();
        let layers: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(layers[0]["name"], "Initial OWC");

        let err = sv4d(&dir, &["polygons", "--zone", "draupne_fm_1"]).unwrap_err();
        assert!(err.to_string().contains("No polygon layer"), "{err}");
    }

    #[test]
    fn panel_fills_selection_from_defaults() {
        let dir = deployment();
        let out = sv4d(&dir, &["panel", "--panel", "0"]).unwrap();
        let panel: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(panel["heading"], "Observed map: max (draupne_fm_1)");
        assert_eq!(panel["layers"][0]["base_layer"], true);
        assert_eq!(
            panel["update_info"],
            "Well data update: -  Production data update: 2020-10-01"
        );
    }
}
