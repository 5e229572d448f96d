//! waymark CLI - run the edge classification analysis over a tiled region.
//!
//! Usage:
//!   waymark analyse --graphs <dir> --tiles <geojson> \
//!       --public <csv> --row <csv> --out <dir>
//!   waymark export --out <dir> --layer <P|B|R|PB|BR> [--geojson <file>]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use waymark_core::export::graph_to_geojson_string;
use waymark_core::loading::{JsonGraphSource, read_point_csv, read_tile_polygons};
use waymark_core::model::Category;
use waymark_core::store::{ArtifactKey, ArtifactStore, JsonArtifactStore, Layer};
use waymark_core::{AnalysisConfig, analyse_batch};

#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Classify path-network edges from GPS track datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tile-by-tile analysis and merge the results
    Analyse {
        /// Directory containing per-tile graph files
        #[arg(long)]
        graphs: PathBuf,

        /// Filename prefix of the per-tile graph files ({prefix}_{tile}.json)
        #[arg(long, default_value = "graph")]
        graph_prefix: String,

        /// GeoJSON FeatureCollection of tile polygons
        #[arg(long)]
        tiles: PathBuf,

        /// CSV of public activity points (latitude, longitude, trackid)
        #[arg(long)]
        public: PathBuf,

        /// CSV of right-of-way survey points (latitude, longitude, trackid)
        #[arg(long)]
        row: PathBuf,

        /// Output directory for graph artifacts
        #[arg(long)]
        out: PathBuf,

        /// Filename prefix of the output artifacts
        #[arg(long, default_value = "waymark")]
        out_prefix: String,

        /// Recompute everything even if merged artifacts already exist
        #[arg(long)]
        force: bool,

        /// Snap distance in metres beyond which a matched point is discarded
        #[arg(long)]
        match_dist: Option<f64>,

        /// Minimum connected-component length in metres kept by denoising
        #[arg(long)]
        min_subgraph_length: Option<f64>,
    },

    /// Export a merged artifact layer as GeoJSON
    Export {
        /// Directory holding the analysis artifacts
        #[arg(long)]
        out: PathBuf,

        /// Filename prefix of the artifacts
        #[arg(long, default_value = "waymark")]
        out_prefix: String,

        /// Layer code: P, B, R, PB or BR
        #[arg(long)]
        layer: String,

        /// Output file (stdout when omitted)
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Analyse {
            graphs,
            graph_prefix,
            tiles,
            public,
            row,
            out,
            out_prefix,
            force,
            match_dist,
            min_subgraph_length,
        } => run_analyse(
            &graphs,
            graph_prefix,
            &tiles,
            &public,
            &row,
            &out,
            out_prefix,
            force,
            match_dist,
            min_subgraph_length,
        ),
        Commands::Export {
            out,
            out_prefix,
            layer,
            geojson,
        } => run_export(&out, out_prefix, &layer, geojson.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyse(
    graphs: &PathBuf,
    graph_prefix: String,
    tiles: &PathBuf,
    public: &PathBuf,
    row: &PathBuf,
    out: &PathBuf,
    out_prefix: String,
    force: bool,
    match_dist: Option<f64>,
    min_subgraph_length: Option<f64>,
) -> waymark_core::Result<ExitCode> {
    let store = JsonArtifactStore::new(out, out_prefix);
    if !force && store.analysis_complete() {
        info!("merged artifacts already present, nothing to do (use --force to recompute)");
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = AnalysisConfig::default();
    if let Some(d) = match_dist {
        config.edge_match_dist = d;
    }
    if let Some(l) = min_subgraph_length {
        config.min_subgraph_length = l;
    }

    let tile_polygons = read_tile_polygons(tiles)?;
    info!("{} tiles", tile_polygons.len());
    let public_points = read_point_csv(public)?;
    let row_points = read_point_csv(row)?;

    let source = JsonGraphSource::new(graphs, graph_prefix);
    let summary = analyse_batch(
        &source,
        &store,
        &tile_polygons,
        &public_points,
        &row_points,
        &config,
    )?;

    if summary.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        for (tile, reason) in &summary.failures {
            error!("tile {tile}: {reason}");
        }
        Ok(ExitCode::FAILURE)
    }
}

fn run_export(
    out: &PathBuf,
    out_prefix: String,
    layer: &str,
    geojson: Option<&std::path::Path>,
) -> waymark_core::Result<ExitCode> {
    let layer = parse_layer(layer)?;
    let store = JsonArtifactStore::new(out, out_prefix);
    let graph = store.read(&ArtifactKey::merged(layer))?;
    let text = graph_to_geojson_string(&graph)?;

    match geojson {
        Some(path) => {
            std::fs::write(path, text)?;
            info!("wrote {} ({} edges)", path.display(), graph.edge_count());
        }
        None => println!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_layer(code: &str) -> waymark_core::Result<Layer> {
    match code {
        "P" => Ok(Layer::Category(Category::PublicOnly)),
        "B" => Ok(Layer::Category(Category::Both)),
        "R" => Ok(Layer::Category(Category::RowOnly)),
        "PB" => Ok(Layer::AllPublic),
        "BR" => Ok(Layer::AllRow),
        other => Err(waymark_core::Error::InvalidData(format!(
            "unknown layer code {other:?}, expected P, B, R, PB or BR"
        ))),
    }
}
