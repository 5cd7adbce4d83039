//! Command line entry point: rank the visualizations for a query state

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::csv::reader::Format;
use qv_core::{DataCube, QueryState, QueryStateConfig};
use qv_manifests::{catalog, RankedVerdict, Resolve, Visualization};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: queryview <cube.json|data.csv> [state.json] [current-visualization]";

/// Rows read when inferring a CSV schema
const SCHEMA_SAMPLE_ROWS: usize = 100;

fn load_cube(path: &Path) -> Result<DataCube> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let (schema, records) = Format::default()
            .with_header(true)
            .infer_schema(file, Some(SCHEMA_SAMPLE_ROWS))
            .with_context(|| format!("Failed to infer schema of {}", path.display()))?;
        debug!("Inferred {} fields from {} records", schema.fields().len(), records);

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("data");
        return Ok(DataCube::from_schema(name, &schema)?);
    }

    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    DataCube::from_json(&json).with_context(|| format!("Invalid data cube in {}", path.display()))
}

fn load_state(cube: Arc<DataCube>, path: Option<&Path>) -> Result<QueryState> {
    let Some(path) = path else {
        return Ok(QueryState::from_cube(cube));
    };
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: QueryStateConfig =
        serde_json::from_str(&json).with_context(|| format!("Invalid query state in {}", path.display()))?;
    Ok(QueryState::from_config(cube, config)?)
}

fn print_verdict(verdict: &RankedVerdict) -> Result<()> {
    let resolve = &verdict.resolve;
    println!(
        "{:<12} {:<10} {:>3}  {}",
        verdict.visualization.id(),
        resolve.kind_name(),
        resolve.score(),
        resolve.description().unwrap_or("")
    );

    match resolve {
        Resolve::Automatic { resolution, .. } => {
            if let Some(splits) = &resolution.adjustment.splits {
                println!("{:>28}{}", "", serde_json::to_string(splits)?);
            }
        }
        Resolve::Manual { resolutions, .. } => {
            for resolution in resolutions {
                println!("{:>28}- {}", "", resolution.description);
            }
        }
        Resolve::Ready { .. } => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(cube_path) = args.first() else {
        bail!(USAGE);
    };

    let cube = Arc::new(load_cube(Path::new(cube_path))?);
    let state = load_state(cube.clone(), args.get(1).map(Path::new))?;
    let current = match args.get(2) {
        Some(id) => id.parse::<Visualization>()?,
        None => Visualization::Totals,
    };

    info!(
        "Ranking visualizations for '{}' ({} splits, {} series)",
        cube.name(),
        state.splits().len(),
        state.series().len()
    );

    for verdict in catalog().evaluate_all(&state, current) {
        print_verdict(&verdict)?;
    }

    Ok(())
}
