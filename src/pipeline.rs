//! End-to-end run: load inputs, resolve addresses, query the index,
//! write the result table.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::geocode::AddressResolver;
use crate::models::{AddressRecord, ResolvedLocation, ResultRow};
use crate::proximity::{load_protected_areas, ProximityIndex};

/// Counts reported after a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub addresses_total: usize,
    pub rows_written: usize,
    pub skipped: usize,
}

/// Load the address list from a JSON array of `{id, address}` objects.
///
/// Fatal if the file cannot be read or parsed.
pub fn load_addresses(path: &Path) -> Result<Vec<AddressRecord>> {
    info!("Loading addresses from {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read address list {}", path.display()))?;
    let addresses: Vec<AddressRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse address list {}", path.display()))?;

    info!("Loaded {} addresses", addresses.len());
    Ok(addresses)
}

/// Write result rows to CSV with the `id, latitude, longitude,
/// near_protected_area` header. A zero-row body is valid output.
pub fn write_results(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    // serialize only emits a header before the first record, so an all-skipped
    // run would otherwise produce a zero-byte file instead of a header-only table
    writer.write_record(["id", "latitude", "longitude", "near_protected_area"])?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Results saved to {}", path.display());
    Ok(())
}

/// Execute a full proximity run.
///
/// Dataset and address-list failures are fatal and abort before any output
/// is written. Per-address resolution failures are logged and skipped; the
/// run continues and the failed address is simply absent from the output.
/// Addresses are processed strictly in input order, one at a time, and rows
/// are written in that same order.
pub async fn run<R: AddressResolver>(config: &Config, resolver: &R) -> Result<RunSummary> {
    let areas = load_protected_areas(&config.areas_path)?;
    let index = ProximityIndex::build(areas);

    let addresses = load_addresses(&config.addresses_path)?;
    let total = addresses.len();

    info!("Converting addresses to coordinates...");
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let mut rows: Vec<ResultRow> = Vec::with_capacity(total);

    for record in &addresses {
        match resolver.resolve(&record.address).await {
            Ok(coordinate) => {
                let location = ResolvedLocation {
                    id: record.id,
                    coordinate,
                };
                let near = index.near(coordinate, config.radius_degrees);
                rows.push(ResultRow::new(&location, near));
            }
            Err(e) => {
                warn!(
                    "Skipping address '{}' (id {}): {}",
                    record.address, record.id, e
                );
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Proximity check completed.");

    write_results(&config.output_path, &rows)?;

    let summary = RunSummary {
        addresses_total: total,
        rows_written: rows.len(),
        skipped: total - rows.len(),
    };
    info!(
        "Run summary: {} addresses, {} rows written, {} skipped",
        summary.addresses_total, summary.rows_written, summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::ResolveError;
    use crate::models::Coordinate;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    /// Resolver backed by a fixed table; unknown addresses fail.
    struct FixedResolver {
        table: HashMap<String, Coordinate>,
    }

    impl FixedResolver {
        fn new(entries: &[(&str, f64, f64)]) -> Self {
            let table = entries
                .iter()
                .map(|&(addr, lat, lon)| (addr.to_string(), Coordinate::new(lat, lon).unwrap()))
                .collect();
            Self { table }
        }
    }

    impl AddressResolver for FixedResolver {
        async fn resolve(&self, address: &str) -> Result<Coordinate, ResolveError> {
            self.table
                .get(address)
                .copied()
                .ok_or_else(|| ResolveError::NoMatch {
                    status: "ZERO_RESULTS".to_string(),
                })
        }
    }

    const PARIS_AREA: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"SITENAME": "Champ de Mars"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.28, 48.85], [2.31, 48.85], [2.31, 48.87], [2.28, 48.87], [2.28, 48.85]]]
                }
            }
        ]
    }"#;

    const EMPTY_AREA: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
    }

    fn fixture(addresses_json: &str, areas_json: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let addresses_path = dir.path().join("addresses.json");
        let areas_path = dir.path().join("areas.geojson");
        let output_path = dir.path().join("results.csv");
        std::fs::File::create(&addresses_path)
            .unwrap()
            .write_all(addresses_json.as_bytes())
            .unwrap();
        std::fs::File::create(&areas_path)
            .unwrap()
            .write_all(areas_json.as_bytes())
            .unwrap();
        Fixture {
            _dir: dir,
            config: Config {
                addresses_path,
                areas_path,
                output_path,
                radius_degrees: crate::proximity::DEFAULT_BUFFER_DEGREES,
                api_key: "unused".to_string(),
            },
        }
    }

    fn read_output(path: &PathBuf) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_address_inside_protected_area() {
        let fx = fixture(
            r#"[{"id": 1, "address": "Eiffel Tower, Paris"}]"#,
            PARIS_AREA,
        );
        let resolver = FixedResolver::new(&[("Eiffel Tower, Paris", 48.8584, 2.2945)]);

        let summary = run(&fx.config, &resolver).await.unwrap();
        assert_eq!(summary.rows_written, 1);

        let lines = read_output(&fx.config.output_path);
        assert_eq!(lines[0], "id,latitude,longitude,near_protected_area");
        assert_eq!(lines[1], "1,48.8584,2.2945,true");
    }

    #[tokio::test]
    async fn test_empty_area_set_yields_false() {
        let fx = fixture(
            r#"[{"id": 1, "address": "Eiffel Tower, Paris"}]"#,
            EMPTY_AREA,
        );
        let resolver = FixedResolver::new(&[("Eiffel Tower, Paris", 48.8584, 2.2945)]);

        run(&fx.config, &resolver).await.unwrap();

        let lines = read_output(&fx.config.output_path);
        assert_eq!(lines[1], "1,48.8584,2.2945,false");
    }

    #[tokio::test]
    async fn test_failed_resolution_is_skipped() {
        let fx = fixture(
            r#"[
                {"id": 7, "address": "no such place"},
                {"id": 8, "address": "Eiffel Tower, Paris"}
            ]"#,
            PARIS_AREA,
        );
        let resolver = FixedResolver::new(&[("Eiffel Tower, Paris", 48.8584, 2.2945)]);

        let summary = run(&fx.config, &resolver).await.unwrap();
        assert_eq!(summary.addresses_total, 2);
        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.skipped, 1);

        let lines = read_output(&fx.config.output_path);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("8,"));
    }

    #[tokio::test]
    async fn test_output_preserves_input_order() {
        let fx = fixture(
            r#"[
                {"id": 3, "address": "c"},
                {"id": 1, "address": "a"},
                {"id": 2, "address": "b"}
            ]"#,
            EMPTY_AREA,
        );
        let resolver = FixedResolver::new(&[
            ("a", 10.0, 10.0),
            ("b", 20.0, 20.0),
            ("c", 30.0, 30.0),
        ]);

        run(&fx.config, &resolver).await.unwrap();

        let lines = read_output(&fx.config.output_path);
        let ids: Vec<&str> = lines[1..]
            .iter()
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_all_failures_still_writes_header_only_output() {
        let fx = fixture(r#"[{"id": 1, "address": "nowhere"}]"#, EMPTY_AREA);
        let resolver = FixedResolver::new(&[]);

        let summary = run(&fx.config, &resolver).await.unwrap();
        assert_eq!(summary.rows_written, 0);

        let lines = read_output(&fx.config.output_path);
        assert_eq!(lines, vec!["id,latitude,longitude,near_protected_area"]);
    }

    #[tokio::test]
    async fn test_missing_dataset_aborts_before_output() {
        let fx = fixture(r#"[{"id": 1, "address": "a"}]"#, EMPTY_AREA);
        let mut config = fx.config.clone();
        config.areas_path = PathBuf::from("/nonexistent/areas.geojson");
        let resolver = FixedResolver::new(&[("a", 10.0, 10.0)]);

        assert!(run(&config, &resolver).await.is_err());
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn test_malformed_address_list_is_fatal() {
        let fx = fixture(r#"{"not": "an array"}"#, EMPTY_AREA);
        let resolver = FixedResolver::new(&[]);

        let err = run(&fx.config, &resolver).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse address list"));
        assert!(!fx.config.output_path.exists());
    }
}
