use approx::assert_relative_eq;
use chrono::{Datelike, NaiveDate};
use sst_pipeline::analyzer::{Analyzer, MAP_FILE, SERIES_FILE};
use sst_pipeline::cf_time::TimeUnitsError;
use sst_pipeline::chunks::{Block, ChunkSpec};
use sst_pipeline::config::{AnalyzerConfig, GeneratorConfig};
use sst_pipeline::generator::SstGenerator;
use sst_pipeline::grid::linspace;
use sst_pipeline::readers::{DataReader, NcReader, ReadError};
use std::path::Path;
use tempfile::tempdir;

// Ten degree grid over the first quarter of 2000, small enough to run quickly.
fn small_generator(seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2000, 3, 31).unwrap(),
        n_lat: 19,
        n_lon: 37,
        seed: Some(seed),
        ..GeneratorConfig::default()
    }
}

fn generate(config: GeneratorConfig, path: &Path) {
    SstGenerator::new(config).unwrap().generate(path).unwrap();
}

#[test]
fn test_round_trip_keeps_coordinates_and_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst_data.nc");
    generate(small_generator(7), &path);

    let reader = NcReader::open(&path, "sst").unwrap();
    let grid = reader.grid();

    assert_eq!(grid.shape(), (91, 19, 37));
    assert_eq!(grid.lat(), linspace(-90.0, 90.0, 19).as_slice());
    assert_eq!(grid.lon(), linspace(0.0, 360.0, 37).as_slice());
    assert_eq!(
        grid.time()[0].date(),
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
    );
    assert_eq!(
        grid.time()[90].date(),
        NaiveDate::from_ymd_opt(2000, 3, 31).unwrap()
    );

    let info = reader.info();
    assert_eq!(
        info.attribute("description"),
        Some("Synthetic Sea Surface Temperature data")
    );
    let sst = info.variable("sst").unwrap();
    let dims: Vec<&str> = sst.dimensions.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(dims, vec!["time", "lat", "lon"]);
    assert!(info.to_string().contains("description:  Synthetic Sea Surface Temperature data"));
}

#[test]
fn test_full_year_grid_is_leap_year() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("year.nc");
    let config = GeneratorConfig {
        end_date: NaiveDate::from_ymd_opt(2000, 12, 31).unwrap(),
        n_lat: 2,
        n_lon: 3,
        ..small_generator(1)
    };
    generate(config, &path);

    let reader = NcReader::open(&path, "sst").unwrap();
    let time = reader.grid().time();
    assert_eq!(time.len(), 366);
    assert!(time.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
}

#[test]
fn test_seeded_generation_is_reproducible() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.nc");
    let b = dir.path().join("b.nc");
    let c = dir.path().join("c.nc");
    generate(small_generator(42), &a);
    generate(small_generator(42), &b);
    generate(small_generator(43), &c);

    let block = Block::full((91, 19, 37));
    let read = |p: &Path| NcReader::open(p, "sst").unwrap().read_block(&block).unwrap();

    assert_eq!(read(&a), read(&b));
    assert_ne!(read(&a), read(&c));

    // Normal(15, 10) over ~64k samples
    let values = read(&a);
    let mean = values.mean().unwrap();
    let std = values.std(0.0);
    assert!((mean - 15.0).abs() < 0.5, "mean = {}", mean);
    assert!((std - 10.0).abs() < 0.5, "std = {}", std);
}

#[test]
fn test_regenerating_overwrites_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst_data.nc");
    generate(small_generator(1), &path);

    let smaller = GeneratorConfig {
        n_lat: 5,
        n_lon: 5,
        ..small_generator(2)
    };
    generate(smaller, &path);

    let reader = NcReader::open(&path, "sst").unwrap();
    assert_eq!(reader.grid().shape(), (91, 5, 5));
}

#[test]
fn test_open_rejects_missing_variable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst_data.nc");
    generate(small_generator(1), &path);

    assert!(matches!(
        NcReader::open(&path, "chlor_a"),
        Err(ReadError::MissingVariable(name)) if name == "chlor_a"
    ));
}

#[test]
fn test_january_mean_matches_daily_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst_data.nc");
    generate(small_generator(2024), &path);

    let analyzer = Analyzer::new(AnalyzerConfig {
        input: path.clone(),
        chunks: ChunkSpec {
            time: 12,
            lat: 19,
            lon: 37,
        },
        output_dir: dir.path().to_path_buf(),
        ..AnalyzerConfig::default()
    })
    .unwrap();

    let reader = NcReader::open(&path, "sst").unwrap();
    let products = analyzer.compute(&reader).unwrap();

    // Every coordinate of the region lies inside the box
    assert!(products.month_map.lat.iter().all(|l| (10.0..=50.0).contains(l)));
    assert!(products.month_map.lon.iter().all(|l| (120.0..=250.0).contains(l)));
    assert_eq!(products.monthly.labels, vec![1, 2, 3]);

    // Cell nearest (30, 160): lat index 12, lon index 16
    let grid = reader.grid();
    let january: Vec<usize> = (0..grid.time().len())
        .filter(|&t| grid.time()[t].month() == 1)
        .collect();
    let cell = reader
        .read_block(&Block {
            time: 0..grid.time().len(),
            lat: 12..13,
            lon: 16..17,
        })
        .unwrap();
    let expected = january.iter().map(|&t| cell[[t, 0, 0]]).sum::<f64>() / january.len() as f64;

    assert_relative_eq!(
        products.month_map.value_at_nearest(30.0, 160.0).unwrap(),
        expected,
        epsilon = 1e-9
    );

    // One year in the data, so the yearly mean is the mean over all days
    let all_days = cell.iter().sum::<f64>() / cell.len() as f64;
    assert_eq!(products.point_series.labels, vec![2000]);
    assert_relative_eq!(products.point_series.values[0], all_days, epsilon = 1e-9);
}

#[test]
fn test_analyzer_run_writes_plots() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst_data.nc");
    generate(small_generator(3), &path);

    let out = dir.path().join("plots");
    let analyzer = Analyzer::new(AnalyzerConfig {
        input: path,
        output_dir: out.clone(),
        ..AnalyzerConfig::default()
    })
    .unwrap();

    let report = analyzer.run().unwrap();

    assert_eq!(report.region_shape, (91, 5, 14));
    assert_eq!(report.point, (30.0, 160.0));
    assert!(report.point_in_region);
    assert_eq!(report.yearly.len(), 1);
    assert_eq!(report.yearly[0].0, NaiveDate::from_ymd_opt(2000, 12, 31).unwrap());
    assert!(report.to_string().contains("2000-12-31: "));
    assert_eq!(report.map_path, out.join(MAP_FILE));
    assert!(report.map_path.exists());
    assert!(out.join(SERIES_FILE).exists());
}

#[test]
fn test_open_rejects_fill_value_in_time_axis() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.nc");

    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("time", 2).unwrap();
        file.add_dimension("lat", 1).unwrap();
        file.add_dimension("lon", 1).unwrap();

        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put_attribute("units", "days since 2000-01-01 00:00:00").unwrap();
        time.put_values(&[0.0, 9.969209968386869e36], ..).unwrap();

        let mut lat = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        lat.put_values(&[30.0], ..).unwrap();
        let mut lon = file.add_variable::<f64>("lon", &["lon"]).unwrap();
        lon.put_values(&[160.0], ..).unwrap();

        let mut sst = file.add_variable::<f64>("sst", &["time", "lat", "lon"]).unwrap();
        sst.put_values(&[15.0, 16.0], ..).unwrap();
    }

    assert!(matches!(
        NcReader::open(&path, "sst"),
        Err(ReadError::TimeUnits(TimeUnitsError::Overflow(_)))
    ));
}
