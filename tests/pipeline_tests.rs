#[cfg(test)]
mod pipeline_tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use approx::assert_relative_eq;
    use tempfile::TempDir;

    use tsn_report::analysis::{self, report};
    use tsn_report::config::{ClassMap, UnmatchedPolicy, UNKNOWN_CLASS};
    use tsn_report::config_loader;
    use tsn_report::error::ReportError;
    use tsn_report::orchestrator::{self, ReportPaths};

    const HEADER: &str = "run,type,module,name,attrname,attrvalue,value,vectime,vecvalue\n";

    const CONTROL_MODULE: &str = "HumanoidTsn.zone[0].app[0]";
    const SENSOR_MODULE: &str = "HumanoidTsn.zone[1].app[1]";

    fn vector_row(module: &str, name: &str, times: &str, values: &str) -> String {
        format!(
            "General-0,vector,{},{},,,,\"{}\",\"{}\"\n",
            module, name, times, values
        )
    }

    fn write_csv(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("results.csv");
        fs::write(&path, format!("{}{}", HEADER, body)).unwrap();
        path
    }

    fn control_scenario(dir: &TempDir) -> PathBuf {
        write_csv(
            dir,
            &[
                "General-0,scalar,HumanoidTsn.zone[0].app[0],rcvdPk:count,,,3,,\n".to_string(),
                vector_row(
                    CONTROL_MODULE,
                    "endToEndDelay:vector",
                    "0.1 0.2 0.3",
                    "0.001 0.002 0.003",
                ),
            ]
            .concat(),
        )
    }

    fn existing_files(dir: &Path) -> Vec<PathBuf> {
        if !dir.exists() {
            return Vec::new();
        }
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// The bundled class map describes the same network as the built-in one
    #[test]
    fn test_bundled_class_map_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/humanoid_tsn.yaml");
        let map = config_loader::load_class_map(&path).unwrap();
        assert_eq!(map, ClassMap::default());
    }

    #[test]
    fn test_control_scenario_end_to_end() {
        let dir = TempDir::new().unwrap();
        let csv = control_scenario(&dir);
        let out_dir = dir.path().join("out");

        let (paths, rows) =
            orchestrator::run_report(&csv, &out_dir, "cfg", 0.5, &ClassMap::default()).unwrap();
        assert_eq!(paths, ReportPaths::in_dir(&out_dir));

        let latency = report::load_summary_json(&paths.summary_json).unwrap();
        let control = latency.get("CONTROL").unwrap();
        assert_eq!(control.sample_count, 3);
        assert_relative_eq!(control.min_delay_seconds.unwrap(), 0.001);
        assert_relative_eq!(control.mean_delay_seconds.unwrap(), 0.002, epsilon = 1e-15);
        assert_relative_eq!(control.max_delay_seconds.unwrap(), 0.003);
        assert_relative_eq!(control.jitter_seconds.unwrap(), 0.001, epsilon = 1e-15);

        // Configured classes without samples are reported as nulls
        let sensor = latency.get("SENSOR").unwrap();
        assert_eq!(sensor.sample_count, 0);
        assert_eq!(sensor.mean_delay_seconds, None);
        assert!(latency.get(UNKNOWN_CLASS).is_none());

        let classes = fs::read_to_string(&paths.latency_classes_csv).unwrap();
        let lines: Vec<&str> = classes.lines().collect();
        assert_eq!(lines[1], "cfg,CONTROL,3,1.0000,2.0000,3.0000");
        assert_eq!(lines[2], "cfg,SENSOR,0,,,");
        assert_eq!(lines[3], "cfg,TELEMETRY,0,,,");

        assert_eq!(rows.len(), 3);
        assert_relative_eq!(rows[0].jitter_ms.unwrap(), 1.0, epsilon = 1e-9);
        assert!(fs::read_to_string(&paths.unified_csv)
            .unwrap()
            .contains("cfg,CONTROL,3,1.0000,2.0000,3.0000,1.0000,"));
        assert!(fs::read_to_string(&paths.text_report)
            .unwrap()
            .contains("CONTROL (control, PCP 7)"));
    }

    #[test]
    fn test_repeated_extraction_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            &[
                vector_row(CONTROL_MODULE, "endToEndDelay:vector", "0.1 0.3", "0.0000251 0.0000199"),
                vector_row(SENSOR_MODULE, "endToEndDelay:vector", "0.2", "0.000113"),
            ]
            .concat(),
        );
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");

        orchestrator::run_extract(&csv, &first, &ClassMap::default()).unwrap();
        orchestrator::run_extract(&csv, &second, &ClassMap::default()).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    /// Values in the latency CSV are the JSON values in milliseconds
    #[test]
    fn test_formatter_round_trips_extracted_values() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            &vector_row(
                SENSOR_MODULE,
                "endToEndDelay:vector",
                "0.01 0.02 0.03 0.04",
                "0.0001234 0.0002345 0.0001111 0.0003",
            ),
        );
        let json = dir.path().join("summary.json");
        let out = dir.path().join("classes.csv");

        let latency = orchestrator::run_extract(&csv, &json, &ClassMap::default()).unwrap();
        orchestrator::run_latency_classes(&json, &out, "cfg").unwrap();

        let sensor = latency.get("SENSOR").unwrap();
        let content = fs::read_to_string(&out).unwrap();
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let row = reader
            .records()
            .map(|r| r.unwrap())
            .find(|r| &r[1] == "SENSOR")
            .unwrap();

        let parsed = |i: usize| row[i].parse::<f64>().unwrap();
        assert_eq!(&row[2], "4");
        assert_relative_eq!(parsed(3), sensor.min_delay_seconds.unwrap() * 1e3, epsilon = 5e-5);
        assert_relative_eq!(parsed(4), sensor.mean_delay_seconds.unwrap() * 1e3, epsilon = 5e-5);
        assert_relative_eq!(parsed(5), sensor.max_delay_seconds.unwrap() * 1e3, epsilon = 5e-5);
    }

    #[test]
    fn test_sample_count_and_ordering_hold_per_class() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            &[
                vector_row(CONTROL_MODULE, "endToEndDelay:vector", "0.1 0.2", "0.00003 0.00001"),
                vector_row(SENSOR_MODULE, "endToEndDelay:vector", "0.15 0.25 0.35", "0.0002 0.0001 0.0004"),
                vector_row(CONTROL_MODULE, "endToEndDelay:vector", "0.15", "0.00002"),
                vector_row(CONTROL_MODULE, "throughput:vector", "0.1", "900"),
            ]
            .concat(),
        );

        let latency = analysis::extract_from_csv(&csv, &ClassMap::default()).unwrap();
        assert_eq!(latency.get("CONTROL").unwrap().sample_count, 3);
        assert_eq!(latency.get("SENSOR").unwrap().sample_count, 3);
        assert_eq!(latency.total_samples(), 6);

        for class in latency.iter().filter(|c| c.summary.sample_count > 0) {
            let s = &class.summary;
            let (min, mean, max) = (
                s.min_delay_seconds.unwrap(),
                s.mean_delay_seconds.unwrap(),
                s.max_delay_seconds.unwrap(),
            );
            assert!(min <= mean && mean <= max, "{}: {} {} {}", class.class_name, min, mean, max);
        }

        // Arrival order across both control rows: 0.03, 0.02, 0.01 ms
        assert_relative_eq!(
            latency.get("CONTROL").unwrap().jitter_seconds.unwrap(),
            0.00001,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_zero_sim_time_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let csv = control_scenario(&dir);
        let json = dir.path().join("summary.json");
        orchestrator::run_extract(&csv, &json, &ClassMap::default()).unwrap();

        let out_csv = dir.path().join("unified.csv");
        let result = orchestrator::run_unified(&json, &out_csv, "cfg", 0.0, &ClassMap::default());
        assert!(matches!(result, Err(ReportError::InvalidDuration(_))));
        assert!(!out_csv.exists());

        let out_dir = dir.path().join("report");
        let result = orchestrator::run_report(&csv, &out_dir, "cfg", 0.0, &ClassMap::default());
        assert!(matches!(result, Err(ReportError::InvalidDuration(_))));
        assert!(existing_files(&out_dir).is_empty());
    }

    #[test]
    fn test_header_only_csv_is_empty_input() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(&dir, "");
        let json = dir.path().join("summary.json");

        let result = orchestrator::run_extract(&csv, &json, &ClassMap::default());
        assert!(matches!(result, Err(ReportError::EmptyInput(_))));
        assert!(!json.exists());
    }

    #[test]
    fn test_malformed_series_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            &vector_row(CONTROL_MODULE, "endToEndDelay:vector", "0.1 0.2", "0.001 abc"),
        );
        let out_dir = dir.path().join("out");

        let result = orchestrator::run_report(&csv, &out_dir, "cfg", 0.5, &ClassMap::default());
        assert!(matches!(result, Err(ReportError::MalformedInput { line: 2, .. })));
        assert!(existing_files(&out_dir).is_empty());
    }

    #[test]
    fn test_unknown_policy_adds_unknown_class() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            &[
                vector_row(CONTROL_MODULE, "endToEndDelay:vector", "0.1", "0.00002"),
                vector_row("HumanoidTsn.thor.app[3]", "endToEndDelay:vector", "0.1 0.2", "0.0005 0.0007"),
            ]
            .concat(),
        );
        let json = dir.path().join("summary.json");
        let out_csv = dir.path().join("unified.csv");

        let map = ClassMap {
            unmatched: UnmatchedPolicy::Unknown,
            ..ClassMap::default()
        };
        orchestrator::run_extract(&csv, &json, &map).unwrap();
        let rows = orchestrator::run_unified(&json, &out_csv, "cfg", 0.5, &map).unwrap();

        let unknown = rows.last().unwrap();
        assert_eq!(unknown.class_name, UNKNOWN_CLASS);
        assert_eq!(unknown.sample_count, 2);
        // No class definition: whole simulation, default packet size
        assert_relative_eq!(unknown.active_duration_s, 0.5);
        assert_eq!(unknown.packet_bytes, 1024);
        assert_eq!(unknown.stream, None);
    }

    #[test]
    fn test_native_run_summary() {
        let dir = TempDir::new().unwrap();
        let vec = dir.path().join("General-#0.vec");
        let sca = dir.path().join("General-#0.sca");
        fs::write(
            &vec,
            "version 3\n\
             vector 4 HumanoidTsn.zone[0].app[0] endToEndDelay:vector ETV\n\
             4\t1\t0.1\t0.00002\n\
             4\t2\t0.2\t0.00004\n",
        )
        .unwrap();
        fs::write(
            &sca,
            "version 3\nscalar HumanoidTsn.zone[0].app[0] rcvdPk:count 2\n",
        )
        .unwrap();

        let out_dir = dir.path().join("summary");
        let out_csv = orchestrator::run_module_summary(&vec, &sca, &out_dir).unwrap();
        assert_eq!(out_csv, out_dir.join("tsn_summary.csv"));

        let content = fs::read_to_string(&out_csv).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("HumanoidTsn.zone[0].app[0],latency,2,"));
        assert!(lines[1].ends_with(",2,"));

        let scalars_csv = dir.path().join("scalars.csv");
        assert_eq!(orchestrator::run_scalar_export(&sca, &scalars_csv).unwrap(), 1);
    }
}
