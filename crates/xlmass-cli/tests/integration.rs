use xlmass_cli::input::Input;
use xlmass_cli::runner::{Runner, Summary};

const CANDIDATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/candidates.txt");
const SCANS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/scans.mgf");

#[test]
fn integration() -> anyhow::Result<()> {
    let output = std::env::temp_dir().join(format!("xlmass-integration-{}.csv", std::process::id()));

    let input: Input = serde_json::from_value(serde_json::json!({
        "candidates": CANDIDATES,
        "scans": SCANS,
        "ppm": 10.0,
        "top": 2,
        "workers": 2,
        "separator": ",",
        "output": output.to_string_lossy(),
    }))?;

    let runner = Runner::new(input.build()?)?;
    assert_eq!(runner.index.len(), 7);

    let summary = runner.run()?;
    assert_eq!(
        summary,
        Summary {
            candidates: 7,
            scans: 3,
            failed_scans: 0,
            matches: 4,
            runtime_secs: summary.runtime_secs,
        }
    );

    let contents = std::fs::read_to_string(&output)?;
    std::fs::remove_file(&output)?;
    let lines = contents.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "scan_id,scan_mass,xlink_id,xlink_mass,error",
            "scan_1,1500.00000000,xl_a,1500.00000000,0.00000000",
            "scan_1,1500.00000000,xl_a2,1500.00000000,0.00000000",
            "scan_2,2000.00000000,xl_e,2000.00000000,0.00000000",
            "scan_2,2000.00000000,xl_f,1999.99000000,0.01000000",
        ]
    );
    Ok(())
}

#[test]
fn missing_candidates_file() -> anyhow::Result<()> {
    let input: Input = serde_json::from_value(serde_json::json!({
        "candidates": "/nonexistent/candidates.txt",
        "scans": SCANS,
    }))?;
    assert!(Runner::new(input.build()?).is_err());
    Ok(())
}

#[test]
fn quoted_title_written_verbatim() -> anyhow::Result<()> {
    let dir = std::env::temp_dir();
    let scans = dir.join(format!("xlmass-quoted-{}.mgf", std::process::id()));
    let output = dir.join(format!("xlmass-quoted-{}.tsv", std::process::id()));
    std::fs::write(
        &scans,
        "BEGIN IONS\n\
         TITLE=run.2.2.2 File:\"run.raw\", NativeID:\"scan=2\"\n\
         PEPMASS=751.007276466812\n\
         CHARGE=2+\n\
         END IONS\n",
    )?;

    let input: Input = serde_json::from_value(serde_json::json!({
        "candidates": CANDIDATES,
        "scans": scans.to_string_lossy(),
        "top": 1,
        "output": output.to_string_lossy(),
    }))?;
    let summary = Runner::new(input.build()?)?.run()?;
    assert_eq!(summary.matches, 1);

    let contents = std::fs::read_to_string(&output)?;
    std::fs::remove_file(&scans)?;
    std::fs::remove_file(&output)?;
    let lines = contents.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "scan_id\tscan_mass\txlink_id\txlink_mass\terror",
            "run.2.2.2 File:\"run.raw\", NativeID:\"scan=2\"\t1500.00000000\txl_a\t1500.00000000\t0.00000000",
        ]
    );
    Ok(())
}
