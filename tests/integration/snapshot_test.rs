use std::time::Duration;

use hwreport::commands::snapshot::collect;

use super::support::FakeSource;

#[test]
fn test_snapshot_serializes_all_sections() {
    let mut source = FakeSource::new(Duration::ZERO);
    let snapshot = collect(&mut source).unwrap();

    assert_eq!(snapshot.disks.len(), 2);
    assert!(snapshot.disks[0].usage.is_some());
    assert!(snapshot.disks[1].usage.is_none());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["system"]["node_name"], "testbox");
    assert_eq!(json["cpu_info"]["physical_cores"], 4);
    assert_eq!(json["disks"][0]["device"], "/dev/sda1");
    assert_eq!(json["network"][0]["name"], "eth0");
}

#[test]
fn test_snapshot_propagates_source_failure() {
    let mut source = FakeSource::new(Duration::ZERO);
    source.fail_identity = true;
    let err = collect(&mut source).unwrap_err();
    assert!(format!("{:#}", err).contains("identity unavailable"));
}
