use hwreport::ui::{bytes2human, center_title, format_bytes};

#[test]
fn test_format_bytes_units() {
    assert_eq!(format_bytes(0.0), "0.00B");
    assert_eq!(format_bytes(1253656.0), "1.20MB");
    assert_eq!(format_bytes(1253656678.0), "1.17GB");
    assert_eq!(format_bytes(1024.0_f64.powi(4) * 3.0), "3.00TB");
}

#[test]
fn test_bytes2human_network_counters() {
    assert_eq!(bytes2human(512), "512B");
    assert_eq!(bytes2human(10000), "9.8K");
    assert_eq!(bytes2human(100001221), "95.4M");
}

#[test]
fn test_section_titles_keep_width() {
    for (title, width) in [
        (" System Information ", 91),
        (" CPU Info ", 89),
        (" SWAP ", 87),
        (" Disk Information ", 92),
    ] {
        let line = center_title(title, width, '=');
        assert_eq!(line.chars().count(), width);
        assert!(line.contains(title));
        assert!(line.starts_with('=') && line.ends_with('='));
    }
}
