use chrono::{DateTime, Local};

const BYTE_UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];
const HUMAN_SYMBOLS: [char; 8] = ['K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Scale a byte count to its proper unit (B, KB, MB, GB, TB, PB)
///
/// e.g. `1253656` => `"1.20MB"`, `1253656678` => `"1.17GB"`
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    let last = BYTE_UNITS.len() - 1;
    for unit in &BYTE_UNITS[..last] {
        // Check the printed digits, so 1023.999 moves up to 1.00K
        let printed = format!("{:.2}", value);
        if value < 1024.0 && printed != "1024.00" {
            return format!("{}{}B", printed, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2}{}B", value, BYTE_UNITS[last])
}

/// Compact byte count used in interface listings, e.g. `1.95M`
pub fn bytes2human(bytes: u64) -> String {
    for (i, symbol) in HUMAN_SYMBOLS.iter().enumerate().rev() {
        let prefix = 1u128 << ((i + 1) * 10);
        if bytes as u128 >= prefix {
            return format!("{:.1}{}", bytes as f64 / prefix as f64, symbol);
        }
    }
    format!("{}B", bytes)
}

/// Center a title inside a run of fill characters
///
/// Placement matches Python's `str.center`: when the margin is odd the extra
/// character goes left only if `width` is odd too.
pub fn center_title(title: &str, width: usize, fill: char) -> String {
    let len = title.chars().count();
    if len >= width {
        return title.to_string();
    }
    let margin = width - len;
    let left = margin / 2 + (margin & width & 1);
    let right = margin - left;

    let fill = fill.to_string();
    format!("{}{}{}", fill.repeat(left), title, fill.repeat(right))
}

/// Format timestamp as `YYYY/M/D H:M:S` without zero padding
pub fn format_boot_time(time: &DateTime<Local>) -> String {
    time.format("%Y/%-m/%-d %-H:%-M:%-S").to_string()
}
