use std::io::Write;

use chrono::NaiveDateTime;
use spacefs::Entry;
use spacefs_api::fs::FileStatus;

#[derive(Debug)]
pub struct SizeType {
    pub value: u64,
    pub unit: &'static str,
}

pub const KIBI: u64 = 1024;
pub const MEBI: u64 = KIBI * 1024;
pub const GIBI: u64 = MEBI * 1024;
pub const TEBI: u64 = GIBI * 1024;
pub const PEBI: u64 = TEBI * 1024;
pub const EXBI: u64 = PEBI * 1024;

pub const BASE_2_SIZE: [SizeType; 6] = [
    SizeType { value: EXBI, unit: "EiB" },
    SizeType { value: PEBI, unit: "PiB" },
    SizeType { value: TEBI, unit: "TiB" },
    SizeType { value: GIBI, unit: "GiB" },
    SizeType { value: MEBI, unit: "MiB" },
    SizeType { value: KIBI, unit: "KiB" },
];

/// formats a byte count with the largest binary unit that keeps the value
/// at or above one, e.g. `1.5 KiB`
pub fn bytes_to_unit(size: u64) -> String {
    for base in BASE_2_SIZE {
        if size >= base.value {
            let whole = size / base.value;
            let tenths = (size % base.value) * 10 / base.value;

            return if tenths == 0 {
                format!("{whole} {}", base.unit)
            } else {
                format!("{whole}.{tenths} {}", base.unit)
            };
        }
    }

    format!("{size} B")
}

pub fn datetime_to_string(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

fn status_str(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Approved => "",
        FileStatus::Pending => "pending",
        FileStatus::Rejected => "rejected",
    }
}

const HEADERS: [&str; 5] = ["type", "name", "size", "updated", "id"];

/// writes the entries of a listing as an aligned table, one row per entry
/// prefixed with its index
pub fn write_listing<O>(output: &mut O, entries: &[Entry]) -> std::io::Result<()>
where
    O: Write
{
    let rows: Vec<[String; 5]> = entries.iter()
        .map(|entry| {
            let kind = if entry.is_folder { "dir" } else { "file" };
            let size = if entry.is_folder {
                String::new()
            } else {
                bytes_to_unit(entry.size)
            };
            let updated = entry.updated_at.as_ref()
                .or(entry.created_at.as_ref())
                .map(datetime_to_string)
                .unwrap_or_default();
            let status = status_str(entry.status);
            let name = if status.is_empty() {
                entry.display_name().to_owned()
            } else {
                format!("{} ({status})", entry.display_name())
            };

            [kind.to_owned(), name, size, updated, entry.id.clone()]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());

    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let index_width = rows.len().to_string().len();
    let empty = "";

    write!(output, "{empty:index_width$}")?;

    for (header, width) in HEADERS.iter().zip(widths) {
        write!(output, " | {header:<width$}")?;
    }

    writeln!(output)?;

    for (index, row) in rows.iter().enumerate() {
        write!(output, "{:>index_width$}", index + 1)?;

        for (col, (value, width)) in row.iter().zip(widths).enumerate() {
            // sizes line up on the right
            if col == 2 {
                write!(output, " | {value:>width$}")?;
            } else {
                write!(output, " | {value:<width$}")?;
            }
        }

        writeln!(output)?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn binary_units() {
        assert_eq!(bytes_to_unit(0), "0 B");
        assert_eq!(bytes_to_unit(1023), "1023 B");
        assert_eq!(bytes_to_unit(1024), "1 KiB");
        assert_eq!(bytes_to_unit(1536), "1.5 KiB");
        assert_eq!(bytes_to_unit(5 * MEBI), "5 MiB");
        assert_eq!(bytes_to_unit(GIBI + GIBI / 4), "1.2 GiB");
    }
}
