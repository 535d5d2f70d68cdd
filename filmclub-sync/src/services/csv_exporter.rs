//! Catalog → CSV export in the sheet's own column layout
//!
//! Header: `imdb_id, name, watch_date, selected_by`, then a
//! `{member}_rating, {member}_blurb` pair per roster member, then
//! `trophy_notes`. Every field is quoted so blurbs with line breaks survive.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use filmclub_common::CatalogRecord;

/// Header row for `roster`
pub fn export_header(roster: &[String]) -> Vec<String> {
    let mut header = vec![
        "imdb_id".to_string(),
        "name".to_string(),
        "watch_date".to_string(),
        "selected_by".to_string(),
    ];
    for member in roster {
        header.push(format!("{}_rating", member));
        header.push(format!("{}_blurb", member));
    }
    header.push("trophy_notes".to_string());
    header
}

fn export_row(record: &CatalogRecord, roster: &[String]) -> Vec<String> {
    let club = record.club_info.as_ref();
    let text = |value: Option<&String>| value.cloned().unwrap_or_default();

    let mut row = vec![
        record.imdb_id.clone(),
        text(record.title.as_ref()),
        text(club.and_then(|c| c.watch_date.as_ref())),
        text(club.and_then(|c| c.selector.as_ref())),
    ];

    for member in roster {
        let entry = club.and_then(|c| c.rating_for(member));
        row.push(
            entry
                .and_then(|e| e.score.as_ref())
                .map(ToString::to_string)
                .unwrap_or_default(),
        );
        row.push(text(entry.and_then(|e| e.blurb.as_ref())));
    }

    row.push(text(club.and_then(|c| c.trophy_notes.as_ref())));
    row
}

/// Write `records` as CSV to `out`, in catalog order
pub fn export_csv<W: Write>(
    records: &[CatalogRecord],
    roster: &[String],
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);

    writer.write_record(export_header(roster))?;
    for record in records {
        writer.write_record(export_row(record, roster))?;
    }
    writer.flush()?;
    Ok(())
}

/// [`export_csv`] into a file, replacing it
pub fn export_csv_file(
    path: &Path,
    records: &[CatalogRecord],
    roster: &[String],
) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    export_csv(records, roster, file)?;
    tracing::info!(path = %path.display(), records = records.len(), "Wrote CSV export");
    Ok(())
}
