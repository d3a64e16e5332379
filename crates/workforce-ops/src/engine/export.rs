//! CSV export of composite score tables for payroll and review handoffs.

use std::io::Write;

use super::scoring::CompositeResult;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write one row per composite result, highest score first.
pub fn write_composite_csv<W: Write>(
    writer: W,
    results: &[CompositeResult],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "user_id",
        "period",
        "total_score",
        "bonus_percentage",
        "tier",
    ])?;

    let mut ordered: Vec<&CompositeResult> = results.iter().collect();
    ordered.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for result in ordered {
        let period = result.period.to_string();
        let total_score = format!("{:.2}", result.total_score);
        let bonus = result.bonus_percentage.to_string();
        csv_writer.write_record([
            result.user_id.0.as_str(),
            period.as_str(),
            total_score.as_str(),
            bonus.as_str(),
            result.tier.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
