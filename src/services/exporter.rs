use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use askama::Template;
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::domain::job::JobRecord;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unsupported export format '{0}', supported: json, jsonl, csv, excel, xml, html")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Template(#[from] askama::Error),
    #[error(transparent)]
    Excel(#[from] XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Jsonl,
    Csv,
    Excel,
    Xml,
    Html,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "jsonl" => Ok(ExportFormat::Jsonl),
            "csv" => Ok(ExportFormat::Csv),
            "excel" => Ok(ExportFormat::Excel),
            "xml" => Ok(ExportFormat::Xml),
            "html" => Ok(ExportFormat::Html),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Template)]
#[template(path = "jobs.html")]
struct JobsTemplate<'a> {
    headers: Vec<&'static str>,
    rows: Vec<Vec<&'a str>>,
}

/// Writes `jobs` to `output_path`, creating missing directories.
pub fn export_jobs(
    jobs: &[JobRecord],
    output_path: &Path,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    log::info!(
        "Exporting {} jobs to {} ({:?})",
        jobs.len(),
        output_path.display(),
        format
    );

    let mut writer = BufWriter::new(File::create(output_path)?);
    write_jobs(jobs, format, &mut writer)?;
    writer.flush()?;

    log::info!("Export completed: {}", output_path.display());
    Ok(output_path.to_path_buf())
}

fn write_jobs<W: Write>(
    jobs: &[JobRecord],
    format: ExportFormat,
    mut writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, jobs)?;
            writeln!(writer)?;
        }
        ExportFormat::Jsonl => {
            for job in jobs {
                serde_json::to_writer(&mut writer, job)?;
                writeln!(writer)?;
            }
        }
        ExportFormat::Csv => write_csv(jobs, writer)?,
        ExportFormat::Xml => write_xml(jobs, writer)?,
        ExportFormat::Html => {
            if jobs.is_empty() {
                log::warn!("No jobs to export; writing an empty listing page.");
            }
            let page = JobsTemplate {
                headers: JobRecord::FIELD_NAMES.to_vec(),
                rows: jobs.iter().map(|job| job.values().to_vec()).collect(),
            };
            writer.write_all(page.render()?.as_bytes())?;
        }
        ExportFormat::Excel => write_excel(jobs, writer)?,
    }
    Ok(())
}

fn write_csv<W: Write>(jobs: &[JobRecord], writer: W) -> Result<(), ExportError> {
    if jobs.is_empty() {
        log::warn!("No jobs to export; writing empty CSV with no headers.");
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    for job in jobs {
        csv_writer.serialize(job)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One sheet: a header row of field names, then one row per record.
fn write_excel<W: Write>(jobs: &[JobRecord], mut writer: W) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in JobRecord::FIELD_NAMES.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }
    for (row, job) in jobs.iter().enumerate() {
        for (col, value) in job.values().iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, *value)?;
        }
    }

    writer.write_all(&workbook.save_to_buffer()?)?;
    Ok(())
}

fn write_xml<W: Write>(jobs: &[JobRecord], mut writer: W) -> Result<(), ExportError> {
    writeln!(writer, "<?xml version='1.0' encoding='utf-8'?>")?;
    writeln!(writer, "<jobs>")?;
    for job in jobs {
        writeln!(writer, "  <job>")?;
        for (name, value) in JobRecord::FIELD_NAMES.iter().zip(job.values()) {
            writeln!(
                writer,
                "    <{0}>{1}</{0}>",
                name,
                html_escape::encode_text(value)
            )?;
        }
        writeln!(writer, "  </job>")?;
    }
    writeln!(writer, "</jobs>")?;
    Ok(())
}
