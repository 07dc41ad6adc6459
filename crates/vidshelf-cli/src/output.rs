//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use serde::Serialize;
use vidshelf_core::{Catalog, VideoId};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Stream details printed by `vidshelf stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StreamReport {
    pub(crate) video: VideoId,
    pub(crate) manifest: String,
    pub(crate) subtitle: String,
    pub(crate) mime: String,
}

/// Upload result printed by `vidshelf upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UploadReport {
    pub(crate) filename: VideoId,
    pub(crate) catalog_refreshed: bool,
}

pub(crate) fn render_catalog(catalog: &Catalog, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_catalog(catalog, format)?);
    Ok(())
}

pub(crate) fn render_stream(report: &StreamReport, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_stream(report, format)?);
    Ok(())
}

pub(crate) fn render_upload(report: &UploadReport, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_upload(report, format)?);
    Ok(())
}

pub(crate) fn render_removed(removed: &[VideoId], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(&removed)?),
        OutputFormat::Table => {
            for video in removed {
                println!("removed: {video}");
            }
        }
    }
    Ok(())
}

fn format_catalog(catalog: &Catalog, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&catalog.entries()),
        OutputFormat::Table => {
            if catalog.is_empty() {
                return Ok("no videos".to_string());
            }
            let mut text = format!("{:>4} VIDEO", "#");
            for (index, video) in catalog.iter().enumerate() {
                let _ = write!(text, "\n{:>4} {video}", index + 1);
            }
            Ok(text)
        }
    }
}

fn format_stream(report: &StreamReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Table => Ok(format!(
            "video: {}\nmanifest: {}\nsubtitles: {}\ntype: {}",
            report.video, report.manifest, report.subtitle, report.mime
        )),
    }
}

fn format_upload(report: &UploadReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Table => {
            let mut text = format!("uploaded: {}", report.filename);
            if !report.catalog_refreshed {
                text.push_str("\nwarning: video list could not be refreshed");
            }
            Ok(text)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}
