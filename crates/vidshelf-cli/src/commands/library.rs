use anyhow::anyhow;
use vidshelf_core::{TransferOrigin, TransferOutcome, VideoId};

use crate::cli::{OutputFormat, RemoveArgs, StreamArgs, UploadArgs};
use crate::client::{AppContext, CliError, CliResult, LocalFile};
use crate::output::{
    StreamReport, UploadReport, render_catalog, render_removed, render_stream, render_upload,
};

pub(crate) async fn handle_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let controller = ctx.controller();
    let catalog = controller.start().await?;
    render_catalog(&catalog, format)
}

pub(crate) async fn handle_upload(
    ctx: &AppContext,
    args: UploadArgs,
    format: OutputFormat,
) -> CliResult<()> {
    match upload_file(ctx, args).await? {
        Some(report) => render_upload(&report, format),
        None => Ok(()),
    }
}

pub(crate) async fn handle_remove(
    ctx: &AppContext,
    args: RemoveArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let removed = remove_videos(ctx, args).await?;
    render_removed(&removed, format)
}

pub(crate) async fn handle_stream(
    ctx: &AppContext,
    args: StreamArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let report = resolve_stream(ctx, args).await?;
    render_stream(&report, format)
}

async fn upload_file(ctx: &AppContext, args: UploadArgs) -> CliResult<Option<UploadReport>> {
    if !args.path.is_file() {
        return Err(CliError::validation(format!(
            "'{}' is not a readable file",
            args.path.display()
        )));
    }

    let controller = ctx.controller();
    let outcome = controller
        .upload(TransferOrigin::Browse, Some(LocalFile::new(args.path)))
        .await?;
    Ok(match outcome {
        TransferOutcome::Skipped => None,
        TransferOutcome::Uploaded {
            filename,
            catalog_refreshed,
        } => Some(UploadReport {
            filename,
            catalog_refreshed,
        }),
    })
}

async fn remove_videos(ctx: &AppContext, args: RemoveArgs) -> CliResult<Vec<VideoId>> {
    let controller = ctx.controller();
    controller.open_removal().await?;
    for id in args.ids {
        let video = VideoId::new(id);
        if !controller.toggle_removal(&video, true) {
            controller.cancel_removal();
            return Err(CliError::validation(format!(
                "video '{video}' is not in the library"
            )));
        }
    }
    Ok(controller.confirm_removal().await?)
}

async fn resolve_stream(ctx: &AppContext, args: StreamArgs) -> CliResult<StreamReport> {
    let id = args.id.trim();
    if id.is_empty() {
        return Err(CliError::validation("video id must not be empty"));
    }

    let controller = ctx.controller();
    controller.select(Some(VideoId::from(id)));
    let stream = controller.load_selected().await?;
    let engine = controller.engine();
    let source = engine
        .source()
        .ok_or_else(|| CliError::failure(anyhow!("player was not given a source")))?;
    let tracks = engine.tracks();
    let [subtitle] = tracks.as_slice() else {
        return Err(CliError::failure(anyhow!(
            "player holds {} subtitle tracks, expected one",
            tracks.len()
        )));
    };
    if !engine.playing() {
        return Err(CliError::failure(anyhow!("player did not start")));
    }
    tracing::debug!(video = %stream.video, "stream attached");

    Ok(StreamReport {
        video: stream.video,
        manifest: ctx.absolute(&source.src),
        subtitle: ctx.absolute(&subtitle.src),
        mime: source.mime.to_string(),
    })
}
