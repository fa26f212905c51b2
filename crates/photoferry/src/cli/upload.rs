//! Upload command handler.

use super::commands::UploadArgs;
use super::connect;
use photoferry::{JsonError, PhotoferryConfig, PhotoferryResult, QualityTier, RunSummary};
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::warn;

/// Fold command-line flags over the loaded configuration.
pub fn apply_upload_args(config: PhotoferryConfig, args: &UploadArgs) -> PhotoferryConfig {
    let mut upload = config.upload().clone();
    if let Some(threads) = args.threads {
        upload = upload.with_threads(threads);
    }
    if args.force {
        upload = upload.with_force(true);
    }
    if args.saver {
        upload = upload.with_quality(QualityTier::Saver);
    }
    if args.use_quota {
        upload = upload.with_use_quota(true);
    }
    if args.verify {
        upload = upload.with_verify_remote(true);
    }
    if args.progress && !args.json {
        upload = upload.with_show_progress(true);
    }

    let mut filter = config.filter().clone();
    if let Some(expression) = &args.filter {
        filter = filter.with_expression(Some(expression.clone()));
    }
    if args.ignore_case {
        filter = filter.with_ignore_case(true);
    }
    if args.regex {
        filter = filter.with_regex(true);
    }
    if args.include {
        filter = filter.with_exclude(false);
    }
    if args.no_recursive {
        filter = filter.with_recursive(false);
    }
    if args.media_only {
        filter = filter.with_media_only(true);
    }

    config.with_upload(upload).with_filter(filter)
}

/// Run `photoferry upload`.
pub async fn handle_upload(config: PhotoferryConfig, args: UploadArgs) -> PhotoferryResult<ExitCode> {
    let config = apply_upload_args(config, &args);
    let (cancel, cancelled) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight uploads");
            cancel.send_replace(true);
        }
    });

    let ferry = connect(config).await?.with_cancellation(cancelled);
    let report = ferry.upload(&args.target, ferry.request()).await?;

    if args.json {
        let summary = RunSummary::from(&report);
        let json = serde_json::to_string_pretty(&summary).map_err(JsonError::from)?;
        println!("{}", json);
    } else {
        for (path, result) in report.iter() {
            match result {
                Ok(success) => println!(
                    "{}\t{}\t{}",
                    success.outcome(),
                    success.remote_ref(),
                    path.display()
                ),
                Err(e) => println!("failed\t{}\t{}", path.display(), e),
            }
        }
        println!(
            "{} files: {} uploaded, {} already present, {} failed",
            report.len(),
            report.transferred(),
            report.dedup_hits(),
            report.failed()
        );
    }

    Ok(if report.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
