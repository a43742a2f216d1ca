// 失敗・キャンセル経路の統合テスト
#![cfg(unix)]

mod fixtures;

use anyhow::Result;
use fixtures::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use upscale_orchestrator::core::{CANCELLED_EXIT_CODE, SIGNAL_EXIT_BASE};
use upscale_orchestrator::progress::FnProgressReporter;
use upscale_orchestrator::{
    CancellationToken, DefaultRunnerConfig, ProgressReporter, UpscaleError, UpscaleRunner,
};

fn fast_runner() -> UpscaleRunner {
    UpscaleRunner::with_config(
        DefaultRunnerConfig::new().with_watch_interval(Duration::from_millis(10)),
    )
}

#[tokio::test]
async fn test_nonzero_exit_reports_diagnostic_lines_only() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
echo "vkCreateInstance failed -9" >&2
echo "12.00%" >&2
echo "invalid gpu device" >&2
exit 3
"#,
    );
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");
    let (values, reporter) = recording_reporter();

    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), Some(reporter), None)
        .await?;

    assert_eq!(outcome.exit_code, 3);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("vkCreateInstance failed -9\ninvalid gpu device")
    );
    assert_progress(&values.lock().unwrap(), &[0.12]);
    Ok(())
}

#[tokio::test]
async fn test_error_message_collected_without_reporter() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
echo "decode image failed" >&2
exit 1
"#,
    );
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");

    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), None, None)
        .await?;

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.error_message.as_deref(), Some("decode image failed"));
    Ok(())
}

#[tokio::test]
async fn test_error_message_keeps_last_sixteen_lines() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
i=1
while [ $i -le 20 ]; do
  echo "line $i" >&2
  echo "50.00%" >&2
  i=$((i + 1))
done
exit 2
"#,
    );
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");

    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), None, None)
        .await?;

    let message = outcome.error_message.expect("失敗時はメッセージがあるべき");
    let lines: Vec<&str> = message.lines().collect();
    assert_eq!(lines.len(), 16);
    assert_eq!(lines.first(), Some(&"line 5"));
    assert_eq!(lines.last(), Some(&"line 20"));
    assert!(lines.iter().all(|line| !line.ends_with('%')));
    Ok(())
}

#[tokio::test]
async fn test_silent_failure_still_has_message() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new("exit 5");
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");

    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), None, None)
        .await?;

    assert_eq!(outcome.exit_code, 5);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("process exited with code 5")
    );
    Ok(())
}

#[tokio::test]
async fn test_cancel_after_first_progress_kills_process() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
echo "10.00%" >&2
sleep 30
echo "100.00%" >&2
"#,
    );
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let reporter: Arc<dyn ProgressReporter> =
        Arc::new(FnProgressReporter::new(move |_| trigger.cancel()));

    let started = Instant::now();
    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        fast_runner().run(&upscaler.spec(&input, &output), Some(reporter), Some(cancel)),
    )
    .await
    .expect("キャンセル後すぐに戻るべき")?;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_ne!(outcome.exit_code, 0);
    assert_eq!(outcome.exit_code, CANCELLED_EXIT_CODE);
    assert!(outcome.is_cancelled());
    assert_eq!(outcome.error_message.as_deref(), Some("operation cancelled"));
    Ok(())
}

#[tokio::test]
async fn test_cancel_directory_mode_releases_watch() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
for f in "$in"/*; do
  cp "$f" "$out/"
  sleep 30
done
"#,
    );
    let input = upscaler.create_input_directory("frames", 3);
    let output = upscaler.path("out");
    let (values, reporter) = recording_reporter();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        fast_runner().run(&upscaler.spec(&input, &output), Some(reporter), Some(cancel)),
    )
    .await
    .expect("キャンセル後すぐに戻るべき")?;

    assert!(outcome.is_cancelled());
    // 部分的な出力は残りうる
    assert_eq!(std::fs::read_dir(&output)?.count(), 1);
    let values = values.lock().unwrap().clone();
    assert_progress(&values, &[1.0 / 3.0]);
    Ok(())
}

#[tokio::test]
async fn test_missing_input_directory_is_not_found_error() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new("exit 0");
    let missing = upscaler.path("does/not/exist");
    let output = upscaler.path("out");

    let result = fast_runner()
        .run(&upscaler.spec(&missing, &output), None, None)
        .await;

    match result {
        Err(UpscaleError::InputNotFound { path }) => assert_eq!(path, missing),
        other => panic!("InputNotFoundが期待されます: {other:?}"),
    }
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_pre_cancelled_never_creates_output() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new("exit 0");
    let input = upscaler.create_input_directory("frames", 2);
    let output = upscaler.path("never/created");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), None, Some(cancel))
        .await?;

    assert_ne!(outcome.exit_code, 0);
    assert!(outcome.is_cancelled());
    assert!(!upscaler.path("never").exists());
    Ok(())
}

#[tokio::test]
async fn test_non_executable_file_is_launch_error() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new("exit 0");
    let not_executable = upscaler.create_input_file("plain.txt");
    let input = upscaler.create_input_file("in.png");
    let mut spec = upscaler.spec(&input, &upscaler.path("out/in.png"));
    spec.executable_path = not_executable.to_string_lossy().into_owned();

    let result = fast_runner().run(&spec, None, None).await;

    assert!(matches!(result, Err(UpscaleError::Launch { .. })));
    Ok(())
}

#[tokio::test]
async fn test_background_descendant_does_not_delay_return() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
echo "boom" >&2
(sleep 6) &
exit 1
"#,
    );
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");

    let started = Instant::now();
    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), None, None)
        .await?;

    assert!(started.elapsed() < Duration::from_secs(3), "elapsed: {:?}", started.elapsed());
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.error_message.as_deref(), Some("boom"));
    Ok(())
}

#[tokio::test]
async fn test_signal_termination_is_not_reported_as_cancel() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
echo "gpu driver crashed" >&2
kill -9 $$
"#,
    );
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");

    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), None, None)
        .await?;

    assert_eq!(outcome.exit_code, SIGNAL_EXIT_BASE + 9);
    assert_ne!(outcome.exit_code, CANCELLED_EXIT_CODE);
    assert!(!outcome.is_cancelled());
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("gpu driver crashed\nprocess terminated by SIGKILL")
    );
    Ok(())
}

#[tokio::test]
async fn test_panicking_reporter_still_returns_outcome() -> Result<()> {
    let _guard = serial().await;
    let upscaler = FakeUpscaler::new(
        r#"
echo "10.00%" >&2
echo "100.00%" >&2
cp "$in" "$out"
"#,
    );
    let input = upscaler.create_input_file("in.png");
    let output = upscaler.path("out/in.png");
    let reporter: Arc<dyn ProgressReporter> =
        Arc::new(FnProgressReporter::new(|_| panic!("reporter failure")));

    let outcome = fast_runner()
        .run(&upscaler.spec(&input, &output), Some(reporter), None)
        .await?;

    assert!(outcome.is_success());
    assert!(output.exists());
    Ok(())
}
