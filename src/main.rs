use anyhow::{anyhow, bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photo_edit::common::{EditOperation, EditOutcome, Hotspot, ImageBlob, SessionStore};
use photo_edit::dispatcher::{self, BatchItem, Dispatcher, SharedSession};
use photo_edit::editor::{GeminiEditor, ImageEditor};
use photo_edit::local::{self, LocalTransform};
use photo_edit::{cli, config, error, export, scanner};
use cli::{Cli, Commands};
use config::Config;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Edit { inputs, op, prompt, factor, width, height, all, output } => {
            println!("🎨 photo-edit - {}\n", op);

            let operation = op
                .to_operation(&prompt, factor, width, height)
                .ok_or_else(|| anyhow!("expand には --width と --height が必要です"))?;

            let session = load_session(&inputs)?;
            let dispatcher = remote_dispatcher(&config, session)?;

            if all {
                run_batch(&dispatcher, &operation).await;
            } else {
                run_single(&dispatcher, 0, &operation).await?;
            }

            finish(dispatcher.session(), &output)?;
        }

        Commands::Retouch { input, prompt, x, y, output } => {
            println!("🖌 photo-edit - レタッチ\n");

            let session = load_session(&[input])?;
            let hotspot = Hotspot::new(x, y);
            check_hotspot(&session, hotspot)?;

            let dispatcher = remote_dispatcher(&config, session)?;
            run_single(&dispatcher, 0, &EditOperation::Retouch { prompt, hotspot }).await?;
            finish(dispatcher.session(), &output)?;
        }

        Commands::Compose { base, complement, prompt, x, y, output } => {
            println!("🧩 photo-edit - 合成\n");

            let session = load_session(&[base])?;
            let complement = read_blob(&complement)?;
            let hotspot = x.zip(y).map(|(x, y)| Hotspot::new(x, y));
            if let Some(h) = hotspot {
                check_hotspot(&session, h)?;
            }

            let dispatcher = remote_dispatcher(&config, session)?;
            let operation = EditOperation::Compose { complement, prompt, hotspot };
            run_single(&dispatcher, 0, &operation).await?;
            finish(dispatcher.session(), &output)?;
        }

        Commands::Crop { input, x, y, width, height, output } => {
            let session = dispatcher::shared(load_session(&[input])?);
            run_local(&session, LocalTransform::Crop { x, y, width, height })?;
            finish(&session, &output)?;
        }

        Commands::Resize { input, width, height, output } => {
            let session = dispatcher::shared(load_session(&[input])?);
            run_local(&session, LocalTransform::Resize { width, height })?;
            finish(&session, &output)?;
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  エンドポイント: {}", config.api_base_url);
                println!("  一括適用の間隔: {}ms", config.batch_delay_ms);
                println!("  リトライ: {}回 (初回待機 {}ms)", config.max_retries, config.retry_base_delay_ms);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn load_session(inputs: &[PathBuf]) -> anyhow::Result<SessionStore> {
    println!("[1/3] 画像を読み込み中...");
    let images = scanner::scan_inputs(inputs)?;
    if images.is_empty() {
        let names: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        return Err(error::PhotoEditError::NoImagesFound(names.join(", ")).into());
    }

    let mut session = SessionStore::new();
    session.load_multiple(scanner::load_uploads(&images)?);
    println!("✔ {}枚の画像を読み込み\n", session.len());
    Ok(session)
}

fn read_blob(path: &Path) -> anyhow::Result<ImageBlob> {
    let images = scanner::scan_inputs(&[path.to_path_buf()])?;
    let upload = scanner::load_uploads(&images)?
        .into_iter()
        .next()
        .with_context(|| format!("画像がありません: {}", path.display()))?;
    Ok(upload.blob)
}

/// ホットスポットが原画像の範囲内か確認
fn check_hotspot(session: &SessionStore, hotspot: Hotspot) -> anyhow::Result<()> {
    let record = session.record(0)?;
    let (width, height) = local::image_dimensions(record.current_blob())?;
    if hotspot.x >= width || hotspot.y >= height {
        return Err(error::PhotoEditError::HotspotOutOfBounds {
            x: hotspot.x,
            y: hotspot.y,
            width,
            height,
        }
        .into());
    }
    Ok(())
}

fn remote_dispatcher(config: &Config, session: SessionStore) -> anyhow::Result<Dispatcher<GeminiEditor>> {
    let editor = GeminiEditor::from_config(config)?;
    Ok(Dispatcher::new(editor, dispatcher::shared(session)).with_batch_delay(config.batch_delay()))
}

async fn run_single<E: ImageEditor>(
    dispatcher: &Dispatcher<E>,
    index: usize,
    operation: &EditOperation,
) -> anyhow::Result<()> {
    println!("[2/3] AI編集中... ({})", operation.kind());
    match dispatcher.apply_edit(index, operation).await? {
        EditOutcome::Applied { history_len } => {
            println!("✔ 編集完了 (履歴 {}件)\n", history_len);
            Ok(())
        }
        EditOutcome::Failed { message } => bail!("編集に失敗しました: {}", message),
        EditOutcome::Stale => bail!("編集結果を反映できませんでした"),
    }
}

async fn run_batch<E: ImageEditor>(dispatcher: &Dispatcher<E>, operation: &EditOperation) {
    let total = dispatcher
        .session()
        .lock()
        .map(|s| s.len())
        .unwrap_or_default();
    println!("[2/3] AI編集中... ({}, {}枚)", operation.kind(), total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let report = dispatcher
        .apply_to_all(operation, |progress| {
            pb.set_position(progress.completed as u64);
            if let BatchItem::Done(EditOutcome::Failed { message }) = &progress.outcome {
                pb.println(format!("  ✖ [{}] {}", progress.index + 1, message));
            }
        })
        .await;
    pb.finish_and_clear();

    println!(
        "✔ 一括編集完了: 成功 {} / 失敗 {} / スキップ {}\n",
        report.succeeded.len(),
        report.failed.len(),
        report.skipped.len()
    );
}

fn run_local(session: &SharedSession, transform: LocalTransform) -> anyhow::Result<()> {
    println!("[2/3] ローカル変換中... ({})", transform.kind());
    match dispatcher::apply_local(session, 0, transform)? {
        EditOutcome::Applied { .. } => {
            println!("✔ 変換完了\n");
            Ok(())
        }
        EditOutcome::Failed { message } => bail!("変換に失敗しました: {}", message),
        EditOutcome::Stale => bail!("変換結果を反映できませんでした"),
    }
}

fn finish(session: &SharedSession, output: &Path) -> anyhow::Result<()> {
    println!("[3/3] 書き出し中...");
    let session = session
        .lock()
        .map_err(|_| anyhow!("セッションのロックに失敗しました"))?;
    let manifest = export::export_session(&session, output)?;

    for entry in &manifest.images {
        match &entry.error {
            Some(err) => println!("  ✖ {} → {} ({})", entry.name, entry.output, err),
            None => println!("  ✔ {} → {} (履歴 {}件)", entry.name, entry.output, entry.history_len),
        }
    }
    println!("\n✅ 出力先: {}", output.display());
    Ok(())
}
