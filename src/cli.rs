use clap::{Parser, Subcommand, ValueEnum};
use photo_edit_common::EditOperation;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-edit")]
#[command(about = "生成AIによる写真編集（レタッチ・フィルター・調整・拡張・アップスケール・合成）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像全体への編集（1枚目のみ、または --all で全画像へ一括適用）
    Edit {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 編集の種類
        #[arg(long, value_enum)]
        op: EditKind,

        /// 指示文（filter/adjust/expand）
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// アップスケール倍率
        #[arg(long, default_value = "2")]
        factor: u32,

        /// 拡張後の幅（expand）
        #[arg(long)]
        width: Option<u32>,

        /// 拡張後の高さ（expand）
        #[arg(long)]
        height: Option<u32>,

        /// 全画像へ順番に適用
        #[arg(long)]
        all: bool,

        /// 出力フォルダ
        #[arg(short, long, default_value = "edited")]
        output: PathBuf,
    },

    /// 指定位置の局所レタッチ
    Retouch {
        #[arg(required = true)]
        input: PathBuf,

        #[arg(short, long, required = true)]
        prompt: String,

        /// 原画像のピクセル座標 X
        #[arg(long)]
        x: u32,

        /// 原画像のピクセル座標 Y
        #[arg(long)]
        y: u32,

        #[arg(short, long, default_value = "edited")]
        output: PathBuf,
    },

    /// 補助画像をベース画像に合成
    Compose {
        #[arg(required = true)]
        base: PathBuf,

        #[arg(required = true)]
        complement: PathBuf,

        #[arg(short, long, required = true)]
        prompt: String,

        /// 配置位置 X（省略時はAIが決める）
        #[arg(long, requires = "y")]
        x: Option<u32>,

        /// 配置位置 Y
        #[arg(long, requires = "x")]
        y: Option<u32>,

        #[arg(short, long, default_value = "edited")]
        output: PathBuf,
    },

    /// ローカルでクロップ
    Crop {
        #[arg(required = true)]
        input: PathBuf,

        #[arg(long, default_value = "0")]
        x: u32,

        #[arg(long, default_value = "0")]
        y: u32,

        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        #[arg(short, long, default_value = "edited")]
        output: PathBuf,
    },

    /// ローカルでリサイズ
    Resize {
        #[arg(required = true)]
        input: PathBuf,

        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        #[arg(short, long, default_value = "edited")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 画像全体に掛ける編集の種類
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EditKind {
    Filter,
    Adjust,
    Enhance,
    Upscale,
    Expand,
}

impl EditKind {
    /// 引数から操作を組み立てる。expand で幅・高さが無ければ None
    pub fn to_operation(
        self,
        prompt: &str,
        factor: u32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Option<EditOperation> {
        let prompt = prompt.to_string();
        let op = match self {
            EditKind::Filter => EditOperation::Filter { prompt },
            EditKind::Adjust => EditOperation::Adjust { prompt },
            EditKind::Enhance => EditOperation::AutoEnhance,
            EditKind::Upscale => EditOperation::Upscale { factor },
            EditKind::Expand => EditOperation::Expand {
                width: width?,
                height: height?,
                prompt,
            },
        };
        Some(op)
    }
}

impl std::fmt::Display for EditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditKind::Filter => write!(f, "filter"),
            EditKind::Adjust => write!(f, "adjust"),
            EditKind::Enhance => write!(f, "enhance"),
            EditKind::Upscale => write!(f, "upscale"),
            EditKind::Expand => write!(f, "expand"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_edit_all() {
        let cli = Cli::parse_from(["photo-edit", "edit", "a.png", "b.png", "--op", "filter", "-p", "noir", "--all"]);
        match cli.command {
            Commands::Edit { inputs, op, prompt, all, .. } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(op, EditKind::Filter);
                assert_eq!(prompt, "noir");
                assert!(all);
            }
            _ => panic!("edit expected"),
        }
    }

    #[test]
    fn test_expand_requires_size() {
        assert!(EditKind::Expand.to_operation("", 2, Some(10), None).is_none());
        assert_eq!(
            EditKind::Expand.to_operation("sky", 2, Some(10), Some(20)),
            Some(EditOperation::Expand { width: 10, height: 20, prompt: "sky".into() })
        );
        assert_eq!(EditKind::Upscale.to_operation("", 4, None, None), Some(EditOperation::Upscale { factor: 4 }));
    }
}
