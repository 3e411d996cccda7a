//! 生成AI写真編集のセッション管理
//!
//! 状態機械そのものは `photo_edit_common`、ここでは外部API連携・
//! 一括適用・ローカル変換・書き出しを扱う。

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod export;
pub mod local;
pub mod scanner;

pub use photo_edit_common as common;
