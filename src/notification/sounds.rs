//! 声音目录 - 枚举可用音效，并按种子确定性地挑选

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::config::DEFAULT_SOUND_FILE;

/// 支持的音频扩展名（不区分大小写）
pub const SOUND_EXTENSIONS: [&str; 6] = ["mp3", "wav", "ogg", "m4a", "aac", "flac"];

/// 资源目录下存放音效的子目录
pub const SOUNDS_SUBDIR: &str = "sounds";

/// 声音目录
#[derive(Debug, Clone)]
pub struct SoundCatalog {
    dir: PathBuf,
}

impl SoundCatalog {
    /// 以资源目录创建（音效位于 `<assets>/sounds`）
    pub fn from_assets_dir(assets_dir: &Path) -> Self {
        Self::new(assets_dir.join(SOUNDS_SUBDIR))
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 某个声音文件的完整路径
    ///
    /// 只接受单段文件名；绝对路径、`..` 或含目录分隔的名字返回 None，
    /// 保证结果始终位于声音目录内
    pub fn path_for(&self, sound_file: &str) -> Option<PathBuf> {
        let mut components = Path::new(sound_file).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.dir.join(name)),
            _ => None,
        }
    }

    /// 列出可用声音文件，按文件名升序
    ///
    /// 目录不可读或没有匹配文件时返回 `["default.mp3"]`，结果永不为空
    pub fn list_sound_files(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "Sounds directory unreadable, using default");
                return vec![DEFAULT_SOUND_FILE.to_string()];
            }
        };

        let mut files: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_sound_file(name))
            .collect();

        if files.is_empty() {
            debug!(dir = %self.dir.display(), "No sound files found, using default");
            return vec![DEFAULT_SOUND_FILE.to_string()];
        }

        files.sort();
        files
    }

    /// 按 (项目路径, 种子) 确定性地挑选一个声音文件
    pub fn pick_sound_file(&self, project_path: &str, seed: &str) -> String {
        let files = self.list_sound_files();
        pick_from(&files, project_path, seed)
    }
}

/// 从给定列表中挑选；列表为空时返回默认文件
pub fn pick_from(files: &[String], project_path: &str, seed: &str) -> String {
    if files.is_empty() {
        return DEFAULT_SOUND_FILE.to_string();
    }
    let hash = hash_string(&format!("{}:{}", project_path, seed));
    let index = hash as usize % files.len();
    files[index].clone()
}

/// 32 位多项式滚动哈希（`hash * 31 + code_unit`），取绝对值
///
/// 按 UTF-16 码元计算，保证与既有安装的选择结果一致
pub fn hash_string(input: &str) -> u32 {
    let hash = input
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32));
    hash.unsigned_abs()
}

fn is_sound_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOUND_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}
