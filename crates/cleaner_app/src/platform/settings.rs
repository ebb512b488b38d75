//! User settings, stored as RON under the user config directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cleaner_core::{RunConfig, DEFAULT_BATCH_SIZE, DEFAULT_MAX_WORKERS};
use cleaner_engine::{ClientSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const SETTINGS_DIR: &str = "cleaner";
const SETTINGS_FILENAME: &str = "settings.ron";

/// Rule template written with fresh settings. Only the bulleted lines under
/// heading 1 end in a colon, so only they become output fields.
pub const DEFAULT_PROMPT: &str = "\
### 动态字段清洗规则（根据此提示词自动提取字段）
请作为专业数据分析师，按照以下规则处理数据。
1. 从【宝贝名】字段提取以下信息
   - 产品名称：提取产品的完整名称
   - 规格：提取产品的容量规格
   - 功效：提取产品的主要功效
   - 核心成分：提取产品的主要有效成分
   - 适用肤质：提取适用肤质信息
2. 输出格式要求
   - 每个字段单独一行
   - 每行先写字段名，再写英文冒号，最后写值
   - 字段名必须与上述列表完全一致
   - 没有信息的字段留空
3. 示例输入
兰蔻小黑瓶精华液 30ml 保湿抗皱 二裂酵母成分 所有肤质适用
4. 示例输出
产品名称:兰蔻小黑瓶精华液
规格:30ml
功效:保湿抗皱
核心成分:二裂酵母
适用肤质:所有肤质
### 重要说明
- 工具会自动从第1条规则中提取字段名
- 你可以修改第1条规则中的字段列表
- 字段数量没有限制，可根据需要增删
- 严格按照示例格式输出，不要添加额外内容";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub prompt: String,
    pub input_file: String,
    pub output_file: String,
    pub batch_size: usize,
    pub max_workers: usize,
    pub max_retries: u32,
    pub utf8_bom: bool,
    pub endpoint: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            prompt: DEFAULT_PROMPT.to_string(),
            input_file: String::new(),
            output_file: String::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_workers: DEFAULT_MAX_WORKERS,
            max_retries: 0,
            utf8_bom: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(self.api_key.trim(), self.prompt.as_str());
        config.batch_size = self.batch_size;
        config.max_workers = self.max_workers;
        config.max_retries = self.max_retries;
        config
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            ..ClientSettings::default()
        }
    }

    pub fn input_path(&self) -> Option<PathBuf> {
        non_blank(&self.input_file)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        non_blank(&self.output_file)
    }
}

fn non_blank(path: &str) -> Option<PathBuf> {
    let path = path.trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILENAME))
}

/// Load settings, writing fresh defaults when the file is missing or cannot
/// be parsed.
pub fn load_settings(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                engine_warn!("Failed to read settings from {:?}: {}", path, err);
            }
            return regenerate(path);
        }
    };

    match ron::from_str::<Settings>(&content) {
        Ok(settings) => {
            engine_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            engine_warn!("Failed to parse settings from {:?}: {}", path, err);
            regenerate(path)
        }
    }
}

fn regenerate(path: &Path) -> Settings {
    let settings = Settings::default();
    match save_settings(path, &settings) {
        Ok(()) => engine_info!("Wrote default settings to {:?}", path),
        Err(err) => engine_warn!("Failed to write default settings: {:#}", err),
    }
    settings
}

/// Replace the settings file atomically.
pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(settings, pretty).context("serializing settings")?;

    let mut tmp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .context("writing settings")?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
