//! 文档持久化
//!
//! 单文件 JSON（条目列表整体一个 blob），固定路径写穿。写入尽力而为，失败
//! 只记日志不外抛；启动加载失败（文件缺失、解析出错）静默回退到种子数据。

pub mod seed;

use std::path::Path;

use crate::model::AgendaItem;

/// 简单的文件持久化：条目列表 <-> JSON 文件
#[derive(Debug, Clone)]
pub struct DocumentPersistence {
    path: std::path::PathBuf,
}

impl DocumentPersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 从 JSON 文件加载条目列表；文件不存在时返回 `Ok(None)`
    pub fn load(&self) -> anyhow::Result<Option<Vec<AgendaItem>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        let items: Vec<AgendaItem> = serde_json::from_str(&data)?;
        Ok(Some(items))
    }

    /// 把条目列表写入 JSON 文件；父目录不存在时自动创建
    pub fn save(&self, items: &[AgendaItem]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }

    /// 删除持久化文件（重置数据用）
    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// 加载存档，失败（缺失 / 损坏）则回退到以 `seed_base` 起排的种子数据
    pub fn load_or_seed(&self, seed_base: chrono::DateTime<chrono::Utc>) -> Vec<AgendaItem> {
        match self.load() {
            Ok(Some(items)) => {
                tracing::info!("Loaded {} agenda items from {}", items.len(), self.path.display());
                items
            }
            Ok(None) => seed::seed_items(seed_base),
            Err(e) => {
                tracing::error!("Failed to load state, falling back to seed data: {}", e);
                seed::seed_items(seed_base)
            }
        }
    }
}
