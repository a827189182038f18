// ==========================================
// 仓库扫描对账系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写合并
// 存储: 用户配置目录下的 config.json(局部覆写,缺省回退内置)
// ==========================================

use crate::config::reconciliation::ReconciliationConfig;
use crate::config::workflow_profile::WorkflowProfiles;
use crate::domain::types::WorkflowKind;
use crate::engine::incident::{AuthorizationGate, DenyAllGate, SupervisorCodeGate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

// ==========================================
// ConfigFile - 覆写文件结构
// ==========================================
// 所有字段可缺省,只写差异
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    /// 主管口令(多货开票授权用)
    #[serde(default)]
    supervisor_code: Option<String>,

    /// 按作业类型覆写对账配置
    #[serde(default)]
    profiles: HashMap<WorkflowKind, ReconciliationConfig>,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    profiles: WorkflowProfiles,
    supervisor_code: Option<String>,
}

impl ConfigManager {
    /// 纯内置配置(无覆写文件)
    pub fn builtin() -> Self {
        Self {
            profiles: WorkflowProfiles::builtin(),
            supervisor_code: None,
        }
    }

    /// 从默认位置加载(用户配置目录/wms-scan-recon/config.json)
    ///
    /// 文件不存在时静默回退内置配置
    pub fn load_default() -> Self {
        match Self::default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("无法定位用户配置目录,使用内置配置");
                Self::builtin()
            }
        }
    }

    /// 从指定文件加载
    ///
    /// 文件缺失 → 内置配置;解析失败 → 告警并回退内置配置
    /// (配置损坏不应让作业画面打不开)
    pub fn load_from_path(path: &Path) -> Self {
        let mut manager = Self::builtin();

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %path.display(), "配置覆写文件不存在,使用内置配置");
                return manager;
            }
        };

        let file: ConfigFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置覆写文件解析失败,使用内置配置");
                return manager;
            }
        };

        manager.profiles.merge_overrides(file.profiles);
        manager.supervisor_code = file.supervisor_code;
        debug!(path = %path.display(), "配置覆写已加载");
        manager
    }

    /// 默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wms-scan-recon").join("config.json"))
    }

    /// 把当前配置写回文件(供配置界面保存)
    pub fn save_to_path(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut profiles = HashMap::new();
        for kind in WorkflowKind::all() {
            profiles.insert(kind, self.profiles.profile(kind));
        }
        let file = ConfigFile {
            supervisor_code: self.supervisor_code.clone(),
            profiles,
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 某作业的对账配置
    pub fn profile(&self, workflow: WorkflowKind) -> ReconciliationConfig {
        self.profiles.profile(workflow)
    }

    /// 覆写某作业的对账配置(配置界面用)
    pub fn set_profile(&mut self, workflow: WorkflowKind, config: ReconciliationConfig) {
        self.profiles.set_profile(workflow, config);
    }

    /// 设置主管口令
    pub fn set_supervisor_code(&mut self, code: Option<String>) {
        self.supervisor_code = code;
    }

    /// 构造授权门: 有口令给口令门,没有给拒绝门
    pub fn authorization_gate(&self) -> Arc<dyn AuthorizationGate> {
        match &self.supervisor_code {
            Some(code) if !code.is_empty() => Arc::new(SupervisorCodeGate::new(code.clone())),
            _ => Arc::new(DenyAllGate),
        }
    }
}
