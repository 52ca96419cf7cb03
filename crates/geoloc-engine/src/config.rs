//! 引擎配置

use geoloc_core::snap::SnapConfig;
use serde::{Deserialize, Serialize};

/// 构造引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 参数捕捉
    pub snap: SnapConfig,
    /// 自动命名时尝试的最大数字后缀
    pub max_name_suffix: u32,
    /// 轨迹采样区域（像素）
    pub plot_width: u32,
    pub plot_height: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            max_name_suffix: 99,
            plot_width: 800,
            plot_height: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"snap": {"tolerance": 0.3}, "max_name_suffix": 9}"#).unwrap();
        assert_eq!(config.max_name_suffix, 9);
        assert!((config.snap.tolerance - 0.3).abs() < 1e-10);
        assert!((config.snap.intersection_tolerance - 0.25).abs() < 1e-10);
        assert_eq!(config.plot_width, 800);
    }
}
