use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppResult, ConfigError};
use crate::infrastructure::LocateStrategy;

/// 浏览器接入方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserMode {
    /// 通过调试端口连接已打开的浏览器
    Attach,
    /// 启动一个无头浏览器
    Headless,
}

impl FromStr for BrowserMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attach" => Ok(BrowserMode::Attach),
            "headless" => Ok(BrowserMode::Headless),
            other => Err(ConfigError::InvalidValue {
                var_name: "BROWSER_MODE".to_string(),
                value: other.to_string(),
                expected: "attach | headless".to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器接入方式
    pub browser_mode: BrowserMode,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 无头模式下使用的浏览器可执行文件
    pub chrome_executable: Option<PathBuf>,
    /// 起始URL
    pub target_url: String,
    /// 连接模式下优先复用标题包含该文本的标签页
    pub target_title: Option<String>,
    /// 发票清单 (CSV，优先)
    pub csv_path: PathBuf,
    /// 发票清单 (XLSX，CSV 不存在时使用)
    pub xlsx_path: PathBuf,
    /// XLSX 工作表名
    pub xlsx_sheet: String,
    /// PDF 保存目录
    pub download_dir: PathBuf,
    /// 批次报告目录
    pub report_dir: PathBuf,
    /// 打开发票页面的最长等待时间
    pub navigation_timeout_ms: u64,
    /// PDF 转换的最长等待时间
    pub render_timeout_ms: u64,
    /// 等待订单列表稳定的最长时间
    pub settle_timeout_ms: u64,
    /// 查找发票入口的策略
    pub locate_strategy: LocateStrategy,
    /// 发票打印页的路径片段
    pub invoice_path_fragment: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_mode: BrowserMode::Attach,
            browser_debug_port: 9222,
            chrome_executable: None,
            target_url: "https://www.amazon.com/".to_string(),
            target_title: None,
            csv_path: PathBuf::from("./data/invoices.csv"),
            xlsx_path: PathBuf::from("./data/invoices.xlsx"),
            xlsx_sheet: "Sheet1".to_string(),
            download_dir: PathBuf::from("./downloads"),
            report_dir: PathBuf::from("./reports"),
            navigation_timeout_ms: 2000,
            render_timeout_ms: 60_000,
            settle_timeout_ms: 5000,
            locate_strategy: LocateStrategy::ContainerText,
            invoice_path_fragment: "gp/css/summary/print.html".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，无法解析的值回退到默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_mode: parse_env("BROWSER_MODE").unwrap_or(default.browser_mode),
            browser_debug_port: parse_env("BROWSER_DEBUG_PORT")
                .unwrap_or(default.browser_debug_port),
            chrome_executable: env_path("CHROME_EXECUTABLE").or(default.chrome_executable),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            target_title: non_empty_env("TARGET_TITLE").or(default.target_title),
            csv_path: env_path("INVOICES_CSV").unwrap_or(default.csv_path),
            xlsx_path: env_path("INVOICES_XLSX").unwrap_or(default.xlsx_path),
            xlsx_sheet: std::env::var("INVOICES_SHEET").unwrap_or(default.xlsx_sheet),
            download_dir: env_path("DOWNLOAD_DIR").unwrap_or(default.download_dir),
            report_dir: env_path("REPORT_DIR").unwrap_or(default.report_dir),
            navigation_timeout_ms: parse_env("NAVIGATION_TIMEOUT_MS")
                .unwrap_or(default.navigation_timeout_ms),
            render_timeout_ms: parse_env("RENDER_TIMEOUT_MS")
                .unwrap_or(default.render_timeout_ms),
            settle_timeout_ms: parse_env("SETTLE_TIMEOUT_MS")
                .unwrap_or(default.settle_timeout_ms),
            locate_strategy: parse_env("LOCATE_STRATEGY").unwrap_or(default.locate_strategy),
            invoice_path_fragment: std::env::var("INVOICE_PATH_FRAGMENT")
                .unwrap_or(default.invoice_path_fragment),
            verbose_logging: parse_env("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
        }
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}

fn parse_env<T: FromStr>(var_name: &str) -> Option<T> {
    std::env::var(var_name).ok().and_then(|v| v.parse().ok())
}

fn env_path(var_name: &str) -> Option<PathBuf> {
    std::env::var(var_name).ok().map(PathBuf::from)
}

fn non_empty_env(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

/// 账户凭据，只交给会话驱动使用
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// 读取 `EMAIL` / `PASSWORD`，缺失或为空时立即失败
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            email: required_env("EMAIL")?,
            password: required_env("PASSWORD")?,
        })
    }

    /// 校验已有的凭据值
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> AppResult<Self> {
        let email = email.into();
        let password = password.into();
        require_non_empty("EMAIL", &email)?;
        require_non_empty("PASSWORD", &password)?;
        Ok(Self { email, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

fn required_env(var_name: &str) -> AppResult<String> {
    let value = std::env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound {
        var_name: var_name.to_string(),
    })?;
    require_non_empty(var_name, &value)?;
    Ok(value)
}

fn require_non_empty(var_name: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::EnvVarEmpty {
            var_name: var_name.to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn browser_mode_parses_case_insensitively() {
        assert_eq!("Headless".parse::<BrowserMode>().unwrap(), BrowserMode::Headless);
        assert_eq!(" attach ".parse::<BrowserMode>().unwrap(), BrowserMode::Attach);
        assert!("remote".parse::<BrowserMode>().is_err());
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let err = Credentials::new("someone@example.com", "   ").unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::EnvVarEmpty { ref var_name }) if var_name == "PASSWORD"
        ));
        assert!(Credentials::new("", "secret").is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = Credentials::new("someone@example.com", "hunter2").unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("someone@example.com"));
    }

    #[test]
    fn default_timeouts_match_invoice_workflow() {
        let config = Config::default();
        assert_eq!(config.navigation_timeout(), Duration::from_millis(2000));
        assert_eq!(config.xlsx_sheet, "Sheet1");
        assert_eq!(config.locate_strategy, LocateStrategy::ContainerText);
        assert_eq!(config.target_title, None);
    }

    #[test]
    fn target_title_is_read_from_env() {
        std::env::set_var("TARGET_TITLE", "Your Orders");
        assert_eq!(Config::from_env().target_title.as_deref(), Some("Your Orders"));

        std::env::set_var("TARGET_TITLE", "  ");
        assert_eq!(Config::from_env().target_title, None);
        std::env::remove_var("TARGET_TITLE");
    }
}
