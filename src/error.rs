use thiserror::Error;

/// 应用程序错误类型
///
/// 工作流之外抛出的任何错误都视为环境故障：整个批次中止。
/// "找不到发票" 不是错误，而是一条 `FetchResult`。
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动无头浏览器失败
    #[error("启动无头浏览器失败: {message}")]
    LaunchFailed { message: String },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 在限定时间内没有到达预期页面
    #[error("等待 {timeout_ms}ms 后仍未到达包含 '{expected}' 的页面 (当前: {actual})")]
    NavigationTimeout {
        expected: String,
        actual: String,
        timeout_ms: u64,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 页面元素不存在
    #[error("找不到页面元素: {selector}")]
    ElementNotFound { selector: String },
    /// PDF 渲染失败
    #[error("渲染 PDF 失败 ({filename}): {message}")]
    RenderFailed { filename: String, message: String },
    /// PDF 渲染超时
    #[error("渲染 PDF 超时 ({filename}), 已等待 {timeout_ms}ms")]
    RenderTimeout { filename: String, timeout_ms: u64 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CSV 解析失败
    #[error("CSV解析失败 ({path}): {source}")]
    CsvParseFailed {
        path: String,
        #[source]
        source: csv::Error,
    },
    /// XLSX 解析失败
    #[error("XLSX解析失败 ({path}): {message}")]
    XlsxParseFailed { path: String, message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 环境变量为空
    #[error("环境变量 {var_name} 不能为空")]
    EnvVarEmpty { var_name: String },
    /// 取值无效
    #[error("环境变量 {var_name} 的值 '{value}' 无效, 期望: {expected}")]
    InvalidValue {
        var_name: String,
        value: String,
        expected: String,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON处理失败: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::File(FileError::CsvParseFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<calamine::XlsxError> for AppError {
    fn from(err: calamine::XlsxError) -> Self {
        AppError::File(FileError::XlsxParseFailed {
            path: String::new(),
            message: err.to_string(),
        })
    }
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::File(FileError::XlsxParseFailed {
            path: String::new(),
            message: err.to_string(),
        })
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Other(format!("后台任务执行失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_timeout_message_names_expected_path() {
        let err = AppError::from(BrowserError::NavigationTimeout {
            expected: "gp/css/summary/print.html".to_string(),
            actual: "/gp/your-account/order-history".to_string(),
            timeout_ms: 2000,
        });
        let text = err.to_string();
        assert!(text.contains("gp/css/summary/print.html"));
        assert!(text.contains("2000ms"));
    }

    #[test]
    fn io_error_becomes_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(AppError::from(io), AppError::File(FileError::ReadFailed { .. })));
    }

    #[test]
    fn spreadsheet_errors_become_parse_failures() {
        let io = || std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");

        let from_csv = AppError::from(csv::Error::from(io()));
        assert!(matches!(from_csv, AppError::File(FileError::CsvParseFailed { .. })));

        let from_xlsx = AppError::from(calamine::XlsxError::Io(io()));
        match from_xlsx {
            AppError::File(FileError::XlsxParseFailed { message, .. }) => {
                assert!(message.contains("truncated"))
            }
            other => panic!("unexpected error: {other}"),
        }

        let from_workbook = AppError::from(calamine::Error::Io(io()));
        assert!(matches!(from_workbook, AppError::File(FileError::XlsxParseFailed { .. })));
    }
}
