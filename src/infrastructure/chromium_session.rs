//! 基于 chromiumoxide 的会话驱动
//!
//! 所有 DOM 操作都通过 JsExecutor 执行，参数统一经过 `js_literal` 转义。

use crate::config::{Config, Credentials};
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::js_executor::{js_literal, JsExecutor, POLL_INTERVAL};
use crate::infrastructure::session::{
    LocateStrategy, SessionDriver, ORDERS_CONTAINER, VIEW_INVOICE_TEXT,
};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

const SEARCH_INPUT: &str = "input#searchOrdersInput";
const SEARCH_FORM: &str = "form#searchForm";

const ACCOUNT_LIST: &str = "#nav-link-accountList";
const SIGN_IN_BUTTON: &str = ".nav-action-button";
const EMAIL_INPUT: &str = "input#ap_email";
const CONTINUE_BUTTON: &str = "input#continue";
const PASSWORD_INPUT: &str = "input#ap_password";
const SIGN_IN_SUBMIT: &str = "input#signInSubmit";
const ORDERS_LINK: &str = "a#nav-orders";
const ACCOUNT_MENU: &str = "[data-nav-ref='nav_youraccount_btn']";
const SIGN_OUT_ITEM: &str = "#nav-item-signout";

const SIGN_IN_PATH: &str = "ap/signin";
const ORDER_HISTORY_PATH: &str = "gp/css/order-history";

/// 浏览器会话驱动
pub struct ChromiumSession {
    executor: JsExecutor,
    strategy: LocateStrategy,
    navigation_timeout: Duration,
    settle_timeout: Duration,
}

impl ChromiumSession {
    pub fn new(executor: JsExecutor, config: &Config) -> Self {
        Self {
            executor,
            strategy: config.locate_strategy,
            navigation_timeout: config.navigation_timeout(),
            settle_timeout: config.settle_timeout(),
        }
    }

    /// 登录账户
    pub async fn sign_in(&self, target_url: &str, credentials: &Credentials) -> AppResult<()> {
        info!("🔐 正在登录...");
        self.navigate_to(target_url).await?;

        self.executor
            .eval(format!(
                "(() => {{ const el = document.querySelector({}); if (el) el.focus(); return !!el; }})()",
                js_literal(ACCOUNT_LIST)?
            ))
            .await?;
        self.click_last(SIGN_IN_BUTTON).await?;
        self.expect_location(SIGN_IN_PATH).await?;

        self.type_into(EMAIL_INPUT, &credentials.email).await?;
        self.click_last(CONTINUE_BUTTON).await?;
        self.type_into(PASSWORD_INPUT, &credentials.password).await?;
        self.click_last(SIGN_IN_SUBMIT).await?;

        let left_sign_in = self
            .executor
            .poll_until(
                &format!("!window.location.href.includes({})", js_literal(SIGN_IN_PATH)?),
                self.navigation_timeout,
            )
            .await?;
        if !left_sign_in {
            return Err(self.navigation_timeout_error("(登录完成页面)").await);
        }

        info!("✓ 登录成功");
        Ok(())
    }

    /// 打开订单历史页，返回它的地址
    pub async fn open_order_history(&self) -> AppResult<String> {
        self.click_last(ORDERS_LINK).await?;
        self.expect_location(ORDER_HISTORY_PATH).await?;
        let href = self.current_location().await?;
        info!("✓ 已打开订单历史: {}", href);
        Ok(href)
    }

    /// 等待容器出现，并等到它的内容不再变化
    ///
    /// 容器始终没有出现时返回 `false`。
    async fn wait_for_settled(&self, selector: &str) -> AppResult<bool> {
        let probe = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el || document.readyState !== 'complete') return -1;
                return el.innerHTML.length;
            }})()"#,
            js_literal(selector)?
        );

        let settled =
            wait_until_stable(|| self.executor.eval_as::<i64>(probe.as_str()), self.settle_timeout)
                .await?;
        match settled {
            Settle::Stable => Ok(true),
            Settle::StillChanging => {
                warn!("容器 {} 内容仍在变化，按当前内容继续", selector);
                Ok(true)
            }
            Settle::Missing => {
                debug!("容器 {} 在 {:?} 内没有出现", selector, self.settle_timeout);
                Ok(false)
            }
        }
    }

    async fn wait_for_selector(&self, selector: &str) -> AppResult<()> {
        let found = self
            .executor
            .poll_until(
                &format!("!!document.querySelector({})", js_literal(selector)?),
                self.settle_timeout,
            )
            .await?;
        if found {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
            }
            .into())
        }
    }

    async fn click_last(&self, selector: &str) -> AppResult<()> {
        self.wait_for_selector(selector).await?;
        self.executor
            .eval(format!(
                r#"(() => {{
                    const all = document.querySelectorAll({});
                    all[all.length - 1].click();
                    return true;
                }})()"#,
                js_literal(selector)?
            ))
            .await?;
        Ok(())
    }

    async fn type_into(&self, selector: &str, value: &str) -> AppResult<()> {
        self.wait_for_selector(selector).await?;
        self.executor
            .page()
            .find_element(selector)
            .await?
            .click()
            .await?
            .type_str(value)
            .await?;
        Ok(())
    }

    async fn expect_location(&self, fragment: &str) -> AppResult<()> {
        if self
            .current_location_includes(fragment, self.navigation_timeout)
            .await?
        {
            Ok(())
        } else {
            Err(self.navigation_timeout_error(fragment).await)
        }
    }

    async fn navigation_timeout_error(&self, expected: &str) -> AppError {
        let actual = self
            .current_location()
            .await
            .unwrap_or_else(|_| "(未知)".to_string());
        BrowserError::NavigationTimeout {
            expected: expected.to_string(),
            actual,
            timeout_ms: self.navigation_timeout.as_millis() as u64,
        }
        .into()
    }

    async fn activate_in_matching_card(&self, order_id: &str) -> AppResult<bool> {
        let js_code = format!(
            r#"(() => {{
                const container = document.querySelector({});
                if (!container) return false;
                const card = Array.from(container.children)
                    .find(c => (c.textContent || '').includes({}));
                if (!card) return false;
                const link = Array.from(card.querySelectorAll('a'))
                    .find(a => /invoice/i.test(a.textContent || ''));
                if (!link) return false;
                link.click();
                return true;
            }})()"#,
            js_literal(ORDERS_CONTAINER)?,
            js_literal(order_id)?
        );
        self.executor.eval_as(js_code).await
    }
}

/// 容器等待的结果
#[derive(Debug, PartialEq, Eq)]
enum Settle {
    Stable,
    StillChanging,
    Missing,
}

/// 轮询容器内容长度（负数表示容器尚未出现），连续两次相同即视为稳定
///
/// 页面跳转中的执行错误按"容器未出现"处理；超时时最后一次仍然出错才返回错误。
async fn wait_until_stable<F, Fut>(mut probe: F, limit: Duration) -> AppResult<Settle>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<i64>>,
{
    let deadline = Instant::now() + limit;
    let mut last: i64 = -1;
    loop {
        let current = match probe().await {
            Ok(length) => length,
            Err(e) if Instant::now() >= deadline => return Err(e),
            Err(e) => {
                debug!("读取容器时页面暂不可用: {}", e);
                -1
            }
        };
        if current >= 0 && current == last {
            return Ok(Settle::Stable);
        }
        if Instant::now() >= deadline {
            return Ok(if current < 0 {
                Settle::Missing
            } else {
                Settle::StillChanging
            });
        }
        last = current;
        sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl SessionDriver for ChromiumSession {
    async fn search(&self, term: &str) -> AppResult<()> {
        self.wait_for_selector(SEARCH_INPUT).await?;
        self.executor
            .eval(format!(
                r#"(() => {{
                    const input = document.querySelector({});
                    input.value = {};
                    input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    const form = document.querySelector({});
                    if (!form) return false;
                    form.submit();
                    return true;
                }})()"#,
                js_literal(SEARCH_INPUT)?,
                js_literal(term)?,
                js_literal(SEARCH_FORM)?
            ))
            .await?;

        // 搜索可能是整页跳转，也可能是页面内刷新
        if timeout(self.settle_timeout, self.executor.page().wait_for_navigation())
            .await
            .is_err()
        {
            debug!("搜索 {} 后没有发生页面跳转", term);
        }
        Ok(())
    }

    async fn current_location_includes(
        &self,
        fragment: &str,
        timeout: Duration,
    ) -> AppResult<bool> {
        self.executor
            .poll_until(
                &format!("window.location.href.includes({})", js_literal(fragment)?),
                timeout,
            )
            .await
    }

    async fn current_location(&self) -> AppResult<String> {
        self.executor.eval_as("window.location.href").await
    }

    async fn find_and_activate(
        &self,
        container_selector: &str,
        text_match: &str,
    ) -> AppResult<bool> {
        let js_code = format!(
            r#"(() => {{
                const container = document.querySelector({});
                if (!container) return false;
                const needle = {};
                const hits = Array.from(container.querySelectorAll('*'))
                    .filter(el => (el.textContent || '').includes(needle));
                if (hits.length === 0) return false;
                const deepest = hits.find(el =>
                    !Array.from(el.children).some(c => (c.textContent || '').includes(needle)));
                const target = deepest || hits[hits.length - 1];
                (target.closest('a, button, input[type=submit]') || target).click();
                return true;
            }})()"#,
            js_literal(container_selector)?,
            js_literal(text_match)?
        );
        self.executor.eval_as(js_code).await
    }

    async fn navigate_to(&self, href: &str) -> AppResult<()> {
        self.executor
            .page()
            .goto(href)
            .await
            .map_err(|e| AppError::navigation_failed(href, e))?;
        Ok(())
    }

    async fn locate_invoice_affordance(&self, order_id: &str) -> AppResult<bool> {
        if !self.wait_for_settled(ORDERS_CONTAINER).await? {
            return Ok(false);
        }
        match self.strategy {
            LocateStrategy::ContainerText => {
                self.find_and_activate(ORDERS_CONTAINER, VIEW_INVOICE_TEXT).await
            }
            LocateStrategy::OrderCardScan => self.activate_in_matching_card(order_id).await,
        }
    }

    async fn sign_out(&self) -> AppResult<()> {
        info!("🚪 正在退出登录...");
        self.wait_for_selector(ACCOUNT_MENU).await?;
        self.executor
            .eval(format!(
                r#"(() => {{
                    const el = document.querySelector({});
                    el.dispatchEvent(new MouseEvent('mouseover', {{ bubbles: true }}));
                    return true;
                }})()"#,
                js_literal(ACCOUNT_MENU)?
            ))
            .await?;
        self.click_last(SIGN_OUT_ITEM).await?;
        self.expect_location(SIGN_IN_PATH).await?;
        info!("✓ 已退出登录");
        Ok(())
    }
}
