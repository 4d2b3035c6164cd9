use download_invoices::browser::connect_to_browser_and_page;
use download_invoices::config::Config;
use download_invoices::infrastructure::{ChromiumSession, JsExecutor, PdfRenderer};
use download_invoices::utils::logging;
use download_invoices::{Credentials, PageRenderer, SessionDriver};

#[tokio::test]
#[ignore] // 需要已打开调试端口的浏览器：cargo test -- --ignored
async fn test_browser_connection() {
    logging::init(true);

    let config = Config::from_env();

    let result = connect_to_browser_and_page(
        config.browser_debug_port,
        Some(&config.target_url),
        config.target_title.as_deref(),
    )
    .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore] // 需要 EMAIL / PASSWORD 以及真实订单号 TEST_ORDER_ID
async fn test_fetch_single_invoice() {
    logging::init(true);

    let config = Config::from_env();
    let credentials = Credentials::from_env().expect("缺少 EMAIL / PASSWORD");
    let order_id = std::env::var("TEST_ORDER_ID").expect("缺少 TEST_ORDER_ID");

    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        Some(&config.target_url),
        config.target_title.as_deref(),
    )
    .await
    .expect("连接浏览器失败");

    let renderer = PdfRenderer::new(page.clone(), config.download_dir.clone());
    let session = ChromiumSession::new(JsExecutor::new(page), &config);

    session
        .sign_in(&config.target_url, &credentials)
        .await
        .expect("登录失败");
    let order_history = session.open_order_history().await.expect("打开订单历史失败");

    session.search(&order_id).await.expect("搜索失败");
    let found = session
        .locate_invoice_affordance(&order_id)
        .await
        .expect("查找发票入口失败");
    assert!(found, "应该能找到发票入口");
    let opened = session
        .current_location_includes(&config.invoice_path_fragment, config.navigation_timeout())
        .await
        .expect("读取页面地址失败");
    assert!(opened, "应该进入发票打印页");

    let path = renderer
        .render_and_save("body", &format!("{}.pdf", order_id))
        .await
        .expect("渲染 PDF 失败");
    assert!(path.exists());

    session.navigate_to(&order_history).await.expect("返回订单页失败");
    session.sign_out().await.expect("退出登录失败");
}
