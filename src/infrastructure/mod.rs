pub mod chromium_session;
pub mod js_executor;
pub mod pdf_renderer;
pub mod session;

pub use chromium_session::ChromiumSession;
pub use js_executor::JsExecutor;
pub use pdf_renderer::PdfRenderer;
pub use session::{LocateStrategy, PageRenderer, SessionDriver, ORDERS_CONTAINER, VIEW_INVOICE_TEXT};
